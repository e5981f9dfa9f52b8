//! Module driver interface.

use crate::bus::identity::ModuleIdentity;
use crate::error::InitError;

/// Behaviour bound to one module type.
///
/// One driver instance serves every port that carries its type; `port`
/// tells the instances apart.
pub trait ModuleDriver {
    /// One-time setup when a module of this type appears on `port`.
    /// An error leaves the port unbound; it is retried next scan.
    fn init(&mut self, port: usize, identity: &ModuleIdentity) -> Result<(), InitError>;

    /// Periodic behaviour, once per dispatch cycle while bound. Must not
    /// block; failures are recorded in the driver's own state.
    fn tick(&mut self, port: usize, identity: &ModuleIdentity);

    /// The module on `port` was removed or replaced. Drop per-port state.
    fn release(&mut self, _port: usize) {}
}

/// Adapts a pair of closures to [`ModuleDriver`].
pub struct FnDriver<I, T> {
    init: I,
    tick: T,
}

impl<I, T> FnDriver<I, T>
where
    I: FnMut(usize, &ModuleIdentity) -> Result<(), InitError>,
    T: FnMut(usize, &ModuleIdentity),
{
    pub fn new(init: I, tick: T) -> Self {
        Self { init, tick }
    }
}

impl<I, T> ModuleDriver for FnDriver<I, T>
where
    I: FnMut(usize, &ModuleIdentity) -> Result<(), InitError>,
    T: FnMut(usize, &ModuleIdentity),
{
    fn init(&mut self, port: usize, identity: &ModuleIdentity) -> Result<(), InitError> {
        (self.init)(port, identity)
    }

    fn tick(&mut self, port: usize, identity: &ModuleIdentity) {
        (self.tick)(port, identity);
    }
}
