//! Driver registry: module type code → driver, and port → active binding.
//!
//! ```text
//!  ┌─────────────────────────────────────────────────────────┐
//!  │  drivers (type code → entry)      bindings (per port)   │
//!  │  ┌────────┬────────────┬────────┐  ┌──────┬───────────┐ │
//!  │  │ 0x0001 │ "ServoArm" │ Box<…> │  │ p0   │ 0x0001    │ │
//!  │  │ 0x0003 │ "SensorEnv"│ Box<…> │  │ p1   │ —         │ │
//!  │  └────────┴────────────┴────────┘  │ p2   │ 0x0003    │ │
//!  │                                    └──────┴───────────┘ │
//!  └─────────────────────────────────────────────────────────┘
//! ```
//!
//! A binding exists only after `init` succeeded. Re-binding a port to the
//! type it is already bound to does nothing, so `init` runs once per
//! attach. Unknown types and failed inits leave the port unbound and are
//! evaluated again on the next scan.

pub mod driver;

use heapless::FnvIndexMap;
use log::{debug, info, warn};

use crate::bus::identity::ModuleIdentity;
use crate::bus::port::PortIndex;
use crate::error::{Error, InitError, Result};

pub use driver::{FnDriver, ModuleDriver};

/// Maximum number of distinct module types (power of two for `FnvIndexMap`).
pub const MAX_DRIVERS: usize = 32;

/// Name reported for type codes with no registered driver.
pub const UNKNOWN_NAME: &str = "unknown";

struct DriverEntry<'d> {
    name: &'static str,
    driver: Box<dyn ModuleDriver + 'd>,
}

/// Result of [`DriverRegistry::resolve_and_bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// Port already bound to this type; `init` was not called.
    AlreadyBound,
    /// `init` succeeded and the binding was created.
    Bound { name: &'static str },
    /// No driver registered for the type code.
    UnknownType,
    /// `init` failed; the port stays unbound.
    InitFailed { name: &'static str, error: InitError },
}

pub struct DriverRegistry<'d, const N: usize> {
    drivers: FnvIndexMap<u16, DriverEntry<'d>, MAX_DRIVERS>,
    bindings: [Option<u16>; N],
}

impl<const N: usize> Default for DriverRegistry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d, const N: usize> DriverRegistry<'d, N> {
    pub fn new() -> Self {
        Self {
            drivers: FnvIndexMap::new(),
            bindings: [None; N],
        }
    }

    // ── Registration (startup only) ───────────────────────────

    /// Register `driver` for `type_code`. A second registration for the
    /// same code replaces the first.
    pub fn register(
        &mut self,
        type_code: u16,
        name: &'static str,
        driver: impl ModuleDriver + 'd,
    ) -> Result<()> {
        let entry = DriverEntry {
            name,
            driver: Box::new(driver),
        };
        match self.drivers.insert(type_code, entry) {
            Ok(Some(old)) => {
                debug!(
                    "Registry: 0x{:04X} '{}' replaced by '{}'",
                    type_code, old.name, name
                );
                Ok(())
            }
            Ok(None) => {
                debug!("Registry: 0x{:04X} -> '{}'", type_code, name);
                Ok(())
            }
            Err(_) => Err(Error::RegistryFull),
        }
    }

    /// Register a driver given as `init` and `tick` closures.
    pub fn register_fn<I, T>(&mut self, type_code: u16, name: &'static str, init: I, tick: T) -> Result<()>
    where
        I: FnMut(usize, &ModuleIdentity) -> core::result::Result<(), InitError> + 'd,
        T: FnMut(usize, &ModuleIdentity) + 'd,
    {
        self.register(type_code, name, FnDriver::new(init, tick))
    }

    pub fn is_registered(&self, type_code: u16) -> bool {
        self.drivers.contains_key(&type_code)
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    // ── Binding ───────────────────────────────────────────────

    /// Bind the driver for `identity.type_code` to `port`, running `init`
    /// unless the port is already bound to that type.
    pub fn resolve_and_bind(&mut self, port: PortIndex<N>, identity: &ModuleIdentity) -> BindOutcome {
        let type_code = identity.type_code;
        match self.bindings[port.get()] {
            Some(bound) if bound == type_code => return BindOutcome::AlreadyBound,
            Some(_) => {
                self.unbind(port);
            }
            None => {}
        }

        let Some(entry) = self.drivers.get_mut(&type_code) else {
            warn!(
                "Registry: no driver for module type 0x{:04X} on port {}",
                type_code, port
            );
            return BindOutcome::UnknownType;
        };

        info!("Registry: loading driver '{}' for port {}", entry.name, port);
        match entry.driver.init(port.get(), identity) {
            Ok(()) => {
                self.bindings[port.get()] = Some(type_code);
                BindOutcome::Bound { name: entry.name }
            }
            Err(error) => {
                warn!(
                    "Registry: driver '{}' init failed on port {}: {}",
                    entry.name, port, error
                );
                BindOutcome::InitFailed {
                    name: entry.name,
                    error,
                }
            }
        }
    }

    /// Clear the binding on `port`, letting its driver release per-port
    /// state. Returns the type code that was bound.
    pub fn unbind(&mut self, port: PortIndex<N>) -> Option<u16> {
        let type_code = self.bindings[port.get()].take()?;
        if let Some(entry) = self.drivers.get_mut(&type_code) {
            info!("Registry: unloading driver '{}' from port {}", entry.name, port);
            entry.driver.release(port.get());
        }
        Some(type_code)
    }

    pub fn binding(&self, port: PortIndex<N>) -> Option<u16> {
        self.bindings[port.get()]
    }

    /// Bound ports in ascending order.
    pub fn bindings(&self) -> impl Iterator<Item = (PortIndex<N>, u16)> + '_ {
        PortIndex::all()
            .zip(self.bindings.iter())
            .filter_map(|(p, b)| b.map(|code| (p, code)))
    }

    pub fn active_port_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.is_some()).count()
    }

    // ── Dispatch ──────────────────────────────────────────────

    /// Tick the driver bound to `port`. Returns `false` if unbound.
    pub fn tick(&mut self, port: PortIndex<N>, identity: &ModuleIdentity) -> bool {
        let Some(type_code) = self.bindings[port.get()] else {
            return false;
        };
        match self.drivers.get_mut(&type_code) {
            Some(entry) => {
                entry.driver.tick(port.get(), identity);
                true
            }
            None => false,
        }
    }

    // ── Inventory queries ─────────────────────────────────────

    /// Registered name of `type_code`, or `"unknown"`.
    pub fn module_name(&self, type_code: u16) -> &'static str {
        self.drivers.get(&type_code).map_or(UNKNOWN_NAME, |e| e.name)
    }
}
