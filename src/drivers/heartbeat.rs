//! Heartbeat driver.
//!
//! Placeholder behaviour for module types whose real driver is not
//! written yet: counts dispatch ticks per port and logs a liveness line
//! every `log_every` ticks.

use log::info;

use crate::bus::identity::ModuleIdentity;
use crate::error::InitError;
use crate::registry::ModuleDriver;

/// Logs every 1000 ticks unless configured otherwise.
pub const DEFAULT_LOG_EVERY: u32 = 1000;

pub struct HeartbeatDriver<const N: usize> {
    label: &'static str,
    log_every: u32,
    ticks: [Option<u32>; N],
}

impl<const N: usize> HeartbeatDriver<N> {
    pub fn new(label: &'static str) -> Self {
        Self::with_period(label, DEFAULT_LOG_EVERY)
    }

    /// `log_every == 0` disables the periodic line.
    pub fn with_period(label: &'static str, log_every: u32) -> Self {
        Self {
            label,
            log_every,
            ticks: [None; N],
        }
    }

    /// Ticks seen on `port` since it was bound, `None` if not bound.
    pub fn ticks(&self, port: usize) -> Option<u32> {
        self.ticks.get(port).copied().flatten()
    }

    /// Ports currently served by this instance.
    pub fn active_ports(&self) -> usize {
        self.ticks.iter().filter(|t| t.is_some()).count()
    }
}

impl<const N: usize> ModuleDriver for HeartbeatDriver<N> {
    fn init(&mut self, port: usize, identity: &ModuleIdentity) -> Result<(), InitError> {
        let slot = self
            .ticks
            .get_mut(port)
            .ok_or(InitError::Other("port out of range"))?;
        *slot = Some(0);
        match identity.unique_id {
            Some(uid) => info!("{}: port {} up (id {})", self.label, port, uid),
            None => info!("{}: port {} up", self.label, port),
        }
        Ok(())
    }

    fn tick(&mut self, port: usize, _identity: &ModuleIdentity) {
        let Some(Some(count)) = self.ticks.get_mut(port) else {
            return;
        };
        *count = count.wrapping_add(1);
        if self.log_every != 0 && *count % self.log_every == 0 {
            info!("{}: port {} alive, {} ticks", self.label, port, count);
        }
    }

    fn release(&mut self, port: usize) {
        if let Some(slot) = self.ticks.get_mut(port) {
            if let Some(count) = slot.take() {
                info!("{}: port {} down after {} ticks", self.label, port, count);
            }
        }
    }
}
