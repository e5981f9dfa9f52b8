//! Dispatch loop: tick every bound port once per control iteration.
//!
//! Ports are visited in ascending order. The dispatcher has no timeout of
//! its own; drivers keep `tick` short and record their own failures.

use log::debug;

use crate::bus::identity::Inventory;
use crate::bus::port::PortIndex;
use crate::registry::DriverRegistry;

#[derive(Debug, Default)]
pub struct Dispatcher {
    cycles: u64,
    last_ticked: usize,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one dispatch cycle. Returns the number of drivers ticked.
    pub fn run_cycle<const N: usize>(
        &mut self,
        registry: &mut DriverRegistry<'_, N>,
        inventory: &Inventory<N>,
    ) -> usize {
        let mut ticked = 0;
        for port in PortIndex::all() {
            if registry.binding(port).is_none() {
                continue;
            }
            match inventory.get(port) {
                Some(identity) => {
                    if registry.tick(port, identity) {
                        ticked += 1;
                    }
                }
                // Bindings are cleared on removal; this is a stale snapshot.
                None => debug!("Dispatch: port {} bound but absent, skipped", port),
            }
        }
        self.cycles = self.cycles.wrapping_add(1);
        self.last_ticked = ticked;
        ticked
    }

    /// Completed dispatch cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Drivers ticked in the most recent cycle.
    pub fn last_ticked(&self) -> usize {
        self.last_ticked
    }
}
