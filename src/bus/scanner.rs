//! Bus scanner: one probe pass, diffed against the previous inventory.
//!
//! The new inventory is built completely by the probe before it replaces
//! the old one, so readers only ever see a whole snapshot.

use log::{debug, info};

use crate::bus::identity::Inventory;
use crate::bus::port::PortIndex;
use crate::bus::probe::ProbeStrategy;

/// Ascending list of ports; never longer than `N`.
pub type PortList<const N: usize> = heapless::Vec<PortIndex<N>, N>;

/// Presence transitions of one scan.
///
/// A port whose identity changed between scans appears in both lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult<const N: usize> {
    pub newly_present: PortList<N>,
    pub removed: PortList<N>,
    pub total_active: usize,
}

impl<const N: usize> ScanResult<N> {
    /// No port changed.
    pub fn is_steady(&self) -> bool {
        self.newly_present.is_empty() && self.removed.is_empty()
    }
}

pub struct BusScanner<P, const N: usize> {
    probe: P,
    inventory: Inventory<N>,
    scan_count: u32,
}

impl<P: ProbeStrategy<N>, const N: usize> BusScanner<P, N> {
    /// Starts with every port absent; the first scan reports all present
    /// modules as new.
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            inventory: Inventory::new(),
            scan_count: 0,
        }
    }

    pub fn scan(&mut self) -> ScanResult<N> {
        let next = self.probe.probe_all();

        let mut newly_present = PortList::new();
        let mut removed = PortList::new();
        for port in PortIndex::all() {
            // Each list receives each port at most once, so pushes fit.
            match (self.inventory.get(port), next.get(port)) {
                (None, Some(_)) => {
                    let _ = newly_present.push(port);
                }
                (Some(_), None) => {
                    let _ = removed.push(port);
                }
                (Some(old), Some(new)) if old != new => {
                    debug!(
                        "Scanner: port {} identity changed 0x{:04X} -> 0x{:04X}",
                        port, old.type_code, new.type_code
                    );
                    let _ = removed.push(port);
                    let _ = newly_present.push(port);
                }
                _ => {}
            }
        }

        self.inventory = next;
        self.scan_count = self.scan_count.wrapping_add(1);

        let result = ScanResult {
            newly_present,
            removed,
            total_active: self.inventory.present_count(),
        };
        if !result.is_steady() {
            info!(
                "Scanner: +{} -{} ({} active)",
                result.newly_present.len(),
                result.removed.len(),
                result.total_active
            );
        }
        result
    }

    /// Snapshot from the most recent scan.
    pub fn inventory(&self) -> &Inventory<N> {
        &self.inventory
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    /// Completed scans since boot.
    pub fn scan_count(&self) -> u32 {
        self.scan_count
    }
}
