//! Probe strategy: the seam between electrical identification and the
//! rest of the core.
//!
//! ```text
//!   SerialIdProbe ───┐
//!                    ├──▶ ProbeStrategy::probe_all() ──▶ Inventory<N>
//!   AddressScanProbe ┘
//! ```
//!
//! Implementations own the physical bus. They never fail as a whole:
//! anything that goes wrong for one port is that port reading absent.

use crate::bus::identity::Inventory;

/// Which identification mechanism produced an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// Per-port 1-Wire ID line carrying an 8-byte ROM.
    SerialId,
    /// Shared multi-drop bus swept across an address window.
    AddressScan,
}

pub trait ProbeStrategy<const N: usize> {
    /// Probe every port in ascending order and return a complete snapshot.
    fn probe_all(&mut self) -> Inventory<N>;

    fn kind(&self) -> ProbeKind;

    /// Modules ignored so far because a fixed-capacity table was full.
    fn overflow_count(&self) -> u32 {
        0
    }
}
