//! Shared-bus probe: sweep an I²C address window for modules.
//!
//! Protocol:
//!   - For each address in the window (ascending), issue a zero-length
//!     write. NACK means nobody is there.
//!   - On ACK, read the one-byte module ID from the ID register.
//!   - Track responders in a fixed-capacity [`AddressTable`]; the slot an
//!     address occupies is the port index it is reported on.
//!
//! ## Slot reuse
//!
//! An entry whose address did not answer during a pass is released at the
//! end of that pass, so the port reads absent for at least one scan before
//! a different module can claim the slot on a later pass.

use core::cell::RefCell;

use embedded_hal::i2c::{Error as _, ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
use log::{debug, info, warn};

use crate::bus::catalog;
use crate::bus::identity::{Inventory, ModuleIdentity};
use crate::bus::port::PortIndex;
use crate::bus::probe::{ProbeKind, ProbeStrategy};
use crate::config::BusConfig;
use crate::error::ProbeError;

/// Capacity of the discovery table on the energy-core board.
pub const DEFAULT_TABLE_CAPACITY: usize = 16;

fn classify<E: embedded_hal::i2c::Error>(e: &E) -> ProbeError {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => ProbeError::Nack,
        _ => ProbeError::Bus,
    }
}

/// Read `buf.len()` bytes starting at register `reg` of the module at `addr`.
pub fn read_register<I: I2c>(
    i2c: &mut I,
    addr: u8,
    reg: u8,
    buf: &mut [u8],
) -> Result<(), ProbeError> {
    i2c.write_read(addr, &[reg], buf).map_err(|e| classify(&e))
}

/// Write `data` starting at register `reg` in one transaction.
pub fn write_register<I: I2c>(i2c: &mut I, addr: u8, reg: u8, data: &[u8]) -> Result<(), ProbeError> {
    let reg = [reg];
    i2c.transaction(addr, &mut [Operation::Write(&reg), Operation::Write(data)])
        .map_err(|e| classify(&e))
}

// ---------------------------------------------------------------------------
// Address table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TableEntry {
    address: u8,
    id_byte: u8,
    /// Answered during the current pass.
    seen: bool,
}

/// What [`AddressTable::observe`] did with a responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    /// Already tracked in this slot.
    Known(usize),
    /// Newly inserted into this slot.
    Inserted(usize),
    /// Table full; the module is ignored.
    Dropped,
}

/// Fixed-capacity table of discovered addresses.
#[derive(Debug, Clone)]
pub struct AddressTable<const N: usize> {
    slots: [Option<TableEntry>; N],
    overflow: u32,
}

impl<const N: usize> Default for AddressTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AddressTable<N> {
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            overflow: 0,
        }
    }

    /// Start a sweep: nothing has answered yet.
    pub fn begin_pass(&mut self) {
        for entry in self.slots.iter_mut().flatten() {
            entry.seen = false;
        }
    }

    /// Record that `address` answered with `id_byte`.
    pub fn observe(&mut self, address: u8, id_byte: u8) -> Observed {
        if let Some(i) = self
            .slots
            .iter()
            .position(|s| s.is_some_and(|e| e.address == address))
        {
            if let Some(entry) = self.slots[i].as_mut() {
                entry.seen = true;
                entry.id_byte = id_byte;
            }
            return Observed::Known(i);
        }
        match self.slots.iter().position(Option::is_none) {
            Some(i) => {
                self.slots[i] = Some(TableEntry {
                    address,
                    id_byte,
                    seen: true,
                });
                Observed::Inserted(i)
            }
            None => {
                self.overflow = self.overflow.saturating_add(1);
                Observed::Dropped
            }
        }
    }

    /// Finish a sweep: release every entry that did not answer.
    /// Returns the number of entries released.
    pub fn end_pass(&mut self) -> usize {
        let mut released = 0;
        for slot in &mut self.slots {
            if let Some(entry) = *slot {
                if !entry.seen {
                    info!("Bus: module removed (addr=0x{:02X})", entry.address);
                    *slot = None;
                    released += 1;
                }
            }
        }
        released
    }

    /// Times a responder was ignored because every slot was taken.
    pub fn overflow_count(&self) -> u32 {
        self.overflow
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot currently holding `address`, if any.
    pub fn slot_of(&self, address: u8) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.is_some_and(|e| e.address == address))
    }

    fn to_inventory(&self) -> Inventory<N> {
        let mut inventory = Inventory::new();
        for (port, slot) in PortIndex::all().zip(self.slots.iter()) {
            inventory.set(port, slot.map(|e| ModuleIdentity::from_bus(e.address, e.id_byte)));
        }
        inventory
    }
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

/// Address-scan probe strategy with an `N`-slot discovery table.
pub struct AddressScanProbe<I, const N: usize = DEFAULT_TABLE_CAPACITY> {
    i2c: I,
    addr_start: u8,
    addr_end: u8,
    id_register: u8,
    table: AddressTable<N>,
}

impl<I: I2c, const N: usize> AddressScanProbe<I, N> {
    pub fn new(i2c: I, config: &BusConfig) -> Self {
        Self {
            i2c,
            addr_start: config.scan_addr_start,
            addr_end: config.scan_addr_end,
            id_register: config.id_register,
            table: AddressTable::new(),
        }
    }

    /// Zero-length write: does anything ACK `addr`?
    fn is_present(&mut self, addr: u8) -> Result<(), ProbeError> {
        self.i2c.write(addr, &[]).map_err(|e| classify(&e))
    }

    /// Presence test plus ID register read for one address.
    pub fn probe_address(&mut self, addr: u8) -> Result<u8, ProbeError> {
        self.is_present(addr)?;
        let mut id = [0u8; 1];
        read_register(&mut self.i2c, addr, self.id_register, &mut id)?;
        Ok(id[0])
    }

    pub fn table(&self) -> &AddressTable<N> {
        &self.table
    }

    /// Bus access for module drivers between scans.
    pub fn bus(&mut self) -> &mut I {
        &mut self.i2c
    }
}

impl<I: I2c, const N: usize> ProbeStrategy<N> for AddressScanProbe<I, N> {
    fn probe_all(&mut self) -> Inventory<N> {
        self.table.begin_pass();

        for addr in self.addr_start..=self.addr_end {
            let id_byte = match self.probe_address(addr) {
                Ok(id) => id,
                Err(ProbeError::Nack) => continue,
                Err(e) => {
                    debug!("Bus: addr=0x{:02X} {}", addr, e);
                    continue;
                }
            };
            match self.table.observe(addr, id_byte) {
                Observed::Known(_) => {}
                Observed::Inserted(slot) => info!(
                    "Bus: new module addr=0x{:02X} id=0x{:02X} name={} slot={}",
                    addr,
                    id_byte,
                    catalog::builtin_name(ProbeKind::AddressScan, id_byte as u16),
                    slot
                ),
                Observed::Dropped => warn!(
                    "Bus: table full ({}/{}), ignoring module at addr=0x{:02X}",
                    N, N, addr
                ),
            }
        }

        self.table.end_pass();
        self.table.to_inventory()
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::AddressScan
    }

    fn overflow_count(&self) -> u32 {
        self.table.overflow_count()
    }
}

// ---------------------------------------------------------------------------
// Time-shared bus handle
// ---------------------------------------------------------------------------

/// Cloneable handle onto one I²C bus owned by a `RefCell`.
///
/// The control loop is single-threaded and scan, dispatch and ticks never
/// overlap, so each transaction holds the borrow only for its own duration.
/// Give one handle to the probe and one to each driver that needs the bus.
pub struct SharedI2c<'a, I> {
    bus: &'a RefCell<I>,
}

impl<'a, I> SharedI2c<'a, I> {
    pub fn new(bus: &'a RefCell<I>) -> Self {
        Self { bus }
    }
}

impl<I> Clone for SharedI2c<'_, I> {
    fn clone(&self) -> Self {
        Self { bus: self.bus }
    }
}

impl<I: I2c> ErrorType for SharedI2c<'_, I> {
    type Error = I::Error;
}

impl<I: I2c> I2c<SevenBitAddress> for SharedI2c<'_, I> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.bus.borrow_mut().transaction(address, operations)
    }
}
