//! Module identity: what one probe says about one port.
//!
//! ## ROM record layout (serial-ID modules)
//!
//! ```text
//!  byte  0      1   2        3   4   5   6      7
//!       ┌──────┬───────────┬────────────────┬───────┐
//!       │family│ type (LE) │ serial / mfg   │ CRC-8 │
//!       └──────┴───────────┴────────────────┴───────┘
//! ```
//!
//! The CRC is the 1-Wire "Dow" CRC-8 (x⁸ + x⁵ + x⁴ + 1, polynomial 0x31,
//! processed LSB-first, i.e. reflected 0x8C) over bytes 0–6.

use core::fmt;

use crate::bus::port::PortIndex;
use crate::error::ProbeError;

pub const ROM_LEN: usize = 8;

/// Reflected form of polynomial 0x31.
const DOW_POLY_REFLECTED: u8 = 0x8C;

/// 1-Wire CRC-8.  A full valid ROM (7 bytes + CRC) folds to zero.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= DOW_POLY_REFLECTED;
            }
            b >>= 1;
        }
    }
    crc
}

// ---------------------------------------------------------------------------
// UniqueId
// ---------------------------------------------------------------------------

/// A CRC-checked 8-byte ROM. Only constructible from a record whose
/// CRC matches, so holding one means the type bytes are trustworthy.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniqueId([u8; ROM_LEN]);

impl UniqueId {
    pub fn from_rom(rom: [u8; ROM_LEN]) -> Result<Self, ProbeError> {
        let computed = crc8(&rom[..ROM_LEN - 1]);
        let expected = rom[ROM_LEN - 1];
        if computed != expected {
            return Err(ProbeError::CrcMismatch { expected, computed });
        }
        Ok(Self(rom))
    }

    pub fn as_bytes(&self) -> &[u8; ROM_LEN] {
        &self.0
    }

    pub fn family(&self) -> u8 {
        self.0[0]
    }

    /// Module type from bytes 1–2, little-endian.
    pub fn type_code(&self) -> u16 {
        u16::from_le_bytes([self.0[1], self.0[2]])
    }

    /// Opaque serial / manufacturing bytes 3–6.
    pub fn serial(&self) -> [u8; 4] {
        [self.0[3], self.0[4], self.0[5], self.0[6]]
    }

    /// Upper-case hex, bytes in wire order.
    pub fn to_hex(&self) -> heapless::String<{ ROM_LEN * 2 }> {
        const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
        let mut s = heapless::String::new();
        for b in self.0 {
            // Capacity is exactly 2 chars per byte.
            let _ = s.push(DIGITS[(b >> 4) as usize] as char);
            let _ = s.push(DIGITS[(b & 0x0F) as usize] as char);
        }
        s
    }
}

impl fmt::Debug for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UniqueId({})", self.to_hex())
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// ModuleIdentity
// ---------------------------------------------------------------------------

/// A present module. Absence is `None` in an [`Inventory`], so an absent
/// port has no type code to dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleIdentity {
    /// 16-bit module type; 0 means "unknown".
    pub type_code: u16,
    /// Serial-ID modules only.
    pub unique_id: Option<UniqueId>,
    /// Shared-bus modules only: where the driver reaches the module.
    pub bus_address: Option<u8>,
}

impl ModuleIdentity {
    /// Validate an identity record read from a 1-Wire ID line.
    pub fn from_rom(rom: [u8; ROM_LEN]) -> Result<Self, ProbeError> {
        let id = UniqueId::from_rom(rom)?;
        Ok(Self {
            type_code: id.type_code(),
            unique_id: Some(id),
            bus_address: None,
        })
    }

    /// Identity of a module that answered on the shared bus.
    pub fn from_bus(address: u8, id_byte: u8) -> Self {
        Self {
            type_code: id_byte as u16,
            unique_id: None,
            bus_address: Some(address),
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Fixed-capacity arena of per-port probe results, addressed by port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory<const N: usize> {
    slots: [Option<ModuleIdentity>; N],
}

impl<const N: usize> Default for Inventory<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Inventory<N> {
    /// Every port absent.
    pub const fn new() -> Self {
        Self { slots: [None; N] }
    }

    pub fn get(&self, port: PortIndex<N>) -> Option<&ModuleIdentity> {
        self.slots[port.get()].as_ref()
    }

    pub fn set(&mut self, port: PortIndex<N>, identity: Option<ModuleIdentity>) {
        self.slots[port.get()] = identity;
    }

    pub fn is_present(&self, port: PortIndex<N>) -> bool {
        self.slots[port.get()].is_some()
    }

    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Present ports in ascending order.
    pub fn present(&self) -> impl Iterator<Item = (PortIndex<N>, &ModuleIdentity)> {
        PortIndex::all()
            .zip(self.slots.iter())
            .filter_map(|(p, s)| s.as_ref().map(|id| (p, id)))
    }
}
