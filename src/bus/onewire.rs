//! Serial-ID probe: one 1-Wire identification line per port.
//!
//! Each module carries a 1-Wire ID EEPROM. A probe is a reset (presence
//! pulse), the SEARCH ROM command and a 64-bit triplet walk, after which
//! the ROM is CRC-checked and decoded by [`ModuleIdentity::from_rom`].
//!
//! ## Dual-target design
//!
//! [`OneWireLine`] is the transport seam. [`BitBangLine`] drives it on any
//! `embedded-hal` open-drain pin with a microsecond delay (ESP-IDF
//! `PinDriver` + `Ets` on target); tests substitute a simulated line.

use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, warn};

use crate::bus::identity::{Inventory, ModuleIdentity, ROM_LEN};
use crate::bus::port::PortIndex;
use crate::bus::probe::{ProbeKind, ProbeStrategy};
use crate::error::ProbeError;

/// SEARCH ROM command byte.
pub const CMD_SEARCH_ROM: u8 = 0xF0;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Bit-level access to one 1-Wire line. Every call is bounded by the
/// slot timing of the line; none may block indefinitely.
pub trait OneWireLine {
    type Error: Debug;

    /// Issue a reset pulse. `Ok(true)` if a device answered with presence.
    fn reset(&mut self) -> Result<bool, Self::Error>;

    fn write_bit(&mut self, bit: bool) -> Result<(), Self::Error>;

    fn read_bit(&mut self) -> Result<bool, Self::Error>;

    /// LSB first.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        for i in 0..8 {
            self.write_bit(byte & (1 << i) != 0)?;
        }
        Ok(())
    }

    /// LSB first.
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit()? {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }
}

// Standard-speed slot timings (µs).
const RESET_LOW_US: u32 = 480;
const PRESENCE_SAMPLE_US: u32 = 70;
const RESET_RECOVERY_US: u32 = 410;
const WRITE_1_LOW_US: u32 = 6;
const WRITE_1_RELEASE_US: u32 = 64;
const WRITE_0_LOW_US: u32 = 60;
const WRITE_0_RELEASE_US: u32 = 10;
const READ_LOW_US: u32 = 6;
const READ_SAMPLE_US: u32 = 9;
const READ_RECOVERY_US: u32 = 55;

/// Bit-banged 1-Wire master on an open-drain GPIO. `set_high` releases
/// the line to the pull-up.
pub struct BitBangLine<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> BitBangLine<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

impl<P, D> OneWireLine for BitBangLine<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    type Error = P::Error;

    fn reset(&mut self) -> Result<bool, Self::Error> {
        // A line held low by a short or a half-seated module cannot be reset.
        if self.pin.is_low()? {
            return Ok(false);
        }
        self.pin.set_low()?;
        self.delay.delay_us(RESET_LOW_US);
        self.pin.set_high()?;
        self.delay.delay_us(PRESENCE_SAMPLE_US);
        let presence = self.pin.is_low()?;
        self.delay.delay_us(RESET_RECOVERY_US);
        Ok(presence)
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), Self::Error> {
        let (low, release) = if bit {
            (WRITE_1_LOW_US, WRITE_1_RELEASE_US)
        } else {
            (WRITE_0_LOW_US, WRITE_0_RELEASE_US)
        };
        self.pin.set_low()?;
        self.delay.delay_us(low);
        self.pin.set_high()?;
        self.delay.delay_us(release);
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, Self::Error> {
        self.pin.set_low()?;
        self.delay.delay_us(READ_LOW_US);
        self.pin.set_high()?;
        self.delay.delay_us(READ_SAMPLE_US);
        let bit = self.pin.is_high()?;
        self.delay.delay_us(READ_RECOVERY_US);
        Ok(bit)
    }
}

// ---------------------------------------------------------------------------
// ROM search
// ---------------------------------------------------------------------------

/// Read the ROM of the (single) device on `line`.
///
/// Runs one pass of the SEARCH ROM triplet walk, taking the 0 branch on
/// every discrepancy, so with several devices the lowest ROM wins.
pub fn search_rom<L: OneWireLine>(line: &mut L) -> Result<[u8; ROM_LEN], ProbeError> {
    let bus = |e: L::Error| {
        debug!("Bus: 1-Wire line error: {:?}", e);
        ProbeError::Bus
    };

    if !line.reset().map_err(bus)? {
        return Err(ProbeError::NoPresence);
    }
    line.write_byte(CMD_SEARCH_ROM).map_err(bus)?;

    let mut rom = [0u8; ROM_LEN];
    for bit_index in 0..ROM_LEN * 8 {
        let id_bit = line.read_bit().map_err(bus)?;
        let cmp_bit = line.read_bit().map_err(bus)?;
        let direction = match (id_bit, cmp_bit) {
            (true, true) => return Err(ProbeError::SearchAborted),
            (a, b) if a != b => a,
            // Discrepancy: two devices disagree on this bit.
            _ => false,
        };
        line.write_bit(direction).map_err(bus)?;
        if direction {
            rom[bit_index / 8] |= 1 << (bit_index % 8);
        }
    }
    Ok(rom)
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

/// Serial-ID probe strategy over `N` independent ID lines.
pub struct SerialIdProbe<L, const N: usize> {
    lines: [L; N],
    crc_errors: u32,
}

impl<L: OneWireLine, const N: usize> SerialIdProbe<L, N> {
    /// `lines[i]` is the ID line of port `i`.
    pub fn new(lines: [L; N]) -> Self {
        Self {
            lines,
            crc_errors: 0,
        }
    }

    /// Probe a single port.
    pub fn probe_port(&mut self, port: PortIndex<N>) -> Result<ModuleIdentity, ProbeError> {
        let rom = search_rom(&mut self.lines[port.get()])?;
        ModuleIdentity::from_rom(rom)
    }

    /// ROM records rejected by CRC since boot.
    pub fn crc_error_count(&self) -> u32 {
        self.crc_errors
    }
}

impl<L: OneWireLine, const N: usize> ProbeStrategy<N> for SerialIdProbe<L, N> {
    fn probe_all(&mut self) -> Inventory<N> {
        let mut inventory = Inventory::new();
        for port in PortIndex::all() {
            match self.probe_port(port) {
                Ok(identity) => {
                    if let Some(uid) = identity.unique_id {
                        debug!(
                            "Bus: port {} module 0x{:04X} (ROM: {})",
                            port, identity.type_code, uid
                        );
                    }
                    inventory.set(port, Some(identity));
                }
                Err(ProbeError::NoPresence) => {}
                Err(e @ ProbeError::CrcMismatch { .. }) => {
                    self.crc_errors = self.crc_errors.saturating_add(1);
                    warn!("Bus: port {} {}", port, e);
                }
                Err(e) => debug!("Bus: port {} {}", port, e),
            }
        }
        inventory
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::SerialId
    }
}
