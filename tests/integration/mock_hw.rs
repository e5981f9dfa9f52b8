//! Mock hardware for integration tests.
//!
//! Simulated 1-Wire ID lines and a simulated I²C bus whose contents the
//! test changes between scans, plus a driver and an event sink that
//! record every call.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use rwc_core::app::events::BusEvent;
use rwc_core::app::ports::EventSink;
use rwc_core::bus::identity::{crc8, ModuleIdentity, ROM_LEN};
use rwc_core::bus::onewire::{OneWireLine, CMD_SEARCH_ROM};
use rwc_core::error::InitError;
use rwc_core::registry::ModuleDriver;

// ── ROM records ───────────────────────────────────────────────

/// Valid 8-byte ID record for `type_code` with a per-module serial.
pub fn rom(type_code: u16, serial: u8) -> [u8; ROM_LEN] {
    let t = type_code.to_le_bytes();
    let mut r = [0x2D, t[0], t[1], serial, 0x00, 0x5A, 0xA5, 0];
    r[7] = crc8(&r[..7]);
    r
}

/// Same record with the CRC byte broken.
pub fn corrupt_rom(type_code: u16, serial: u8) -> [u8; ROM_LEN] {
    let mut r = rom(type_code, serial);
    r[7] ^= 0x01;
    r
}

// ── Simulated 1-Wire line ─────────────────────────────────────

/// Slot the test writes to plug (`Some`) or unplug (`None`) a module.
pub type Socket = Rc<RefCell<Option<[u8; ROM_LEN]>>>;

/// Single-slave 1-Wire line that answers SEARCH ROM with the ROM
/// currently in its socket.
pub struct SimOneWireLine {
    socket: Socket,
    rom: Option<[u8; ROM_LEN]>,
    command: u8,
    command_bits: u8,
    bit: usize,
    phase: u8,
    selected: bool,
}

impl SimOneWireLine {
    pub fn with_socket() -> (Self, Socket) {
        let socket: Socket = Rc::new(RefCell::new(None));
        let line = Self {
            socket: socket.clone(),
            rom: None,
            command: 0,
            command_bits: 0,
            bit: 0,
            phase: 0,
            selected: false,
        };
        (line, socket)
    }

    fn rom_bit(&self) -> bool {
        self.rom
            .is_some_and(|r| r[self.bit / 8] & (1 << (self.bit % 8)) != 0)
    }
}

impl OneWireLine for SimOneWireLine {
    type Error = Infallible;

    fn reset(&mut self) -> Result<bool, Infallible> {
        self.rom = *self.socket.borrow();
        self.command = 0;
        self.command_bits = 0;
        self.bit = 0;
        self.phase = 0;
        self.selected = self.rom.is_some();
        Ok(self.rom.is_some())
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), Infallible> {
        if self.command_bits < 8 {
            if bit {
                self.command |= 1 << self.command_bits;
            }
            self.command_bits += 1;
            return Ok(());
        }
        if self.selected && self.command == CMD_SEARCH_ROM && self.phase == 2 {
            self.selected = bit == self.rom_bit();
            self.bit += 1;
            self.phase = 0;
        }
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, Infallible> {
        if !self.selected || self.command != CMD_SEARCH_ROM {
            return Ok(true);
        }
        let b = self.rom_bit();
        let out = if self.phase == 0 { b } else { !b };
        self.phase += 1;
        Ok(out)
    }
}

/// `N` empty simulated lines and their sockets.
pub fn sim_lines<const N: usize>() -> ([SimOneWireLine; N], [Socket; N]) {
    let pairs: [(SimOneWireLine, Socket); N] = std::array::from_fn(|_| SimOneWireLine::with_socket());
    let sockets = std::array::from_fn(|i| pairs[i].1.clone());
    let lines = pairs.map(|(line, _)| line);
    (lines, sockets)
}

// ── Simulated I²C bus ─────────────────────────────────────────

/// Register holding the module ID byte.
pub const ID_REGISTER: u8 = 0x00;

#[derive(Debug, Clone, Copy)]
struct Device {
    id_byte: u8,
    value: u16,
}

/// Devices keyed by 7-bit address. Any register other than
/// [`ID_REGISTER`] reads back the device's 16-bit value, big-endian.
#[derive(Default)]
pub struct MockI2cBus {
    devices: BTreeMap<u8, Device>,
    pub transactions: usize,
}

#[allow(dead_code)]
impl MockI2cBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, address: u8, id_byte: u8) {
        self.devices.insert(address, Device { id_byte, value: 0 });
    }

    pub fn detach(&mut self, address: u8) {
        self.devices.remove(&address);
    }

    pub fn set_value(&mut self, address: u8, value: u16) {
        if let Some(d) = self.devices.get_mut(&address) {
            d.value = value;
        }
    }
}

impl ErrorType for MockI2cBus {
    type Error = ErrorKind;
}

impl I2c for MockI2cBus {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
        self.transactions += 1;
        let device = *self
            .devices
            .get(&address)
            .ok_or(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))?;
        let mut register = ID_REGISTER;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if let Some(&r) = bytes.first() {
                        register = r;
                    }
                }
                Operation::Read(buf) => {
                    let src = if register == ID_REGISTER {
                        vec![device.id_byte]
                    } else {
                        device.value.to_be_bytes().to_vec()
                    };
                    for (dst, s) in buf.iter_mut().zip(src) {
                        *dst = s;
                    }
                }
            }
        }
        Ok(())
    }
}

// ── Recording driver ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    Init { port: usize, type_code: u16 },
    Tick { port: usize },
    Release { port: usize },
}

/// Shared call log; one log can be handed to several drivers.
pub type CallLog = Rc<RefCell<Vec<(&'static str, DriverCall)>>>;

pub struct RecordingDriver {
    name: &'static str,
    log: CallLog,
    /// Number of `init` calls still to fail.
    fail_inits: u32,
}

#[allow(dead_code)]
impl RecordingDriver {
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: log.clone(),
            fail_inits: 0,
        }
    }

    pub fn failing(name: &'static str, log: &CallLog, fail_inits: u32) -> Self {
        Self {
            fail_inits,
            ..Self::new(name, log)
        }
    }
}

impl ModuleDriver for RecordingDriver {
    fn init(&mut self, port: usize, identity: &ModuleIdentity) -> Result<(), InitError> {
        self.log.borrow_mut().push((
            self.name,
            DriverCall::Init {
                port,
                type_code: identity.type_code,
            },
        ));
        if self.fail_inits > 0 {
            self.fail_inits -= 1;
            return Err(InitError::NotReady);
        }
        Ok(())
    }

    fn tick(&mut self, port: usize, _identity: &ModuleIdentity) {
        self.log.borrow_mut().push((self.name, DriverCall::Tick { port }));
    }

    fn release(&mut self, port: usize) {
        self.log.borrow_mut().push((self.name, DriverCall::Release { port }));
    }
}

#[allow(dead_code)]
pub fn count(log: &CallLog, call: DriverCall) -> usize {
    log.borrow().iter().filter(|(_, c)| *c == call).count()
}

// ── Recording sink ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<BusEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<BusEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn contains(&self, event: &BusEvent) -> bool {
        self.events.contains(event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &BusEvent) {
        self.events.push(*event);
    }
}
