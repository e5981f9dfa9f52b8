//! Generic shared-bus sensor driver.
//!
//! Serves any address-scan module that exposes a big-endian 16-bit
//! reading at a fixed register. `init` confirms the module still answers
//! with its ID byte; every `tick` refreshes the cached reading. Read
//! failures during `tick` are counted, not propagated.

use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::bus::i2c_scan::{read_register, write_register};
use crate::bus::identity::ModuleIdentity;
use crate::error::{InitError, ProbeError};
use crate::registry::ModuleDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PortState {
    address: u8,
    reading: Option<u16>,
    read_errors: u32,
}

pub struct RegisterPollDriver<I, const N: usize> {
    i2c: I,
    id_register: u8,
    data_register: u8,
    /// Register/value written after the ID check, e.g. to start conversions.
    enable: Option<(u8, u8)>,
    ports: [Option<PortState>; N],
}

impl<I: I2c, const N: usize> RegisterPollDriver<I, N> {
    /// `i2c` is typically a [`SharedI2c`](crate::bus::i2c_scan::SharedI2c)
    /// handle onto the scanned bus.
    pub fn new(i2c: I, id_register: u8, data_register: u8) -> Self {
        Self {
            i2c,
            id_register,
            data_register,
            enable: None,
            ports: [None; N],
        }
    }

    /// Write `value` to `register` on every successful ID check.
    pub fn with_enable(mut self, register: u8, value: u8) -> Self {
        self.enable = Some((register, value));
        self
    }

    /// Latest reading from `port`, if bound and read at least once.
    pub fn reading(&self, port: usize) -> Option<u16> {
        self.state(port).and_then(|s| s.reading)
    }

    /// Failed tick reads on `port` since it was bound.
    pub fn read_errors(&self, port: usize) -> u32 {
        self.state(port).map_or(0, |s| s.read_errors)
    }

    fn state(&self, port: usize) -> Option<&PortState> {
        self.ports.get(port).and_then(Option::as_ref)
    }
}

impl<I: I2c, const N: usize> ModuleDriver for RegisterPollDriver<I, N> {
    fn init(&mut self, port: usize, identity: &ModuleIdentity) -> Result<(), InitError> {
        let address = identity
            .bus_address
            .ok_or(InitError::Other("module has no bus address"))?;
        if port >= N {
            return Err(InitError::Other("port out of range"));
        }

        let mut id = [0u8; 1];
        read_register(&mut self.i2c, address, self.id_register, &mut id).map_err(|e| match e {
            ProbeError::Nack => InitError::NoAck,
            _ => InitError::NotReady,
        })?;
        if u16::from(id[0]) != identity.type_code {
            return Err(InitError::BadResponse);
        }
        if let Some((register, value)) = self.enable {
            write_register(&mut self.i2c, address, register, &[value])
                .map_err(|_| InitError::Other("enable write failed"))?;
        }

        self.ports[port] = Some(PortState {
            address,
            reading: None,
            read_errors: 0,
        });
        info!("RegisterPoll: port {} at 0x{:02X}", port, address);
        Ok(())
    }

    fn tick(&mut self, port: usize, _identity: &ModuleIdentity) {
        let Some(Some(state)) = self.ports.get_mut(port) else {
            return;
        };
        let mut buf = [0u8; 2];
        match read_register(&mut self.i2c, state.address, self.data_register, &mut buf) {
            Ok(()) => state.reading = Some(u16::from_be_bytes(buf)),
            Err(e) => {
                state.read_errors = state.read_errors.saturating_add(1);
                debug!("RegisterPoll: port {} read failed: {}", port, e);
            }
        }
    }

    fn release(&mut self, port: usize) {
        if let Some(slot) = self.ports.get_mut(port) {
            *slot = None;
        }
    }
}
