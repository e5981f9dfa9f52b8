//! Bus discovery configuration.
//!
//! Tunable parameters for module scanning. There is no persistent store;
//! the application builds a [`BusConfig`] (usually the default) and hands
//! it to [`CoreService::new`](crate::app::service::CoreService::new),
//! which validates it before the control loop starts.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Highest valid 7-bit bus address.
const MAX_7BIT_ADDR: u8 = 0x7F;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusConfig {
    // --- Scan cadence ---
    /// Periodic re-scan interval for hot-plug detection (milliseconds)
    pub scan_interval_ms: u32,

    // --- Shared-bus address sweep ---
    /// First address probed (inclusive)
    pub scan_addr_start: u8,
    /// Last address probed (inclusive)
    pub scan_addr_end: u8,
    /// Register holding the one-byte module ID
    pub id_register: u8,
    /// Bus clock (Hz)
    pub i2c_clock_hz: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: 5000,

            scan_addr_start: 0x10,
            scan_addr_end: 0x7E,
            id_register: 0x00,
            i2c_clock_hz: 400_000, // Fast mode
        }
    }
}

impl BusConfig {
    /// Reject values that would make scanning meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.scan_interval_ms == 0 {
            return Err(Error::Config("scan_interval_ms must be non-zero"));
        }
        if self.scan_addr_start > self.scan_addr_end {
            return Err(Error::Config("scan address window is empty"));
        }
        if self.scan_addr_end > MAX_7BIT_ADDR {
            return Err(Error::Config("scan address above 7-bit range"));
        }
        if self.i2c_clock_hz == 0 {
            return Err(Error::Config("i2c_clock_hz must be non-zero"));
        }
        Ok(())
    }

    /// Number of addresses visited by one sweep.
    pub fn window_len(&self) -> usize {
        (self.scan_addr_end as usize + 1).saturating_sub(self.scan_addr_start as usize)
    }
}
