//! GPIO / peripheral pin assignments for the RWC core board.
//!
//! Single source of truth for the three module ports. Every port shares
//! the I²C pair; each has its own UART pair and 1-Wire ID line.

use crate::bus::port::{PortConfig, PortMap};

// ---------------------------------------------------------------------------
// Shared I²C bus (all ports)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Per-port lines
// ---------------------------------------------------------------------------

/// Number of physical module ports on the core board.
pub const CORE_PORT_COUNT: usize = 3;

pub const PORT_TX_GPIO: [i32; CORE_PORT_COUNT] = [43, 11, 35];
pub const PORT_RX_GPIO: [i32; CORE_PORT_COUNT] = [44, 12, 37];
/// 1-Wire identification line (one ID EEPROM per module).
pub const PORT_ID_GPIO: [i32; CORE_PORT_COUNT] = [10, 13, 14];

/// Compiled-in topology of the core board.
pub const CORE_PORTS: PortMap<CORE_PORT_COUNT> = PortMap::new([
    PortConfig::new(I2C_SDA_GPIO, I2C_SCL_GPIO, PORT_TX_GPIO[0], PORT_RX_GPIO[0], PORT_ID_GPIO[0]),
    PortConfig::new(I2C_SDA_GPIO, I2C_SCL_GPIO, PORT_TX_GPIO[1], PORT_RX_GPIO[1], PORT_ID_GPIO[1]),
    PortConfig::new(I2C_SDA_GPIO, I2C_SCL_GPIO, PORT_TX_GPIO[2], PORT_RX_GPIO[2], PORT_ID_GPIO[2]),
]);
