//! Built-in module type codes.
//!
//! Values 0x0000–0x00FF are reserved for reference modules; anything
//! above is vendor/custom. The two probe variants grew separate numbering
//! for the reserved range, so the catalog is keyed by [`ProbeKind`].
//! These numbers are what deployed modules carry; do not renumber.
//!
//! Names here are for diagnostics only. The authoritative name of a bound
//! module is whatever its driver was registered with.

use crate::bus::probe::ProbeKind;

/// Serial-ID (1-Wire ROM) module types on the core board.
pub mod serial_id {
    pub const UNKNOWN: u16 = 0x0000;
    pub const SERVO_ARM: u16 = 0x0001;
    pub const LED_MATRIX: u16 = 0x0002;
    pub const SENSOR_ENV: u16 = 0x0003;
    pub const MOTOR_DC: u16 = 0x0004;
    pub const RELAY_4CH: u16 = 0x0005;
    pub const OLED_128: u16 = 0x0006;
    pub const RFID_RC522: u16 = 0x0007;
    pub const AUDIO_I2S: u16 = 0x0008;
}

/// Shared-bus one-byte module IDs read from the ID register.
pub mod bus_id {
    pub const TEMPERATURE: u16 = 0x01;
    pub const HUMIDITY: u16 = 0x02;
    pub const LIGHT: u16 = 0x03;
    pub const MOTION: u16 = 0x04;
    pub const SOUND: u16 = 0x05;
    pub const TOUCH: u16 = 0x06;
    pub const MOTOR: u16 = 0x10;
    pub const SERVO: u16 = 0x11;
    pub const LED_RING: u16 = 0x20;
    pub const LED_MATRIX: u16 = 0x21;
    pub const RELAY: u16 = 0x30;
    pub const GPS: u16 = 0x40;
    pub const COMPASS: u16 = 0x41;
    pub const UNKNOWN: u16 = 0xFF;
}

const SERIAL_ID_NAMES: &[(u16, &str)] = &[
    (serial_id::SERVO_ARM, "ServoArm"),
    (serial_id::LED_MATRIX, "LedMatrix"),
    (serial_id::SENSOR_ENV, "SensorEnv"),
    (serial_id::MOTOR_DC, "MotorDc"),
    (serial_id::RELAY_4CH, "Relay4Ch"),
    (serial_id::OLED_128, "Oled128"),
    (serial_id::RFID_RC522, "RfidRc522"),
    (serial_id::AUDIO_I2S, "AudioI2s"),
];

const BUS_ID_NAMES: &[(u16, &str)] = &[
    (bus_id::TEMPERATURE, "Temperature"),
    (bus_id::HUMIDITY, "Humidity"),
    (bus_id::LIGHT, "Light"),
    (bus_id::MOTION, "Motion"),
    (bus_id::SOUND, "Sound"),
    (bus_id::TOUCH, "Touch"),
    (bus_id::MOTOR, "Motor"),
    (bus_id::SERVO, "Servo"),
    (bus_id::LED_RING, "LED-Ring"),
    (bus_id::LED_MATRIX, "LED-Matrix"),
    (bus_id::RELAY, "Relay"),
    (bus_id::GPS, "GPS"),
    (bus_id::COMPASS, "Compass"),
    (bus_id::UNKNOWN, "Unknown"),
];

/// Upper bound of the reserved reference range.
pub const RESERVED_MAX: u16 = 0x00FF;

pub fn is_reserved(type_code: u16) -> bool {
    type_code <= RESERVED_MAX
}

/// Every catalogued `(type_code, name)` pair for one probe variant.
pub fn entries(kind: ProbeKind) -> &'static [(u16, &'static str)] {
    match kind {
        ProbeKind::SerialId => SERIAL_ID_NAMES,
        ProbeKind::AddressScan => BUS_ID_NAMES,
    }
}

/// Reference name of a type code: `"Custom"` for uncatalogued reserved
/// codes, `"Vendor"` above the reserved range.
pub fn builtin_name(kind: ProbeKind, type_code: u16) -> &'static str {
    entries(kind)
        .iter()
        .find(|(code, _)| *code == type_code)
        .map(|(_, name)| *name)
        .unwrap_or(if is_reserved(type_code) { "Custom" } else { "Vendor" })
}
