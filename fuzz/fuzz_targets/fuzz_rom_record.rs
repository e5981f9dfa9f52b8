//! Fuzz target: `ModuleIdentity::from_rom`
//!
//! Arbitrary 8-byte records must either decode (and then fold to a zero
//! CRC) or be rejected with a CRC mismatch. Never a panic.
//!
//! cargo fuzz run fuzz_rom_record

#![no_main]

use libfuzzer_sys::fuzz_target;
use rwc_core::bus::identity::{crc8, ModuleIdentity, ROM_LEN};
use rwc_core::error::ProbeError;

fuzz_target!(|data: &[u8]| {
    let Ok(rom) = <[u8; ROM_LEN]>::try_from(data) else {
        return;
    };
    match ModuleIdentity::from_rom(rom) {
        Ok(id) => {
            assert_eq!(crc8(&rom), 0, "accepted ROM must fold to zero");
            assert_eq!(id.type_code, u16::from_le_bytes([rom[1], rom[2]]));
        }
        Err(ProbeError::CrcMismatch { expected, computed }) => {
            assert_eq!(expected, rom[7]);
            assert_ne!(expected, computed);
        }
        Err(e) => panic!("unexpected error {e}"),
    }
});
