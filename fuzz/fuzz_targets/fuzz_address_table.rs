//! Fuzz target: `AddressTable` pass sequences
//!
//! Each input byte is a responder address; 0xFF ends a pass. The table
//! must never exceed its capacity and never track one address twice.
//!
//! cargo fuzz run fuzz_address_table

#![no_main]

use libfuzzer_sys::fuzz_target;
use rwc_core::bus::i2c_scan::AddressTable;

const PASS_END: u8 = 0xFF;

fuzz_target!(|data: &[u8]| {
    let mut table = AddressTable::<16>::new();
    table.begin_pass();
    for &byte in data {
        if byte == PASS_END {
            table.end_pass();
            table.begin_pass();
            continue;
        }
        let addr = byte & 0x7F;
        table.observe(addr, byte);
        assert!(table.len() <= 16);
        assert!(table.slot_of(addr).is_some() || table.len() == 16);
    }
    table.end_pass();
});
