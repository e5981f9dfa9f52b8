//! Shared-bus discovery: address sweep, bounded table, driver bus access.

use std::cell::RefCell;

use rwc_core::app::events::BusEvent;
use rwc_core::app::service::CoreService;
use rwc_core::bus::catalog::bus_id;
use rwc_core::bus::i2c_scan::{AddressScanProbe, SharedI2c};
use rwc_core::bus::PortIndex;
use rwc_core::config::BusConfig;
use rwc_core::drivers::register_poll::RegisterPollDriver;
use rwc_core::registry::DriverRegistry;

use crate::mock_hw::{count, CallLog, DriverCall, MockI2cBus, RecordingDriver, RecordingSink, ID_REGISTER};

fn port(i: usize) -> PortIndex<16> {
    PortIndex::new(i).unwrap()
}

#[test]
fn responders_fill_slots_in_address_order() {
    let bus = RefCell::new(MockI2cBus::new());
    bus.borrow_mut().attach(0x48, bus_id::TEMPERATURE as u8);
    bus.borrow_mut().attach(0x20, bus_id::SERVO as u8);

    let log = CallLog::default();
    let mut reg = DriverRegistry::new();
    reg.register(bus_id::SERVO, "Servo", RecordingDriver::new("Servo", &log))
        .unwrap();
    let probe = AddressScanProbe::<_, 16>::new(SharedI2c::new(&bus), &BusConfig::default());
    let mut svc = CoreService::new(probe, reg, BusConfig::default()).unwrap();
    let mut sink = RecordingSink::new();

    let result = svc.start(0, &mut sink);
    assert_eq!(result.total_active, 2);

    let servo = svc.inventory().get(port(0)).unwrap();
    assert_eq!(servo.bus_address, Some(0x20));
    assert_eq!(servo.type_code, bus_id::SERVO);
    let temp = svc.inventory().get(port(1)).unwrap();
    assert_eq!(temp.bus_address, Some(0x48));

    assert_eq!(svc.binding(port(0)), Some(bus_id::SERVO));
    assert!(sink.contains(&BusEvent::UnknownModule {
        port: 1,
        type_code: bus_id::TEMPERATURE,
    }));
    assert_eq!(count(&log, DriverCall::Init { port: 0, type_code: bus_id::SERVO }), 1);
}

#[test]
fn seventeenth_module_is_dropped_and_counted() {
    let bus = RefCell::new(MockI2cBus::new());
    for addr in 0x10..=0x20u8 {
        bus.borrow_mut().attach(addr, bus_id::LIGHT as u8);
    }
    let probe = AddressScanProbe::<_, 16>::new(SharedI2c::new(&bus), &BusConfig::default());
    let mut svc = CoreService::new(probe, DriverRegistry::new(), BusConfig::default()).unwrap();
    let mut sink = RecordingSink::new();

    let result = svc.start(0, &mut sink);
    assert_eq!(result.total_active, 16);
    assert_eq!(svc.probe().table().overflow_count(), 1);
    assert!(sink.contains(&BusEvent::AddressTableFull {
        dropped: 1,
        dropped_total: 1,
    }));

    // The sixteen that fit are unaffected by the one that did not.
    for (i, addr) in (0x10..=0x1Fu8).enumerate() {
        assert_eq!(svc.inventory().get(port(i)).unwrap().bus_address, Some(addr));
    }
    assert_eq!(svc.probe().table().slot_of(0x20), None);
}

#[test]
fn vacated_slot_is_reused_after_one_absent_scan() {
    let bus = RefCell::new(MockI2cBus::new());
    bus.borrow_mut().attach(0x30, bus_id::MOTION as u8);
    bus.borrow_mut().attach(0x31, bus_id::SOUND as u8);
    let probe = AddressScanProbe::<_, 16>::new(SharedI2c::new(&bus), &BusConfig::default());
    let mut svc = CoreService::new(probe, DriverRegistry::new(), BusConfig::default()).unwrap();
    let mut sink = RecordingSink::new();
    svc.start(0, &mut sink);

    bus.borrow_mut().detach(0x30);
    let gone = svc.rescan(100, &mut sink);
    assert_eq!(gone.removed.as_slice(), [port(0)]);
    assert!(!svc.inventory().is_present(port(0)));
    assert_eq!(svc.inventory().get(port(1)).unwrap().bus_address, Some(0x31));

    bus.borrow_mut().attach(0x50, bus_id::GPS as u8);
    let back = svc.rescan(200, &mut sink);
    assert_eq!(back.newly_present.as_slice(), [port(0)]);
    assert_eq!(svc.inventory().get(port(0)).unwrap().bus_address, Some(0x50));
}

#[test]
fn addresses_outside_the_window_are_ignored() {
    let bus = RefCell::new(MockI2cBus::new());
    bus.borrow_mut().attach(0x08, bus_id::TOUCH as u8);
    bus.borrow_mut().attach(0x7F, bus_id::TOUCH as u8);
    let probe = AddressScanProbe::<_, 16>::new(SharedI2c::new(&bus), &BusConfig::default());
    let mut svc = CoreService::new(probe, DriverRegistry::new(), BusConfig::default()).unwrap();

    let result = svc.start(0, &mut RecordingSink::new());
    assert_eq!(result.total_active, 0);
}

#[test]
fn driver_reads_through_the_shared_bus() {
    let bus = RefCell::new(MockI2cBus::new());
    bus.borrow_mut().attach(0x44, bus_id::HUMIDITY as u8);
    bus.borrow_mut().set_value(0x44, 5120);

    let mut reg = DriverRegistry::new();
    reg.register(
        bus_id::HUMIDITY,
        "Humidity",
        RegisterPollDriver::<_, 16>::new(SharedI2c::new(&bus), ID_REGISTER, 0x02),
    )
    .unwrap();
    let probe = AddressScanProbe::<_, 16>::new(SharedI2c::new(&bus), &BusConfig::default());
    let mut svc = CoreService::new(probe, reg, BusConfig::default()).unwrap();
    let mut sink = RecordingSink::new();

    svc.start(0, &mut sink);
    assert_eq!(svc.binding(port(0)), Some(bus_id::HUMIDITY));
    let before = bus.borrow().transactions;
    assert_eq!(svc.poll(10, &mut sink), 1);
    assert_eq!(bus.borrow().transactions, before + 1);
}
