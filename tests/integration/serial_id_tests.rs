//! Serial-ID discovery through the full scan → bind → dispatch pipeline.

use rwc_core::app::events::BusEvent;
use rwc_core::app::service::CoreService;
use rwc_core::bus::catalog::serial_id;
use rwc_core::bus::onewire::SerialIdProbe;
use rwc_core::bus::PortIndex;
use rwc_core::config::BusConfig;
use rwc_core::error::InitError;
use rwc_core::registry::DriverRegistry;

use crate::mock_hw::{
    corrupt_rom, count, rom, sim_lines, CallLog, DriverCall, RecordingDriver, RecordingSink,
    SimOneWireLine, Socket,
};

type Service = CoreService<'static, SerialIdProbe<SimOneWireLine, 3>, 3>;

struct Rig {
    svc: Service,
    sockets: [Socket; 3],
    log: CallLog,
    sink: RecordingSink,
}

fn rig_with(registry: impl FnOnce(&mut DriverRegistry<'static, 3>, &CallLog)) -> Rig {
    let (lines, sockets) = sim_lines::<3>();
    let log = CallLog::default();
    let mut reg = DriverRegistry::new();
    registry(&mut reg, &log);
    let svc = CoreService::new(SerialIdProbe::new(lines), reg, BusConfig::default()).unwrap();
    Rig {
        svc,
        sockets,
        log,
        sink: RecordingSink::new(),
    }
}

fn rig() -> Rig {
    rig_with(|reg, log| {
        reg.register(serial_id::SERVO_ARM, "ServoArm", RecordingDriver::new("ServoArm", log))
            .unwrap();
        reg.register(serial_id::SENSOR_ENV, "SensorEnv", RecordingDriver::new("SensorEnv", log))
            .unwrap();
    })
}

fn port(i: usize) -> PortIndex<3> {
    PortIndex::new(i).unwrap()
}

// ── Attach ────────────────────────────────────────────────────

#[test]
fn servo_arm_on_port_zero_binds_and_ticks_once() {
    let mut r = rig();
    *r.sockets[0].borrow_mut() = Some(rom(serial_id::SERVO_ARM, 1));

    r.svc.start(0, &mut r.sink);
    assert_eq!(r.svc.active_port_count(), 1);
    assert_eq!(r.svc.binding(port(0)), Some(serial_id::SERVO_ARM));
    assert_eq!(r.svc.module_name(serial_id::SERVO_ARM), "ServoArm");
    assert!(r.sink.contains(&BusEvent::ModuleAttached {
        port: 0,
        type_code: serial_id::SERVO_ARM,
        name: "ServoArm",
    }));

    assert_eq!(r.svc.poll(10, &mut r.sink), 1);
    assert_eq!(
        *r.log.borrow(),
        [
            ("ServoArm", DriverCall::Init { port: 0, type_code: 1 }),
            ("ServoArm", DriverCall::Tick { port: 0 }),
        ]
    );
}

#[test]
fn identity_carries_unique_id() {
    let mut r = rig();
    *r.sockets[2].borrow_mut() = Some(rom(serial_id::SENSOR_ENV, 0x77));
    r.svc.start(0, &mut r.sink);

    let id = r.svc.inventory().get(port(2)).unwrap();
    assert_eq!(id.type_code, serial_id::SENSOR_ENV);
    assert_eq!(id.bus_address, None);
    let uid = id.unique_id.unwrap();
    assert_eq!(uid.family(), 0x2D);
    assert_eq!(uid.as_bytes()[3], 0x77);
}

// ── Corrupt records ───────────────────────────────────────────

#[test]
fn bad_crc_port_is_absent_and_never_looked_up() {
    let mut r = rig();
    *r.sockets[0].borrow_mut() = Some(rom(serial_id::SERVO_ARM, 1));
    *r.sockets[1].borrow_mut() = Some(corrupt_rom(serial_id::SENSOR_ENV, 2));

    let result = r.svc.start(0, &mut r.sink);
    assert_eq!(result.total_active, 1);
    assert!(!r.svc.inventory().is_present(port(1)));
    assert_eq!(r.svc.binding(port(1)), None);
    assert_eq!(r.svc.probe().crc_error_count(), 1);

    // No init attempt, no "unknown" report for the corrupt port.
    assert!(r
        .log
        .borrow()
        .iter()
        .all(|(name, _)| *name != "SensorEnv"));
    assert!(!r
        .sink
        .events
        .iter()
        .any(|e| matches!(e, BusEvent::UnknownModule { port: 1, .. })));
}

// ── Steady state ──────────────────────────────────────────────

#[test]
fn repeated_scan_with_no_change_is_steady() {
    let mut r = rig();
    *r.sockets[0].borrow_mut() = Some(rom(serial_id::SERVO_ARM, 1));
    *r.sockets[2].borrow_mut() = Some(rom(serial_id::SENSOR_ENV, 2));
    r.svc.start(0, &mut r.sink);
    let before = r.svc.inventory().clone();

    let again = r.svc.rescan(100, &mut r.sink);
    assert!(again.is_steady());
    assert_eq!(again.total_active, 2);
    assert_eq!(*r.svc.inventory(), before);
    assert_eq!(count(&r.log, DriverCall::Init { port: 0, type_code: 1 }), 1);
    assert_eq!(count(&r.log, DriverCall::Init { port: 2, type_code: 3 }), 1);
}

// ── Removal ───────────────────────────────────────────────────

#[test]
fn removal_clears_binding_and_stops_ticks() {
    let mut r = rig();
    *r.sockets[0].borrow_mut() = Some(rom(serial_id::SERVO_ARM, 1));
    r.svc.start(0, &mut r.sink);
    r.svc.poll(10, &mut r.sink);

    *r.sockets[0].borrow_mut() = None;
    r.svc.request_scan();
    assert_eq!(r.svc.poll(20, &mut r.sink), 0);

    assert_eq!(r.svc.binding(port(0)), None);
    assert_eq!(r.svc.active_port_count(), 0);
    assert_eq!(count(&r.log, DriverCall::Tick { port: 0 }), 1);
    assert_eq!(count(&r.log, DriverCall::Release { port: 0 }), 1);
    assert!(r.sink.contains(&BusEvent::ModuleDetached {
        port: 0,
        type_code: serial_id::SERVO_ARM,
    }));
}

#[test]
fn swapped_module_rebinds_to_new_type() {
    let mut r = rig();
    *r.sockets[1].borrow_mut() = Some(rom(serial_id::SERVO_ARM, 1));
    r.svc.start(0, &mut r.sink);

    *r.sockets[1].borrow_mut() = Some(rom(serial_id::SENSOR_ENV, 9));
    let result = r.svc.rescan(100, &mut r.sink);
    assert_eq!(result.removed.as_slice(), [port(1)]);
    assert_eq!(result.newly_present.as_slice(), [port(1)]);
    assert_eq!(r.svc.binding(port(1)), Some(serial_id::SENSOR_ENV));
    assert_eq!(count(&r.log, DriverCall::Release { port: 1 }), 1);
}

// ── Resolution failures ───────────────────────────────────────

#[test]
fn failed_init_is_retried_on_next_scan() {
    let mut r = rig_with(|reg, log| {
        reg.register(
            serial_id::SENSOR_ENV,
            "SensorEnv",
            RecordingDriver::failing("SensorEnv", log, 1),
        )
        .unwrap();
    });
    *r.sockets[1].borrow_mut() = Some(rom(serial_id::SENSOR_ENV, 5));

    r.svc.start(0, &mut r.sink);
    assert_eq!(r.svc.binding(port(1)), None);
    assert!(r.sink.contains(&BusEvent::DriverInitFailed {
        port: 1,
        type_code: serial_id::SENSOR_ENV,
        name: "SensorEnv",
        error: InitError::NotReady,
    }));
    assert_eq!(r.svc.poll(10, &mut r.sink), 0);

    r.svc.rescan(100, &mut r.sink);
    assert_eq!(r.svc.binding(port(1)), Some(serial_id::SENSOR_ENV));
    assert_eq!(count(&r.log, DriverCall::Init { port: 1, type_code: 3 }), 2);
    assert_eq!(r.svc.poll(110, &mut r.sink), 1);
}

#[test]
fn unknown_type_is_reported_and_never_ticked() {
    let mut r = rig();
    *r.sockets[2].borrow_mut() = Some(rom(serial_id::AUDIO_I2S, 3));

    r.svc.start(0, &mut r.sink);
    assert!(r.sink.contains(&BusEvent::UnknownModule {
        port: 2,
        type_code: serial_id::AUDIO_I2S,
    }));
    assert_eq!(r.svc.module_name(serial_id::AUDIO_I2S), "unknown");

    for t in 1..=5 {
        assert_eq!(r.svc.poll(t, &mut r.sink), 0);
    }
    assert!(r.log.borrow().is_empty());
    assert_eq!(r.svc.binding(port(2)), None);
    assert!(r.svc.inventory().is_present(port(2)));
}
