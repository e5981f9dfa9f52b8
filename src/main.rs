//! RWC Core Firmware — Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  ID lines (1-Wire, one per port)        LogEventSink     │
//! │  BitBangLine × N ─▶ SerialIdProbe       (EventSink)      │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ──────────────      │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  CoreService: scan · bind · dispatch               │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, InputOutput, PinDriver, Pull};
use log::info;

use rwc_core::adapters::log_sink::LogEventSink;
use rwc_core::app::service::CoreService;
use rwc_core::bus::catalog;
use rwc_core::bus::onewire::{BitBangLine, SerialIdProbe};
use rwc_core::bus::ProbeKind;
use rwc_core::config::BusConfig;
use rwc_core::drivers::heartbeat::HeartbeatDriver;
use rwc_core::pins::{self, CORE_PORT_COUNT};
use rwc_core::registry::DriverRegistry;

/// Control-loop period between `poll` calls.
const LOOP_PERIOD_MS: u32 = 10;

type IdLine = BitBangLine<PinDriver<'static, AnyIOPin, InputOutput>, Ets>;

/// Open-drain ID line on `gpio`, released to the pull-up.
fn id_line(gpio: i32) -> Result<IdLine> {
    // SAFETY: each ID GPIO is claimed exactly once, here.
    let pin = unsafe { AnyIOPin::new(gpio) };
    let mut pin = PinDriver::input_output_od(pin)?;
    pin.set_pull(Pull::Up)?;
    pin.set_high()?;
    Ok(BitBangLine::new(pin, Ets))
}

fn uptime_ms() -> u64 {
    // SAFETY: plain read of the monotonic system timer.
    let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
    (us / 1000) as u64
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("RWC core v{}", env!("CARGO_PKG_VERSION"));
    for (port, cfg) in pins::CORE_PORTS.iter() {
        info!("Port {}: id=GPIO{} tx=GPIO{} rx=GPIO{}", port, cfg.id, cfg.tx, cfg.rx);
    }

    // ── 2. Probe ──────────────────────────────────────────────
    let lines: [IdLine; CORE_PORT_COUNT] = [
        id_line(pins::PORT_ID_GPIO[0])?,
        id_line(pins::PORT_ID_GPIO[1])?,
        id_line(pins::PORT_ID_GPIO[2])?,
    ];
    let probe = SerialIdProbe::new(lines);

    // ── 3. Drivers ────────────────────────────────────────────
    let mut registry = DriverRegistry::<CORE_PORT_COUNT>::new();
    for &(type_code, name) in catalog::entries(ProbeKind::SerialId) {
        registry.register(type_code, name, HeartbeatDriver::<CORE_PORT_COUNT>::new(name))?;
    }

    // ── 4. Service ────────────────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut service = CoreService::new(probe, registry, BusConfig::default())?;
    service.start(uptime_ms(), &mut sink);

    info!("System ready. Entering control loop.");

    loop {
        service.poll(uptime_ms(), &mut sink);
        FreeRtos::delay_ms(LOOP_PERIOD_MS);
    }
}
