//! Core service: scan cadence, binding and dispatch in one control loop.
//!
//! [`CoreService`] owns the scanner (and through it the probe and the
//! physical bus), the driver registry and the dispatcher. The application
//! calls [`poll`](CoreService::poll) once per loop iteration:
//!
//! ```text
//!  poll(now) ──▶ scan due? ──yes──▶ scan ─▶ unbind removed ─▶ bind present
//!                   │                                              │
//!                   no                                             │
//!                   ▼                                              ▼
//!              dispatch cycle ◀────────────────────────────────────┘
//! ```
//!
//! Everything runs sequentially on the caller's thread, so the bus is
//! never touched by two parties at once.

use log::info;
use serde::Serialize;

use crate::bus::identity::{Inventory, ROM_LEN};
use crate::bus::port::PortIndex;
use crate::bus::probe::ProbeStrategy;
use crate::bus::scanner::{BusScanner, ScanResult};
use crate::config::BusConfig;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::registry::{BindOutcome, DriverRegistry};

use super::events::BusEvent;
use super::ports::EventSink;
use super::trigger::ScanTrigger;

/// One row of the published module inventory.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InventoryEntry {
    pub port: usize,
    pub type_code: u16,
    pub name: &'static str,
    pub bound: bool,
    pub bus_address: Option<u8>,
    pub unique_id: Option<heapless::String<{ ROM_LEN * 2 }>>,
}

pub struct CoreService<'d, P, const N: usize> {
    scanner: BusScanner<P, N>,
    registry: DriverRegistry<'d, N>,
    dispatcher: Dispatcher,
    config: BusConfig,
    trigger: Option<&'d ScanTrigger>,
    scan_requested: bool,
    last_scan_ms: Option<u64>,
    overflow_reported: u32,
}

impl<'d, P: ProbeStrategy<N>, const N: usize> CoreService<'d, P, N> {
    /// Build the service. Fails fast on a board with no ports or an
    /// invalid config: there would be nothing meaningful to scan.
    pub fn new(probe: P, registry: DriverRegistry<'d, N>, config: BusConfig) -> Result<Self> {
        if N == 0 {
            return Err(Error::Config("no ports configured"));
        }
        config.validate()?;
        info!(
            "CoreService: {} ports, {} drivers, {:?} probe, scan every {} ms",
            N,
            registry.driver_count(),
            probe.kind(),
            config.scan_interval_ms
        );
        Ok(Self {
            scanner: BusScanner::new(probe),
            registry,
            dispatcher: Dispatcher::new(),
            config,
            trigger: None,
            scan_requested: false,
            last_scan_ms: None,
            overflow_reported: 0,
        })
    }

    /// Also re-scan whenever `trigger` is raised (e.g. from a hot-plug ISR).
    pub fn with_trigger(mut self, trigger: &'d ScanTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Initial scan and bind. Call once before the first [`poll`](Self::poll).
    pub fn start(&mut self, now_ms: u64, sink: &mut impl EventSink) -> ScanResult<N> {
        sink.emit(&BusEvent::Started {
            ports: N,
            drivers: self.registry.driver_count(),
        });
        self.rescan(now_ms, sink)
    }

    /// One control-loop iteration: scan if due, then tick every bound
    /// port. Returns the number of drivers ticked.
    pub fn poll(&mut self, now_ms: u64, sink: &mut impl EventSink) -> usize {
        if self.scan_due(now_ms) {
            self.rescan(now_ms, sink);
        }
        self.dispatcher
            .run_cycle(&mut self.registry, self.scanner.inventory())
    }

    /// Ask for a scan on the next [`poll`](Self::poll).
    pub fn request_scan(&mut self) {
        self.scan_requested = true;
    }

    fn scan_due(&mut self, now_ms: u64) -> bool {
        // Consume the external trigger even when a scan is due anyway.
        let triggered = self.trigger.is_some_and(ScanTrigger::take);
        let requested = core::mem::take(&mut self.scan_requested);
        let elapsed = match self.last_scan_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.config.scan_interval_ms as u64,
            None => true,
        };
        triggered || requested || elapsed
    }

    /// Run a scan now and reconcile bindings with the new inventory.
    pub fn rescan(&mut self, now_ms: u64, sink: &mut impl EventSink) -> ScanResult<N> {
        let previous = self.scanner.inventory().clone();
        let result = self.scanner.scan();
        self.last_scan_ms = Some(now_ms);

        for &port in &result.removed {
            let bound = self.registry.unbind(port);
            let type_code = previous
                .get(port)
                .map(|id| id.type_code)
                .or(bound)
                .unwrap_or(0);
            sink.emit(&BusEvent::ModuleDetached {
                port: port.get(),
                type_code,
            });
        }

        // Every present port, not only new ones: unknown types and failed
        // inits get another chance each scan.
        for (port, identity) in self.scanner.inventory().present() {
            let type_code = identity.type_code;
            let event = match self.registry.resolve_and_bind(port, identity) {
                BindOutcome::AlreadyBound => continue,
                BindOutcome::Bound { name } => BusEvent::ModuleAttached {
                    port: port.get(),
                    type_code,
                    name,
                },
                BindOutcome::UnknownType => BusEvent::UnknownModule {
                    port: port.get(),
                    type_code,
                },
                BindOutcome::InitFailed { name, error } => BusEvent::DriverInitFailed {
                    port: port.get(),
                    type_code,
                    name,
                    error,
                },
            };
            sink.emit(&event);
        }

        let overflow = self.scanner.probe().overflow_count();
        if overflow > self.overflow_reported {
            sink.emit(&BusEvent::AddressTableFull {
                dropped: overflow - self.overflow_reported,
                dropped_total: overflow,
            });
            self.overflow_reported = overflow;
        }

        sink.emit(&BusEvent::ScanCompleted {
            newly_present: result.newly_present.len(),
            removed: result.removed.len(),
            total_active: result.total_active,
        });
        result
    }

    // ── Inventory queries ─────────────────────────────────────

    /// Ports with an initialised driver.
    pub fn active_port_count(&self) -> usize {
        self.registry.active_port_count()
    }

    /// Registered name of `type_code`, or `"unknown"`.
    pub fn module_name(&self, type_code: u16) -> &'static str {
        self.registry.module_name(type_code)
    }

    /// Snapshot from the latest scan.
    pub fn inventory(&self) -> &Inventory<N> {
        self.scanner.inventory()
    }

    /// Present modules in port order, ready for a telemetry publisher.
    pub fn snapshot(&self) -> heapless::Vec<InventoryEntry, N> {
        let mut out = heapless::Vec::new();
        for (port, identity) in self.scanner.inventory().present() {
            // At most N present ports.
            let _ = out.push(InventoryEntry {
                port: port.get(),
                type_code: identity.type_code,
                name: self.registry.module_name(identity.type_code),
                bound: self.registry.binding(port).is_some(),
                bus_address: identity.bus_address,
                unique_id: identity.unique_id.map(|u| u.to_hex()),
            });
        }
        out
    }

    pub fn binding(&self, port: PortIndex<N>) -> Option<u16> {
        self.registry.binding(port)
    }

    pub fn registry(&self) -> &DriverRegistry<'d, N> {
        &self.registry
    }

    pub fn probe(&self) -> &P {
        self.scanner.probe()
    }

    /// Probe access between scans, e.g. for bus I/O outside a driver.
    pub fn probe_mut(&mut self) -> &mut P {
        self.scanner.probe_mut()
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn scan_count(&self) -> u32 {
        self.scanner.scan_count()
    }

    pub fn dispatch_cycles(&self) -> u64 {
        self.dispatcher.cycles()
    }
}
