//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing bus events to the logger (UART /
//! USB-CDC in production). An MQTT or display adapter would implement the
//! same trait.

use log::{info, warn};

use crate::app::events::BusEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BusEvent`] to the serial console.
#[derive(Debug)]
pub struct LogEventSink {
    /// Suppress `SCAN |` lines for scans that changed nothing.
    quiet_steady: bool,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self { quiet_steady: true }
    }

    /// Log every scan summary, including steady ones.
    pub fn verbose() -> Self {
        Self { quiet_steady: false }
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BusEvent) {
        match *event {
            BusEvent::Started { ports, drivers } => {
                info!("START | ports={} drivers={}", ports, drivers);
            }
            BusEvent::ModuleAttached {
                port,
                type_code,
                name,
            } => {
                info!("ATTACH | port={} type=0x{:04X} driver={}", port, type_code, name);
            }
            BusEvent::ModuleDetached { port, type_code } => {
                info!("DETACH | port={} type=0x{:04X}", port, type_code);
            }
            BusEvent::UnknownModule { port, type_code } => {
                warn!("UNKNOWN | port={} type=0x{:04X}", port, type_code);
            }
            BusEvent::DriverInitFailed {
                port,
                type_code,
                name,
                error,
            } => {
                warn!(
                    "INITFAIL | port={} type=0x{:04X} driver={} err={}",
                    port, type_code, name, error
                );
            }
            BusEvent::AddressTableFull {
                dropped,
                dropped_total,
            } => {
                warn!("TABLEFULL | dropped={} total={}", dropped, dropped_total);
            }
            BusEvent::ScanCompleted {
                newly_present,
                removed,
                total_active,
            } => {
                if self.quiet_steady && newly_present == 0 && removed == 0 {
                    return;
                }
                info!(
                    "SCAN | +{} -{} active={}",
                    newly_present, removed, total_active
                );
            }
        }
    }
}
