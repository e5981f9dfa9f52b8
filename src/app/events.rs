//! Outbound bus events.
//!
//! The [`CoreService`](super::service::CoreService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters decide where they
//! go: serial log, MQTT, a display status line.

use crate::error::InitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// The service ran its first scan.
    Started { ports: usize, drivers: usize },

    /// A driver was initialised for a newly seen module.
    ModuleAttached {
        port: usize,
        type_code: u16,
        name: &'static str,
    },

    /// A module disappeared or was replaced; its binding is gone.
    ModuleDetached { port: usize, type_code: u16 },

    /// A module is present but no driver is registered for its type.
    UnknownModule { port: usize, type_code: u16 },

    /// The module's driver refused to initialise; retried next scan.
    DriverInitFailed {
        port: usize,
        type_code: u16,
        name: &'static str,
        error: InitError,
    },

    /// The shared-bus discovery table was full and modules were ignored.
    AddressTableFull { dropped: u32, dropped_total: u32 },

    /// Summary of one scan.
    ScanCompleted {
        newly_present: usize,
        removed: usize,
        total_active: usize,
    },
}
