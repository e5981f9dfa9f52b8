//! Port traits — the boundary between the discovery core and the
//! application layer.
//!
//! ```text
//!   CoreService ──▶ EventSink ──▶ Adapter (log, MQTT, display)
//! ```
//!
//! Module drivers are the other seam; see
//! [`ModuleDriver`](crate::registry::ModuleDriver).

use super::events::BusEvent;

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: core → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// Presence changes and type-resolution failures are only observable
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &BusEvent);
}

/// Discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &BusEvent) {}
}
