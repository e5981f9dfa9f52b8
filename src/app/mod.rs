//! Application core — discovery, binding and dispatch, zero direct I/O.
//!
//! Hardware is reached only through the probe strategy handed to
//! [`service::CoreService`]; everything observable leaves through the
//! [`ports::EventSink`] port, keeping this layer testable without real
//! peripherals.

pub mod events;
pub mod ports;
pub mod service;
pub mod trigger;
