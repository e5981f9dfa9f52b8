//! Stock module drivers.
//!
//! Board firmware registers these (or its own [`ModuleDriver`] impls) with
//! the [`DriverRegistry`](crate::registry::DriverRegistry) at startup.
//!
//! [`ModuleDriver`]: crate::registry::ModuleDriver

pub mod heartbeat;
pub mod register_poll;
