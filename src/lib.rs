//! RWC core firmware library.
//!
//! Peripheral-module discovery and driver dispatch for the RWC core
//! board. Exposes the pure-logic modules for integration testing and
//! host-side tooling. All ESP-IDF-specific code lives in the binary,
//! behind the `espidf` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod bus;
pub mod config;
pub mod dispatch;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod registry;

pub use error::{Error, Result};
