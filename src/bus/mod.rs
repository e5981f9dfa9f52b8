//! RWC bus: module discovery.
//!
//! ```text
//!  ┌──────────────┐     ┌──────────────┐     ┌──────────────────┐
//!  │ ProbeStrategy│────▶│  BusScanner  │────▶│ ScanResult       │
//!  │ (1-Wire/I²C) │     │ (diff, snap) │     │ + Inventory<N>   │
//!  └──────────────┘     └──────────────┘     └──────────────────┘
//! ```

pub mod catalog;
pub mod i2c_scan;
pub mod identity;
pub mod onewire;
pub mod port;
pub mod probe;
pub mod scanner;

pub use identity::{Inventory, ModuleIdentity, UniqueId};
pub use port::{PortConfig, PortIndex, PortMap};
pub use probe::{ProbeKind, ProbeStrategy};
pub use scanner::{BusScanner, PortList, ScanResult};
