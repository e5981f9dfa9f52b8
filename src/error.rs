//! Unified error types for the core firmware.
//!
//! A single `Error` enum that every subsystem can convert into. All
//! variants are `Copy` so they travel through the scanner, registry and
//! event sink without allocation.
//!
//! Only [`Error::Config`] is fatal; probe and driver-init failures are
//! handled at the layer where they occur and never unwind past the
//! scanner or the registry.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A low-level probe failed (collapsed to "not present" by callers).
    Probe(ProbeError),
    /// A module driver refused to initialise.
    Init(InitError),
    /// The driver table has no room for another module type.
    RegistryFull,
    /// Configuration is invalid. Detected at startup, before the loop runs.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probe(e) => write!(f, "probe: {e}"),
            Self::Init(e) => write!(f, "driver init: {e}"),
            Self::RegistryFull => write!(f, "driver registry full"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Probe errors
// ---------------------------------------------------------------------------

/// Transient failures below the presence-detection layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// No presence pulse after a 1-Wire reset.
    NoPresence,
    /// The 1-Wire search read (1,1) for a bit pair: nobody answered.
    SearchAborted,
    /// ROM CRC-8 did not match the trailing byte.
    CrcMismatch { expected: u8, computed: u8 },
    /// Address or data byte was not acknowledged on the shared bus.
    Nack,
    /// Any other transport error (arbitration loss, timeout, pin fault).
    Bus,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPresence => write!(f, "no presence pulse"),
            Self::SearchAborted => write!(f, "ROM search aborted"),
            Self::CrcMismatch { expected, computed } => write!(
                f,
                "CRC mismatch (rom=0x{expected:02X}, computed=0x{computed:02X})"
            ),
            Self::Nack => write!(f, "not acknowledged"),
            Self::Bus => write!(f, "bus error"),
        }
    }
}

impl From<ProbeError> for Error {
    fn from(e: ProbeError) -> Self {
        Self::Probe(e)
    }
}

// ---------------------------------------------------------------------------
// Driver init errors
// ---------------------------------------------------------------------------

/// Reported by [`ModuleDriver::init`](crate::registry::ModuleDriver::init).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// The module's own peripheral did not acknowledge.
    NoAck,
    /// The module answered but with unexpected contents.
    BadResponse,
    /// The module is not ready yet (e.g. still powering up).
    NotReady,
    /// Driver-specific failure.
    Other(&'static str),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAck => write!(f, "no ACK from module"),
            Self::BadResponse => write!(f, "unexpected response"),
            Self::NotReady => write!(f, "module not ready"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<InitError> for Error {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
