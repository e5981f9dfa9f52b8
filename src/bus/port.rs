//! Port model: the fixed set of physical attachment points.
//!
//! The port count `N` is a const generic fixed at build time. A
//! [`PortIndex<N>`] can only be constructed for `0..N`, so once a caller
//! holds one, every per-port table indexed by it is in range.

use core::fmt;

/// Bounded index of one port. Ordered ascending, which is also the probe
/// and dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortIndex<const N: usize>(u8);

impl<const N: usize> PortIndex<N> {
    const FITS_U8: () = assert!(N <= 256, "port count must fit in a u8 index");

    /// Returns `None` when `index >= N`.
    pub const fn new(index: usize) -> Option<Self> {
        let () = Self::FITS_U8;
        if index < N {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Raw index, always `< N`.
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// Every port in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        let () = Self::FITS_U8;
        (0..N).map(|i| Self(i as u8))
    }
}

impl<const N: usize> fmt::Display for PortIndex<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pins a module sees on one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConfig {
    pub sda: i32,
    pub scl: i32,
    pub tx: i32,
    pub rx: i32,
    /// 1-Wire identification line.
    pub id: i32,
}

impl PortConfig {
    pub const fn new(sda: i32, scl: i32, tx: i32, rx: i32, id: i32) -> Self {
        Self { sda, scl, tx, rx, id }
    }
}

/// Compiled-in board topology.
#[derive(Debug, Clone)]
pub struct PortMap<const N: usize> {
    ports: [PortConfig; N],
}

impl<const N: usize> PortMap<N> {
    pub const fn new(ports: [PortConfig; N]) -> Self {
        Self { ports }
    }

    pub const fn port_count(&self) -> usize {
        N
    }

    pub fn port_config(&self, index: PortIndex<N>) -> &PortConfig {
        &self.ports[index.get()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PortIndex<N>, &PortConfig)> {
        PortIndex::all().zip(self.ports.iter())
    }
}
