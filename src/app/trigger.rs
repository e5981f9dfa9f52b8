//! On-demand scan request.
//!
//! A hot-plug interrupt (or an RPC handler) calls [`ScanTrigger::request`];
//! the control loop consumes it on its next iteration. Lock-free, so it is
//! safe to call from interrupt context. Typically placed in a `static`.

use core::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct ScanTrigger {
    pending: AtomicBool,
}

impl ScanTrigger {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Ask for an immediate re-probe.
    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Consume a pending request.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}
