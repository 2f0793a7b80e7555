//! Interrupt handling for graceful shutdown
//!
//! A Ctrl+C must stop the launch of new iterations without tearing down the
//! ones in flight, so the summary still gets produced from whatever was
//! measured. The flag is global; virtual-user tasks poll it between steps.

use std::sync::atomic::{AtomicBool, Ordering};

static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Whether a stop was requested (Ctrl+C pressed).
#[inline]
pub fn interrupted() -> bool {
    STOP_REQUESTED.load(Ordering::SeqCst)
}

/// Request a graceful stop (called from the signal handler).
#[inline]
pub fn request_stop() {
    STOP_REQUESTED.store(true, Ordering::SeqCst);
}

/// Clear the flag (tests only; the process exits after a real interrupt).
#[inline]
pub fn reset() {
    STOP_REQUESTED.store(false, Ordering::SeqCst);
}
