//! Cooperative shutdown.
//!
//! Loops poll [`StopSignal::stop_requested`] once at the head of every
//! iteration. A stop never interrupts a scan or sleep already in progress.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Non-blocking poll of external shutdown intent.
pub trait StopSignal {
    /// Returns `true` once shutdown has been requested.
    fn stop_requested(&self) -> bool;
}

/// Shared flag flipped by a signal handler and read by the loop.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    stopped: Arc<AtomicBool>,
}

impl StopFlag {
    /// A flag that has not been raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop before its next cycle.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

impl StopSignal for StopFlag {
    fn stop_requested(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl<T: StopSignal + ?Sized> StopSignal for &T {
    fn stop_requested(&self) -> bool {
        (**self).stop_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = StopFlag::new();
        let handle = flag.clone();
        assert!(!flag.stop_requested());

        handle.stop();
        assert!(flag.stop_requested());
    }
}
