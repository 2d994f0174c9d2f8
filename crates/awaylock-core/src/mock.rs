//! Scripted capability doubles for exercising the loops without hardware.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::device::DiscoveredDevice;
use crate::discovery::{Discovery, DiscoveryError, DiscoveryResult};
use crate::lock::{LockAction, LockError};
use crate::stop::StopSignal;

/// A device for building scripted rounds.
pub type MockDevice = DiscoveredDevice;

/// Replays a fixed sequence of discovery results.
///
/// Once the script runs out every round returns no devices.
#[derive(Debug, Default)]
pub struct ScriptedDiscovery {
    rounds: Mutex<VecDeque<DiscoveryResult<Vec<DiscoveredDevice>>>>,
    requested: Mutex<Vec<Duration>>,
    simulate_duration: bool,
}

impl ScriptedDiscovery {
    /// Replay `rounds` in order.
    #[must_use]
    pub fn new(rounds: Vec<DiscoveryResult<Vec<DiscoveredDevice>>>) -> Self {
        Self {
            rounds: Mutex::new(rounds.into()),
            requested: Mutex::new(Vec::new()),
            simulate_duration: false,
        }
    }

    /// Sleep for the requested duration on each round, like real hardware.
    #[must_use]
    pub fn with_simulated_duration(mut self) -> Self {
        self.simulate_duration = true;
        self
    }

    /// Durations requested so far, one per round.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex was poisoned.
    #[must_use]
    pub fn requested(&self) -> Vec<Duration> {
        self.requested.lock().expect("mock mutex poisoned").clone()
    }

    /// Number of rounds run so far.
    #[must_use]
    pub fn rounds_run(&self) -> usize {
        self.requested().len()
    }
}

impl Discovery for ScriptedDiscovery {
    async fn discover(&self, duration: Duration) -> DiscoveryResult<Vec<DiscoveredDevice>> {
        self.requested
            .lock()
            .map_err(|_| DiscoveryError::DiscoveryFailed {
                message: "mock mutex poisoned".into(),
            })?
            .push(duration);

        if self.simulate_duration {
            tokio::time::sleep(duration).await;
        }

        self.rounds
            .lock()
            .map_err(|_| DiscoveryError::DiscoveryFailed {
                message: "mock mutex poisoned".into(),
            })?
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Counts lock requests, optionally failing each one.
#[derive(Debug, Default)]
pub struct RecordingLock {
    calls: AtomicUsize,
    fail: bool,
}

impl RecordingLock {
    /// A lock that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A lock that always fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// How many times `lock` was called.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LockAction for RecordingLock {
    async fn lock(&self) -> Result<(), LockError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(LockError::CommandFailed {
                program: "mock-lock".into(),
                status: "exit status: 1".into(),
            })
        } else {
            Ok(())
        }
    }
}

/// Reports a stop after a fixed number of polls.
///
/// `StopAfterPolls::new(n)` lets exactly `n` loop iterations start.
#[derive(Debug)]
pub struct StopAfterPolls {
    remaining: AtomicUsize,
}

impl StopAfterPolls {
    /// Allow `polls` negative answers before stopping.
    #[must_use]
    pub const fn new(polls: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(polls),
        }
    }
}

impl StopSignal for StopAfterPolls {
    fn stop_requested(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
    }
}
