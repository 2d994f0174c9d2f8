//! Consecutive-miss counter that turns noisy samples into a lock decision.
//!
//! A single integer counter is used rather than a time window, so the
//! decision does not depend on how long each discovery round took.
//!
//! ```text
//!   Near sample            -> counter = 0,  Near
//!   Weak / absent sample   -> counter += 1
//!       counter < limit    -> AwayCounting(counter)
//!       counter >= limit   -> counter = 0,  Triggered
//! ```

use crate::device::{Presence, SignalSample};

/// Result of feeding one sample to the [`HysteresisEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Target is close enough. The counter was reset.
    Near,
    /// Target is weak or missing; this many consecutive misses so far.
    AwayCounting(u32),
    /// Enough consecutive misses. The counter was reset; lock now.
    Triggered,
}

/// Stateful classifier owned by a single monitor run.
#[derive(Debug, Clone)]
pub struct HysteresisEngine {
    rssi_threshold: i16,
    away_count_threshold: u32,
    away_counter: u32,
}

impl HysteresisEngine {
    /// Create an engine. An `away_count_threshold` of 0 behaves like 1.
    #[must_use]
    pub fn new(rssi_threshold: i16, away_count_threshold: u32) -> Self {
        Self {
            rssi_threshold,
            away_count_threshold: away_count_threshold.max(1),
            away_counter: 0,
        }
    }

    /// Classify one sample and decide whether to trigger.
    pub fn observe(&mut self, sample: &SignalSample) -> Outcome {
        if sample.presence(self.rssi_threshold) == Presence::Near {
            self.away_counter = 0;
            return Outcome::Near;
        }

        self.away_counter += 1;
        if self.away_counter >= self.away_count_threshold {
            self.away_counter = 0;
            Outcome::Triggered
        } else {
            Outcome::AwayCounting(self.away_counter)
        }
    }

    /// Consecutive misses recorded so far.
    #[must_use]
    pub const fn away_counter(&self) -> u32 {
        self.away_counter
    }

    /// Misses required to trigger.
    #[must_use]
    pub const fn away_count_threshold(&self) -> u32 {
        self.away_count_threshold
    }

    /// Near threshold in dBm.
    #[must_use]
    pub const fn rssi_threshold(&self) -> i16 {
        self.rssi_threshold
    }
}
