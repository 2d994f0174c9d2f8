//! One scan cycle: discover, match, classify, and lock if it is time.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::{Config, ConfigResult};
use crate::device::{Presence, SignalSample};
use crate::discovery::Discovery;
use crate::hysteresis::{HysteresisEngine, Outcome};
use crate::lock::LockAction;
use crate::matcher::TargetIdentity;

/// Longest identifier shown when the device has no advertised name.
const DISPLAY_NAME_MAX_CHARS: usize = 20;

/// What happened during one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleReport {
    /// Discovery failed. The engine was not consulted.
    DiscoveryFailed,
    /// Target is near.
    Near,
    /// Target is weak or missing; `counter` consecutive misses so far.
    Away {
        /// Consecutive misses.
        counter: u32,
    },
    /// The engine triggered, the lock action ran and the cool-down elapsed.
    Locked {
        /// Whether the lock action reported success.
        lock_succeeded: bool,
    },
}

/// Drives single discovery rounds through the hysteresis engine.
///
/// Owns the engine for the lifetime of a run, so the counter carries over
/// from one cycle to the next.
pub struct ScanCycle<D, L> {
    discovery: D,
    lock: L,
    identity: TargetIdentity,
    engine: HysteresisEngine,
    scan_duration: Duration,
    cooldown: Duration,
}

impl<D: Discovery, L: LockAction> ScanCycle<D, L> {
    /// Build a driver from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::NoTargetIdentity`] when no device is configured.
    pub fn new(config: &Config, discovery: D, lock: L) -> ConfigResult<Self> {
        Ok(Self {
            discovery,
            lock,
            identity: config.target_identity()?,
            engine: HysteresisEngine::new(config.rssi_threshold, config.away_count_threshold),
            scan_duration: config.scan_duration_duration(),
            cooldown: config.cooldown_duration(),
        })
    }

    /// The engine, for inspection.
    pub const fn engine(&self) -> &HysteresisEngine {
        &self.engine
    }

    /// The identity being followed.
    pub const fn identity(&self) -> &TargetIdentity {
        &self.identity
    }

    /// Run exactly one discovery round and act on its outcome.
    ///
    /// Discovery failures are logged and leave the engine untouched.
    /// A failed lock is logged; the counter has already been reset.
    pub async fn run_once(&mut self) -> CycleReport {
        let devices = match self.discovery.discover(self.scan_duration).await {
            Ok(devices) => devices,
            Err(e) => {
                error!(error = %e, "Error: discovery round failed");
                return CycleReport::DiscoveryFailed;
            }
        };

        let sample = SignalSample::from_match(self.identity.find(&devices));
        let presence = sample.presence(self.engine.rssi_threshold());
        let outcome = self.engine.observe(&sample);
        self.log_sample(&sample, presence, outcome);

        match outcome {
            Outcome::Near => CycleReport::Near,
            Outcome::AwayCounting(counter) => CycleReport::Away { counter },
            Outcome::Triggered => {
                let lock_succeeded = self.lock_and_cool_down().await;
                CycleReport::Locked { lock_succeeded }
            }
        }
    }

    async fn lock_and_cool_down(&self) -> bool {
        info!("LOCKING SCREEN!");
        let lock_succeeded = match self.lock.lock().await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Lock action failed");
                false
            }
        };

        info!(cooldown_secs = self.cooldown.as_secs(), "Cooling down after lock");
        tokio::time::sleep(self.cooldown).await;
        lock_succeeded
    }

    fn log_sample(&self, sample: &SignalSample, presence: Presence, outcome: Outcome) {
        let limit = self.engine.away_count_threshold();
        // A triggered cycle has already reset the counter; report the count that fired it.
        let count = match outcome {
            Outcome::AwayCounting(n) => n,
            Outcome::Triggered => limit,
            Outcome::Near => 0,
        };
        let name = self.display_name(sample);

        match (presence, sample.rssi()) {
            (Presence::Near, Some(rssi)) => info!(rssi, "Nearby: {name} (RSSI: {rssi})"),
            (Presence::Weak, Some(rssi)) => {
                warn!(rssi, count, limit, "Far: {name} (RSSI: {rssi}) - {count}/{limit}");
            }
            _ => warn!(count, limit, "Device not found - {count}/{limit}"),
        }
    }

    fn display_name(&self, sample: &SignalSample) -> String {
        sample.name().map_or_else(
            || {
                self.identity
                    .value()
                    .chars()
                    .take(DISPLAY_NAME_MAX_CHARS)
                    .collect()
            },
            str::to_owned,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::DiscoveryError;
    use crate::mock::{MockDevice, RecordingLock, ScriptedDiscovery};

    const PHONE: &str = "AA:BB:CC:DD:EE:FF";

    fn config() -> Config {
        Config {
            device_address: Some(PHONE.into()),
            rssi_threshold: -70,
            away_count_threshold: 3,
            check_interval: 3,
            cooldown: 10,
            ..Config::default()
        }
    }

    fn seen(rssi: i16) -> Result<Vec<MockDevice>, DiscoveryError> {
        Ok(vec![
            MockDevice::new("11:11:11:11:11:11", Some("Router"), -30),
            MockDevice::new(PHONE.to_lowercase(), Some("Phone"), rssi),
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn test_weak_weak_missing_locks_once() {
        let discovery = ScriptedDiscovery::new(vec![seen(-75), seen(-80), Ok(vec![])]);
        let lock = RecordingLock::new();
        let mut cycle = ScanCycle::new(&config(), &discovery, &lock).unwrap();

        assert_eq!(cycle.run_once().await, CycleReport::Away { counter: 1 });
        assert_eq!(cycle.run_once().await, CycleReport::Away { counter: 2 });
        assert_eq!(
            cycle.run_once().await,
            CycleReport::Locked {
                lock_succeeded: true
            }
        );
        assert_eq!(lock.calls(), 1);
        assert_eq!(cycle.engine().away_counter(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_discovery_failure_leaves_counter_alone() {
        let discovery = ScriptedDiscovery::new(vec![
            seen(-90),
            Err(DiscoveryError::DiscoveryFailed {
                message: "adapter reset".into(),
            }),
            seen(-90),
        ]);
        let lock = RecordingLock::new();
        let mut cycle = ScanCycle::new(&config(), &discovery, &lock).unwrap();

        assert_eq!(cycle.run_once().await, CycleReport::Away { counter: 1 });
        assert_eq!(cycle.run_once().await, CycleReport::DiscoveryFailed);
        assert_eq!(cycle.engine().away_counter(), 1);
        assert_eq!(cycle.run_once().await, CycleReport::Away { counter: 2 });
        assert_eq!(lock.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lock_still_resets_counter() {
        let mut config = config();
        config.away_count_threshold = 1;
        let discovery = ScriptedDiscovery::new(vec![Ok(vec![])]);
        let lock = RecordingLock::failing();
        let mut cycle = ScanCycle::new(&config, &discovery, &lock).unwrap();

        assert_eq!(
            cycle.run_once().await,
            CycleReport::Locked {
                lock_succeeded: false
            }
        );
        assert_eq!(lock.calls(), 1);
        assert_eq!(cycle.engine().away_counter(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_holds_for_cooldown() {
        let mut config = config();
        config.away_count_threshold = 1;
        config.cooldown = 10;
        let discovery = ScriptedDiscovery::new(vec![Ok(vec![])]);
        let lock = RecordingLock::new();
        let mut cycle = ScanCycle::new(&config, &discovery, &lock).unwrap();

        let start = tokio::time::Instant::now();
        cycle.run_once().await;
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_duration_is_passed_through() {
        let mut config = config();
        config.scan_duration = 4;
        let discovery = ScriptedDiscovery::new(vec![seen(-50)]);
        let lock = RecordingLock::new();
        let mut cycle = ScanCycle::new(&config, &discovery, &lock).unwrap();

        assert_eq!(cycle.run_once().await, CycleReport::Near);
        assert_eq!(discovery.requested(), vec![Duration::from_secs(4)]);
    }

    #[test]
    fn test_requires_identity() {
        let discovery = ScriptedDiscovery::default();
        let lock = RecordingLock::new();
        assert!(ScanCycle::new(&Config::default(), &discovery, &lock).is_err());
    }

    #[test]
    fn test_display_name_falls_back_to_truncated_identifier() {
        let config = Config {
            device_name: Some("A very long device name fragment".into()),
            ..Config::default()
        };
        let discovery = ScriptedDiscovery::default();
        let lock = RecordingLock::new();
        let cycle = ScanCycle::new(&config, &discovery, &lock).unwrap();

        assert_eq!(
            cycle.display_name(&SignalSample::found(-60, None)),
            "A very long device n"
        );
        assert_eq!(
            cycle.display_name(&SignalSample::found(-60, Some("Pixel".into()))),
            "Pixel"
        );
    }
}
