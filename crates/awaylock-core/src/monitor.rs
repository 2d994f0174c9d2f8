//! The monitor loop: scan cycles at a fixed cadence until stopped.
//!
//! ```text
//!            stop_requested() == false
//!          ┌──────────────────────────┐
//!          ▼                          │
//!  ┌─────────────┐  cycle + sleep  ───┘
//!  │   Running   │
//!  └─────────────┘
//!          │ stop_requested() == true (loop head only)
//!          ▼
//!  ┌─────────────┐
//!  │   Stopped   │  terminal
//!  └─────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::{Config, ConfigResult};
use crate::cycle::{CycleReport, ScanCycle};
use crate::discovery::Discovery;
use crate::lock::LockAction;
use crate::stop::StopSignal;

/// Counters describing a finished monitor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSummary {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Cycles started.
    pub cycles: u64,
    /// Times the engine triggered.
    pub triggers: u64,
    /// Triggers whose lock action failed.
    pub lock_failures: u64,
    /// Cycles lost to discovery failures.
    pub discovery_failures: u64,
    /// When the most recent trigger fired.
    pub last_triggered_at: Option<DateTime<Utc>>,
}

impl MonitorSummary {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            cycles: 0,
            triggers: 0,
            lock_failures: 0,
            discovery_failures: 0,
            last_triggered_at: None,
        }
    }

    fn record(&mut self, report: CycleReport) {
        self.cycles += 1;
        match report {
            CycleReport::DiscoveryFailed => self.discovery_failures += 1,
            CycleReport::Locked { lock_succeeded } => {
                self.triggers += 1;
                self.last_triggered_at = Some(Utc::now());
                if !lock_succeeded {
                    self.lock_failures += 1;
                }
            }
            CycleReport::Near | CycleReport::Away { .. } => {}
        }
    }
}

/// Run scan cycles until `stop` reports a stop at the head of an iteration.
///
/// Each iteration runs one cycle (which includes the post-lock cool-down
/// when it triggers) and then waits `check_interval`. No single-cycle
/// failure ends the run.
///
/// # Errors
///
/// Returns a [`crate::ConfigError`] before any cycle runs if the
/// configuration is invalid (most notably, no target device).
pub async fn run_monitor<D, L, S>(
    config: &Config,
    discovery: D,
    lock: L,
    stop: S,
) -> ConfigResult<MonitorSummary>
where
    D: Discovery,
    L: LockAction,
    S: StopSignal,
{
    config.validate()?;
    let mut cycle = ScanCycle::new(config, discovery, lock)?;
    let interval = config.check_interval_duration();

    info!(
        search_by = cycle.identity().kind(),
        device = cycle.identity().value(),
        rssi_threshold = config.rssi_threshold,
        scan_duration_secs = config.scan_duration,
        away_count_threshold = config.away_count_threshold,
        "AWAYLOCK STARTED"
    );

    let mut summary = MonitorSummary::new();
    while !stop.stop_requested() {
        let report = cycle.run_once().await;
        summary.record(report);
        tokio::time::sleep(interval).await;
    }

    info!(
        cycles = summary.cycles,
        triggers = summary.triggers,
        lock_failures = summary.lock_failures,
        discovery_failures = summary.discovery_failures,
        "Monitor stopped"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::ConfigError;
    use crate::discovery::DiscoveryError;
    use crate::mock::{MockDevice, RecordingLock, ScriptedDiscovery, StopAfterPolls};
    use crate::stop::StopFlag;

    const PHONE: &str = "AA:BB:CC:DD:EE:FF";

    fn config() -> Config {
        Config {
            device_address: Some(PHONE.into()),
            rssi_threshold: -70,
            away_count_threshold: 3,
            check_interval: 3,
            scan_duration: 6,
            cooldown: 10,
            ..Config::default()
        }
    }

    fn seen(rssi: i16) -> Result<Vec<MockDevice>, DiscoveryError> {
        Ok(vec![MockDevice::new(PHONE, Some("Phone"), rssi)])
    }

    fn failure() -> Result<Vec<MockDevice>, DiscoveryError> {
        Err(DiscoveryError::ScanTimeout { duration_secs: 6 })
    }

    #[tokio::test(start_paused = true)]
    async fn test_refuses_to_start_without_identity() {
        let discovery = ScriptedDiscovery::default();
        let lock = RecordingLock::new();
        let stop = StopFlag::new();

        let result = run_monitor(&Config::default(), &discovery, &lock, &stop).await;
        let Err(ConfigError::MultipleValidationErrors(errors)) = result else {
            panic!("expected a configuration error");
        };
        assert!(matches!(errors[0], ConfigError::NoTargetIdentity));
        assert_eq!(discovery.rounds_run(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_stopped_runs_nothing() {
        let discovery = ScriptedDiscovery::default();
        let lock = RecordingLock::new();
        let stop = StopFlag::new();
        stop.stop();

        let summary = run_monitor(&config(), &discovery, &lock, &stop).await.unwrap();
        assert_eq!(summary.cycles, 0);
        assert_eq!(discovery.rounds_run(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_locks_exactly_once() {
        let discovery = ScriptedDiscovery::new(vec![seen(-75), seen(-80), Ok(vec![])]);
        let lock = RecordingLock::new();

        let summary = run_monitor(&config(), &discovery, &lock, StopAfterPolls::new(3))
            .await
            .unwrap();

        assert_eq!(summary.cycles, 3);
        assert_eq!(summary.triggers, 1);
        assert!(summary.last_triggered_at.is_some());
        assert_eq!(lock.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_discovery_failure_does_not_count_or_stop() {
        // Without the failure this script would lock on the third cycle.
        let discovery =
            ScriptedDiscovery::new(vec![seen(-90), seen(-90), failure(), seen(-50), seen(-90)]);
        let lock = RecordingLock::new();

        let summary = run_monitor(&config(), &discovery, &lock, StopAfterPolls::new(5))
            .await
            .unwrap();

        assert_eq!(summary.cycles, 5);
        assert_eq!(summary.discovery_failures, 1);
        assert_eq!(summary.triggers, 0);
        assert_eq!(lock.calls(), 0);
        assert_eq!(discovery.rounds_run(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_then_retry_after_interval() {
        let discovery = ScriptedDiscovery::new(vec![failure(), seen(-50)]);
        let lock = RecordingLock::new();

        let start = tokio::time::Instant::now();
        let summary = run_monitor(&config(), &discovery, &lock, StopAfterPolls::new(2))
            .await
            .unwrap();

        assert_eq!(summary.cycles, 2);
        // Two cycles, each followed by the 3s interval.
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_adds_to_interval() {
        let mut config = config();
        config.away_count_threshold = 1;
        let discovery = ScriptedDiscovery::new(vec![Ok(vec![])]);
        let lock = RecordingLock::new();

        let start = tokio::time::Instant::now();
        run_monitor(&config, &discovery, &lock, StopAfterPolls::new(1))
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(10 + 3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_failure_does_not_stop_run() {
        let mut config = config();
        config.away_count_threshold = 1;
        let discovery = ScriptedDiscovery::new(vec![Ok(vec![]), Ok(vec![]), seen(-40)]);
        let lock = RecordingLock::failing();

        let summary = run_monitor(&config, &discovery, &lock, StopAfterPolls::new(3))
            .await
            .unwrap();

        assert_eq!(summary.cycles, 3);
        assert_eq!(summary.triggers, 2);
        assert_eq!(summary.lock_failures, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_sleep_prevents_next_cycle() {
        let discovery = ScriptedDiscovery::new(vec![seen(-50), seen(-50), seen(-50)]);
        let lock = RecordingLock::new();
        let stop = StopFlag::new();

        let stopper = stop.clone();
        tokio::spawn(async move {
            // Lands inside the first 3s interval sleep.
            tokio::time::sleep(Duration::from_secs(1)).await;
            stopper.stop();
        });

        let start = tokio::time::Instant::now();
        let summary = run_monitor(&config(), &discovery, &lock, &stop).await.unwrap();

        assert_eq!(summary.cycles, 1);
        assert_eq!(discovery.rounds_run(), 1);
        // The in-flight sleep is not cut short.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_cadence_includes_scan_time() {
        let discovery = ScriptedDiscovery::new(vec![seen(-50), seen(-50)]).with_simulated_duration();
        let lock = RecordingLock::new();

        let start = tokio::time::Instant::now();
        run_monitor(&config(), &discovery, &lock, StopAfterPolls::new(2))
            .await
            .unwrap();

        // Each cycle: 6s scan, then the 3s interval.
        assert_eq!(start.elapsed(), Duration::from_secs(2 * (6 + 3)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_near_samples_never_lock() {
        let discovery = ScriptedDiscovery::new((0..20).map(|_| seen(-55)).collect());
        let lock = RecordingLock::new();

        let summary = run_monitor(&config(), &discovery, &lock, StopAfterPolls::new(20))
            .await
            .unwrap();

        assert_eq!(summary.cycles, 20);
        assert_eq!(lock.calls(), 0);
    }
}
