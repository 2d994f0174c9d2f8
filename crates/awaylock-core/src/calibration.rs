//! Calibration mode: stream raw RSSI so the user can pick a threshold.
//!
//! Never touches the hysteresis engine or the lock action.

use std::fmt;

use tracing::{error, info};

use crate::config::{Config, ConfigResult};
use crate::device::SignalSample;
use crate::discovery::Discovery;
use crate::stop::StopSignal;

/// Cells in the intensity bar.
pub const BAR_WIDTH: usize = 30;

/// RSSI that maps to an empty bar; every dB above it fills one cell.
const BAR_FLOOR_DBM: i32 = -100;

/// One calibration round's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationReading {
    sample: SignalSample,
}

impl CalibrationReading {
    /// Wrap a sample.
    #[must_use]
    pub const fn new(sample: SignalSample) -> Self {
        Self { sample }
    }

    /// The underlying sample.
    #[must_use]
    pub const fn sample(&self) -> &SignalSample {
        &self.sample
    }
}

impl fmt::Display for CalibrationReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sample.rssi() {
            Some(rssi) => {
                let name = self.sample.name().unwrap_or("Device");
                write!(f, "{name}: RSSI {rssi:4} dBm [{}]", signal_bar(rssi))
            }
            None => f.write_str("Scanning... (device not found in this cycle)"),
        }
    }
}

/// Render `rssi` as a fixed-width bar: one filled cell per dB above -100.
#[must_use]
pub fn signal_bar(rssi: i16) -> String {
    let filled = usize::try_from(i32::from(rssi) - BAR_FLOOR_DBM)
        .unwrap_or(0)
        .min(BAR_WIDTH);
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(BAR_WIDTH - filled));
    bar
}

/// Totals for a finished calibration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalibrationSummary {
    /// Rounds that completed.
    pub rounds: u64,
    /// Rounds in which the target was seen.
    pub found: u64,
    /// Rounds lost to discovery failures.
    pub discovery_failures: u64,
    /// Strongest reading seen.
    pub strongest: Option<i16>,
    /// Weakest reading seen.
    pub weakest: Option<i16>,
}

impl CalibrationSummary {
    fn record(&mut self, reading: &CalibrationReading) {
        self.rounds += 1;
        if let Some(rssi) = reading.sample.rssi() {
            self.found += 1;
            self.strongest = Some(self.strongest.map_or(rssi, |s| s.max(rssi)));
            self.weakest = Some(self.weakest.map_or(rssi, |w| w.min(rssi)));
        }
    }
}

/// Repeatedly discover and hand each reading to `report` until stopped.
///
/// Uses the shorter `calibration_scan_duration`. A failed round is logged
/// and retried after `check_interval`.
///
/// # Errors
///
/// Returns a [`crate::ConfigError`] before any round runs if the
/// configuration is invalid.
pub async fn run_calibration<D, S, F>(
    config: &Config,
    discovery: D,
    stop: S,
    mut report: F,
) -> ConfigResult<CalibrationSummary>
where
    D: Discovery,
    S: StopSignal,
    F: FnMut(&CalibrationReading),
{
    config.validate()?;
    let identity = config.target_identity()?;
    let scan_duration = config.calibration_scan_duration_duration();

    info!(
        search_by = identity.kind(),
        device = identity.value(),
        "CALIBRATION MODE: walk away from the computer and note the RSSI value"
    );

    let mut summary = CalibrationSummary::default();
    while !stop.stop_requested() {
        match discovery.discover(scan_duration).await {
            Ok(devices) => {
                let reading =
                    CalibrationReading::new(SignalSample::from_match(identity.find(&devices)));
                summary.record(&reading);
                report(&reading);
            }
            Err(e) => {
                summary.discovery_failures += 1;
                error!(error = %e, "Error: calibration round failed");
                tokio::time::sleep(config.check_interval_duration()).await;
            }
        }
    }

    info!(
        rounds = summary.rounds,
        found = summary.found,
        strongest = ?summary.strongest,
        weakest = ?summary.weakest,
        "Calibration stopped"
    );
    Ok(summary)
}
