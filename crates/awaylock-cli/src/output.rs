//! Human-readable output for one-shot commands.

use std::fmt::Write as _;

use awaylock_core::{CalibrationSummary, DiscoveredDevice, MonitorSummary};

const RULE_WIDTH: usize = 60;

/// Render a survey as the numbered table shown by `--scan`.
#[must_use]
pub fn format_survey(devices: &[DiscoveredDevice]) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");

    if devices.is_empty() {
        let _ = writeln!(out, "No devices found!");
        let _ = writeln!(out, "{rule}");
        return out;
    }

    let _ = writeln!(
        out,
        "Found {} devices (sorted by signal strength):\n",
        devices.len()
    );
    for (i, device) in devices.iter().enumerate() {
        let name = device.name.as_deref().unwrap_or("(unnamed)");
        let _ = writeln!(out, "{:3}. {name}", i + 1);
        let _ = writeln!(out, "     RSSI: {} dBm | Address: {}", device.rssi, device.address);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "To use a device, copy its address and run:");
    let _ = writeln!(out, "   awaylock --address \"ADDRESS\" --save");
    let _ = writeln!(out, "{rule}");
    out
}

/// Render a survey as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn format_survey_json(devices: &[DiscoveredDevice]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(devices)
}

/// Closing line of a calibration run: the range to pick a threshold from.
#[must_use]
pub fn format_calibration_summary(summary: &CalibrationSummary) -> String {
    match (summary.strongest, summary.weakest) {
        (Some(strongest), Some(weakest)) => format!(
            "Seen in {} of {} rounds. Strongest: {strongest} dBm, weakest: {weakest} dBm.",
            summary.found, summary.rounds
        ),
        _ => format!("Device not seen in {} rounds.", summary.rounds),
    }
}

/// Closing line of a monitor run.
#[must_use]
pub fn format_monitor_summary(summary: &MonitorSummary) -> String {
    let mut out = format!(
        "Ran {} cycles since {}, locked {} times",
        summary.cycles,
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        summary.triggers
    );
    if summary.lock_failures > 0 {
        let _ = write!(out, " ({} failed)", summary.lock_failures);
    }
    out.push('.');
    out
}
