//! One-off listing of every visible device, for finding the target's address.

use std::time::Duration;

use tracing::info;

use crate::device::DiscoveredDevice;
use crate::discovery::{Discovery, DiscoveryResult};

/// Discovery window for a survey.
pub const SURVEY_DURATION: Duration = Duration::from_secs(10);

/// Discover for `duration` and return devices strongest first.
///
/// # Errors
///
/// Propagates the discovery failure; a survey is a one-shot command.
pub async fn survey<D: Discovery>(
    discovery: D,
    duration: Duration,
) -> DiscoveryResult<Vec<DiscoveredDevice>> {
    info!(duration_secs = duration.as_secs(), "Scanning all Bluetooth devices...");
    let mut devices = discovery.discover(duration).await?;
    devices.sort_by(|a, b| b.rssi.cmp(&a.rssi));
    info!(count = devices.len(), "Survey complete");
    Ok(devices)
}
