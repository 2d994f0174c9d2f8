//! The device-discovery capability consumed by the scan loops.

use std::time::Duration;

use crate::device::DiscoveredDevice;

/// Errors that can occur during a discovery round.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// No Bluetooth adapter present.
    #[error("no Bluetooth adapter found")]
    AdapterNotFound,

    /// Adapter is present but powered off.
    #[error("Bluetooth adapter is powered off")]
    AdapterPoweredOff,

    /// The round did not finish in time.
    #[error("scan timed out after {duration_secs} seconds")]
    ScanTimeout {
        /// Allowed duration.
        duration_secs: u64,
    },

    /// Connecting to the Bluetooth daemon failed.
    #[error("failed to initialize Bluetooth session: {message}")]
    SessionInitFailed {
        /// Backend message.
        message: String,
    },

    /// The backend reported a failure mid-round.
    #[error("discovery failed: {message}")]
    DiscoveryFailed {
        /// Backend message.
        message: String,
    },

    /// No backend compiled into this build.
    #[error("Bluetooth support is not compiled in")]
    Unsupported,
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = std::result::Result<T, DiscoveryError>;

/// Something that can list the wireless devices currently in range.
///
/// Implementations may take up to `duration` to answer and must not keep a
/// round running after returning. Callers never issue overlapping rounds.
#[allow(async_fn_in_trait)]
pub trait Discovery {
    /// Run one bounded discovery round.
    async fn discover(&self, duration: Duration) -> DiscoveryResult<Vec<DiscoveredDevice>>;
}

impl<T: Discovery + ?Sized> Discovery for &T {
    async fn discover(&self, duration: Duration) -> DiscoveryResult<Vec<DiscoveredDevice>> {
        (**self).discover(duration).await
    }
}
