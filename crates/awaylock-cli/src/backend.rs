//! Selecting the discovery backend compiled into this build.

#[cfg(not(feature = "bluetooth"))]
use std::time::Duration;

#[cfg(not(feature = "bluetooth"))]
use awaylock_core::{DiscoveredDevice, Discovery, DiscoveryResult};
use awaylock_core::DiscoveryError;

/// BlueZ on Linux.
#[cfg(feature = "bluetooth")]
pub type Backend = awaylock_core::BluezDiscovery;

/// No backend; [`open`] always fails, so no value of this type exists.
#[cfg(not(feature = "bluetooth"))]
#[derive(Debug)]
pub enum Backend {}

#[cfg(not(feature = "bluetooth"))]
impl Discovery for Backend {
    async fn discover(&self, _duration: Duration) -> DiscoveryResult<Vec<DiscoveredDevice>> {
        match *self {}
    }
}

/// Open the platform discovery backend.
///
/// # Errors
///
/// Returns [`DiscoveryError::Unsupported`] when built without the
/// `bluetooth` feature, or the backend's own initialization error.
pub async fn open() -> Result<Backend, DiscoveryError> {
    #[cfg(feature = "bluetooth")]
    {
        awaylock_core::BluezDiscovery::new().await
    }

    #[cfg(not(feature = "bluetooth"))]
    {
        Err(DiscoveryError::Unsupported)
    }
}
