//! Unified error types for the awaylock core library.
//!
//! This module provides a unified error type [`AwayLockError`] that covers all failure
//! modes across awaylock. Each capability also has its own specific error type
//! ([`ConfigError`], [`DiscoveryError`], [`LockError`]) which converts into it.
//!
//! # Design Principles
//!
//! - **Specific variants**: Each error variant captures exactly one failure mode
//! - **Actionable messages**: Error messages guide users toward resolution
//! - **Context preservation**: Wrapped errors maintain their original context
//! - **CLI-ready**: Error types carry machine-readable codes and process exit codes
//!
//! # Example
//!
//! ```rust
//! use awaylock_core::error::{AwayLockError, Result};
//!
//! fn require_identity(address: Option<&str>, name: Option<&str>) -> Result<()> {
//!     if address.is_none() && name.is_none() {
//!         return Err(AwayLockError::NoTargetConfigured);
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::discovery::DiscoveryError;
pub use crate::lock::LockError;

/// The unified error type for all awaylock operations.
#[derive(Debug, Error)]
pub enum AwayLockError {
    // =========================================================================
    // DISCOVERY ERRORS
    // =========================================================================
    /// No Bluetooth adapter was found on this system.
    #[error(
        "No Bluetooth adapter found. Ensure Bluetooth hardware is present and drivers are loaded."
    )]
    BluetoothAdapterNotFound,

    /// The Bluetooth adapter exists but is powered off.
    #[error("Bluetooth adapter is powered off. Turn Bluetooth on and try again.")]
    BluetoothAdapterPoweredOff,

    /// A discovery round failed.
    #[error("Bluetooth scan failed: {0}")]
    BluetoothScanFailed(String),

    /// This build has no discovery backend.
    #[error("awaylock was built without Bluetooth support (enable the `bluetooth` feature)")]
    BluetoothUnsupported,

    // =========================================================================
    // LOCK ACTION ERRORS
    // =========================================================================
    /// The lock action could not be performed.
    #[error("Lock action failed: {0}")]
    LockFailed(String),

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// Neither a device address nor a device name is configured.
    #[error("No target device configured. Specify --address or --name (run --scan to find it).")]
    NoTargetConfigured,

    /// The configuration file exists but could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// The configuration was parsed but contains invalid values.
    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    /// The platform has no discoverable configuration directory.
    #[error("Cannot determine configuration directory; pass --config explicitly")]
    ConfigDirUnavailable,

    // =========================================================================
    // PERSISTENCE ERRORS
    // =========================================================================
    /// An error occurred while persisting configuration.
    #[error("Persistence error: {0}")]
    PersistenceError(String),
}

/// A specialized [`Result`] type for awaylock operations.
pub type Result<T> = std::result::Result<T, AwayLockError>;

impl AwayLockError {
    /// Returns the process exit code the CLI should use for this error.
    ///
    /// Follows the BSD `sysexits.h` conventions.
    #[inline]
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            // EX_USAGE
            Self::NoTargetConfigured => 64,

            // EX_CONFIG
            Self::ConfigParseError(_)
            | Self::ConfigValidationError(_)
            | Self::ConfigDirUnavailable => 78,

            // EX_UNAVAILABLE
            Self::BluetoothAdapterNotFound
            | Self::BluetoothAdapterPoweredOff
            | Self::BluetoothScanFailed(_)
            | Self::BluetoothUnsupported
            | Self::LockFailed(_) => 69,

            // EX_IOERR
            Self::PersistenceError(_) => 74,
        }
    }

    /// Returns a machine-readable error code.
    #[inline]
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BluetoothAdapterNotFound => "BLUETOOTH_ADAPTER_NOT_FOUND",
            Self::BluetoothAdapterPoweredOff => "BLUETOOTH_ADAPTER_POWERED_OFF",
            Self::BluetoothScanFailed(_) => "BLUETOOTH_SCAN_FAILED",
            Self::BluetoothUnsupported => "BLUETOOTH_UNSUPPORTED",
            Self::LockFailed(_) => "LOCK_FAILED",
            Self::NoTargetConfigured => "NO_TARGET_CONFIGURED",
            Self::ConfigParseError(_) => "CONFIG_PARSE_ERROR",
            Self::ConfigValidationError(_) => "CONFIG_VALIDATION_ERROR",
            Self::ConfigDirUnavailable => "CONFIG_DIR_UNAVAILABLE",
            Self::PersistenceError(_) => "PERSISTENCE_ERROR",
        }
    }
}

// =============================================================================
// CONVERSIONS FROM MODULE-SPECIFIC ERRORS
// =============================================================================

impl From<ConfigError> for AwayLockError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoTargetIdentity => Self::NoTargetConfigured,
            ConfigError::NoConfigDir => Self::ConfigDirUnavailable,
            ConfigError::LoadError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::WriteError { path, source } => {
                Self::PersistenceError(format!("Failed to write {}: {}", path.display(), source))
            }
            ConfigError::CreateDirError { path, source } => Self::PersistenceError(format!(
                "Failed to create directory {}: {}",
                path.display(),
                source
            )),
            ConfigError::SerializeError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::ValidationError { field, message } => {
                Self::ConfigValidationError(format!("{field}: {message}"))
            }
            ConfigError::MultipleValidationErrors(errors) => {
                // A lone missing identity reads better as its own error.
                if errors.len() == 1 && matches!(errors[0], ConfigError::NoTargetIdentity) {
                    return Self::NoTargetConfigured;
                }
                let messages: Vec<String> = errors.into_iter().map(|e| e.to_string()).collect();
                Self::ConfigValidationError(messages.join("; "))
            }
        }
    }
}

impl From<DiscoveryError> for AwayLockError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::AdapterNotFound => Self::BluetoothAdapterNotFound,
            DiscoveryError::AdapterPoweredOff => Self::BluetoothAdapterPoweredOff,
            DiscoveryError::Unsupported => Self::BluetoothUnsupported,
            DiscoveryError::ScanTimeout { duration_secs } => {
                Self::BluetoothScanFailed(format!("Scan timed out after {duration_secs} seconds"))
            }
            DiscoveryError::SessionInitFailed { message }
            | DiscoveryError::DiscoveryFailed { message } => Self::BluetoothScanFailed(message),
        }
    }
}

impl From<LockError> for AwayLockError {
    fn from(err: LockError) -> Self {
        Self::LockFailed(err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
