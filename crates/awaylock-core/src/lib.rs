//! # awaylock-core
//!
//! Core logic for awaylock: lock the workstation when a paired Bluetooth
//! device (a phone, a watch) has been away for a while.
//!
//! This crate provides:
//! - A hysteresis engine that debounces noisy RSSI readings into a lock decision
//! - Scan-cycle, monitor and calibration loops over pluggable capabilities
//! - Configuration loading, saving and validation
//! - A BlueZ discovery backend (feature `bluetooth`) and a command-based lock action
//!
//! ## Architecture
//!
//! - [`device`] - Discovered devices and per-cycle signal samples
//! - [`matcher`] - Deciding whether a device is the configured target
//! - [`hysteresis`] - Consecutive-miss counter and trigger decision
//! - [`cycle`] - One discovery round through the engine, with lock and cool-down
//! - [`monitor`] - The main loop, stopped cooperatively
//! - [`calibration`] - Raw RSSI streaming for threshold tuning
//! - [`survey`] - One-off listing of nearby devices
//! - [`discovery`], [`lock`], [`stop`] - Capabilities the loops are generic over
//! - [`config`] - Application configuration
//! - [`error`] - Unified error types for the crate

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

#[cfg(feature = "bluetooth")]
pub mod bluetooth;
pub mod calibration;
pub mod config;
pub mod cycle;
pub mod device;
pub mod discovery;
pub mod error;
pub mod hysteresis;
pub mod lock;
pub mod matcher;
#[cfg(any(test, feature = "mock-bluetooth"))]
pub mod mock;
pub mod monitor;
pub mod stop;
pub mod survey;

// Re-export primary types for convenience
#[cfg(feature = "bluetooth")]
pub use bluetooth::BluezDiscovery;
pub use calibration::{run_calibration, signal_bar, CalibrationReading, CalibrationSummary};
pub use crate::config::{
    is_valid_device_address, is_valid_mac_address, Config, ConfigError, ConfigOverrides,
    ConfigResult,
};
pub use cycle::{CycleReport, ScanCycle};
pub use device::{DiscoveredDevice, Presence, SignalSample};
pub use discovery::{Discovery, DiscoveryError, DiscoveryResult};
pub use error::{AwayLockError, Result};
pub use hysteresis::{HysteresisEngine, Outcome};
pub use lock::{default_lock_command, CommandLock, LockAction, LockError};
pub use matcher::{matches, TargetIdentity};
#[cfg(any(test, feature = "mock-bluetooth"))]
pub use mock::{MockDevice, RecordingLock, ScriptedDiscovery, StopAfterPolls};
pub use monitor::{run_monitor, MonitorSummary};
pub use stop::{StopFlag, StopSignal};
pub use survey::{survey, SURVEY_DURATION};
