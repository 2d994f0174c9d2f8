//! Application configuration management.
//!
//! Handles loading, saving, and validating awaylock configuration including:
//! - The Bluetooth device to follow (address or name fragment)
//! - RSSI threshold for proximity
//! - Scan cadence, hysteresis depth and post-lock cool-down
//! - The command used to lock the workstation
//!
//! Loading is layered: built-in defaults, then the TOML file (if present),
//! then `AWAYLOCK_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::lock::default_lock_command;
use crate::matcher::TargetIdentity;

/// Prefix for environment variable overrides (`AWAYLOCK_RSSI_THRESHOLD`, ...).
pub const ENV_PREFIX: &str = "AWAYLOCK";

/// Placeholder-free MAC address pattern (`AA:BB:CC:DD:EE:FF`).
static MAC_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}$").expect("MAC address regex is valid")
});

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Neither a device address nor a device name is set.
    #[error("no target device configured: set device_address or device_name")]
    NoTargetIdentity,

    /// No platform configuration directory could be determined.
    #[error("cannot determine configuration directory")]
    NoConfigDir,

    /// The layered configuration could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    /// Writing the configuration file failed.
    #[error("failed to write {}: {source}", path.display())]
    WriteError {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Creating the configuration directory failed.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirError {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be serialized to TOML.
    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A single field holds an invalid value.
    #[error("{field}: {message}")]
    ValidationError {
        /// Offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// Several validation problems at once.
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    MultipleValidationErrors(Vec<ConfigError>),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device MAC address or CoreBluetooth UUID. Preferred over the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_address: Option<String>,

    /// Case-insensitive fragment of the device name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,

    /// Readings at or above this value (dBm) count as nearby.
    /// Typical values: -80 (farther) to -60 (closer).
    pub rssi_threshold: i16,

    /// Seconds between scan cycles.
    pub check_interval: u64,

    /// Consecutive "away" cycles required before locking.
    pub away_count_threshold: u32,

    /// Seconds each discovery round runs.
    pub scan_duration: u64,

    /// Seconds to hold after locking before scanning resumes.
    pub cooldown: u64,

    /// Seconds each calibration discovery round runs.
    pub calibration_scan_duration: u64,

    /// Program and arguments executed to lock the workstation.
    pub lock_command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_address: None,
            device_name: None,
            rssi_threshold: -70,
            check_interval: 3,
            away_count_threshold: 3,
            scan_duration: 6,
            cooldown: 10,
            calibration_scan_duration: 5,
            lock_command: default_lock_command(),
        }
    }
}

/// Values supplied on the command line that take precedence over the file.
///
/// `None` leaves the loaded value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Device address override.
    pub device_address: Option<String>,
    /// Device name override.
    pub device_name: Option<String>,
    /// RSSI threshold override.
    pub rssi_threshold: Option<i16>,
    /// Check interval override.
    pub check_interval: Option<u64>,
    /// Away count override.
    pub away_count_threshold: Option<u32>,
    /// Scan duration override.
    pub scan_duration: Option<u64>,
    /// Cool-down override.
    pub cooldown: Option<u64>,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory is unknown or the file cannot be parsed.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load configuration from `path`, layering environment overrides on top.
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an environment value cannot be parsed.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        Self::load_layered(path, None)
    }

    /// Layer `path` and the environment over the defaults.
    ///
    /// `env` replaces the process environment when set.
    fn load_layered(path: &Path, env: Option<config::Map<String, String>>) -> ConfigResult<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("lock_command")
                    .source(env),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Save configuration to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self) -> ConfigResult<PathBuf> {
        let path = Self::default_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to `path` as pretty TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDirError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Get the default configuration file path.
    ///
    /// macOS: `~/Library/Application Support/awaylock/config.toml`
    /// Linux: `~/.config/awaylock/config.toml`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] when no home directory is known.
    pub fn default_path() -> ConfigResult<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "awaylock")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Merge every override that is set.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        let ConfigOverrides {
            device_address,
            device_name,
            rssi_threshold,
            check_interval,
            away_count_threshold,
            scan_duration,
            cooldown,
        } = overrides;

        if device_address.is_some() {
            self.device_address = device_address;
        }
        if device_name.is_some() {
            self.device_name = device_name;
        }
        if let Some(v) = rssi_threshold {
            self.rssi_threshold = v;
        }
        if let Some(v) = check_interval {
            self.check_interval = v;
        }
        if let Some(v) = away_count_threshold {
            self.away_count_threshold = v;
        }
        if let Some(v) = scan_duration {
            self.scan_duration = v;
        }
        if let Some(v) = cooldown {
            self.cooldown = v;
        }
    }

    /// Resolve the active matching strategy. The address wins when both are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoTargetIdentity`] when neither is configured.
    pub fn target_identity(&self) -> ConfigResult<TargetIdentity> {
        let non_empty = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        if let Some(address) = non_empty(&self.device_address) {
            Ok(TargetIdentity::Address(address))
        } else if let Some(name) = non_empty(&self.device_name) {
            Ok(TargetIdentity::Name(name))
        } else {
            Err(ConfigError::NoTargetIdentity)
        }
    }

    /// Check every field, collecting all problems.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MultipleValidationErrors`] listing each invalid field.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        match self.target_identity() {
            Ok(TargetIdentity::Address(address)) if !is_valid_device_address(&address) => {
                errors.push(invalid(
                    "device_address",
                    "expected a MAC address (AA:BB:CC:DD:EE:FF) or a device UUID",
                ));
            }
            Ok(_) => {}
            Err(e) => errors.push(e),
        }

        if !(-100..=0).contains(&self.rssi_threshold) {
            errors.push(invalid("rssi_threshold", "must be between -100 and 0 dBm"));
        }
        if self.away_count_threshold == 0 {
            errors.push(invalid("away_count_threshold", "must be at least 1"));
        }
        if self.scan_duration == 0 {
            errors.push(invalid("scan_duration", "must be at least 1 second"));
        }
        if self.calibration_scan_duration == 0 {
            errors.push(invalid(
                "calibration_scan_duration",
                "must be at least 1 second",
            ));
        }
        if self.lock_command.first().map_or(true, |p| p.trim().is_empty()) {
            errors.push(invalid("lock_command", "must name a program to run"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MultipleValidationErrors(errors))
        }
    }

    /// Time between cycles.
    #[must_use]
    pub const fn check_interval_duration(&self) -> Duration {
        Duration::from_secs(self.check_interval)
    }

    /// Discovery window for one monitoring cycle.
    #[must_use]
    pub const fn scan_duration_duration(&self) -> Duration {
        Duration::from_secs(self.scan_duration)
    }

    /// Hold after a lock fires.
    #[must_use]
    pub const fn cooldown_duration(&self) -> Duration {
        Duration::from_secs(self.cooldown)
    }

    /// Discovery window for one calibration round.
    #[must_use]
    pub const fn calibration_scan_duration_duration(&self) -> Duration {
        Duration::from_secs(self.calibration_scan_duration)
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Returns `true` for a colon-separated MAC address.
#[must_use]
pub fn is_valid_mac_address(address: &str) -> bool {
    MAC_ADDRESS_RE.is_match(address)
}

/// Returns `true` for anything a discovery backend reports as an address:
/// a MAC address (BlueZ) or a peripheral UUID (CoreBluetooth).
#[must_use]
pub fn is_valid_device_address(address: &str) -> bool {
    is_valid_mac_address(address) || uuid::Uuid::parse_str(address).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_address(address: &str) -> Config {
        Config {
            device_address: Some(address.to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rssi_threshold, -70);
        assert_eq!(config.check_interval, 3);
        assert_eq!(config.away_count_threshold, 3);
        assert_eq!(config.scan_duration, 6);
        assert_eq!(config.cooldown, 10);
        assert_eq!(config.calibration_scan_duration, 5);
        assert!(!config.lock_command.is_empty());
    }

    #[test]
    fn test_mac_address_validation() {
        assert!(is_valid_mac_address("AA:BB:CC:DD:EE:FF"));
        assert!(is_valid_mac_address("aa:bb:cc:dd:ee:0f"));
        assert!(!is_valid_mac_address("AA:BB:CC"));
        assert!(!is_valid_mac_address("AA-BB-CC-DD-EE-FF"));
        assert!(!is_valid_mac_address("GG:BB:CC:DD:EE:FF"));
    }

    #[test]
    fn test_device_address_accepts_uuid() {
        assert!(is_valid_device_address("6F1A2B3C-4D5E-6F70-8192-A3B4C5D6E7F8"));
        assert!(is_valid_device_address("AA:BB:CC:DD:EE:FF"));
        assert!(!is_valid_device_address("my phone"));
    }

    #[test]
    fn test_address_takes_precedence_over_name() {
        let config = Config {
            device_address: Some("AA:BB:CC:DD:EE:FF".into()),
            device_name: Some("Phone".into()),
            ..Config::default()
        };
        assert_eq!(
            config.target_identity().unwrap(),
            TargetIdentity::Address("AA:BB:CC:DD:EE:FF".into())
        );
    }

    #[test]
    fn test_name_identity_when_no_address() {
        let config = Config {
            device_name: Some("Phone".into()),
            ..Config::default()
        };
        assert_eq!(
            config.target_identity().unwrap(),
            TargetIdentity::Name("Phone".into())
        );
    }

    #[test]
    fn test_blank_identity_is_missing() {
        let config = Config {
            device_address: Some("  ".into()),
            device_name: Some(String::new()),
            ..Config::default()
        };
        assert!(matches!(
            config.target_identity(),
            Err(ConfigError::NoTargetIdentity)
        ));
    }

    #[test]
    fn test_validate_ok() {
        tokio_test::assert_ok!(with_address("AA:BB:CC:DD:EE:FF").validate());
        tokio_test::assert_ok!(Config {
            device_name: Some("Pixel".into()),
            ..Config::default()
        }
        .validate());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = Config {
            rssi_threshold: 10,
            away_count_threshold: 0,
            scan_duration: 0,
            lock_command: Vec::new(),
            ..Config::default()
        };
        let Err(ConfigError::MultipleValidationErrors(errors)) = config.validate() else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 5);
        assert!(matches!(errors[0], ConfigError::NoTargetIdentity));
    }

    #[test]
    fn test_validate_rejects_bad_address() {
        let err = tokio_test::assert_err!(with_address("not-an-address").validate());
        assert!(err.to_string().contains("device_address"));
    }

    #[test]
    fn test_apply_only_set_values() {
        let mut config = with_address("AA:BB:CC:DD:EE:FF");
        config.apply(ConfigOverrides {
            rssi_threshold: Some(-65),
            device_name: Some("Watch".into()),
            ..ConfigOverrides::default()
        });
        assert_eq!(config.rssi_threshold, -65);
        assert_eq!(config.device_name.as_deref(), Some("Watch"));
        assert_eq!(config.device_address.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(config.check_interval, 3);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = with_address("AA:BB:CC:DD:EE:FF");
        config.rssi_threshold = -62;
        config.cooldown = 30;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.rssi_threshold, Config::default().rssi_threshold);
        assert_eq!(loaded.scan_duration, Config::default().scan_duration);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "device_name = \"Pixel\"\naway_count_threshold = 5\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.device_name.as_deref(), Some("Pixel"));
        assert_eq!(loaded.away_count_threshold, 5);
        assert_eq!(loaded.check_interval, 3);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "device_name = \"Pixel\"\nrssi_threshold = -80\n").unwrap();

        let env: config::Map<String, String> = [
            ("AWAYLOCK_RSSI_THRESHOLD", "-65"),
            ("AWAYLOCK_LOCK_COMMAND", "xdg-screensaver lock"),
            ("AWAYLOCK_CONFIG", "/ignored/by/the/loader.toml"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let loaded = Config::load_layered(&path, Some(env)).unwrap();
        assert_eq!(loaded.device_name.as_deref(), Some("Pixel"));
        assert_eq!(loaded.rssi_threshold, -65);
        assert_eq!(loaded.lock_command, vec!["xdg-screensaver", "lock"]);
        assert_eq!(loaded.check_interval, 3);
    }

    #[test]
    fn test_bad_environment_value_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let env: config::Map<String, String> =
            [("AWAYLOCK_AWAY_COUNT_THRESHOLD".to_string(), "many".to_string())]
                .into_iter()
                .collect();

        let err = tokio_test::assert_err!(Config::load_layered(
            &dir.path().join("config.toml"),
            Some(env)
        ));
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn test_duration_helpers() {
        let config = Config::default();
        assert_eq!(config.check_interval_duration(), Duration::from_secs(3));
        assert_eq!(config.scan_duration_duration(), Duration::from_secs(6));
        assert_eq!(config.cooldown_duration(), Duration::from_secs(10));
        assert_eq!(
            config.calibration_scan_duration_duration(),
            Duration::from_secs(5)
        );
    }
}
