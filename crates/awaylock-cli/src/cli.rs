//! Command-line arguments.

use std::path::PathBuf;

use awaylock_core::ConfigOverrides;
use clap::Parser;

const EXAMPLES: &str = "\
Examples:
  awaylock --scan                                  Find all devices
  awaylock --address AA:BB:CC:DD:EE:FF             Monitor by address
  awaylock --address AA:BB:CC:DD:EE:FF --save      Save address to config
  awaylock --address AA:BB:CC:DD:EE:FF --calibrate Calibration mode
  awaylock --threshold -65                         Set RSSI threshold";

/// Command-line arguments for awaylock
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "awaylock")]
#[command(about = "Lock the computer when a Bluetooth device moves away")]
#[command(version, after_help = EXAMPLES)]
pub struct Args {
    /// Scan for all BLE devices and exit
    #[arg(long)]
    pub scan: bool,

    /// Device address or UUID (recommended)
    #[arg(short, long)]
    pub address: Option<String>,

    /// Device name fragment (fallback)
    #[arg(short, long)]
    pub name: Option<String>,

    /// RSSI threshold in dBm (default: -70)
    #[arg(short, long, allow_negative_numbers = true)]
    pub threshold: Option<i16>,

    /// Seconds between checks (default: 3)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Scan duration in seconds (default: 6)
    #[arg(long = "scan-time")]
    pub scan_time: Option<u64>,

    /// Consecutive away readings before locking (default: 3)
    #[arg(long)]
    pub away_count: Option<u32>,

    /// Seconds to wait after locking (default: 10)
    #[arg(long)]
    pub cooldown: Option<u64>,

    /// Calibration mode (shows RSSI)
    #[arg(short, long, conflicts_with = "scan")]
    pub calibrate: bool,

    /// Save settings to the config file
    #[arg(short, long)]
    pub save: bool,

    /// Config file path
    #[arg(long, env = "AWAYLOCK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print scan results as JSON
    #[arg(long, requires = "scan")]
    pub json: bool,

    /// Running under launchd/systemd: plain stdout plus JSON log files
    #[arg(long)]
    pub service: bool,
}

/// What the invocation should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// List nearby devices.
    Survey,
    /// Stream RSSI for the target.
    Calibrate,
    /// Watch the target and lock when it leaves.
    Monitor,
}

impl Args {
    /// The selected mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        if self.scan {
            Mode::Survey
        } else if self.calibrate {
            Mode::Calibrate
        } else {
            Mode::Monitor
        }
    }

    /// Values to layer over the loaded configuration.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            device_address: self.address.clone(),
            device_name: self.name.clone(),
            rssi_threshold: self.threshold,
            check_interval: self.interval,
            away_count_threshold: self.away_count,
            scan_duration: self.scan_time,
            cooldown: self.cooldown,
        }
    }
}
