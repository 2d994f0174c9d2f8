//! Logging initialization and configuration.
//!
//! This module provides mode-aware logging setup:
//! - **Service**: JSON logs to rolling files + compact logs to stdout
//! - **Interactive**: compact stdout with a wall-clock timestamp

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Static guards to keep non-blocking writers alive.
/// These must persist for the lifetime of the program.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static STDOUT_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Environment variable consulted when `RUST_LOG` is unset.
pub const LOG_LEVEL_ENV: &str = "AWAYLOCK_LOG_LEVEL";

/// Local `[HH:MM:SS]` timestamps for interactive output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", chrono::Local::now().format("%H:%M:%S"))
    }
}

/// Initialize the logging system.
///
/// # Arguments
///
/// * `service` - Whether awaylock runs under a service manager
///
/// # Service Mode
///
/// - Logs to rolling daily files in the platform data directory
/// - Also logs to stdout so launchd/journald capture it
/// - JSON format for structured logging in files
/// - Compact format for stdout (no ANSI colors)
///
/// # Interactive Mode
///
/// - Logs to stdout only, compact, with local time
///
/// # Errors
///
/// Returns an error if the env filter cannot be parsed.
pub fn init(service: bool) -> anyhow::Result<()> {
    let log_level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    if service {
        init_service(env_filter);
    } else {
        init_interactive(env_filter);
    }

    Ok(())
}

/// Initialize service logging with file + stdout output.
fn init_service(env_filter: EnvFilter) {
    let log_dir = log_directory();

    // Ensure log directory exists
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir).ok();
    }

    // Rolling file appender - creates new file daily
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "awaylock");

    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);
    let (non_blocking_stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

    // File layer - JSON format for structured logging
    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Stdout layer - compact, no ANSI colors for launchd/journald
    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_stdout)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    // Store guards to prevent dropping (keeps writers alive)
    let _ = FILE_GUARD.set(file_guard);
    let _ = STDOUT_GUARD.set(stdout_guard);

    tracing::debug!(log_dir = %log_dir.display(), "Service logging initialized");
}

/// Initialize interactive logging to stdout.
fn init_interactive(env_filter: EnvFilter) {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_timer(ClockTime)
        .with_target(false)
        .with_level(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();
}

/// Returns the log directory for the current user.
fn log_directory() -> PathBuf {
    directories::ProjectDirs::from("", "", "awaylock")
        .map_or_else(|| PathBuf::from("./logs"), |dirs| dirs.data_dir().join("logs"))
}
