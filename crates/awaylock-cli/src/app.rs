//! Wiring the command line to the core loops.

use std::path::PathBuf;

use anyhow::Context;
use awaylock_core::{
    run_calibration, run_monitor, survey, AwayLockError, CommandLock, Config, StopFlag,
    SURVEY_DURATION,
};
use tracing::info;

use crate::backend;
use crate::cli::{Args, Mode};
use crate::output::{
    format_calibration_summary, format_monitor_summary, format_survey, format_survey_json,
};
use crate::shutdown;

/// Load the configuration, apply command-line overrides and save if asked.
///
/// Returns the effective configuration and the file it belongs to.
///
/// # Errors
///
/// Returns an error if the file cannot be located, parsed or written.
pub fn load_config(args: &Args) -> Result<(Config, PathBuf), AwayLockError> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };

    let mut config = Config::load_from(&path)?;
    config.apply(args.overrides());

    if args.save {
        config.save_to(&path)?;
    }
    Ok((config, path))
}

/// Run the mode selected on the command line until it finishes or is stopped.
///
/// # Errors
///
/// Returns an error for invalid configuration or when the discovery
/// backend cannot be opened. Failures inside a running loop are logged
/// there and never end up here.
pub async fn run(args: Args) -> anyhow::Result<()> {
    let (config, path) = load_config(&args).context("Failed to load configuration")?;
    info!(config = %path.display(), "Using configuration");

    match args.mode() {
        Mode::Survey => {
            let discovery = open_backend().await?;
            let devices = survey(&discovery, SURVEY_DURATION)
                .await
                .map_err(AwayLockError::from)
                .context("Scan failed")?;

            if args.json {
                println!("{}", format_survey_json(&devices)?);
            } else {
                print!("{}", format_survey(&devices));
            }
        }

        Mode::Calibrate => {
            config.validate().map_err(AwayLockError::from)?;
            let discovery = open_backend().await?;
            let stop = StopFlag::new();
            let force = shutdown::install(stop.clone());

            tokio::select! {
                res = run_calibration(&config, &discovery, &stop, |reading| println!("{reading}")) => {
                    let summary = res.map_err(AwayLockError::from)?;
                    println!("{}", format_calibration_summary(&summary));
                }
                Ok(()) = force => {}
            }
        }

        Mode::Monitor => {
            config.validate().map_err(AwayLockError::from)?;
            let lock = CommandLock::from_argv(&config.lock_command).map_err(AwayLockError::from)?;
            info!(program = lock.program(), "Lock action ready");
            let discovery = open_backend().await?;
            let stop = StopFlag::new();
            let force = shutdown::install(stop.clone());

            tokio::select! {
                res = run_monitor(&config, &discovery, &lock, &stop) => {
                    let summary = res.map_err(AwayLockError::from)?;
                    println!("{}", format_monitor_summary(&summary));
                }
                Ok(()) = force => {}
            }
        }
    }

    Ok(())
}

/// Machine-readable code and process exit status for a failed run.
///
/// Errors that did not originate in awaylock report `INTERNAL` and exit 1.
#[must_use]
pub fn failure(err: &anyhow::Error) -> (&'static str, u8) {
    err.downcast_ref::<AwayLockError>().map_or(("INTERNAL", 1), |e| {
        (e.error_code(), u8::try_from(e.exit_code()).unwrap_or(1))
    })
}

async fn open_backend() -> anyhow::Result<backend::Backend> {
    backend::open()
        .await
        .map_err(AwayLockError::from)
        .context("Failed to open Bluetooth")
}
