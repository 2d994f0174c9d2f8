//! # awaylock
//!
//! Locks the computer when a Bluetooth device (your phone, your watch)
//! moves away from it.
//!
//! ## Running
//!
//! ```bash
//! # Find your phone's address
//! awaylock --scan
//!
//! # Watch it and lock when it leaves
//! awaylock --address AA:BB:CC:DD:EE:FF
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::process::ExitCode;

use awaylock_cli::{app, cli::Args, logging};
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    if let Err(e) = logging::init(args.service) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting awaylock");

    match app::run(args).await {
        Ok(()) => {
            info!("Stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let (code, status) = app::failure(&e);
            error!(code, "{e:#}");
            ExitCode::from(status)
        }
    }
}
