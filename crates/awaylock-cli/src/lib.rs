//! # awaylock-cli
//!
//! Command-line front end for awaylock.
//!
//! This library provides argument parsing, logging setup, signal handling
//! and output formatting; the binary in `main.rs` only glues them together.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod app;
pub mod backend;
pub mod cli;
pub mod logging;
pub mod output;
pub mod shutdown;
