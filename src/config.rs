//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "tourney-clock")]
#[command(about = "A tournament clock with levels, breaks and a shared persisted record")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the persisted clock and tournament records
    #[arg(short, long, default_value = "./clock-data")]
    pub data_dir: PathBuf,

    /// Seconds between checks for records changed by another surface
    #[arg(short, long, default_value = "1")]
    pub reload_interval: u64,

    /// Display only: never drive the countdown or accept commands
    #[arg(long)]
    pub passive: bool,

    /// Ring the terminal bell on alerts
    #[arg(long)]
    pub bell: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Polling cadence for the store watcher, never below one second
    pub fn reload_every(&self) -> Duration {
        Duration::from_secs(self.reload_interval.max(1))
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
