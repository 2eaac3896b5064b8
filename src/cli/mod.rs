//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `sentinel scan` - Sweep the local subnet
//! - `sentinel history` - View or prune saved scans
//! - `sentinel export <scan-id>` - Export a saved scan
//! - `sentinel threats` - View or clear the threat log

mod export;
mod history;
mod scan;
mod threats;

pub use export::ExportCommand;
pub use history::HistoryCommand;
pub use scan::ScanCommand;
pub use threats::ThreatsCommand;

use crate::config::AppSettings;
use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sentinel - local network device discovery.
///
/// Sweeps the subnet of the active interface, fingerprints responding hosts
/// by their open ports and flags devices that look like IP cameras.
#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find and fingerprint devices on the local network", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom settings file
    #[arg(long, global = true, value_name = "PATH", env = "SENTINEL_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Settings from `--config`, else the default location.
    pub fn settings(&self) -> CliResult<AppSettings> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };
        Ok(settings)
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep the local subnet for devices
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// View saved scans
    #[command(alias = "h")]
    History(HistoryCommand),

    /// Export a saved scan
    #[command(alias = "e")]
    Export(ExportCommand),

    /// View the threat log
    #[command(alias = "t")]
    Threats(ThreatsCommand),
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_flags() {
        let cli = Cli::try_parse_from([
            "sentinel", "scan", "--address", "192.168.1.50/24", "-c", "20", "--no-dns", "-o", "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Scan(cmd) => {
                assert_eq!(cmd.address.as_deref(), Some("192.168.1.50/24"));
                assert_eq!(cmd.concurrency, Some(20));
                assert!(cmd.no_dns);
                assert_eq!(cmd.output, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_address_conflicts_with_interface() {
        let result = Cli::try_parse_from([
            "sentinel", "scan", "--address", "10.0.0.1/24", "--interface", "eth0",
        ]);
        assert!(result.is_err());
    }
}
