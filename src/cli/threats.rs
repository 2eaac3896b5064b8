//! Threats subcommand implementation.

use crate::error::CliResult;
use crate::output;
use crate::storage::ThreatLog;
use clap::Parser;

/// View or clear the threat log.
#[derive(Parser, Debug)]
pub struct ThreatsCommand {
    /// Remove every logged threat
    #[arg(long)]
    pub clear: bool,

    /// Print entries as JSON
    #[arg(long)]
    pub json: bool,
}

impl ThreatsCommand {
    /// Execute the threats command.
    pub fn execute(&self, quiet: bool) -> CliResult<()> {
        let log = ThreatLog::new()?;

        if self.clear {
            let removed = log.clear()?;
            if !quiet {
                output::print_success(&format!("Cleared {} threat log entries", removed));
            }
            return Ok(());
        }

        let entries = log.list()?;
        if self.json {
            let json = serde_json::to_string_pretty(&entries)
                .map_err(|e| crate::error::CliError::Other(e.to_string()))?;
            println!("{}", json);
        } else {
            output::print_threats(&entries);
        }
        Ok(())
    }
}
