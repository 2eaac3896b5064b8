//! History subcommand implementation.

use crate::error::CliResult;
use crate::output;
use crate::storage::ScanStore;
use clap::Parser;

/// View and manage saved scans.
#[derive(Parser, Debug)]
pub struct HistoryCommand {
    /// Number of recent scans to show
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Delete all saved scans
    #[arg(long, conflicts_with = "prune")]
    pub clear: bool,

    /// Delete scans older than N days
    #[arg(long, value_name = "DAYS")]
    pub prune: Option<u32>,
}

impl HistoryCommand {
    /// Execute the history command.
    pub fn execute(&self, quiet: bool) -> CliResult<()> {
        let store = ScanStore::new()?;

        if self.clear {
            let removed = store.clear()?;
            if !quiet {
                output::print_success(&format!("Removed {} saved scan(s)", removed));
            }
            return Ok(());
        }

        if let Some(days) = self.prune {
            let removed = store.prune(chrono::Duration::days(i64::from(days)))?;
            if !quiet {
                output::print_success(&format!(
                    "Removed {} scan(s) older than {} day(s)",
                    removed, days
                ));
            }
            return Ok(());
        }

        output::print_history(&store.list_recent(self.count)?);
        Ok(())
    }
}
