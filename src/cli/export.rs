//! Export subcommand implementation.
//!
//! Handles the `sentinel export <scan-id>` command for exporting scan results.

use crate::cli::OutputFormat;
use crate::error::CliResult;
use crate::output;
use crate::storage::{ScanRecord, ScanStore};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Export scan results.
#[derive(Parser, Debug)]
pub struct ExportCommand {
    /// Scan ID or prefix to export
    ///
    /// Can be a full UUID or the first few characters (short ID).
    #[arg(value_name = "SCAN_ID")]
    pub scan_id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Output file path (prints to stdout if not specified)
    #[arg(short = 'o', long = "output")]
    pub output_file: Option<PathBuf>,

    /// Export only devices flagged as threats
    #[arg(long)]
    pub threats_only: bool,
}

impl ExportCommand {
    /// Execute the export command.
    pub fn execute(&self, quiet: bool) -> CliResult<()> {
        let store = ScanStore::new()?;
        let record = self.prepare(store.find(&self.scan_id)?);

        match &self.output_file {
            Some(path) => {
                console::set_colors_enabled(false);
                let mut out = BufWriter::new(File::create(path)?);
                output::write_record(&mut out, &record, self.format)?;
                out.flush()?;

                if !quiet {
                    output::print_success(&format!(
                        "Exported scan {} to {}",
                        record.id.short(),
                        path.display()
                    ));
                }
            }
            None => {
                let stdout = io::stdout();
                output::write_record(&mut stdout.lock(), &record, self.format)?;
            }
        }

        Ok(())
    }

    fn prepare(&self, mut record: ScanRecord) -> ScanRecord {
        if self.threats_only {
            record.devices.retain(|d| d.is_threat);
        }
        record
    }
}
