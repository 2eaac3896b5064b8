//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan records.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{
    print_error, print_history, print_info, print_live_device, print_scan_header,
    print_success, print_threats, print_warning, write_plain,
};

use crate::cli::OutputFormat;
use crate::storage::ScanRecord;
use std::io::{self, Write};

/// Write a scan record in the requested format.
pub fn write_record<W: Write>(out: &mut W, record: &ScanRecord, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => write_plain(out, record),
        OutputFormat::Json => write_json(out, record),
        OutputFormat::Csv => write_csv(out, record),
    }
}

/// Print a scan record to stdout.
pub fn print_results(record: &ScanRecord, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_record(&mut out, record, format)
}
