//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::scanner::LocalLink;
use crate::storage::{ScanRecord, ThreatEntry};
use crate::types::{DeviceCategory, ScannedDevice};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

fn category_style(device: &ScannedDevice) -> Style {
    if device.is_threat {
        return Style::new().red().bold();
    }
    match device.category {
        DeviceCategory::SelfDevice => Style::new().cyan(),
        DeviceCategory::GenericDevice => Style::new().dim(),
        _ => Style::new().green(),
    }
}

/// Write a scan record in human-readable plain text.
pub fn write_plain<W: Write>(out: &mut W, record: &ScanRecord) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                  {} Network Scan Results",
        style("Sentinel").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {}",
        style("Subnet:").bold(),
        record.subnet.as_deref().unwrap_or("-")
    )?;
    writeln!(
        out,
        "  {} {} ({})",
        style("Local:").bold(),
        record.local_address.as_deref().unwrap_or("-"),
        record.interface.as_deref().unwrap_or("no interface")
    )?;
    writeln!(
        out,
        "  {} {}",
        style("Scan ID:").bold(),
        style(record.id.short()).dim()
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {} hosts probed in {:.2}s",
        style("Statistics:").bold(),
        record.hosts_scanned,
        record.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "               {} devices, {} potential cameras",
        style(record.devices.len()).green().bold(),
        style(record.threat_count).red().bold()
    )?;
    writeln!(out)?;

    if record.devices.is_empty() {
        writeln!(out, "  {}", style("No devices found.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<16} {:<22} {:<20} {}",
            style("ADDRESS").bold(),
            style("CATEGORY").bold(),
            style("NAME").bold(),
            style("PORTS").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for device in &record.devices {
            let ports = device
                .open_ports
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let marker = if device.is_threat { " !" } else { "" };

            writeln!(
                out,
                "  {:<16} {:<22} {:<20} {}",
                device.address,
                category_style(device).apply_to(format!("{}{}", device.category, marker)),
                truncate_string(device.resolved_name.as_deref().unwrap_or(""), 20),
                style(ports).dim()
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(link: Option<&LocalLink>, hosts_hint: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("Sentinel").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    match link {
        Some(link) => println!(
            "{} Local link: {}",
            style("•").dim(),
            style(link).white().bold()
        ),
        None => println!("{} Local link: {}", style("•").dim(), style("auto-detect").yellow()),
    }
    println!(
        "{} Sweeping up to {} hosts...",
        style("•").dim(),
        style(hosts_hint).white().bold()
    );
    println!();
}

/// Print one device as soon as it is discovered.
pub fn print_live_device(device: &ScannedDevice) {
    let name = device
        .resolved_name
        .as_deref()
        .map(|n| format!(" ({})", n))
        .unwrap_or_default();
    println!(
        "  {} {}{} {}",
        style("+").green().bold(),
        style(&device.address).bold(),
        name,
        category_style(device).apply_to(device.category)
    );
}

/// Print a history listing.
pub fn print_history(records: &[ScanRecord]) {
    if records.is_empty() {
        println!("{}", style("No saved scans.").dim());
        return;
    }

    println!(
        "  {:<10} {:<20} {}",
        style("ID").bold(),
        style("STARTED").bold(),
        style("SUMMARY").bold()
    );
    for record in records {
        println!(
            "  {:<10} {:<20} {}",
            style(record.id.short()).dim(),
            record.started_at.format("%Y-%m-%d %H:%M:%S"),
            record.summary()
        );
    }
}

/// Print the threat log.
pub fn print_threats(entries: &[ThreatEntry]) {
    if entries.is_empty() {
        println!("{}", style("Threat log is empty.").dim());
        return;
    }

    for entry in entries {
        println!(
            "  {}  {:<8} {:<7} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.kind,
            style(entry.risk).yellow().bold(),
            entry.value
        );
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
