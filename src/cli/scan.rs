//! Scan subcommand implementation.
//!
//! Handles `sentinel scan`: builds scan options from settings and flags,
//! runs the sweep, then saves the record and logs threats.

use crate::cli::OutputFormat;
use crate::config::{dns_timeout, AppSettings};
use crate::error::CliResult;
use crate::output;
use crate::scanner::{LinkSource, LocalLink, NetworkScanner, ScanOptions};
use crate::storage::{ScanRecord, ScanStore, ThreatEntry, ThreatLog};
use chrono::Utc;
use clap::Parser;
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

/// Sweep the local subnet for devices.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Interface to scan from (default: first active interface)
    #[arg(short = 'i', long)]
    pub interface: Option<String>,

    /// Use this address/prefix instead of detecting one (e.g. 192.168.1.50/24)
    #[arg(short = 'a', long, conflicts_with = "interface")]
    pub address: Option<String>,

    /// Connect timeout per probe in milliseconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Maximum number of hosts fingerprinted at once
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Maximum number of hosts to sweep
    #[arg(long)]
    pub host_limit: Option<usize>,

    /// Reverse lookup timeout in milliseconds (0 = wait indefinitely)
    #[arg(long)]
    pub dns_timeout: Option<u64>,

    /// Skip reverse name lookups
    #[arg(long)]
    pub no_dns: bool,

    /// Rate limit in connect attempts per second (0 = unlimited)
    #[arg(short = 'r', long = "rate")]
    pub rate_limit: Option<u32>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Print devices as they are discovered
    #[arg(long)]
    pub live: bool,

    /// Don't save scan results or log threats
    #[arg(long)]
    pub no_save: bool,
}

impl ScanCommand {
    /// Merge settings with command-line overrides.
    pub fn options(&self, settings: &AppSettings, verbose: bool) -> ScanOptions {
        let mut options = settings.scan_options().with_progress(verbose && !self.live);

        if let Some(ms) = self.timeout {
            options = options.with_probe_timeout(Duration::from_millis(ms));
        }
        if let Some(concurrency) = self.concurrency {
            options = options.with_concurrency(concurrency);
        }
        if let Some(limit) = self.host_limit {
            options = options.with_host_limit(limit);
        }
        if let Some(ms) = self.dns_timeout {
            options = options.with_dns_timeout(dns_timeout(ms));
        }
        if self.no_dns {
            options = options.with_name_resolution(false);
        }
        if let Some(rate) = self.rate_limit {
            options = options.with_rate_limit(rate);
        }

        options
    }

    fn link_source(&self, settings: &AppSettings) -> CliResult<LinkSource> {
        if let Some(notation) = &self.address {
            return Ok(LinkSource::Fixed(LocalLink::parse(notation)?));
        }
        Ok(LinkSource::Detect {
            interface: self.interface.clone().or_else(|| settings.interface.clone()),
        })
    }

    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, verbose: bool, quiet: bool) -> CliResult<()> {
        let options = self.options(settings, verbose);
        let link = self.link_source(settings)?;
        let plain = self.output == OutputFormat::Plain;

        if !quiet && plain {
            let fixed = match &link {
                LinkSource::Fixed(link) => Some(link),
                LinkSource::Detect { .. } => None,
            };
            output::print_scan_header(fixed, options.host_limit);
        }

        let scanner = NetworkScanner::new(options).with_link(link);
        let watcher = (self.live && plain && !quiet).then(|| spawn_live_printer(&scanner));

        let started_at = Utc::now();
        let report = scanner.run().await?;

        // Dropping the scanner closes the channel once the printer has
        // caught up with the final snapshot.
        drop(scanner);
        if let Some(handle) = watcher {
            if let Err(e) = handle.await {
                warn!(error = %e, "live printer failed");
            }
        }

        if report.link.is_none() && !quiet {
            output::print_warning("no active IPv4 interface found; nothing was scanned");
        }

        let record = ScanRecord::from_report(report, started_at);

        if !self.no_save {
            self.persist(&record, settings, quiet);
        }

        output::print_results(&record, self.output)?;
        Ok(())
    }

    /// Save the record and log threats. Failures are reported, not fatal.
    fn persist(&self, record: &ScanRecord, settings: &AppSettings, quiet: bool) {
        let show = !quiet && self.output == OutputFormat::Plain;

        if settings.auto_save_scans {
            match ScanStore::new().and_then(|store| store.save(record)) {
                Ok(()) if show => output::print_info(&format!("Scan saved as {}", record.id.short())),
                Ok(()) => {}
                Err(e) => warn!(error = %e, "could not save scan"),
            }
        }

        if settings.log_threats && record.threat_count > 0 {
            let entries = record.threats().map(ThreatEntry::for_device);
            match ThreatLog::new().and_then(|log| log.append(entries)) {
                Ok(n) if show => output::print_warning(&format!("{} potential camera(s) logged", n)),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "could not write threat log"),
            }
        }
    }
}

/// Print each device the first time it shows up in the live set.
fn spawn_live_printer(scanner: &NetworkScanner) -> tokio::task::JoinHandle<()> {
    let mut rx = scanner.subscribe();

    tokio::spawn(async move {
        let mut seen = HashSet::new();
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            for device in snapshot {
                if seen.insert(device.address.clone()) {
                    output::print_live_device(&device);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> ScanCommand {
        let mut argv = vec!["scan"];
        argv.extend_from_slice(args);
        ScanCommand::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = AppSettings {
            concurrency: 10,
            rate_limit: 5,
            ..AppSettings::default()
        };
        let options = command(&["-c", "25", "-t", "300", "--dns-timeout", "0"]).options(&settings, false);

        assert_eq!(options.concurrency, 25);
        assert_eq!(options.probe_timeout, Duration::from_millis(300));
        assert_eq!(options.dns_timeout, None);
        assert_eq!(options.rate_limit, 5);
        assert!(options.resolve_names);
    }

    #[test]
    fn test_settings_used_without_flags() {
        let settings = AppSettings::default();
        let options = command(&["--no-dns"]).options(&settings, true);

        assert_eq!(options.concurrency, 50);
        assert_eq!(options.host_limit, 254);
        assert!(!options.resolve_names);
        assert!(options.progress);
    }

    #[test]
    fn test_link_source() {
        let settings = AppSettings {
            interface: Some("wlan0".to_string()),
            ..AppSettings::default()
        };

        match command(&[]).link_source(&settings).unwrap() {
            LinkSource::Detect { interface } => assert_eq!(interface.as_deref(), Some("wlan0")),
            other => panic!("unexpected source: {:?}", other),
        }

        match command(&["--address", "10.1.1.7/28"]).link_source(&settings).unwrap() {
            LinkSource::Fixed(link) => assert_eq!(link.prefix, 28),
            other => panic!("unexpected source: {:?}", other),
        }

        assert!(command(&["--address", "10.1.1.7/40"]).link_source(&settings).is_err());
    }
}
