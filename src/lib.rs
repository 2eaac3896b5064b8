//! # Sentinel - Local Network Device Discovery
//!
//! Sentinel sweeps the subnet of the active network interface, probes each
//! host on a handful of signature ports and classifies what it finds. Hosts
//! exposing video-streaming ports are flagged as potential hidden cameras.
//!
//! ## Features
//!
//! - **Subnet sweep**: derives the host range from the local address and prefix
//! - **Fingerprinting**: Windows, Apple and camera/DVR port signatures
//! - **Bounded concurrency**: a fixed pool of in-flight hosts with short connect timeouts
//! - **Live results**: a sorted, deduplicated device set observable during the scan
//! - **History and threat log**: scans and flagged devices persisted as JSON
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use sentinel::scanner::{NetworkScanner, ScanOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let scanner = NetworkScanner::new(ScanOptions::default());
//!     for device in scanner.scan().await.unwrap() {
//!         println!("{} {}", device.address, device.category);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Address arithmetic and device types
//! - [`scanner`] - Prober, fingerprinter, result set and the scan orchestrator
//! - [`config`] - Settings file and XDG paths
//! - [`storage`] - Scan history and threat log
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError};
pub use scanner::{NetworkScanner, ProbeOutcome, Prober, ScanOptions, ScanReport};
pub use types::{DeviceCategory, NetworkAddress, ScanId, ScannedDevice, SubnetRange};
