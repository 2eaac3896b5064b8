//! Scan result persistence.
//!
//! JSON-based storage for scan records and the threat log.

mod json_store;
mod threat_log;

pub use json_store::{ScanRecord, ScanStore};
pub use threat_log::{RiskLevel, ThreatEntry, ThreatKind, ThreatLog};
