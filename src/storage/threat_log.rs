//! Threat log.
//!
//! A single JSON file of threat entries. Scans append one entry per device
//! that carries a streaming signature.

use crate::config::Paths;
use crate::error::{StorageError, StorageResult};
use crate::types::{ScanId, ScannedDevice};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Source of a threat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatKind {
    Network,
}

/// Severity of a threat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

impl fmt::Display for ThreatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "NETWORK"),
        }
    }
}

/// One logged threat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatEntry {
    pub id: ScanId,
    pub kind: ThreatKind,
    pub value: String,
    pub risk: RiskLevel,
    pub timestamp: DateTime<Utc>,
    /// Address of the device that triggered the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ThreatEntry {
    /// Entry for a device flagged during a network scan.
    pub fn for_device(device: &ScannedDevice) -> Self {
        Self {
            id: ScanId::new(),
            kind: ThreatKind::Network,
            value: format!("Found {}", device.display_name()),
            risk: RiskLevel::Medium,
            timestamp: Utc::now(),
            address: Some(device.address.clone()),
        }
    }
}

/// JSON-file backed threat log.
pub struct ThreatLog {
    path: PathBuf,
}

impl ThreatLog {
    /// Open the log in the default data directory.
    pub fn new() -> StorageResult<Self> {
        Ok(Self::open(Paths::get()?.threat_log_file()))
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> StorageResult<Vec<ThreatEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| StorageError::LoadFailed(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| StorageError::LoadFailed(e.to_string()))
    }

    fn write(&self, entries: &[ThreatEntry]) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }

    /// Append entries; returns how many were written.
    pub fn append(&self, new: impl IntoIterator<Item = ThreatEntry>) -> StorageResult<usize> {
        let mut entries = self.read()?;
        let before = entries.len();
        entries.extend(new);
        let added = entries.len() - before;
        if added > 0 {
            self.write(&entries)?;
        }
        Ok(added)
    }

    /// All entries, newest first.
    pub fn list(&self) -> StorageResult<Vec<ThreatEntry>> {
        let mut entries = self.read()?;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    /// Remove every entry; returns how many were removed.
    pub fn clear(&self) -> StorageResult<usize> {
        let count = self.read()?.len();
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| StorageError::SaveFailed(e.to_string()))?;
        }
        Ok(count)
    }
}
