//! JSON-based scan record storage.
//!
//! Stores each scan as a separate JSON file for simplicity and durability.
//! Supports listing, prefix lookup, deletion and pruning.

use crate::config::Paths;
use crate::error::{StorageError, StorageResult};
use crate::scanner::ScanReport;
use crate::types::{ScanId, ScannedDevice};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A persisted scan record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Unique identifier for this scan.
    pub id: ScanId,
    /// When the scan was started.
    pub started_at: DateTime<Utc>,
    /// When the scan completed.
    pub completed_at: DateTime<Utc>,
    /// Interface the scan ran from, if one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    /// Scanning host's own address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_address: Option<String>,
    /// Subnet in `network/prefix` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    /// Hosts probed, excluding the scanning host.
    pub hosts_scanned: usize,
    /// Devices flagged as potential cameras.
    pub threat_count: usize,
    /// Total scan duration in milliseconds.
    pub duration_ms: u64,
    /// Discovered devices, sorted by address.
    pub devices: Vec<ScannedDevice>,
}

impl ScanRecord {
    /// Build a record from a finished scan that started at `started_at`.
    pub fn from_report(report: ScanReport, started_at: DateTime<Utc>) -> Self {
        let threat_count = report.threats().count();
        let (interface, local_address) = match report.link {
            Some(link) => (Some(link.interface), Some(link.address.to_string())),
            None => (None, None),
        };

        Self {
            id: ScanId::new(),
            started_at,
            completed_at: Utc::now(),
            interface,
            local_address,
            subnet: report.subnet,
            hosts_scanned: report.hosts_scanned,
            threat_count,
            duration_ms: report.duration_ms,
            devices: report.devices,
        }
    }

    pub fn threats(&self) -> impl Iterator<Item = &ScannedDevice> {
        self.devices.iter().filter(|d| d.is_threat)
    }

    /// Get a short summary of the scan.
    pub fn summary(&self) -> String {
        format!(
            "{} - {} devices, {} threats, {} hosts probed [{:.2}s]",
            self.subnet.as_deref().unwrap_or("no network"),
            self.devices.len(),
            self.threat_count,
            self.hosts_scanned,
            self.duration_ms as f64 / 1000.0
        )
    }
}

/// JSON file-based scan storage.
pub struct ScanStore {
    scans_dir: PathBuf,
}

impl ScanStore {
    /// Open the store in the default data directory.
    pub fn new() -> StorageResult<Self> {
        Self::open(Paths::get()?.scans_dir())
    }

    /// Open a store rooted at `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let scans_dir = dir.into();
        fs::create_dir_all(&scans_dir)
            .map_err(|e| StorageError::DirectoryError(e.to_string()))?;

        Ok(Self { scans_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.scans_dir
    }

    /// Save a scan record.
    pub fn save(&self, record: &ScanRecord) -> StorageResult<()> {
        let file = self.scan_file(&record.id);
        let content = serde_json::to_string_pretty(record)?;

        fs::write(&file, content).map_err(|e| StorageError::SaveFailed(e.to_string()))?;
        debug!(id = %record.id, path = %file.display(), "scan saved");
        Ok(())
    }

    /// Load a scan record by ID.
    pub fn load(&self, id: &ScanId) -> StorageResult<ScanRecord> {
        let file = self.scan_file(id);

        if !file.exists() {
            return Err(StorageError::ScanNotFound(id.to_string()));
        }

        let content =
            fs::read_to_string(&file).map_err(|e| StorageError::LoadFailed(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| StorageError::LoadFailed(e.to_string()))
    }

    /// Find a scan by full ID or unique prefix.
    pub fn find(&self, id_or_prefix: &str) -> StorageResult<ScanRecord> {
        if let Ok(id) = id_or_prefix.parse::<ScanId>() {
            return self.load(&id);
        }

        let matches: Vec<_> = self
            .list_ids()?
            .into_iter()
            .filter(|id| id.matches_prefix(id_or_prefix))
            .collect();

        match matches.as_slice() {
            [] => Err(StorageError::ScanNotFound(id_or_prefix.to_string())),
            [id] => self.load(id),
            _ => Err(StorageError::AmbiguousPrefix(
                id_or_prefix.to_string(),
                matches.len(),
            )),
        }
    }

    /// List all scan IDs.
    pub fn list_ids(&self) -> StorageResult<Vec<ScanId>> {
        let mut ids = Vec::new();

        for entry in
            fs::read_dir(&self.scans_dir).map_err(|e| StorageError::DirectoryError(e.to_string()))?
        {
            let entry = entry.map_err(|e| StorageError::DirectoryError(e.to_string()))?;
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    if let Ok(id) = stem.to_string_lossy().parse::<ScanId>() {
                        ids.push(id);
                    }
                }
            }
        }

        Ok(ids)
    }

    /// List all scan records, most recent first. Unreadable files are skipped.
    pub fn list(&self) -> StorageResult<Vec<ScanRecord>> {
        let mut records = Vec::new();

        for id in self.list_ids()? {
            match self.load(&id) {
                Ok(record) => records.push(record),
                Err(e) => warn!(%id, error = %e, "skipping unreadable scan record"),
            }
        }

        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(records)
    }

    /// List recent scans (last n).
    pub fn list_recent(&self, count: usize) -> StorageResult<Vec<ScanRecord>> {
        let mut records = self.list()?;
        records.truncate(count);
        Ok(records)
    }

    /// Delete a scan record.
    pub fn delete(&self, id: &ScanId) -> StorageResult<()> {
        let file = self.scan_file(id);

        if !file.exists() {
            return Err(StorageError::ScanNotFound(id.to_string()));
        }

        fs::remove_file(&file).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }

    /// Delete scans that started more than `max_age` ago.
    ///
    /// An age reaching past the representable date range matches nothing.
    pub fn prune(&self, max_age: Duration) -> StorageResult<usize> {
        let Some(cutoff) = Utc::now().checked_sub_signed(max_age) else {
            debug!(days = max_age.num_days(), "prune age out of range, nothing to delete");
            return Ok(0);
        };
        let mut deleted = 0;

        for record in self.list()? {
            if record.started_at < cutoff {
                self.delete(&record.id)?;
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    /// Delete every stored scan.
    pub fn clear(&self) -> StorageResult<usize> {
        let ids = self.list_ids()?;
        for id in &ids {
            self.delete(id)?;
        }
        Ok(ids.len())
    }

    fn scan_file(&self, id: &ScanId) -> PathBuf {
        self.scans_dir.join(format!("{}.json", id))
    }
}
