//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data, and the JSON
//! settings file that supplies scan defaults.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::{ScanOptions, DEFAULT_CONCURRENCY, DEFAULT_HOST_LIMIT};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Global paths singleton.
static PATHS: OnceLock<Paths> = OnceLock::new();

/// Application directory paths under the XDG base directories.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/sentinel)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/sentinel)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Get the global paths instance, creating the directories on first use.
    pub fn get() -> ConfigResult<&'static Paths> {
        if let Some(paths) = PATHS.get() {
            return Ok(paths);
        }
        let paths = Self::new()?;
        Ok(PATHS.get_or_init(|| paths))
    }

    fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "sentinel", "sentinel")
            .ok_or(ConfigError::DirectoryNotFound)?;

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        };

        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.data_dir)?;

        Ok(paths)
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the scans storage directory.
    pub fn scans_dir(&self) -> PathBuf {
        self.data_dir.join("scans")
    }

    /// Get the path to the threat log.
    pub fn threat_log_file(&self) -> PathBuf {
        self.data_dir.join("threats.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Connect timeout per probe in milliseconds.
    pub probe_timeout_ms: u64,
    /// Maximum hosts fingerprinted at once.
    pub concurrency: usize,
    /// Maximum hosts enumerated per scan.
    pub host_limit: usize,
    /// Reverse lookup bound in milliseconds, 0 for none.
    pub dns_timeout_ms: u64,
    /// Look up host names for responding devices.
    pub resolve_names: bool,
    /// Maximum connect attempts per second, 0 for unlimited.
    pub rate_limit: u32,
    /// Save every scan to the history store.
    pub auto_save_scans: bool,
    /// Append threat devices to the threat log after each scan.
    pub log_threats: bool,
    /// Interface to scan from when none is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 150,
            concurrency: DEFAULT_CONCURRENCY,
            host_limit: DEFAULT_HOST_LIMIT,
            dns_timeout_ms: 2000,
            resolve_names: true,
            rate_limit: 0,
            auto_save_scans: true,
            log_threats: true,
            interface: None,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if absent.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::get()?.settings_file();
        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Scan options seeded from these settings.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::default()
            .with_probe_timeout(Duration::from_millis(self.probe_timeout_ms))
            .with_concurrency(self.concurrency)
            .with_host_limit(self.host_limit)
            .with_dns_timeout(dns_timeout(self.dns_timeout_ms))
            .with_name_resolution(self.resolve_names)
            .with_rate_limit(self.rate_limit)
    }
}

/// Convert a millisecond setting into an optional bound; 0 disables it.
pub fn dns_timeout(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        let options = settings.scan_options();
        assert_eq!(options.probe_timeout, Duration::from_millis(150));
        assert_eq!(options.concurrency, 50);
        assert_eq!(options.host_limit, 254);
        assert_eq!(options.dns_timeout, Some(Duration::from_millis(2000)));
    }

    #[test]
    fn test_zero_dns_timeout_is_unbounded() {
        assert_eq!(dns_timeout(0), None);
        let settings = AppSettings {
            dns_timeout_ms: 0,
            ..AppSettings::default()
        };
        assert_eq!(settings.scan_options().dns_timeout, None);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "concurrency": 10, "interface": "wlan0" }"#).unwrap();

        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(settings.concurrency, 10);
        assert_eq!(settings.interface.as_deref(), Some("wlan0"));
        assert_eq!(settings.probe_timeout_ms, 150);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = AppSettings {
            rate_limit: 200,
            ..AppSettings::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            AppSettings::load_from(&path),
            Err(ConfigError::InvalidFormat(_))
        ));
    }
}
