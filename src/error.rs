//! Error types for Sentinel.
//!
//! Uses `thiserror` for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scanning operations.
///
/// Per-probe variants never leave the fingerprinter; they are turned into
/// classification signals there.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection timed out")]
    Timeout,

    #[error("Connection refused")]
    ConnectionRefused,

    #[error("Connection reset by peer")]
    ConnectionReset,

    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("Host unreachable")]
    HostUnreachable,

    #[error("No active network interface with an IPv4 address")]
    NoActiveInterface,

    #[error("Interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("Invalid prefix length: /{0}")]
    InvalidPrefix(u8),

    #[error("A scan is already in progress")]
    ScanInProgress,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors raised while loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a home directory for configuration")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by the scan and threat stores.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("scan not found: {0}")]
    ScanNotFound(String),

    #[error("ambiguous scan id prefix '{0}': {1} matches")]
    AmbiguousPrefix(String, usize),

    #[error("failed to save: {0}")]
    SaveFailed(String),

    #[error("failed to load: {0}")]
    LoadFailed(String),

    #[error("storage directory error: {0}")]
    DirectoryError(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Top-level error surfaced by CLI subcommands.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Address(#[from] crate::types::AddressError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type CliResult<T> = Result<T, CliError>;
