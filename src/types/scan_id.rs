//! Identifiers for persisted records.
//!
//! `ScanId` names a stored scan record or threat log entry. Users usually
//! refer to records by the first few characters, so prefix matching lives
//! here too.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of the abbreviated form shown in listings.
const SHORT_LEN: usize = 8;

/// A random (UUID v4) record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(Uuid);

impl ScanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex characters, as shown in `history`.
    pub fn short(&self) -> String {
        let mut s = self.0.simple().to_string();
        s.truncate(SHORT_LEN);
        s
    }

    /// Whether the hyphenated form starts with `prefix` (case-insensitive).
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        !prefix.is_empty() && self.0.to_string().starts_with(&prefix.to_ascii_lowercase())
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScanId {
    type Err = ScanIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 32 {
            return Err(ScanIdError::Abbreviated(s.to_string()));
        }

        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ScanIdError::InvalidFormat(s.to_string()))
    }
}

/// Error type for ScanId parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScanIdError {
    #[error("invalid scan ID format: {0}")]
    InvalidFormat(String),
    #[error("'{0}' is an abbreviated ID; look it up by prefix instead")]
    Abbreviated(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form() {
        let id = ScanId::new();
        let short = id.short();
        assert_eq!(short.len(), SHORT_LEN);
        assert!(id.to_string().starts_with(&short));
        assert!(id.matches_prefix(&short));
        assert!(id.matches_prefix(&short.to_uppercase()));
        assert!(!id.matches_prefix(""));
    }

    #[test]
    fn test_parse_full_id() {
        let id = ScanId::new();
        let parsed: ScanId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_abbreviated_id() {
        let id = ScanId::new();
        assert!(matches!(
            id.short().parse::<ScanId>(),
            Err(ScanIdError::Abbreviated(_))
        ));
        assert!(matches!(
            "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz".parse::<ScanId>(),
            Err(ScanIdError::InvalidFormat(_))
        ));
    }
}
