//! Configuration management for Sentinel.
//!
//! Provides XDG-compliant configuration storage and the settings file that
//! seeds scan defaults.

mod settings;

pub use settings::{dns_timeout, AppSettings, Paths};
