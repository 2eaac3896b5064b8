//! Core type definitions using newtype patterns for type safety.
//!
//! These types keep address arithmetic and device identity out of raw
//! integers and strings.

mod address;
mod device;
mod scan_id;

pub use address::{AddressError, NetworkAddress, SubnetRange, DEFAULT_PREFIX};
pub use device::{DeviceCategory, ScannedDevice};
pub use scan_id::{ScanId, ScanIdError};
