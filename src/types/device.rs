//! Discovered device types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device class inferred from which signature ports answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    /// MSRPC / SMB signature (135, 445).
    WindowsWorkstation,
    /// iOS device sync signature (62078).
    AppleDevice,
    /// RTSP / RTMP / HTTP-alt streaming signature (554, 1935, 8080).
    IpCameraDvr,
    /// The scanning host itself.
    SelfDevice,
    /// Responded, but matched no signature.
    GenericDevice,
}

impl DeviceCategory {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::WindowsWorkstation => "Windows workstation",
            Self::AppleDevice => "Apple device",
            Self::IpCameraDvr => "IP camera / DVR",
            Self::SelfDevice => "This device",
            Self::GenericDevice => "Generic device",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A host that answered at least one probe.
///
/// `address` is the identity key within a scan session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedDevice {
    /// Dotted-quad address of the host.
    pub address: String,
    /// Reverse-DNS name, if one exists and differs from the address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_name: Option<String>,
    pub category: DeviceCategory,
    /// Set when a streaming signature port was open.
    pub is_threat: bool,
    /// Ports that accepted a connection, in probe order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub open_ports: Vec<u16>,
}

impl ScannedDevice {
    pub fn new(address: impl Into<String>, category: DeviceCategory, is_threat: bool) -> Self {
        Self {
            address: address.into(),
            resolved_name: None,
            category,
            is_threat,
            open_ports: Vec::new(),
        }
    }

    /// Set the resolved name.
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.resolved_name = name;
        self
    }

    /// Set the open ports.
    pub fn with_open_ports(mut self, ports: Vec<u16>) -> Self {
        self.open_ports = ports;
        self
    }

    /// Name to show for this device: the resolved name, else the category.
    pub fn display_name(&self) -> String {
        self.resolved_name
            .clone()
            .unwrap_or_else(|| self.category.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_category() {
        let device = ScannedDevice::new("192.168.1.10", DeviceCategory::IpCameraDvr, true);
        assert_eq!(device.display_name(), "IP camera / DVR");

        let named = device.with_name(Some("cam.lan".to_string()));
        assert_eq!(named.display_name(), "cam.lan");
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&DeviceCategory::IpCameraDvr).unwrap();
        assert_eq!(json, "\"ip_camera_dvr\"");
    }
}
