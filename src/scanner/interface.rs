//! Local link detection.
//!
//! Finds the IPv4 address and prefix length of the active interface, which
//! anchors the subnet sweep.

use crate::error::{ScanError, ScanResult};
use crate::types::{AddressError, SubnetRange};
use ipnetwork::IpNetwork;
use pnet::datalink::{self, NetworkInterface};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use tracing::debug;

/// The scanning host's own address on the local network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalLink {
    /// Interface name, or `"manual"` when given on the command line.
    pub interface: String,
    pub address: Ipv4Addr,
    pub prefix: u8,
}

impl LocalLink {
    pub fn new(interface: impl Into<String>, address: Ipv4Addr, prefix: u8) -> Self {
        Self {
            interface: interface.into(),
            address,
            prefix,
        }
    }

    /// Build a link from `A.B.C.D[/P]` notation.
    pub fn parse(notation: &str) -> Result<Self, AddressError> {
        let (address, range) = SubnetRange::parse(notation)?;
        Ok(Self::new("manual", address.to_ipv4(), range.prefix()))
    }

    pub fn subnet(&self) -> ScanResult<SubnetRange> {
        SubnetRange::new(self.address, self.prefix).map_err(|_| ScanError::InvalidPrefix(self.prefix))
    }
}

impl fmt::Display for LocalLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.address, self.prefix, self.interface)
    }
}

/// Where the orchestrator gets its local link from.
#[derive(Debug, Clone)]
pub enum LinkSource {
    /// Ask the OS, optionally restricted to one interface name.
    Detect { interface: Option<String> },
    /// Use a fixed link.
    Fixed(LocalLink),
}

impl Default for LinkSource {
    fn default() -> Self {
        Self::Detect { interface: None }
    }
}

impl LinkSource {
    /// Resolve the link, failing with `NoActiveInterface` when there is none.
    pub fn resolve(&self) -> ScanResult<LocalLink> {
        match self {
            Self::Fixed(link) => Ok(link.clone()),
            Self::Detect { interface } => detect_local_link(interface.as_deref()),
        }
    }
}

/// Pick the first usable IPv4 address from the OS interface list.
pub fn detect_local_link(preferred: Option<&str>) -> ScanResult<LocalLink> {
    let interfaces = datalink::interfaces();

    if let Some(name) = preferred {
        let iface = interfaces
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| ScanError::InterfaceNotFound(name.to_string()))?;
        return first_ipv4(iface).ok_or(ScanError::NoActiveInterface);
    }

    interfaces
        .iter()
        .filter(|i| !i.is_loopback() && i.is_up())
        .find_map(first_ipv4)
        .ok_or(ScanError::NoActiveInterface)
}

fn first_ipv4(iface: &NetworkInterface) -> Option<LocalLink> {
    iface.ips.iter().find_map(|network| match network {
        IpNetwork::V4(net) if usable_address(net.ip()) => {
            debug!(interface = %iface.name, address = %net.ip(), prefix = net.prefix(), "candidate link");
            Some(LocalLink::new(iface.name.clone(), net.ip(), net.prefix()))
        }
        _ => None,
    })
}

fn usable_address(addr: Ipv4Addr) -> bool {
    !addr.is_loopback() && !addr.is_unspecified()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manual_link() {
        let link = LocalLink::parse("192.168.1.50/24").unwrap();
        assert_eq!(link.address, Ipv4Addr::new(192, 168, 1, 50));
        assert_eq!(link.prefix, 24);
        assert_eq!(link.interface, "manual");
        assert_eq!(link.subnet().unwrap().to_string(), "192.168.1.0/24");
    }

    #[test]
    fn test_parse_default_prefix() {
        let link = LocalLink::parse("10.0.0.9").unwrap();
        assert_eq!(link.prefix, crate::types::DEFAULT_PREFIX);
    }

    #[test]
    fn test_fixed_source() {
        let link = LocalLink::new("eth0", Ipv4Addr::new(10, 0, 0, 2), 24);
        let source = LinkSource::Fixed(link.clone());
        assert_eq!(source.resolve().unwrap(), link);
    }

    #[test]
    fn test_missing_interface() {
        let result = detect_local_link(Some("definitely-not-an-interface0"));
        assert!(matches!(result, Err(ScanError::InterfaceNotFound(_))));
    }

    #[test]
    fn test_usable_address() {
        assert!(!usable_address(Ipv4Addr::LOCALHOST));
        assert!(!usable_address(Ipv4Addr::UNSPECIFIED));
        assert!(usable_address(Ipv4Addr::new(192, 168, 0, 4)));
    }
}
