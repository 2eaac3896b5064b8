//! IPv4 address and subnet range types.
//!
//! `NetworkAddress` is a plain 32-bit view of an IPv4 address so that range
//! arithmetic never has to go through strings. `SubnetRange` derives the
//! network and broadcast addresses from a base address and prefix length.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Prefix length assumed when the link does not report one.
pub const DEFAULT_PREFIX: u8 = 24;

/// An IPv4 address as a 32-bit unsigned integer (big-endian octet order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkAddress(u32);

impl NetworkAddress {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw integer value.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn octets(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    #[inline]
    pub const fn to_ipv4(self) -> Ipv4Addr {
        let [a, b, c, d] = self.octets();
        Ipv4Addr::new(a, b, c, d)
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

impl From<Ipv4Addr> for NetworkAddress {
    fn from(addr: Ipv4Addr) -> Self {
        Self(u32::from_be_bytes(addr.octets()))
    }
}

impl From<NetworkAddress> for Ipv4Addr {
    fn from(addr: NetworkAddress) -> Self {
        addr.to_ipv4()
    }
}

impl From<[u8; 4]> for NetworkAddress {
    fn from(octets: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(octets))
    }
}

impl FromStr for NetworkAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Ipv4Addr>()
            .map(Self::from)
            .map_err(|_| AddressError::InvalidAddress(s.to_string()))
    }
}

/// Error type for address and range parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),
    #[error("prefix length {0} out of range (0-32)")]
    InvalidPrefix(u8),
    #[error("invalid address/prefix notation: {0}")]
    InvalidCidr(String),
}

/// A subnet derived from a host address and a prefix length.
///
/// The usable host range excludes the network and broadcast addresses and is
/// empty for /31 and /32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetRange {
    network: NetworkAddress,
    broadcast: NetworkAddress,
    prefix: u8,
}

impl SubnetRange {
    /// Compute the range containing `address` for the given prefix length.
    pub fn new(address: impl Into<NetworkAddress>, prefix: u8) -> Result<Self, AddressError> {
        if prefix > 32 {
            return Err(AddressError::InvalidPrefix(prefix));
        }

        let mask = Self::mask_for(prefix);
        let network = address.into().as_u32() & mask;
        let broadcast = network | !mask;

        Ok(Self {
            network: NetworkAddress(network),
            broadcast: NetworkAddress(broadcast),
            prefix,
        })
    }

    /// Parse `A.B.C.D/P`, or a bare address with the default /24 prefix.
    pub fn parse(s: &str) -> Result<(NetworkAddress, Self), AddressError> {
        let s = s.trim();
        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => {
                let prefix: u8 = prefix
                    .trim()
                    .parse()
                    .map_err(|_| AddressError::InvalidCidr(s.to_string()))?;
                (addr, prefix)
            }
            None => (s, DEFAULT_PREFIX),
        };

        let address: NetworkAddress = addr.parse()?;
        Ok((address, Self::new(address, prefix)?))
    }

    #[inline]
    const fn mask_for(prefix: u8) -> u32 {
        if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - prefix as u32)
        }
    }

    pub fn mask(&self) -> u32 {
        Self::mask_for(self.prefix)
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn network(&self) -> NetworkAddress {
        self.network
    }

    pub fn broadcast(&self) -> NetworkAddress {
        self.broadcast
    }

    /// Bounds of the usable host range, or `None` when it is empty.
    fn usable_bounds(&self) -> Option<(u32, u32)> {
        let first = self.network.as_u32() as u64 + 1;
        let last = self.broadcast.as_u32() as i64 - 1;
        if last < first as i64 {
            None
        } else {
            Some((first as u32, last as u32))
        }
    }

    /// Number of usable host addresses.
    pub fn usable_count(&self) -> u64 {
        self.usable_bounds()
            .map_or(0, |(first, last)| (last - first) as u64 + 1)
    }

    /// Whether `address` lies in the usable host range.
    pub fn contains_host(&self, address: NetworkAddress) -> bool {
        self.usable_bounds()
            .is_some_and(|(first, last)| (first..=last).contains(&address.as_u32()))
    }

    /// Iterate the usable host addresses in ascending numeric order.
    pub fn hosts(&self) -> impl Iterator<Item = NetworkAddress> {
        let range = match self.usable_bounds() {
            Some((first, last)) => first..=last,
            #[allow(clippy::reversed_empty_ranges)]
            None => 1..=0,
        };
        range.map(NetworkAddress)
    }
}

impl fmt::Display for SubnetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}
