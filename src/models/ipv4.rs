//! IPv4 CIDR block parsing and arithmetic.
//!
//! Provides [`Ipv4`] for representing a CIDR block (address plus prefix
//! length), along with the few mask helpers the topology checks need.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Addresses AWS reserves in every subnet (network, router, DNS, future, broadcast).
pub const AWS_RESERVED_ADDRESSES: u64 = 5;

/// CIDR parsing and arithmetic errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CidrError {
    #[error("invalid CIDR format: '{0}' (expected a.b.c.d/len)")]
    Format(String),

    #[error("invalid IPv4 address: '{0}'")]
    Address(String),

    #[error("invalid prefix length: '{0}' (must be 0-32)")]
    PrefixLength(String),

    #[error("prefix /{0} leaves no usable host addresses")]
    TooSmall(u8),

    #[error("'{given}' has host bits set (network address is {network})")]
    HostBits { given: String, network: String },
}

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use vpc_topology_builder::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, CidrError> {
    if len > MAX_LENGTH {
        return Err(CidrError::PrefixLength(len.to_string()));
    }
    let right_len = MAX_LENGTH - len;
    let mask = (u32::MAX as u64 >> right_len) << right_len;
    Ok(mask as u32)
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, CidrError> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// Calculate the broadcast address for a given IP and prefix length.
pub fn broadcast_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, CidrError> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from((u32::from(addr) & mask) | !mask))
}

/// Number of usable host addresses in an AWS subnet of the given prefix.
///
/// AWS reserves 5 addresses per subnet, so anything smaller than /28 is
/// rejected by the provider.
pub fn num_aws_hosts(len: u8) -> Result<u64, CidrError> {
    if len > 28 {
        return Err(CidrError::TooSmall(len));
    }
    Ok((1u64 << (MAX_LENGTH - len)) - AWS_RESERVED_ADDRESSES)
}

/// IPv4 address with CIDR prefix length.
#[derive(Eq, Ord, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// Network address of the block.
    pub addr: Ipv4Addr,
    /// The prefix length (0-32).
    pub mask: u8,
}

impl Ipv4 {
    /// Parse a CIDR string such as "10.0.1.0/24".
    ///
    /// The prefix must be plain decimal digits and the address must be the
    /// network address of the block.
    pub fn new(addr_cidr: &str) -> Result<Ipv4, CidrError> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| CidrError::Format(addr_cidr.to_string()))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| CidrError::Address(addr.to_string()))?;
        let digits_ok = matches!(mask.len(), 1 | 2)
            && mask.bytes().all(|b| b.is_ascii_digit())
            && !(mask.len() == 2 && mask.starts_with('0'));
        if !digits_ok {
            return Err(CidrError::PrefixLength(mask.to_string()));
        }
        let len: u8 = mask
            .parse()
            .map_err(|_| CidrError::PrefixLength(mask.to_string()))?;
        if len > MAX_LENGTH {
            return Err(CidrError::PrefixLength(mask.to_string()));
        }
        let network = cut_addr(addr, len)?;
        if network != addr {
            return Err(CidrError::HostBits {
                given: addr_cidr.to_string(),
                network: format!("{network}/{len}"),
            });
        }
        Ok(Ipv4 { addr, mask: len })
    }

    /// The default route, 0.0.0.0/0.
    pub fn any() -> Ipv4 {
        Ipv4 {
            addr: Ipv4Addr::UNSPECIFIED,
            mask: 0,
        }
    }

    /// Get the lowest (network) address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        // mask is bounded by construction
        cut_addr(self.addr, self.mask).unwrap_or(self.addr)
    }

    /// Get the highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        broadcast_addr(self.addr, self.mask).unwrap_or(self.addr)
    }

    /// True when `ip` falls inside this block.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.lo() <= ip && ip <= self.hi()
    }

    /// True when `other` lies entirely inside this block.
    pub fn covers(&self, other: &Ipv4) -> bool {
        self.contains(other.lo()) && self.contains(other.hi())
    }

    /// True when the two blocks share at least one address.
    pub fn overlaps(&self, other: &Ipv4) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }
}

impl FromStr for Ipv4 {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv4::new(s)
    }
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(de::Error::custom)
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

impl PartialEq for Ipv4 {
    fn eq(&self, other: &Ipv4) -> bool {
        self.addr == other.addr && self.mask == other.mask
    }
}

impl PartialOrd for Ipv4 {
    fn partial_cmp(&self, other: &Ipv4) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
