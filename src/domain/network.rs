// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants
//!
//! Address blocks and the deterministic partition of a stack's block into
//! the public, private and data subnet groups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::errors::ConstructionError;

/// Canonical IPv4 address block in CIDR notation
///
/// Invariants:
/// - Prefix length 0-32
/// - No host bits set (`10.0.0.0/16`, never `10.0.3.7/16`)
///
/// # Examples
///
/// ```rust
/// use cim_topology::domain::Ipv4Cidr;
///
/// let block = Ipv4Cidr::new("10.0.0.0/16").unwrap();
/// let subnet = block.subnet(8, 4).unwrap();
/// assert_eq!(subnet.to_string(), "10.0.4.0/24");
/// assert!(block.contains(&subnet));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Cidr {
    /// `0.0.0.0/0`
    pub const ANY: Ipv4Cidr = Ipv4Cidr {
        network: Ipv4Addr::UNSPECIFIED,
        prefix_len: 0,
    };

    /// Block from parts already known to be canonical
    pub(crate) const fn new_unchecked(network: Ipv4Addr, prefix_len: u8) -> Self {
        Self { network, prefix_len }
    }

    /// Parse an address block, rejecting host bits and bad prefixes
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, ConstructionError> {
        let cidr = cidr.as_ref();
        let invalid = || ConstructionError::InvalidCidr(cidr.to_string());

        let (addr_str, prefix_str) = cidr.split_once('/').ok_or_else(invalid)?;
        let address = Ipv4Addr::from_str(addr_str).map_err(|_| invalid())?;
        let prefix_len = prefix_str.parse::<u8>().map_err(|_| invalid())?;

        Self::from_parts(address, prefix_len).map_err(|_| invalid())
    }

    /// Create from a network address and prefix length
    pub fn from_parts(network: Ipv4Addr, prefix_len: u8) -> Result<Self, ConstructionError> {
        if prefix_len > 32 {
            return Err(ConstructionError::InvalidCidr(format!("{}/{}", network, prefix_len)));
        }

        let bits = u32::from(network);
        if bits & !mask(prefix_len) != 0 {
            return Err(ConstructionError::InvalidCidr(format!(
                "{}/{} has host bits set",
                network, prefix_len
            )));
        }

        Ok(Self {
            network,
            prefix_len,
        })
    }

    /// Network address
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    /// Prefix length
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// First address of the block as an integer
    pub fn first(&self) -> u32 {
        u32::from(self.network)
    }

    /// Last address of the block as an integer
    pub fn last(&self) -> u32 {
        self.first() | !mask(self.prefix_len)
    }

    /// Whether `other` lies entirely inside this block
    pub fn contains(&self, other: &Ipv4Cidr) -> bool {
        other.prefix_len >= self.prefix_len && other.first() & mask(self.prefix_len) == self.first()
    }

    /// Whether the two blocks share any address
    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        self.first() <= other.last() && other.first() <= self.last()
    }

    /// Carve sub-block `netnum` out of this block by extending the prefix by `newbits`
    ///
    /// Same semantics as Terraform's `cidrsubnet(block, newbits, netnum)`.
    pub fn subnet(&self, newbits: u8, netnum: u32) -> Result<Ipv4Cidr, ConstructionError> {
        let new_prefix = self.prefix_len as u32 + newbits as u32;
        if new_prefix > 32 {
            return Err(ConstructionError::SubnetLayout {
                cidr: self.to_string(),
                reason: format!("extending /{} by {} bits exceeds /32", self.prefix_len, newbits),
            });
        }

        if (netnum as u64) >= (1u64 << newbits) {
            return Err(ConstructionError::SubnetLayout {
                cidr: self.to_string(),
                reason: format!("network number {} does not fit in {} bits", netnum, newbits),
            });
        }

        let offset = (netnum as u64) << (32 - new_prefix);
        let address = (self.first() as u64 | offset) as u32;

        Self::from_parts(Ipv4Addr::from(address), new_prefix as u8)
    }
}

fn mask(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        p => u32::MAX << (32 - p as u32),
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Ipv4Cidr {
    type Error = ConstructionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ipv4Cidr> for String {
    fn from(cidr: Ipv4Cidr) -> Self {
        cidr.to_string()
    }
}

/// The three subnet groups every stack network carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetGroup {
    /// Internet-facing subnets (load balancers)
    Public,
    /// Application subnets (services)
    Private,
    /// Data subnets (databases)
    Data,
}

impl SubnetGroup {
    /// Groups in partition order
    pub const ALL: [SubnetGroup; 3] = [SubnetGroup::Public, SubnetGroup::Private, SubnetGroup::Data];

    fn index(&self) -> u32 {
        match self {
            SubnetGroup::Public => 0,
            SubnetGroup::Private => 1,
            SubnetGroup::Data => 2,
        }
    }
}

impl fmt::Display for SubnetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetGroup::Public => write!(f, "public"),
            SubnetGroup::Private => write!(f, "private"),
            SubnetGroup::Data => write!(f, "data"),
        }
    }
}

/// How an address block is partitioned into subnet groups
///
/// Subnet `zone` of group `g` is sub-block `g * group_stride + zone` of the
/// block extended by `newbits`. With the defaults a `/16` yields
/// public `x.x.0-2.0/24`, private `x.x.4-6.0/24`, data `x.x.8-10.0/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetLayout {
    /// Bits added to the block prefix for each subnet
    pub newbits: u8,
    /// Distance in network numbers between the first subnets of adjacent groups
    pub group_stride: u32,
    /// Subnets per group, one per availability zone
    pub zone_count: u32,
}

impl Default for SubnetLayout {
    fn default() -> Self {
        Self {
            newbits: 8,
            group_stride: 4,
            zone_count: 3,
        }
    }
}

impl SubnetLayout {
    /// One availability zone per letter suffix, `a` through `z`
    pub const MAX_ZONES: u32 = 26;

    /// Partition `block` into the three subnet groups
    ///
    /// # Invariants
    /// - Groups never overlap each other
    /// - Every subnet lies inside `block`
    /// - Each group has exactly `zone_count` subnets
    pub fn partition(&self, block: &Ipv4Cidr) -> Result<SubnetGroups, ConstructionError> {
        let reject = |reason: String| ConstructionError::SubnetLayout {
            cidr: block.to_string(),
            reason,
        };

        if self.zone_count == 0 {
            return Err(reject("zone count must be at least 1".into()));
        }
        if self.zone_count > Self::MAX_ZONES {
            return Err(reject(format!(
                "zone count {} exceeds the {} zone suffixes a-z",
                self.zone_count,
                Self::MAX_ZONES
            )));
        }
        if self.zone_count > self.group_stride {
            return Err(reject(format!(
                "zone count {} exceeds group stride {}",
                self.zone_count, self.group_stride
            )));
        }
        let needed = self.group_stride as u64 * SubnetGroup::ALL.len() as u64;
        if self.newbits >= 32 || needed > (1u64 << self.newbits) {
            return Err(reject(format!(
                "{} network numbers do not fit in {} bits",
                needed, self.newbits
            )));
        }

        let group = |g: SubnetGroup| -> Result<Vec<Ipv4Cidr>, ConstructionError> {
            (0..self.zone_count)
                .map(|zone| block.subnet(self.newbits, g.index() * self.group_stride + zone))
                .collect()
        };

        Ok(SubnetGroups {
            public: group(SubnetGroup::Public)?,
            private: group(SubnetGroup::Private)?,
            data: group(SubnetGroup::Data)?,
        })
    }
}

/// Result of partitioning a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetGroups {
    pub public: Vec<Ipv4Cidr>,
    pub private: Vec<Ipv4Cidr>,
    pub data: Vec<Ipv4Cidr>,
}

impl SubnetGroups {
    /// Subnets of one group
    pub fn group(&self, group: SubnetGroup) -> &[Ipv4Cidr] {
        match group {
            SubnetGroup::Public => &self.public,
            SubnetGroup::Private => &self.private,
            SubnetGroup::Data => &self.data,
        }
    }

    /// Every subnet, public first
    pub fn all(&self) -> impl Iterator<Item = &Ipv4Cidr> {
        self.public.iter().chain(&self.private).chain(&self.data)
    }
}

/// Availability zone names for a region: `{region}a`, `{region}b`, ...
pub fn availability_zones(region: &str, count: u32) -> Vec<String> {
    (b'a'..=b'z')
        .take(count as usize)
        .map(|suffix| format!("{}{}", region, suffix as char))
        .collect()
}
