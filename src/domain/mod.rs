// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Domain Models
//!
//! Value objects shared by every stack: address blocks and their subnet
//! partition, the resource kind taxonomy, and the pure validation functions
//! declarations must pass.
//!
//! # Value Objects with Invariants
//!
//! - [`Ipv4Cidr`] - canonical IPv4 address block
//! - [`SubnetLayout`] / [`SubnetGroups`] - deterministic public/private/data partition
//! - [`ResourceKind`] - resource declaration taxonomy

pub mod invariants;
pub mod network;
pub mod resource_type;

pub use invariants::{contains_placeholder, ValidationResult};
pub use network::{availability_zones, Ipv4Cidr, SubnetGroup, SubnetGroups, SubnetLayout};
pub use resource_type::{ResourceCategory, ResourceKind};
