// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provider and network declarations

use serde::{Deserialize, Serialize};

use super::StackBuilder;
use crate::domain::{availability_zones, Ipv4Cidr, ResourceKind, SubnetGroup, SubnetGroups, SubnetLayout};
use crate::domain::invariants::validate_name;
use crate::errors::ConstructionError;
use crate::plan::{NodeHandle, ResourceNode, Value};

/// Declare the provider binding every stack starts with
pub fn declare_provider(stack: &mut StackBuilder, region: &str, profile: &str) -> Result<NodeHandle, ConstructionError> {
    validate_name("region", region)?;
    validate_name("profile", profile)?;

    stack.add(
        ResourceNode::new("provider", ResourceKind::Provider)
            .with("region", region)
            .with("profile", profile),
    )
}

/// Inputs of a network declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub environment: String,
    pub profile: String,
    pub region: String,
    pub cidr: Ipv4Cidr,
    #[serde(default)]
    pub layout: SubnetLayout,
}

/// A declared network: its node plus the partition it was built with
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkHandle {
    pub node: NodeHandle,
    pub environment: String,
    pub cidr: Ipv4Cidr,
    pub subnets: SubnetGroups,
    pub zones: Vec<String>,
}

impl NetworkHandle {
    pub fn vpc_id(&self) -> Value {
        self.node.value("vpc_id")
    }

    /// Computed subnet ids of one group
    pub fn subnet_ids(&self, group: SubnetGroup) -> Value {
        self.node.value(subnet_output(group))
    }
}

fn subnet_output(group: SubnetGroup) -> &'static str {
    match group {
        SubnetGroup::Public => "public_subnets",
        SubnetGroup::Private => "private_subnets",
        SubnetGroup::Data => "database_subnets",
    }
}

/// Declare the stack's network, partitioning its block into the three
/// subnet groups
pub fn declare_network(stack: &mut StackBuilder, spec: &NetworkSpec) -> Result<NetworkHandle, ConstructionError> {
    validate_name("environment", &spec.environment)?;
    let subnets = spec.layout.partition(&spec.cidr)?;
    let zones = availability_zones(&spec.region, spec.layout.zone_count);

    let cidr_list = |group: SubnetGroup| Value::list(subnets.group(group).iter().map(|c| c.to_string()));

    let node = ResourceNode::new(format!("{}-vpc", spec.environment), ResourceKind::Network)
        .with("name", format!("{}-{}.vpc", spec.environment, spec.profile))
        .with("cidr", spec.cidr.to_string())
        .with("azs", zones.clone())
        .with("public_subnets", cidr_list(SubnetGroup::Public))
        .with("private_subnets", cidr_list(SubnetGroup::Private))
        .with("database_subnets", cidr_list(SubnetGroup::Data));

    let node = stack.add(node)?;

    Ok(NetworkHandle {
        node,
        environment: spec.environment.clone(),
        cidr: spec.cidr,
        subnets,
        zones,
    })
}
