// Copyright (c) 2025 - Cowboy AI, Inc.
//! Foundation stack
//!
//! One per environment: provider, network, tier chain, the shared cluster,
//! a state table and the environment-wide parameters.

use tracing::info;

use super::network::{declare_network, declare_provider, NetworkSpec};
use super::{StackBuilder, StackInput, StackSpec};
use crate::compute::{create_cluster, CapacityMode};
use crate::config::FoundationConfig;
use crate::domain::{ResourceKind, SubnetGroup, SubnetLayout};
use crate::errors::TopologyResult;
use crate::parameters::{keys, ParameterType};
use crate::plan::{ResourceNode, Value};
use crate::security::build_tier_chain;

pub const VPC_ID: &str = "vpc_id";
pub const PUBLIC_SUBNETS: &str = "public_subnets";
pub const PRIVATE_SUBNETS: &str = "private_subnets";
pub const DATABASE_SUBNETS: &str = "database_subnets";
pub const CLUSTER_ID: &str = "cluster_id";
pub const CLUSTER_NAME: &str = "cluster_name";
pub const PUBLIC_TIER_ID: &str = "public_security_group_id";
pub const APPLICATION_TIER_ID: &str = "application_security_group_id";
pub const DATA_TIER_ID: &str = "data_security_group_id";

/// What an application stack needs to know about its foundation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundationExports {
    /// Foundation stack name
    pub stack: String,
    pub environment: String,
    pub region: String,
    pub capacity_mode: CapacityMode,
}

impl FoundationExports {
    /// Stack input bound to one of the foundation's outputs
    pub fn input(&self, output: &str) -> StackInput {
        StackInput::output(self.stack.clone(), output)
    }
}

/// Declare the foundation stack described by `config`
pub fn build_foundation(config: &FoundationConfig) -> TopologyResult<(StackSpec, FoundationExports)> {
    let mut stack = StackBuilder::new(config.name.clone())?;
    let env = config.environment.as_str();

    declare_provider(&mut stack, &config.region, &config.profile)?;

    let network = declare_network(
        &mut stack,
        &NetworkSpec {
            environment: env.to_string(),
            profile: config.profile.clone(),
            region: config.region.clone(),
            cidr: config.cidr,
            layout: SubnetLayout {
                newbits: config.subnet_newbits,
                group_stride: config.zone_count.max(SubnetLayout::default().group_stride),
                zone_count: config.zone_count,
            },
        },
    )?;

    let tiers = build_tier_chain(&mut stack, &network)?;

    stack.publish(env, keys::AWS_DEFAULT_REGION, config.region.as_str(), ParameterType::String)?;

    let capacity_mode = CapacityMode::Fargate;
    let cluster = create_cluster(&mut stack, &config.cluster_name, env, capacity_mode)?;
    stack.publish(env, keys::ECS_CLUSTER, cluster.identity.clone(), ParameterType::String)?;

    stack.add(
        ResourceNode::new(format!("{}-dynamodb", env), ResourceKind::Table)
            .with("name", format!("{}-{}", config.project, env))
            .with("hash_key", "Environment")
            .with("billing_mode", "PAY_PER_REQUEST")
            .with(
                "attribute",
                Value::list([Value::map([("name", "Environment"), ("type", "S")])]),
            ),
    )?;

    stack.output(VPC_ID, network.vpc_id())?;
    stack.output(PUBLIC_SUBNETS, network.subnet_ids(SubnetGroup::Public))?;
    stack.output(PRIVATE_SUBNETS, network.subnet_ids(SubnetGroup::Private))?;
    stack.output(DATABASE_SUBNETS, network.subnet_ids(SubnetGroup::Data))?;
    stack.output(CLUSTER_ID, cluster.identity.clone())?;
    stack.output(CLUSTER_NAME, cluster.name.clone())?;
    stack.output(PUBLIC_TIER_ID, tiers.public.identity_value())?;
    stack.output(APPLICATION_TIER_ID, tiers.application.identity_value())?;
    stack.output(DATA_TIER_ID, tiers.data.identity_value())?;

    let spec = stack.build();
    info!(
        stack = %spec.name(),
        environment = %env,
        cidr = %config.cidr,
        nodes = spec.nodes().len(),
        "Declared foundation stack"
    );

    let exports = FoundationExports {
        stack: spec.name().to_string(),
        environment: env.to_string(),
        region: config.region.clone(),
        capacity_mode,
    };
    Ok((spec, exports))
}
