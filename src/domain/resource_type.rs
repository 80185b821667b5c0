// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Resource Kind Taxonomy
//!
//! The closed vocabulary of resource declarations a stack can contain. Kinds
//! are opaque to composition: they carry a name for the plan document and the
//! type the reconciliation engine knows them by, nothing more.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a declared resource node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    // Provider
    /// Cloud provider binding (region, credential profile)
    Provider,

    // Networking
    /// Virtual network with its subnet groups
    Network,
    /// Security group (one tier of the tier chain)
    SecurityGroup,
    /// Application load balancer
    LoadBalancer,
    /// Load balancer target group
    TargetGroup,
    /// Load balancer listener
    Listener,

    // Compute
    /// Container cluster
    Cluster,
    /// Capacity provider attachment of a cluster
    ClusterCapacityProviders,
    /// Container task specification
    TaskDefinition,
    /// Long-running service scheduled on a cluster
    Service,
    /// Container image repository
    ContainerRepository,

    // Identity
    /// Assumable role
    Role,
    /// Inline policy attached to a role
    RolePolicy,

    // Storage / configuration
    /// Key/value state table
    Table,
    /// Published parameter store entry
    Parameter,
}

impl ResourceKind {
    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Network => "network",
            Self::SecurityGroup => "security_group",
            Self::LoadBalancer => "load_balancer",
            Self::TargetGroup => "target_group",
            Self::Listener => "listener",
            Self::Cluster => "cluster",
            Self::ClusterCapacityProviders => "cluster_capacity_providers",
            Self::TaskDefinition => "task_definition",
            Self::Service => "service",
            Self::ContainerRepository => "container_repository",
            Self::Role => "role",
            Self::RolePolicy => "role_policy",
            Self::Table => "table",
            Self::Parameter => "parameter",
        }
    }

    /// Type name used by the reconciliation engine
    pub fn engine_type(&self) -> &'static str {
        match self {
            Self::Provider => "provider.aws",
            Self::Network => "module.vpc",
            Self::SecurityGroup => "module.security_group",
            Self::LoadBalancer => "aws_lb",
            Self::TargetGroup => "aws_lb_target_group",
            Self::Listener => "aws_lb_listener",
            Self::Cluster => "aws_ecs_cluster",
            Self::ClusterCapacityProviders => "aws_ecs_cluster_capacity_providers",
            Self::TaskDefinition => "aws_ecs_task_definition",
            Self::Service => "aws_ecs_service",
            Self::ContainerRepository => "aws_ecr_repository",
            Self::Role => "aws_iam_role",
            Self::RolePolicy => "aws_iam_role_policy",
            Self::Table => "aws_dynamodb_table",
            Self::Parameter => "aws_ssm_parameter",
        }
    }

    /// Get the resource category
    pub fn category(&self) -> ResourceCategory {
        match self {
            Self::Provider => ResourceCategory::Provider,
            Self::Network | Self::LoadBalancer | Self::TargetGroup | Self::Listener => {
                ResourceCategory::Networking
            }
            Self::SecurityGroup | Self::Role | Self::RolePolicy => ResourceCategory::Security,
            Self::Cluster
            | Self::ClusterCapacityProviders
            | Self::TaskDefinition
            | Self::Service
            | Self::ContainerRepository => ResourceCategory::Compute,
            Self::Table => ResourceCategory::Storage,
            Self::Parameter => ResourceCategory::Configuration,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// High-level resource categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Provider,
    Networking,
    Security,
    Compute,
    Storage,
    Configuration,
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider => write!(f, "Provider"),
            Self::Networking => write!(f, "Networking"),
            Self::Security => write!(f, "Security"),
            Self::Compute => write!(f, "Compute"),
            Self::Storage => write!(f, "Storage"),
            Self::Configuration => write!(f, "Configuration"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_serialization() {
        let kind = ResourceKind::ClusterCapacityProviders;
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"cluster_capacity_providers\"");
        assert_eq!(json.trim_matches('"'), kind.as_str());
    }

    #[test]
    fn test_categories() {
        assert_eq!(ResourceKind::SecurityGroup.category(), ResourceCategory::Security);
        assert_eq!(ResourceKind::TaskDefinition.category(), ResourceCategory::Compute);
        assert_eq!(ResourceKind::Parameter.category(), ResourceCategory::Configuration);
    }

    #[test]
    fn test_engine_types() {
        assert_eq!(ResourceKind::Service.engine_type(), "aws_ecs_service");
        assert_eq!(ResourceKind::Parameter.engine_type(), "aws_ssm_parameter");
    }
}
