// Copyright (c) 2025 - Cowboy AI, Inc.
//! Container cluster

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::invariants::validate_name;
use crate::domain::ResourceKind;
use crate::errors::ConstructionError;
use crate::plan::{ResourceNode, Value};
use crate::stack::StackBuilder;

/// How the cluster provides capacity to its services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CapacityMode {
    #[default]
    #[serde(rename = "FARGATE")]
    Fargate,
    #[serde(rename = "FARGATE_SPOT")]
    FargateSpot,
}

impl CapacityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityMode::Fargate => "FARGATE",
            CapacityMode::FargateSpot => "FARGATE_SPOT",
        }
    }
}

impl fmt::Display for CapacityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The shared cluster services are scheduled on
///
/// Created once by the foundation stack; application stacks hold an
/// [`imported`](ClusterHandle::imported) handle built from its outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterHandle {
    /// Computed cluster identity
    pub identity: Value,
    pub name: Value,
    pub capacity_mode: CapacityMode,
}

impl ClusterHandle {
    /// Handle for a cluster declared in another stack
    pub fn imported(identity: Value, name: Value, capacity_mode: CapacityMode) -> Self {
        Self {
            identity,
            name,
            capacity_mode,
        }
    }
}

/// Declare cluster `{environment}-{name}` and its capacity provider attachment
pub fn create_cluster(
    stack: &mut StackBuilder,
    name: &str,
    environment: &str,
    capacity_mode: CapacityMode,
) -> Result<ClusterHandle, ConstructionError> {
    validate_name("cluster name", name)?;
    validate_name("environment", environment)?;

    let cluster = stack.add(
        ResourceNode::new(format!("{}-ecs-cluster", name), ResourceKind::Cluster)
            .with("name", format!("{}-{}", environment, name)),
    )?;

    stack.add(
        ResourceNode::new(format!("{}-ecs-cluster-capacity", name), ResourceKind::ClusterCapacityProviders)
            .with("cluster_name", cluster.value("name"))
            .with("capacity_providers", vec![capacity_mode.as_str()]),
    )?;

    Ok(ClusterHandle {
        identity: cluster.value("id"),
        name: cluster.value("name"),
        capacity_mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_with_capacity_attachment() {
        let mut stack = StackBuilder::new("dev").unwrap();
        let cluster = create_cluster(&mut stack, "ecs-demo", "dev", CapacityMode::Fargate).unwrap();
        let spec = stack.build();

        let node = spec.node("ecs-demo-ecs-cluster").unwrap();
        assert_eq!(node.kind, ResourceKind::Cluster);
        assert_eq!(node.attribute("name"), Some(&Value::from("dev-ecs-demo")));

        let capacity = spec.node("ecs-demo-ecs-cluster-capacity").unwrap();
        assert_eq!(capacity.attribute("cluster_name"), Some(&cluster.name));
        assert_eq!(capacity.attribute("capacity_providers"), Some(&Value::from(vec!["FARGATE"])));

        let identity = cluster.identity.as_reference().unwrap();
        assert_eq!(identity.resource, "ecs-demo-ecs-cluster");
    }

    #[test]
    fn test_second_cluster_with_same_name_is_rejected() {
        let mut stack = StackBuilder::new("dev").unwrap();
        create_cluster(&mut stack, "ecs-demo", "dev", CapacityMode::Fargate).unwrap();
        assert!(matches!(
            create_cluster(&mut stack, "ecs-demo", "dev", CapacityMode::FargateSpot),
            Err(ConstructionError::DuplicateResource { .. })
        ));
    }
}
