// Copyright (c) 2025 - Cowboy AI, Inc.
//! Task specifications
//!
//! cpu and memory are dimensionless compute units. The data model keeps them
//! numeric; the task node carries their textual form, which is what the
//! execution engine expects. [`ComputeUnits::as_attribute`] is the only place
//! that conversion happens.
//!
//! Container definitions are a nested document inside one string attribute.
//! They are always produced by `serde_json`, so names and images are escaped
//! and typed like any other JSON value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::invariants::{reject_placeholder, require_non_empty, validate_name, validate_port, validate_positive};
use crate::domain::ResourceKind;
use crate::errors::{ConstructionError, TopologyResult};
use crate::plan::{ResourceNode, Value};

/// A positive quantity of cpu or memory units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputeUnits(i64);

impl ComputeUnits {
    pub fn new(field: &str, units: i64) -> Result<Self, ConstructionError> {
        validate_positive(field, units)?;
        Ok(Self(units))
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    /// Textual form carried by the task node
    pub fn as_attribute(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for ComputeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub container_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

impl PortMapping {
    pub fn container(port: u16) -> Self {
        Self {
            container_port: port,
            host_port: None,
            protocol: None,
        }
    }
}

/// One entry of the task's container definitions document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub cpu: ComputeUnits,
    pub memory: ComputeUnits,
    pub essential: bool,
    pub port_mappings: Vec<PortMapping>,
}

/// A validated task specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub family: String,
    pub cpu: ComputeUnits,
    pub memory: ComputeUnits,
    pub container: ContainerSpec,
}

impl TaskSpec {
    /// # Invariants
    /// - cpu and memory are positive
    /// - at least one port mapping, none on port 0
    /// - no name or image contains placeholder syntax
    pub fn new(
        family: &str,
        container_name: &str,
        image: &str,
        cpu: i64,
        memory: i64,
        port_mappings: Vec<PortMapping>,
    ) -> Result<Self, ConstructionError> {
        validate_name("task family", family)?;
        validate_name("container name", container_name)?;
        require_non_empty("image", image)?;
        reject_placeholder("image", image)?;

        let cpu = ComputeUnits::new("cpu", cpu)?;
        let memory = ComputeUnits::new("memory", memory)?;

        if port_mappings.is_empty() {
            return Err(ConstructionError::EmptyPortMappings(family.to_string()));
        }
        for mapping in &port_mappings {
            validate_port("container port", mapping.container_port)?;
        }

        Ok(Self {
            family: family.to_string(),
            cpu,
            memory,
            container: ContainerSpec {
                name: container_name.to_string(),
                image: image.to_string(),
                cpu,
                memory,
                essential: true,
                port_mappings,
            },
        })
    }

    /// Whether some port mapping exposes `port`
    pub fn exposes(&self, port: u16) -> bool {
        self.container.port_mappings.iter().any(|m| m.container_port == port)
    }

    /// Container definitions document, encoded
    pub fn container_definitions(&self) -> TopologyResult<String> {
        Ok(serde_json::to_string(&[&self.container])?)
    }

    pub(crate) fn to_node(&self, id: String) -> TopologyResult<ResourceNode> {
        Ok(ResourceNode::new(id, ResourceKind::TaskDefinition)
            .with("family", self.family.clone())
            .with("requires_compatibilities", vec!["FARGATE"])
            .with("network_mode", "awsvpc")
            .with("cpu", self.cpu.as_attribute())
            .with("memory", self.memory.as_attribute())
            .with("container_definitions", Value::String(self.container_definitions()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    fn nginx(cpu: i64, memory: i64, ports: Vec<PortMapping>) -> Result<TaskSpec, ConstructionError> {
        TaskSpec::new("petapp", "petapp", "nginx", cpu, memory, ports)
    }

    #[test_case(0, 512 ; "zero cpu")]
    #[test_case(256, 0 ; "zero memory")]
    #[test_case(-256, 512 ; "negative cpu")]
    fn test_non_positive_units_rejected(cpu: i64, memory: i64) {
        let err = nginx(cpu, memory, vec![PortMapping::container(80)]).unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidNumber { .. }));
    }

    #[test]
    fn test_empty_port_mappings_rejected() {
        let err = nginx(256, 512, vec![]).unwrap_err();
        assert_eq!(err, ConstructionError::EmptyPortMappings("petapp".into()));
    }

    #[test]
    fn test_units_render_as_text() {
        let task = nginx(256, 512, vec![PortMapping::container(80)]).unwrap();
        let node = task.to_node("petapp-task-definition".into()).unwrap();

        assert_eq!(node.attribute("cpu"), Some(&Value::from("256")));
        assert_eq!(node.attribute("memory"), Some(&Value::from("512")));
    }

    #[test]
    fn test_container_definitions_are_encoded_json() {
        let task = TaskSpec::new("petapp", "pet\"app", "nginx", 256, 512, vec![PortMapping::container(80)]);
        // quotes are not valid in names
        assert!(task.is_err());

        let task = nginx(256, 512, vec![PortMapping::container(80)]).unwrap();
        let encoded: serde_json::Value = serde_json::from_str(&task.container_definitions().unwrap()).unwrap();
        assert_eq!(
            encoded,
            json!([{
                "name": "petapp",
                "image": "nginx",
                "cpu": 256,
                "memory": 512,
                "essential": true,
                "portMappings": [{ "containerPort": 80 }]
            }])
        );
    }

    #[test]
    fn test_image_with_registry_path() {
        let task = TaskSpec::new(
            "petapp",
            "petapp",
            "123456789012.dkr.ecr.ap-southeast-1.amazonaws.com/dev-petapp:latest",
            256,
            512,
            vec![PortMapping::container(8080)],
        )
        .unwrap();
        assert!(task.exposes(8080));
        assert!(!task.exposes(80));
    }
}
