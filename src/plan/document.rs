// Copyright (c) 2025 - Cowboy AI, Inc.
//! The synthesized plan document
//!
//! The single artifact composition hands to the reconciliation engine. It is
//! immutable once built: nodes keep their originating stack so the engine can
//! scope partial operations to one stack.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use super::node::ResourceNode;
use super::value::{NodeAddress, Value};
use crate::domain::{ResourceCategory, ResourceKind};
use crate::errors::TopologyResult;
use crate::parameters::{ParameterCollision, ParameterRegistry};

/// Version of the plan document layout
pub const PLAN_FORMAT_VERSION: u32 = 1;

/// A resource node placed in the plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedNode {
    /// Stack that declared the node
    pub stack: String,
    pub id: String,
    pub kind: ResourceKind,
    pub category: ResourceCategory,
    pub engine_type: String,
    pub attributes: BTreeMap<String, Value>,
    /// Every node this one must follow: attribute references and explicit edges
    pub depends_on: BTreeSet<NodeAddress>,
}

impl PlannedNode {
    pub(crate) fn from_node(stack: &str, node: ResourceNode) -> Self {
        let depends_on = node.references().map(|r| r.address()).collect();
        Self {
            stack: stack.to_string(),
            category: node.kind.category(),
            engine_type: node.kind.engine_type().to_string(),
            id: node.id,
            kind: node.kind,
            attributes: node.attributes,
            depends_on,
        }
    }

    pub fn address(&self) -> NodeAddress {
        NodeAddress::new(self.stack.clone(), self.id.clone())
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Per-stack summary: resolved outputs and the stacks it consumes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackSummary {
    pub name: String,
    pub upstream: BTreeSet<String>,
    pub outputs: BTreeMap<String, Value>,
}

/// Complete desired-state graph produced by one composition
///
/// Serialized with `parameters` as a map from key path to parameter and
/// the repeated publications under a top-level `collisions`.
#[derive(Debug, Clone)]
pub struct SynthesizedPlan {
    pub format_version: u32,
    pub plan_id: Uuid,
    pub synthesized_at: DateTime<Utc>,
    stacks: Vec<StackSummary>,
    nodes: Vec<PlannedNode>,
    /// One valid execution order over every node
    execution_order: Vec<NodeAddress>,
    parameters: ParameterRegistry,
}

impl SynthesizedPlan {
    pub(crate) fn new(
        stacks: Vec<StackSummary>,
        nodes: Vec<PlannedNode>,
        execution_order: Vec<NodeAddress>,
        parameters: ParameterRegistry,
    ) -> Self {
        Self {
            format_version: PLAN_FORMAT_VERSION,
            plan_id: Uuid::now_v7(),
            synthesized_at: Utc::now(),
            stacks,
            nodes,
            execution_order,
            parameters,
        }
    }

    /// Stacks in composition order
    pub fn stacks(&self) -> &[StackSummary] {
        &self.stacks
    }

    /// Every node in declaration order
    pub fn nodes(&self) -> &[PlannedNode] {
        &self.nodes
    }

    pub fn node(&self, stack: &str, id: &str) -> Option<&PlannedNode> {
        self.nodes.iter().find(|n| n.stack == stack && n.id == id)
    }

    /// Nodes declared by one stack
    pub fn nodes_in_stack<'a>(&'a self, stack: &'a str) -> impl Iterator<Item = &'a PlannedNode> {
        self.nodes.iter().filter(move |n| n.stack == stack)
    }

    pub fn nodes_of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &PlannedNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn nodes_of_category(&self, category: ResourceCategory) -> impl Iterator<Item = &PlannedNode> {
        self.nodes.iter().filter(move |n| n.category == category)
    }

    pub fn stack_outputs(&self, stack: &str) -> Option<&BTreeMap<String, Value>> {
        self.stacks.iter().find(|s| s.name == stack).map(|s| &s.outputs)
    }

    /// Nodes in an order where every node follows its dependencies
    pub fn topological_order(&self) -> Vec<&PlannedNode> {
        self.execution_order
            .iter()
            .filter_map(|address| self.node(&address.stack, &address.resource))
            .collect()
    }

    pub fn parameters(&self) -> &ParameterRegistry {
        &self.parameters
    }

    /// Parameter keys published more than once during composition
    pub fn collisions(&self) -> &[ParameterCollision] {
        self.parameters.collisions()
    }

    /// Render the plan as a JSON document
    pub fn to_json(&self) -> TopologyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> TopologyResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for SynthesizedPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut plan = serializer.serialize_struct("SynthesizedPlan", 8)?;
        plan.serialize_field("format_version", &self.format_version)?;
        plan.serialize_field("plan_id", &self.plan_id)?;
        plan.serialize_field("synthesized_at", &self.synthesized_at)?;
        plan.serialize_field("stacks", &self.stacks)?;
        plan.serialize_field("nodes", &self.nodes)?;
        plan.serialize_field("execution_order", &self.execution_order)?;
        plan.serialize_field("parameters", &self.parameters)?;
        plan.serialize_field("collisions", self.parameters.collisions())?;
        plan.end()
    }
}
