// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Composition
//!
//! A stack is one deployable unit: a set of resource nodes, named inputs it
//! consumes and named outputs it offers to stacks declared after it.
//!
//! ```text
//! foundation (dev) ──outputs──> application (dev-petapp) ──outputs──> ...
//!     network, tiers,             inputs: vpc_id, subnets,
//!     cluster, parameters         cluster_id, tier identities
//! ```
//!
//! Stacks are declared with a [`StackBuilder`], frozen into a [`StackSpec`]
//! and handed, in order, to [`compose`].

pub mod application;
pub mod compose;
pub mod foundation;
pub mod network;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::domain::invariants::validate_name;
use crate::domain::ResourceKind;
use crate::errors::ConstructionError;
use crate::parameters::{ParameterKey, ParameterType, PublishedParameter};
use crate::plan::{NodeHandle, ResourceNode, Value};

pub use application::{build_application, ApplicationStack};
pub use compose::{compose, compose_with};
pub use foundation::{build_foundation, FoundationExports};
pub use network::{declare_network, declare_provider, NetworkHandle, NetworkSpec};

/// Where a stack input comes from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StackInput {
    /// A value known when the stack is declared
    Literal(Value),
    /// A named output of a stack declared earlier in the composition
    Output { stack: String, output: String },
}

impl StackInput {
    pub fn output(stack: impl Into<String>, output: impl Into<String>) -> Self {
        StackInput::Output {
            stack: stack.into(),
            output: output.into(),
        }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        StackInput::Literal(value.into())
    }
}

/// Frozen declaration of one stack
#[derive(Debug, Clone, PartialEq)]
pub struct StackSpec {
    name: String,
    inputs: BTreeMap<String, StackInput>,
    nodes: Vec<ResourceNode>,
    outputs: BTreeMap<String, Value>,
    publications: Vec<PublishedParameter>,
}

impl StackSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &BTreeMap<String, StackInput> {
        &self.inputs
    }

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&ResourceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn outputs(&self) -> &BTreeMap<String, Value> {
        &self.outputs
    }

    pub fn publications(&self) -> &[PublishedParameter] {
        &self.publications
    }

    /// Names of every other stack this one consumes, through inputs or
    /// direct references
    pub fn upstream(&self) -> BTreeSet<String> {
        let from_inputs = self.inputs.values().flat_map(|input| match input {
            StackInput::Output { stack, .. } => vec![stack.as_str()],
            StackInput::Literal(value) => value.references().into_iter().map(|r| r.stack.as_str()).collect(),
        });
        let from_nodes = self
            .nodes
            .iter()
            .flat_map(|node| node.references().map(|r| r.stack.as_str()));

        from_inputs
            .chain(from_nodes)
            .filter(|stack| *stack != self.name)
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        String,
        BTreeMap<String, StackInput>,
        Vec<ResourceNode>,
        BTreeMap<String, Value>,
        Vec<PublishedParameter>,
    ) {
        (self.name, self.inputs, self.nodes, self.outputs, self.publications)
    }
}

/// Mutable declaration context for one stack
///
/// Nodes may reference nodes added later in the same stack; those references
/// are checked when the stack is composed.
#[derive(Debug, Clone)]
pub struct StackBuilder {
    name: String,
    inputs: BTreeMap<String, StackInput>,
    nodes: Vec<ResourceNode>,
    outputs: BTreeMap<String, Value>,
    publications: Vec<PublishedParameter>,
    /// Parameter node declared for each published key
    parameter_nodes: BTreeMap<ParameterKey, String>,
}

impl StackBuilder {
    pub fn new(name: impl Into<String>) -> Result<Self, ConstructionError> {
        let name = name.into();
        validate_name("stack name", &name)?;
        Ok(Self {
            name,
            inputs: BTreeMap::new(),
            nodes: Vec::new(),
            outputs: BTreeMap::new(),
            publications: Vec::new(),
            parameter_nodes: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare an input and get the placeholder value that stands for it
    pub fn input(&mut self, name: impl Into<String>, source: StackInput) -> Result<Value, ConstructionError> {
        let name = name.into();
        validate_name("stack input", &name)?;
        self.inputs.insert(name.clone(), source);
        Ok(Value::Input(name))
    }

    /// Append a node and get a handle for wiring references to it
    pub fn add(&mut self, node: ResourceNode) -> Result<NodeHandle, ConstructionError> {
        validate_name("resource id", &node.id)?;
        if self.contains(&node.id) {
            return Err(ConstructionError::DuplicateResource {
                stack: self.name.clone(),
                resource: node.id,
            });
        }

        debug!(stack = %self.name, resource = %node.id, kind = %node.kind, "Declared node");
        let handle = NodeHandle::new(self.name.clone(), node.id.clone());
        self.nodes.push(node);
        Ok(handle)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Handle to an already declared node
    pub fn handle(&self, id: &str) -> Option<NodeHandle> {
        self.contains(id).then(|| NodeHandle::new(self.name.clone(), id))
    }

    /// Offer a value to stacks declared later
    pub fn output(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), ConstructionError> {
        let name = name.into();
        validate_name("stack output", &name)?;
        self.outputs.insert(name, value.into());
        Ok(())
    }

    /// Publish a parameter: a parameter node in this stack plus a registry
    /// entry once the stack is composed
    ///
    /// Publishing a key again keeps its one node and overwrites the node's
    /// value; the registry records the collision at composition.
    pub fn publish(
        &mut self,
        namespace: &str,
        name: &str,
        value: impl Into<Value>,
        parameter_type: ParameterType,
    ) -> Result<NodeHandle, ConstructionError> {
        let parameter = PublishedParameter::new(namespace, name, value, parameter_type)?.from_stack(self.name.clone());

        if let Some(id) = self.parameter_nodes.get(&parameter.key).cloned() {
            if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
                node.attributes
                    .insert("type".to_string(), parameter.parameter_type.as_str().into());
                node.attributes.insert("value".to_string(), parameter.value.clone());
            }
            debug!(stack = %self.name, key = %parameter.key, "Republished parameter");
            self.publications.push(parameter);
            return Ok(NodeHandle::new(self.name.clone(), id));
        }

        let node = ResourceNode::new(format!("{}-{}-parameter", namespace, name), ResourceKind::Parameter)
            .with("name", parameter.key.path())
            .with("type", parameter.parameter_type.as_str())
            .with("value", parameter.value.clone());

        let handle = self.add(node)?;
        self.parameter_nodes.insert(parameter.key.clone(), handle.id().to_string());
        self.publications.push(parameter);
        Ok(handle)
    }

    pub fn build(self) -> StackSpec {
        StackSpec {
            name: self.name,
            inputs: self.inputs,
            nodes: self.nodes,
            outputs: self.outputs,
            publications: self.publications,
        }
    }
}
