// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource nodes

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::value::{NodeAddress, ResourceRef, Value};
use crate::domain::ResourceKind;

/// One declared resource
///
/// # Invariants
/// - `id` is unique within its stack
/// - every reference in `attributes` or `depends_on` resolves, by the end of
///   composition, to a node of the same or an upstream stack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceNode {
    pub id: String,
    pub kind: ResourceKind,
    pub attributes: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<ResourceRef>,
}

impl ResourceNode {
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            attributes: BTreeMap::new(),
            depends_on: BTreeSet::new(),
        }
    }

    /// Set an attribute (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add an explicit ordering edge that no attribute carries
    pub fn after(mut self, dependency: ResourceRef) -> Self {
        self.depends_on.insert(dependency);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Attribute references plus explicit dependencies
    pub fn references(&self) -> impl Iterator<Item = &ResourceRef> {
        self.attributes
            .values()
            .flat_map(|value| value.references())
            .chain(self.depends_on.iter())
    }
}

/// Handle to a node declared in a stack, used to wire references to it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    stack: String,
    id: String,
}

impl NodeHandle {
    pub(crate) fn new(stack: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            id: id.into(),
        }
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> NodeAddress {
        NodeAddress::new(self.stack.clone(), self.id.clone())
    }

    /// Reference to a computed attribute of this node
    pub fn attr(&self, attribute: impl Into<String>) -> ResourceRef {
        ResourceRef::new(self.stack.clone(), self.id.clone(), attribute)
    }

    /// Same as [`attr`](Self::attr), wrapped as a value
    pub fn value(&self, attribute: impl Into<String>) -> Value {
        Value::Ref(self.attr(attribute))
    }
}
