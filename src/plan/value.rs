// Copyright (c) 2025 - Cowboy AI, Inc.
//! Attribute values and reference edges
//!
//! A [`Value`] is either literal data or a *reference* to a computed
//! attribute of another resource. References are what turn a flat list of
//! declarations into a graph: every [`ResourceRef`] inside an attribute is a
//! dependency edge the reconciliation engine must honour.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Address of a resource node: the stack it belongs to and its id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeAddress {
    pub stack: String,
    pub resource: String,
}

impl NodeAddress {
    pub fn new(stack: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            resource: resource.into(),
        }
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stack, self.resource)
    }
}

/// Reference to a computed attribute of a resource node
///
/// The attribute is opaque to composition; only the node it points at must
/// exist, in the same stack or in a stack declared earlier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceRef {
    pub stack: String,
    pub resource: String,
    pub attribute: String,
}

impl ResourceRef {
    pub fn new(
        stack: impl Into<String>,
        resource: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            stack: stack.into(),
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    /// Node this reference points at
    pub fn address(&self) -> NodeAddress {
        NodeAddress::new(self.stack.clone(), self.resource.clone())
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}.{}", self.stack, self.resource, self.attribute)
    }
}

/// Declared attribute value
///
/// `Input` names a stack input and only exists until composition substitutes
/// it; a composed plan never contains one.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(i64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Ref(ResourceRef),
    Input(String),
}

impl Value {
    /// Build a map value from key/value pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list value
    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&ResourceRef> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Every reference edge inside this value, depth first
    pub fn references<'a>(&'a self) -> Vec<&'a ResourceRef> {
        let mut found = Vec::new();
        self.walk(&mut |value: &'a Value| {
            if let Value::Ref(r) = value {
                found.push(r);
            }
        });
        found
    }

    /// Every stack input this value still names
    pub fn inputs<'a>(&'a self) -> Vec<&'a str> {
        let mut found = Vec::new();
        self.walk(&mut |value: &'a Value| {
            if let Value::Input(name) = value {
                found.push(name.as_str());
            }
        });
        found
    }

    /// Every string leaf
    pub fn strings<'a>(&'a self) -> Vec<&'a str> {
        let mut found = Vec::new();
        self.walk(&mut |value: &'a Value| {
            if let Value::String(s) = value {
                found.push(s.as_str());
            }
        });
        found
    }

    /// Whether the value is fully known before apply (no references, no inputs)
    pub fn is_literal(&self) -> bool {
        let mut literal = true;
        self.walk(&mut |value: &Value| {
            if matches!(value, Value::Ref(_) | Value::Input(_)) {
                literal = false;
            }
        });
        literal
    }

    /// Replace every `Input` with the value `lookup` returns for it
    ///
    /// Returns the name of the first input `lookup` does not know.
    pub fn resolve_inputs(&self, lookup: &dyn Fn(&str) -> Option<Value>) -> Result<Value, String> {
        Ok(match self {
            Value::Input(name) => lookup(name).ok_or_else(|| name.clone())?,
            Value::List(items) => Value::List(
                items
                    .iter()
                    .map(|item| item.resolve_inputs(lookup))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), v.resolve_inputs(lookup)?)))
                    .collect::<Result<_, String>>()?,
            ),
            other => other.clone(),
        })
    }

    /// Textual form of a literal scalar or list of scalars
    ///
    /// Lists render comma-separated, which is how string-list parameters are
    /// stored. `None` for references, inputs, maps and null.
    pub fn render_literal(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    Value::List(_) => None,
                    scalar => scalar.render_literal(),
                })
                .collect::<Option<Vec<_>>>()
                .map(|parts| parts.join(",")),
            Value::Null | Value::Map(_) | Value::Ref(_) | Value::Input(_) => None,
        }
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Value)) {
        visit(self);
        match self {
            Value::List(items) => items.iter().for_each(|item| item.walk(visit)),
            Value::Map(entries) => entries.values().for_each(|v| v.walk(visit)),
            _ => {}
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_i64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Ref(r) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$ref", r)?;
                map.end()
            }
            Value::Input(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$input", name)?;
                map.end()
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as i64)
    }
}

impl From<u16> for Value {
    fn from(n: u16) -> Self {
        Value::Number(n as i64)
    }
}

impl From<ResourceRef> for Value {
    fn from(r: ResourceRef) -> Self {
        Value::Ref(r)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::list(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn cluster_ref() -> ResourceRef {
        ResourceRef::new("dev", "ecs-demo-ecs-cluster", "id")
    }

    #[test]
    fn test_references_are_collected_from_nested_values() {
        let value = Value::map([
            ("cluster", Value::from(cluster_ref())),
            (
                "load_balancer",
                Value::list([Value::map([(
                    "target_group_arn",
                    ResourceRef::new("app", "tg", "arn"),
                )])]),
            ),
        ]);

        let refs = value.references();
        assert_eq!(refs.len(), 2);
        assert!(refs.contains(&&cluster_ref()));
        assert!(!value.is_literal());
    }

    #[test]
    fn test_resolve_inputs() {
        let value = Value::list([Value::Input("cluster_id".into()), Value::from("x")]);

        let resolved = value
            .resolve_inputs(&|name| (name == "cluster_id").then(|| cluster_ref().into()))
            .unwrap();
        assert_eq!(resolved, Value::list([Value::from(cluster_ref()), Value::from("x")]));
        assert!(resolved.inputs().is_empty());

        let missing = Value::Input("vpc_id".into()).resolve_inputs(&|_| None);
        assert_eq!(missing, Err("vpc_id".to_string()));
    }

    #[test]
    fn test_serialization_marks_references() {
        let value = Value::map([
            ("name", Value::from("dev-ecs-demo")),
            ("cpu", Value::from("256")),
            ("count", Value::from(1u32)),
            ("cluster", Value::from(cluster_ref())),
        ]);

        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({
                "name": "dev-ecs-demo",
                "cpu": "256",
                "count": 1,
                "cluster": { "$ref": { "stack": "dev", "resource": "ecs-demo-ecs-cluster", "attribute": "id" } }
            })
        );
    }

    #[test]
    fn test_render_literal() {
        assert_eq!(Value::from("ap-southeast-1").render_literal().as_deref(), Some("ap-southeast-1"));
        assert_eq!(Value::from(vec!["a", "b"]).render_literal().as_deref(), Some("a,b"));
        assert_eq!(Value::from(cluster_ref()).render_literal(), None);
    }
}
