// Copyright (c) 2025 - Cowboy AI, Inc.
//! Parameter Store Bridge
//!
//! Durable, namespaced key/value publication used to hand identifiers across
//! stack and process boundaries when a direct reference is not available.
//!
//! # Architecture
//!
//! ```text
//! Stack declares publish(...)        Composition                 Apply time (external)
//! ──────────────────────────         ───────────                 ─────────────────────
//! Parameter node + declaration ───>  ParameterRegistry  ───────> ParameterStore (NATS KV, ...)
//!                                    last-write-wins,            literal values synced here,
//!                                    collisions reported         computed ones by the engine
//! ```
//!
//! Composition never reads its own writes back: [`ParameterRegistry::resolve`]
//! is for consumers of the finished plan. Reads across stacks are eventually
//! consistent with respect to synthesis order.

pub mod keys;
pub mod nats;
pub mod store;

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

use crate::domain::invariants::reject_placeholder;
use crate::errors::{ConstructionError, TopologyError, TopologyResult};
use crate::plan::Value;

pub use keys::ParameterKey;
pub use nats::{NatsConfig, NatsParameterStore};
pub use store::{sync_literal_parameters, InMemoryParameterStore, ParameterStore, SyncReport};

/// Parameter value type as understood by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParameterType {
    #[default]
    String,
    StringList,
    SecureString,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "String",
            ParameterType::StringList => "StringList",
            ParameterType::SecureString => "SecureString",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One published key/value pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedParameter {
    pub key: ParameterKey,
    pub value: Value,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    /// Stack that published it, when published during composition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl PublishedParameter {
    /// Validate and build a parameter
    ///
    /// # Invariants
    /// - Key follows `/{namespace}/{name}`
    /// - Neither key nor any string in the value contains placeholder syntax
    pub fn new(
        namespace: impl AsRef<str>,
        name: impl AsRef<str>,
        value: impl Into<Value>,
        parameter_type: ParameterType,
    ) -> Result<Self, ConstructionError> {
        let key = ParameterKey::new(namespace, name)?;
        let value = value.into();
        validate_value(&key, &value)?;

        Ok(Self {
            key,
            value,
            parameter_type,
            stack: None,
        })
    }

    /// Record the publishing stack
    pub fn from_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Whether the value is only known once the plan is applied
    pub fn is_computed(&self) -> bool {
        !self.value.is_literal()
    }
}

pub(crate) fn validate_value(key: &ParameterKey, value: &Value) -> Result<(), ConstructionError> {
    let field = format!("value of {}", key);
    value
        .strings()
        .into_iter()
        .try_for_each(|s| reject_placeholder(&field, s))
}

/// What to do when a key is published twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Keep the later value, log and record the collision
    #[default]
    Overwrite,
    /// Fail with [`TopologyError::ParameterKeyCollision`]
    Reject,
}

/// A key published more than once
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterCollision {
    pub key: ParameterKey,
    pub previous_stack: Option<String>,
    pub current_stack: Option<String>,
    pub previous_value: Value,
    pub current_value: Value,
}

/// Every parameter published by one composition, keyed by path
///
/// Serializes as the key path to parameter map; collisions are reported
/// separately.
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    policy: CollisionPolicy,
    entries: BTreeMap<ParameterKey, PublishedParameter>,
    collisions: Vec<ParameterCollision>,
}

impl ParameterRegistry {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Publish `value` under `/{namespace}/{name}`
    ///
    /// Returns the collision when the key was already published.
    pub fn publish(
        &mut self,
        namespace: &str,
        name: &str,
        value: impl Into<Value>,
        parameter_type: ParameterType,
    ) -> TopologyResult<Option<ParameterCollision>> {
        let parameter = PublishedParameter::new(namespace, name, value, parameter_type)?;
        self.publish_parameter(parameter)
    }

    /// Publish an already built parameter
    pub fn publish_parameter(
        &mut self,
        parameter: PublishedParameter,
    ) -> TopologyResult<Option<ParameterCollision>> {
        validate_value(&parameter.key, &parameter.value)?;

        let Some(previous) = self.entries.get(&parameter.key) else {
            self.entries.insert(parameter.key.clone(), parameter);
            return Ok(None);
        };

        let collision = ParameterCollision {
            key: parameter.key.clone(),
            previous_stack: previous.stack.clone(),
            current_stack: parameter.stack.clone(),
            previous_value: previous.value.clone(),
            current_value: parameter.value.clone(),
        };

        let describe = |stack: &Option<String>| stack.clone().unwrap_or_else(|| "<direct>".to_string());

        if self.policy == CollisionPolicy::Reject {
            return Err(TopologyError::ParameterKeyCollision {
                key: collision.key.path(),
                previous: describe(&collision.previous_stack),
                current: describe(&collision.current_stack),
            });
        }

        warn!(
            key = %collision.key,
            previous = %describe(&collision.previous_stack),
            current = %describe(&collision.current_stack),
            "Parameter key published twice; last write wins"
        );

        self.entries.insert(parameter.key.clone(), parameter);
        self.collisions.push(collision.clone());
        Ok(Some(collision))
    }

    /// Current value of `/{namespace}/{name}`
    pub fn resolve(&self, namespace: &str, name: &str) -> Option<&Value> {
        let key = ParameterKey::new(namespace, name).ok()?;
        self.entries.get(&key).map(|p| &p.value)
    }

    pub fn get(&self, key: &ParameterKey) -> Option<&PublishedParameter> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PublishedParameter> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn collisions(&self) -> &[ParameterCollision] {
        &self.collisions
    }
}

impl Serialize for ParameterRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}
