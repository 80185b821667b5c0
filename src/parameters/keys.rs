// Copyright (c) 2025 - Cowboy AI, Inc.

//! Parameter key hierarchy
//!
//! Published parameters live in a flat namespace per environment:
//!
//! ```text
//! /{environment}/{logical_name}
//! ```
//!
//! The logical names below are an interface other tooling reads by exact key
//! (a CI pipeline looks up `/dev/image_repo_name`); renaming one is a
//! breaking change.
//!
//! # Examples
//!
//! ```rust
//! use cim_topology::parameters::keys::{ParameterKey, ECS_CLUSTER};
//!
//! let key = ParameterKey::new("dev", ECS_CLUSTER).unwrap();
//! assert_eq!(key.path(), "/dev/ecs_cluster");
//! assert_eq!(key.subject_token(), "dev.ecs_cluster");
//! assert_eq!(ParameterKey::parse("/dev/ecs_cluster").unwrap(), key);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::invariants::{reject_placeholder, validate_name};
use crate::errors::ConstructionError;

/// Region the environment is deployed to
pub const AWS_DEFAULT_REGION: &str = "aws_default_region";
/// Container image repository name
pub const IMAGE_REPO_NAME: &str = "image_repo_name";
/// Container name inside the service's task
pub const TASK_DEFINITION_CONTAINER_NAME: &str = "task_definition_container_name";
/// Service name
pub const ECS_SERVICE: &str = "ecs_service";
/// Cluster identity
pub const ECS_CLUSTER: &str = "ecs_cluster";

/// Every logical name with a consumer outside this crate
pub const WELL_KNOWN: [&str; 5] = [
    AWS_DEFAULT_REGION,
    IMAGE_REPO_NAME,
    TASK_DEFINITION_CONTAINER_NAME,
    ECS_SERVICE,
    ECS_CLUSTER,
];

/// Validated `/{namespace}/{name}` key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParameterKey {
    namespace: String,
    name: String,
}

impl ParameterKey {
    /// Build a key from its namespace (environment) and logical name
    ///
    /// # Invariants
    /// - Neither segment contains unexpanded placeholder syntax
    /// - Both segments are non-empty `[A-Za-z0-9._-]+`
    pub fn new(namespace: impl AsRef<str>, name: impl AsRef<str>) -> Result<Self, ConstructionError> {
        let (namespace, name) = (namespace.as_ref(), name.as_ref());
        let path = format!("/{}/{}", namespace, name);

        reject_placeholder("parameter key", &path)?;
        validate_name("parameter namespace", namespace)
            .and_then(|_| validate_name("parameter name", name))
            .map_err(|_| ConstructionError::InvalidParameterKey(path))?;

        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Parse a full `/{namespace}/{name}` path
    pub fn parse(path: &str) -> Result<Self, ConstructionError> {
        reject_placeholder("parameter key", path)?;

        let segments: Vec<&str> = path
            .strip_prefix('/')
            .map(|rest| rest.split('/').collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [namespace, name] => Self::new(namespace, name),
            _ => Err(ConstructionError::InvalidParameterKey(path.to_string())),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full key path
    pub fn path(&self) -> String {
        format!("/{}/{}", self.namespace, self.name)
    }

    /// Dot-separated form used as a key in subject-addressed stores
    pub fn subject_token(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Whether some tool outside this crate reads this key
    pub fn is_well_known(&self) -> bool {
        WELL_KNOWN.contains(&self.name.as_str())
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.namespace, self.name)
    }
}

impl FromStr for ParameterKey {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ParameterKey {
    type Error = ConstructionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ParameterKey> for String {
    fn from(key: ParameterKey) -> Self {
        key.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("dev", AWS_DEFAULT_REGION, "/dev/aws_default_region")]
    #[test_case("dev", IMAGE_REPO_NAME, "/dev/image_repo_name")]
    #[test_case("dev", TASK_DEFINITION_CONTAINER_NAME, "/dev/task_definition_container_name")]
    #[test_case("prod", ECS_SERVICE, "/prod/ecs_service")]
    #[test_case("prod", ECS_CLUSTER, "/prod/ecs_cluster")]
    fn test_well_known_paths(namespace: &str, name: &str, expected: &str) {
        let key = ParameterKey::new(namespace, name).unwrap();
        assert_eq!(key.path(), expected);
        assert!(key.is_well_known());
    }

    #[test]
    fn test_placeholder_in_key_is_rejected() {
        let err = ParameterKey::new("${config.environment}", ECS_SERVICE).unwrap_err();
        assert!(matches!(err, ConstructionError::UnexpandedPlaceholder { .. }));

        let err = ParameterKey::parse("/${config.environment}/ecs_service").unwrap_err();
        assert!(matches!(err, ConstructionError::UnexpandedPlaceholder { .. }));
    }

    #[test]
    fn test_malformed_paths() {
        assert!(ParameterKey::parse("dev/ecs_cluster").is_err());
        assert!(ParameterKey::parse("/dev/ecs/cluster").is_err());
        assert!(ParameterKey::parse("/dev/").is_err());
        assert!(ParameterKey::new("dev", "ecs cluster").is_err());
    }

    #[test]
    fn test_key_serializes_as_path() {
        let key = ParameterKey::new("dev", ECS_CLUSTER).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"/dev/ecs_cluster\"");
    }
}
