//! Error types for topology composition

use thiserror::Error;

use crate::security::TierRole;

/// Malformed declarations detected while building stacks or composing them
///
/// These never reach an external system: the plan is not produced when any
/// of them is raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// Required field is missing or empty
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Identifier unusable as a resource name or key segment
    #[error("Invalid name for {field}: '{value}'")]
    InvalidName { field: String, value: String },

    /// Address block is not a canonical IPv4 CIDR
    #[error("Invalid CIDR block: {0}")]
    InvalidCidr(String),

    /// Requested subnet layout does not fit in the address block
    #[error("Subnet layout does not fit in {cidr}: {reason}")]
    SubnetLayout { cidr: String, reason: String },

    /// Numeric field outside its valid range
    #[error("Invalid value for {field}: {value}")]
    InvalidNumber { field: String, value: i64 },

    /// Task declared without any port mapping
    #[error("Task '{0}' has no port mappings")]
    EmptyPortMappings(String),

    /// Load balancer binding targets a port the task does not expose
    #[error("Load balancer port {port} is not mapped by task '{task}'")]
    UnmappedPort { task: String, port: u16 },

    /// Two stacks share a name
    #[error("Duplicate stack: {0}")]
    DuplicateStack(String),

    /// Two resources share an id within one stack
    #[error("Duplicate resource '{resource}' in stack '{stack}'")]
    DuplicateResource { stack: String, resource: String },

    /// Reference to a stack that is not part of the composition
    #[error("Stack '{from}' references unknown stack '{to}'")]
    UnknownStack { from: String, to: String },

    /// Reference to an output the upstream stack does not declare
    #[error("Stack '{stack}' has no output named '{output}'")]
    UnknownOutput { stack: String, output: String },

    /// Attribute uses an input the stack never declared
    #[error("Stack '{stack}' uses undeclared input '{input}'")]
    UnknownInput { stack: String, input: String },

    /// Reference to a resource that does not exist in its stack
    #[error("Unresolved reference to '{stack}/{resource}' from '{from}'")]
    UnresolvedReference {
        from: String,
        stack: String,
        resource: String,
    },

    /// Resources of one stack reference each other in a cycle
    #[error("Cyclic resource dependency in stack '{stack}' involving '{resource}'")]
    CyclicResourceDependency { stack: String, resource: String },

    /// Parameter key does not follow `/{environment}/{logical_name}`
    #[error("Invalid parameter key: {0}")]
    InvalidParameterKey(String),

    /// Template placeholder survived substitution
    #[error("Unexpanded placeholder in {field}: {value}")]
    UnexpandedPlaceholder { field: String, value: String },
}

/// Errors that can occur while composing a topology
#[derive(Debug, Error)]
pub enum TopologyError {
    /// Malformed stack declaration
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    /// A stack references a stack that is not declared strictly before it
    #[error("Cyclic stack dependency: stack '{from}' references '{to}' which is not declared before it")]
    CyclicStackDependency { from: String, to: String },

    /// A security tier was built before the tier it is sourced from
    #[error("Unresolved tier reference: the {tier} tier requires the {requires} tier to be built first")]
    UnresolvedTierReference { tier: TierRole, requires: TierRole },

    /// Two publications of one key under the rejecting collision policy
    #[error("Parameter key collision on {key}: published by '{previous}' and '{current}'")]
    ParameterKeyCollision {
        key: String,
        previous: String,
        current: String,
    },

    /// Apply-time parameter store failure
    #[error("Parameter store error: {0}")]
    ParameterStore(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for topology operations
pub type TopologyResult<T> = Result<T, TopologyError>;

impl From<serde_json::Error> for TopologyError {
    fn from(err: serde_json::Error) -> Self {
        TopologyError::Serialization(err.to_string())
    }
}
