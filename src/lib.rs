//! Deployment topology composition for the Composable Information Machine
//!
//! Declares a multi-tier cloud deployment as ordered stacks (a foundation
//! per environment, applications on top) and composes them into one
//! immutable plan for an external reconciliation engine. Identifiers flow
//! between stacks as references and, out of band, through a parameter store.

pub mod compute;
pub mod config;
pub mod domain;
pub mod errors;
pub mod parameters;
pub mod plan;
pub mod security;
pub mod stack;

// Re-export commonly used types
pub use config::{ApplicationConfig, DeploymentConfig, FoundationConfig};
pub use errors::{ConstructionError, TopologyError, TopologyResult};
pub use parameters::{CollisionPolicy, ParameterRegistry, ParameterStore};
pub use plan::{ResourceRef, SynthesizedPlan, Value};
pub use stack::{compose, compose_with, StackBuilder, StackInput, StackSpec};
