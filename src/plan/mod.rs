// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plan Graph
//!
//! Typed resource declarations joined by reference edges.
//!
//! ```text
//! ResourceNode ──attribute──> Value::Ref(ResourceRef) ──points at──> ResourceNode
//!      │                                                              (same or
//!      └─────────── depends_on (explicit ordering edge) ──────────>   upstream stack)
//! ```
//!
//! The plan's correctness contract is that a valid topological order
//! exists; [`SynthesizedPlan`] carries one, but the reconciliation engine is
//! free to compute its own from the declared edges.

pub mod document;
pub mod graph;
pub mod node;
pub mod value;

pub use document::{PlannedNode, StackSummary, SynthesizedPlan, PLAN_FORMAT_VERSION};
pub use graph::topological_order;
pub use node::{NodeHandle, ResourceNode};
pub use value::{NodeAddress, ResourceRef, Value};
