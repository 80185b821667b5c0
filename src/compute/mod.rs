// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cluster & Service Model
//!
//! One shared cluster per foundation stack, any number of services per
//! application stack. A service is always created together with its task
//! specification and load balancer binding.

pub mod cluster;
pub mod service;
pub mod task;

pub use cluster::{create_cluster, CapacityMode, ClusterHandle};
pub use service::{LoadBalancerBinding, NetworkBinding, ServiceHandle, ServiceSpec};
pub use task::{ComputeUnits, ContainerSpec, PortMapping, TaskSpec};
