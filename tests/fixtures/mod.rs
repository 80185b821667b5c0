// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-topology
//!
//! Deterministic deployment configurations. Every integration test builds
//! its stacks from these, never from ad-hoc literals.
#![allow(dead_code)]

use cim_topology::domain::Ipv4Cidr;
use cim_topology::stack::{build_application, build_foundation, FoundationExports};
use cim_topology::{ApplicationConfig, FoundationConfig, StackSpec};

pub const DEV_CIDR: &str = "10.0.0.0/16";
pub const PROD_CIDR: &str = "10.1.0.0/16";
pub const REGION: &str = "ap-southeast-1";
pub const PROFILE: &str = "aws-test";

pub fn cidr(block: &str) -> Ipv4Cidr {
    Ipv4Cidr::new(block).expect("Invalid CIDR in test fixture")
}

/// Foundation `dev` on 10.0.0.0/16
pub fn dev_foundation_config() -> FoundationConfig {
    FoundationConfig {
        name: "dev".to_string(),
        cidr: cidr(DEV_CIDR),
        region: REGION.to_string(),
        profile: PROFILE.to_string(),
        environment: "dev".to_string(),
        project: "idp".to_string(),
        cluster_name: "ecs-demo".to_string(),
        zone_count: 3,
        subnet_newbits: 8,
    }
}

/// Foundation `prod` on 10.1.0.0/16
pub fn prod_foundation_config() -> FoundationConfig {
    FoundationConfig {
        name: "prod".to_string(),
        cidr: cidr(PROD_CIDR),
        environment: "prod".to_string(),
        ..dev_foundation_config()
    }
}

/// nginx, 256 cpu, 512 memory, port 80, on `dev`
pub fn nginx_application_config() -> ApplicationConfig {
    ApplicationConfig {
        name: "dev-petapp".to_string(),
        foundation: "dev".to_string(),
        environment: "dev".to_string(),
        project: "petapp".to_string(),
        region: REGION.to_string(),
        profile: PROFILE.to_string(),
        image: "nginx".to_string(),
        cpu: 256,
        memory: 512,
        container_port: 80,
        listener_port: 80,
        desired_count: 1,
    }
}

pub fn dev_foundation() -> (StackSpec, FoundationExports) {
    build_foundation(&dev_foundation_config()).expect("Invalid foundation fixture")
}

pub fn nginx_application(foundation: &FoundationExports) -> StackSpec {
    build_application(&nginx_application_config(), foundation)
        .expect("Invalid application fixture")
        .stack
}
