// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment configuration
//!
//! One [`FoundationConfig`] per environment, any number of
//! [`ApplicationConfig`]s each pointing at the foundation it runs on.
//!
//! ```json
//! {
//!   "foundations": [{ "name": "dev", "cidr": "10.0.0.0/16", "environment": "dev" }],
//!   "applications": [{ "name": "dev-petapp", "foundation": "dev", "environment": "dev",
//!                      "image": "nginx", "cpu": 256, "memory": 512, "container_port": 80 }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::info;

use crate::domain::Ipv4Cidr;
use crate::errors::{TopologyError, TopologyResult};
use crate::parameters::CollisionPolicy;
use crate::plan::SynthesizedPlan;
use crate::stack::{build_application, build_foundation, compose_with, FoundationExports};

/// Environment variable naming a JSON configuration file
pub const CONFIG_ENV: &str = "TOPOLOGY_CONFIG";

const DEFAULT_REGION: &str = "ap-southeast-1";
const DEFAULT_PROFILE: &str = "aws-test";

/// Foundation stack: network, tier chain, cluster, shared parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoundationConfig {
    /// Stack name
    pub name: String,
    pub cidr: Ipv4Cidr,
    pub region: String,
    pub profile: String,
    pub environment: String,
    pub project: String,
    pub cluster_name: String,
    pub zone_count: u32,
    pub subnet_newbits: u8,
}

impl Default for FoundationConfig {
    fn default() -> Self {
        Self {
            name: "dev".to_string(),
            cidr: Ipv4Cidr::new_unchecked(Ipv4Addr::new(10, 0, 0, 0), 16),
            region: DEFAULT_REGION.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            environment: "dev".to_string(),
            project: "idp".to_string(),
            cluster_name: "ecs-demo".to_string(),
            zone_count: 3,
            subnet_newbits: 8,
        }
    }
}

impl FoundationConfig {
    /// Foundation for `environment` on `cidr` with every other field defaulted
    pub fn for_environment(environment: &str, cidr: Ipv4Cidr) -> Self {
        Self {
            name: environment.to_string(),
            environment: environment.to_string(),
            cidr,
            ..Self::default()
        }
    }
}

/// Application stack: one service on a foundation's cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Stack name
    pub name: String,
    /// Name of the foundation stack this application runs on
    pub foundation: String,
    pub environment: String,
    pub project: String,
    pub region: String,
    pub profile: String,
    pub image: String,
    pub cpu: i64,
    pub memory: i64,
    pub container_port: u16,
    pub listener_port: u16,
    pub desired_count: i64,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "dev-petapp".to_string(),
            foundation: "dev".to_string(),
            environment: "dev".to_string(),
            project: "petapp".to_string(),
            region: DEFAULT_REGION.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            image: "nginx".to_string(),
            cpu: 256,
            memory: 512,
            container_port: 80,
            listener_port: 80,
            desired_count: 1,
        }
    }
}

/// Everything one synthesis run composes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub foundations: Vec<FoundationConfig>,
    pub applications: Vec<ApplicationConfig>,
    pub collision_policy: CollisionPolicy,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        let cidr = |second: u8| Ipv4Cidr::new_unchecked(Ipv4Addr::new(10, second, 0, 0), 16);
        Self {
            foundations: vec![
                FoundationConfig::for_environment("dev", cidr(0)),
                FoundationConfig::for_environment("prod", cidr(1)),
            ],
            applications: vec![ApplicationConfig::default()],
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl DeploymentConfig {
    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> TopologyResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TopologyError::Configuration(format!("{}: {}", path.display(), e)))?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| TopologyError::Configuration(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded deployment configuration");
        Ok(config)
    }

    /// File named by `TOPOLOGY_CONFIG`, or the default deployment
    pub fn from_env() -> TopologyResult<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) => {
                info!("{} not set, using default deployment", CONFIG_ENV);
                Ok(Self::default())
            }
        }
    }

    /// Build every stack, foundations first, and compose them
    pub fn synthesize(&self) -> TopologyResult<SynthesizedPlan> {
        let mut stacks = Vec::with_capacity(self.foundations.len() + self.applications.len());
        let mut exports: Vec<FoundationExports> = Vec::with_capacity(self.foundations.len());

        for foundation in &self.foundations {
            let (stack, foundation_exports) = build_foundation(foundation)?;
            stacks.push(stack);
            exports.push(foundation_exports);
        }

        for application in &self.applications {
            let foundation = exports
                .iter()
                .find(|e| e.stack == application.foundation)
                .ok_or_else(|| {
                    TopologyError::Configuration(format!(
                        "application '{}' runs on unknown foundation '{}'",
                        application.name, application.foundation
                    ))
                })?;
            stacks.push(build_application(application, foundation)?.stack);
        }

        compose_with(stacks, self.collision_policy)
    }
}
