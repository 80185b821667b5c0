// Copyright (c) 2025 - Cowboy AI, Inc.
//! Security Tier Chain
//!
//! Three security groups layered so each tier only admits traffic from the
//! tier in front of it.
//!
//! ```text
//! internet ──http/https──> public ──all from public id──> application
//!                                                              │
//!          stack block ──all──> data <──all from application id┘
//! ```
//!
//! # Rule classes
//!
//! - [`CidrRule`]: protocol preset admitted from address blocks
//! - [`SelfRule`]: "all from self", for intra-tier health checks (optional per tier)
//! - [`SourceGroupRule`]: computed rule whose source is another tier's identity
//!
//! The classes are kept in separate lists. Only [`SourceGroupRule`]s carry
//! the reference edge that orders one tier after another.

pub mod tiers;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Ipv4Cidr, ResourceKind};
use crate::plan::{ResourceNode, ResourceRef, Value};

pub use tiers::{build_tier_chain, TierChain, TierChainBuilder, TierChainOptions, TierHandle};

/// Position of a tier in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierRole {
    Public,
    Application,
    Data,
}

impl TierRole {
    /// Chain order, front to back
    pub const ALL: [TierRole; 3] = [TierRole::Public, TierRole::Application, TierRole::Data];

    pub fn as_str(&self) -> &'static str {
        match self {
            TierRole::Public => "public",
            TierRole::Application => "application",
            TierRole::Data => "data",
        }
    }

    /// Tier whose identity this tier admits traffic from
    pub fn source(&self) -> Option<TierRole> {
        match self {
            TierRole::Public => None,
            TierRole::Application => Some(TierRole::Public),
            TierRole::Data => Some(TierRole::Application),
        }
    }

    /// Security group name within an environment
    pub fn group_name(&self, environment: &str) -> String {
        let suffix = match self {
            TierRole::Public => "sg-public",
            TierRole::Application => "sg-app",
            TierRole::Data => "sg-data",
        };
        format!("{}-{}", environment, suffix)
    }
}

impl fmt::Display for TierRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named protocol preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RulePreset {
    #[serde(rename = "all-all")]
    AllAll,
    #[serde(rename = "http-80-tcp")]
    Http80Tcp,
    #[serde(rename = "https-443-tcp")]
    Https443Tcp,
}

impl RulePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            RulePreset::AllAll => "all-all",
            RulePreset::Http80Tcp => "http-80-tcp",
            RulePreset::Https443Tcp => "https-443-tcp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidrRule {
    pub preset: RulePreset,
    pub cidr_blocks: Vec<Ipv4Cidr>,
}

impl CidrRule {
    pub fn new(preset: RulePreset, cidr_blocks: impl IntoIterator<Item = Ipv4Cidr>) -> Self {
        Self {
            preset,
            cidr_blocks: cidr_blocks.into_iter().collect(),
        }
    }

    fn to_value(&self) -> Value {
        Value::map([
            ("rule", Value::from(self.preset.as_str())),
            (
                "cidr_blocks",
                Value::list(self.cidr_blocks.iter().map(|c| c.to_string())),
            ),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfRule {
    pub preset: RulePreset,
}

impl SelfRule {
    fn to_value(self) -> Value {
        Value::map([("rule", self.preset.as_str())])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceGroupRule {
    pub preset: RulePreset,
    /// Identity of the source tier
    pub source: ResourceRef,
}

impl SourceGroupRule {
    fn to_value(&self) -> Value {
        Value::map([
            ("rule", Value::from(self.preset.as_str())),
            ("source_security_group_id", Value::Ref(self.source.clone())),
        ])
    }
}

/// An inbound rule that admits traffic from outside the tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Cidr(CidrRule),
    SourceGroup(SourceGroupRule),
}

/// One security group of the chain
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityTier {
    pub role: TierRole,
    pub name: String,
    /// Network the group lives in
    pub network: Value,
    pub ingress: Vec<CidrRule>,
    pub ingress_self: Vec<SelfRule>,
    pub computed_ingress: Vec<SourceGroupRule>,
    pub egress: Vec<CidrRule>,
    pub egress_self: Vec<SelfRule>,
}

impl SecurityTier {
    /// Inbound rules from outside the tier; self rules are not included
    pub fn inbound_allow(&self) -> Vec<Rule> {
        self.ingress
            .iter()
            .cloned()
            .map(Rule::Cidr)
            .chain(self.computed_ingress.iter().cloned().map(Rule::SourceGroup))
            .collect()
    }

    pub fn outbound_allow(&self) -> Vec<Rule> {
        self.egress.iter().cloned().map(Rule::Cidr).collect()
    }

    pub(crate) fn to_node(&self) -> ResourceNode {
        ResourceNode::new(self.name.clone(), ResourceKind::SecurityGroup)
            .with("name", self.name.clone())
            .with("vpc_id", self.network.clone())
            .with("ingress_with_cidr_blocks", Value::list(self.ingress.iter().map(CidrRule::to_value)))
            .with("ingress_with_self", Value::list(self.ingress_self.iter().map(|r| r.to_value())))
            .with(
                "computed_ingress_with_source_security_group_id",
                Value::list(self.computed_ingress.iter().map(SourceGroupRule::to_value)),
            )
            .with(
                "number_of_computed_ingress_with_source_security_group_id",
                self.computed_ingress.len() as i64,
            )
            .with("egress_with_cidr_blocks", Value::list(self.egress.iter().map(CidrRule::to_value)))
            .with("egress_with_self", Value::list(self.egress_self.iter().map(|r| r.to_value())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_follow_chain_order() {
        assert_eq!(TierRole::Public.source(), None);
        assert_eq!(TierRole::Application.source(), Some(TierRole::Public));
        assert_eq!(TierRole::Data.source(), Some(TierRole::Application));
    }

    #[test]
    fn test_group_names() {
        assert_eq!(TierRole::Public.group_name("dev"), "dev-sg-public");
        assert_eq!(TierRole::Application.group_name("dev"), "dev-sg-app");
        assert_eq!(TierRole::Data.group_name("prod"), "prod-sg-data");
    }

    #[test]
    fn test_preset_serializes_as_rule_name() {
        assert_eq!(serde_json::to_string(&RulePreset::Https443Tcp).unwrap(), "\"https-443-tcp\"");
    }
}
