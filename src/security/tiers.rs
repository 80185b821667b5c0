// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tier chain construction
//!
//! Tiers are built front to back. Building a tier whose source tier does not
//! exist yet is a construction bug and fails with
//! [`TopologyError::UnresolvedTierReference`].

use super::{CidrRule, RulePreset, SecurityTier, SelfRule, SourceGroupRule, TierRole};
use crate::domain::Ipv4Cidr;
use crate::errors::{ConstructionError, TopologyError, TopologyResult};
use crate::plan::{NodeHandle, ResourceRef, Value};
use crate::stack::{NetworkHandle, StackBuilder};

/// A tier declared in a stack
#[derive(Debug, Clone, PartialEq)]
pub struct TierHandle {
    pub role: TierRole,
    pub node: NodeHandle,
    pub tier: SecurityTier,
}

impl TierHandle {
    /// The group's computed identity, the source of the next tier's rule
    pub fn identity(&self) -> ResourceRef {
        self.node.attr("security_group_id")
    }

    pub fn identity_value(&self) -> Value {
        Value::Ref(self.identity())
    }
}

/// The three tiers of one stack
#[derive(Debug, Clone, PartialEq)]
pub struct TierChain {
    pub public: TierHandle,
    pub application: TierHandle,
    pub data: TierHandle,
}

impl TierChain {
    pub fn tier(&self, role: TierRole) -> &TierHandle {
        match role {
            TierRole::Public => &self.public,
            TierRole::Application => &self.application,
            TierRole::Data => &self.data,
        }
    }
}

/// Per-tier switches for the "all from self" rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierChainOptions {
    pub public_self: bool,
    pub application_self: bool,
    pub data_self: bool,
}

impl Default for TierChainOptions {
    fn default() -> Self {
        Self {
            public_self: true,
            application_self: true,
            data_self: true,
        }
    }
}

impl TierChainOptions {
    fn self_rules(&self, role: TierRole) -> Vec<SelfRule> {
        let enabled = match role {
            TierRole::Public => self.public_self,
            TierRole::Application => self.application_self,
            TierRole::Data => self.data_self,
        };
        if enabled {
            vec![SelfRule { preset: RulePreset::AllAll }]
        } else {
            Vec::new()
        }
    }
}

/// Builds the chain one tier at a time
pub struct TierChainBuilder<'s> {
    stack: &'s mut StackBuilder,
    environment: String,
    network: Value,
    cidr: Ipv4Cidr,
    options: TierChainOptions,
    public: Option<TierHandle>,
    application: Option<TierHandle>,
    data: Option<TierHandle>,
}

impl<'s> TierChainBuilder<'s> {
    pub fn new(stack: &'s mut StackBuilder, network: &NetworkHandle, options: TierChainOptions) -> Self {
        Self {
            stack,
            environment: network.environment.clone(),
            network: network.vpc_id(),
            cidr: network.cidr,
            options,
            public: None,
            application: None,
            data: None,
        }
    }

    /// Public tier: web and secure-web from anywhere
    pub fn public(&mut self) -> TopologyResult<TierHandle> {
        let ingress = vec![
            CidrRule::new(RulePreset::Http80Tcp, [Ipv4Cidr::ANY]),
            CidrRule::new(RulePreset::Https443Tcp, [Ipv4Cidr::ANY]),
        ];
        let handle = self.declare(TierRole::Public, ingress)?;
        self.public = Some(handle.clone());
        Ok(handle)
    }

    /// Application tier: everything from the public tier's identity
    pub fn application(&mut self) -> TopologyResult<TierHandle> {
        let handle = self.declare(TierRole::Application, Vec::new())?;
        self.application = Some(handle.clone());
        Ok(handle)
    }

    /// Data tier: the stack's own block plus the application tier's identity
    pub fn data(&mut self) -> TopologyResult<TierHandle> {
        let ingress = vec![CidrRule::new(RulePreset::AllAll, [self.cidr])];
        let handle = self.declare(TierRole::Data, ingress)?;
        self.data = Some(handle.clone());
        Ok(handle)
    }

    pub fn finish(self) -> TopologyResult<TierChain> {
        let missing = |role: TierRole| ConstructionError::MissingField(format!("{} tier", role));
        Ok(TierChain {
            public: self.public.ok_or_else(|| missing(TierRole::Public))?,
            application: self.application.ok_or_else(|| missing(TierRole::Application))?,
            data: self.data.ok_or_else(|| missing(TierRole::Data))?,
        })
    }

    fn built(&self, role: TierRole) -> Option<&TierHandle> {
        match role {
            TierRole::Public => self.public.as_ref(),
            TierRole::Application => self.application.as_ref(),
            TierRole::Data => self.data.as_ref(),
        }
    }

    fn declare(&mut self, role: TierRole, ingress: Vec<CidrRule>) -> TopologyResult<TierHandle> {
        let computed_ingress = match role.source() {
            None => Vec::new(),
            Some(source) => {
                let source_tier = self.built(source).ok_or(TopologyError::UnresolvedTierReference {
                    tier: role,
                    requires: source,
                })?;
                vec![SourceGroupRule {
                    preset: RulePreset::AllAll,
                    source: source_tier.identity(),
                }]
            }
        };

        let self_rules = self.options.self_rules(role);
        let tier = SecurityTier {
            role,
            name: role.group_name(&self.environment),
            network: self.network.clone(),
            ingress,
            ingress_self: self_rules.clone(),
            computed_ingress,
            egress: vec![CidrRule::new(RulePreset::AllAll, [Ipv4Cidr::ANY])],
            egress_self: self_rules,
        };

        let node = self.stack.add(tier.to_node())?;
        Ok(TierHandle { role, node, tier })
    }
}

/// Build public, application and data tiers, in that order
pub fn build_tier_chain(stack: &mut StackBuilder, network: &NetworkHandle) -> TopologyResult<TierChain> {
    let mut builder = TierChainBuilder::new(stack, network, TierChainOptions::default());
    builder.public()?;
    builder.application()?;
    builder.data()?;
    builder.finish()
}
