// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Tier Chain Ordering

use cim_topology::domain::{Ipv4Cidr, SubnetLayout};
use cim_topology::security::{build_tier_chain, TierChainBuilder, TierChainOptions, TierRole};
use cim_topology::stack::{declare_network, NetworkHandle, NetworkSpec};
use cim_topology::{StackBuilder, TopologyError};
use proptest::prelude::*;
use std::net::Ipv4Addr;

fn arb_environment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

fn arb_block() -> impl Strategy<Value = Ipv4Cidr> {
    (any::<u8>(), any::<u8>()).prop_map(|(a, b)| {
        Ipv4Cidr::from_parts(Ipv4Addr::new(10, a, b & 0xf0, 0), 20).expect("masked block is canonical")
    })
}

fn arb_role_sequence() -> impl Strategy<Value = Vec<TierRole>> {
    prop::collection::vec(prop::sample::select(TierRole::ALL.to_vec()), 1..6)
}

fn network(stack: &mut StackBuilder, environment: &str, cidr: Ipv4Cidr) -> NetworkHandle {
    declare_network(
        stack,
        &NetworkSpec {
            environment: environment.to_string(),
            profile: "aws-test".to_string(),
            region: "ap-southeast-1".to_string(),
            cidr,
            layout: SubnetLayout {
                newbits: 4,
                group_stride: 4,
                zone_count: 3,
            },
        },
    )
    .expect("valid network")
}

proptest! {
    /// Application admits exactly public's identity, data exactly application's
    #[test]
    fn prop_chain_links_are_fixed(environment in arb_environment(), cidr in arb_block()) {
        let mut stack = StackBuilder::new(environment.clone()).unwrap();
        let handle = network(&mut stack, &environment, cidr);
        let chain = build_tier_chain(&mut stack, &handle).unwrap();

        let app_sources: Vec<_> = chain.application.tier.computed_ingress.iter().map(|r| r.source.clone()).collect();
        let data_sources: Vec<_> = chain.data.tier.computed_ingress.iter().map(|r| r.source.clone()).collect();

        prop_assert_eq!(app_sources, vec![chain.public.identity()]);
        prop_assert_eq!(data_sources, vec![chain.application.identity()]);
        prop_assert!(chain.public.tier.computed_ingress.is_empty());
        prop_assert_eq!(&chain.data.tier.ingress[0].cidr_blocks, &vec![cidr]);
    }

    /// Any build sequence succeeds exactly for the tiers whose source is
    /// already built, and fails fast otherwise
    #[test]
    fn prop_chain_order_is_not_permutable(roles in arb_role_sequence()) {
        let mut stack = StackBuilder::new("dev").unwrap();
        let handle = network(&mut stack, "dev", Ipv4Cidr::new("10.0.0.0/16").unwrap());
        let mut builder = TierChainBuilder::new(&mut stack, &handle, TierChainOptions::default());
        let mut built: Vec<TierRole> = Vec::new();

        for role in roles {
            if built.contains(&role) {
                continue;
            }
            let result = match role {
                TierRole::Public => builder.public(),
                TierRole::Application => builder.application(),
                TierRole::Data => builder.data(),
            };
            match role.source() {
                Some(source) if !built.contains(&source) => {
                    let is_unresolved = matches!(
                        result,
                        Err(TopologyError::UnresolvedTierReference { tier, requires }) if tier == role && requires == source
                    );
                    prop_assert!(is_unresolved);
                }
                _ => {
                    prop_assert!(result.is_ok());
                    built.push(role);
                }
            }
        }
    }
}
