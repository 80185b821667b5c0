// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Subnet Partitioning

use cim_topology::domain::{Ipv4Cidr, SubnetGroup, SubnetLayout};
use proptest::prelude::*;
use std::net::Ipv4Addr;

// ============================================================================
// Generators
// ============================================================================

/// Canonical block with a prefix between /8 and /24
fn arb_block() -> impl Strategy<Value = Ipv4Cidr> {
    (any::<u32>(), 8u8..=24).prop_map(|(bits, prefix)| {
        let mask = u32::MAX << (32 - prefix);
        Ipv4Cidr::from_parts(Ipv4Addr::from(bits & mask), prefix).expect("masked block is canonical")
    })
}

/// Layout that fits in a block of `prefix` bits
fn arb_layout(prefix: u8) -> impl Strategy<Value = SubnetLayout> {
    let max_newbits = (32 - prefix).min(8);
    (1u32..=6).prop_flat_map(move |zone_count| {
        let stride = zone_count.next_power_of_two();
        let min_newbits = (stride * 3).next_power_of_two().trailing_zeros() as u8;
        (Just(zone_count), Just(stride), min_newbits..=max_newbits.max(min_newbits))
    })
    .prop_map(|(zone_count, group_stride, newbits)| SubnetLayout {
        newbits,
        group_stride,
        zone_count,
    })
}

fn arb_block_and_layout() -> impl Strategy<Value = (Ipv4Cidr, SubnetLayout)> {
    arb_block().prop_flat_map(|block| (Just(block), arb_layout(block.prefix_len())))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Every subnet of every group lies inside the block
    #[test]
    fn prop_subnets_contained((block, layout) in arb_block_and_layout()) {
        prop_assume!(block.prefix_len() + layout.newbits <= 32);
        let groups = layout.partition(&block).unwrap();

        for subnet in groups.all() {
            prop_assert!(block.contains(subnet), "{} outside {}", subnet, block);
        }
    }

    /// No two subnets overlap, within or across groups
    #[test]
    fn prop_subnets_disjoint((block, layout) in arb_block_and_layout()) {
        prop_assume!(block.prefix_len() + layout.newbits <= 32);
        let groups = layout.partition(&block).unwrap();
        let all: Vec<_> = groups.all().collect();

        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                prop_assert!(!a.overlaps(b), "{} overlaps {}", a, b);
            }
        }
    }

    /// Each group spans one subnet per zone
    #[test]
    fn prop_one_subnet_per_zone((block, layout) in arb_block_and_layout()) {
        prop_assume!(block.prefix_len() + layout.newbits <= 32);
        let groups = layout.partition(&block).unwrap();

        for group in SubnetGroup::ALL {
            prop_assert_eq!(groups.group(group).len(), layout.zone_count as usize);
        }
    }

    /// Partitioning is deterministic
    #[test]
    fn prop_partition_deterministic((block, layout) in arb_block_and_layout()) {
        prop_assume!(block.prefix_len() + layout.newbits <= 32);
        prop_assert_eq!(layout.partition(&block).unwrap(), layout.partition(&block).unwrap());
    }

    /// A layout that does not fit is rejected, never truncated
    #[test]
    fn prop_oversized_layout_rejected(block in arb_block()) {
        let layout = SubnetLayout {
            newbits: 1,
            group_stride: 4,
            zone_count: 3,
        };
        prop_assert!(layout.partition(&block).is_err());
    }
}
