// Copyright (c) 2025 - Cowboy AI, Inc.
//! Dependency ordering
//!
//! Kahn's algorithm over node addresses. Ties are broken by declaration
//! order, so the same declarations always produce the same order.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::value::NodeAddress;

/// Order `nodes` so every node comes after its dependencies
///
/// `edges` maps a node to the nodes it depends on. Dependencies outside
/// `nodes` are ignored, which lets one stack be ordered on its own while it
/// still points at upstream stacks.
///
/// # Errors
/// Returns the first node, in declaration order, that sits on or behind a cycle.
pub fn topological_order(
    nodes: &[NodeAddress],
    edges: &BTreeMap<NodeAddress, BTreeSet<NodeAddress>>,
) -> Result<Vec<NodeAddress>, NodeAddress> {
    let position: HashMap<&NodeAddress, usize> =
        nodes.iter().enumerate().map(|(i, n)| (n, i)).collect();

    let mut in_degree = vec![0usize; nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

    for (index, node) in nodes.iter().enumerate() {
        let Some(dependencies) = edges.get(node) else {
            continue;
        };
        for dependency in dependencies {
            if let Some(&upstream) = position.get(dependency) {
                in_degree[index] += 1;
                dependents[upstream].push(index);
            }
        }
    }

    let mut ready: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(index) = ready.pop_front() {
        order.push(nodes[index].clone());
        for &dependent in &dependents[index] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push_back(dependent);
            }
        }
    }

    if order.len() < nodes.len() {
        let stuck = (0..nodes.len())
            .find(|&i| in_degree[i] > 0)
            .map(|i| nodes[i].clone())
            .unwrap_or_else(|| nodes[0].clone());
        return Err(stuck);
    }

    Ok(order)
}
