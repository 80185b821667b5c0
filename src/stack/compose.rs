// Copyright (c) 2025 - Cowboy AI, Inc.
//! Composition of ordered stacks into one plan
//!
//! Stacks are synthesized in declaration order. A stack may consume outputs
//! of, and reference nodes in, stacks declared strictly before it; inside a
//! stack, references may point forward by name. Composition either returns a
//! complete plan or the first construction error: nothing partial escapes.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

use super::{StackInput, StackSpec};
use crate::errors::{ConstructionError, TopologyError, TopologyResult};
use crate::parameters::{CollisionPolicy, ParameterRegistry};
use crate::plan::{topological_order, NodeAddress, PlannedNode, ResourceRef, StackSummary, SynthesizedPlan, Value};

/// Compose `stacks` with the default (overwrite) parameter collision policy
pub fn compose(stacks: Vec<StackSpec>) -> TopologyResult<SynthesizedPlan> {
    compose_with(stacks, CollisionPolicy::default())
}

/// Compose `stacks`, handling repeated parameter keys per `policy`
pub fn compose_with(stacks: Vec<StackSpec>, policy: CollisionPolicy) -> TopologyResult<SynthesizedPlan> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (position, stack) in stacks.iter().enumerate() {
        if positions.insert(stack.name().to_string(), position).is_some() {
            return Err(ConstructionError::DuplicateStack(stack.name().to_string()).into());
        }
    }

    let declared: HashMap<&str, BTreeSet<&str>> = stacks
        .iter()
        .map(|s| (s.name(), s.nodes().iter().map(|n| n.id.as_str()).collect()))
        .collect();

    let scope = Scope {
        positions: &positions,
        declared: &declared,
    };

    let mut summaries: Vec<StackSummary> = Vec::with_capacity(stacks.len());
    let mut nodes: Vec<PlannedNode> = Vec::new();
    let mut registry = ParameterRegistry::new(policy);

    for (position, stack) in stacks.iter().enumerate() {
        let (summary, stack_nodes) = synthesize_stack(position, stack, &scope, &summaries, &mut registry)?;
        info!(
            stack = %summary.name,
            nodes = stack_nodes.len(),
            upstream = ?summary.upstream,
            "Synthesized stack"
        );
        summaries.push(summary);
        nodes.extend(stack_nodes);
    }

    let addresses: Vec<NodeAddress> = nodes.iter().map(PlannedNode::address).collect();
    let edges: BTreeMap<NodeAddress, BTreeSet<NodeAddress>> =
        nodes.iter().map(|n| (n.address(), n.depends_on.clone())).collect();

    let execution_order = topological_order(&addresses, &edges).map_err(|stuck| {
        ConstructionError::CyclicResourceDependency {
            stack: stuck.stack,
            resource: stuck.resource,
        }
    })?;

    let plan = SynthesizedPlan::new(summaries, nodes, execution_order, registry);
    info!(
        plan_id = %plan.plan_id,
        stacks = plan.stacks().len(),
        nodes = plan.nodes().len(),
        parameters = plan.parameters().len(),
        collisions = plan.collisions().len(),
        "Composed plan"
    );
    Ok(plan)
}

/// What every stack can see of the composition
struct Scope<'a> {
    positions: &'a HashMap<String, usize>,
    declared: &'a HashMap<&'a str, BTreeSet<&'a str>>,
}

impl Scope<'_> {
    /// Position of `to`, which `from` (at `position`) may only consume when
    /// it is declared strictly earlier
    fn upstream_position(&self, position: usize, from: &str, to: &str) -> TopologyResult<usize> {
        match self.positions.get(to) {
            None => Err(ConstructionError::UnknownStack {
                from: from.to_string(),
                to: to.to_string(),
            }
            .into()),
            Some(&p) if p >= position => Err(TopologyError::CyclicStackDependency {
                from: from.to_string(),
                to: to.to_string(),
            }),
            Some(&p) => Ok(p),
        }
    }

    /// Check one reference made by `origin` inside stack `stack`
    fn check_reference(&self, position: usize, stack: &str, origin: &str, reference: &ResourceRef) -> TopologyResult<()> {
        if reference.stack != stack {
            self.upstream_position(position, stack, &reference.stack)?;
        }

        let exists = self
            .declared
            .get(reference.stack.as_str())
            .is_some_and(|ids| ids.contains(reference.resource.as_str()));

        if !exists {
            return Err(ConstructionError::UnresolvedReference {
                from: origin.to_string(),
                stack: reference.stack.clone(),
                resource: reference.resource.clone(),
            }
            .into());
        }
        Ok(())
    }
}

fn synthesize_stack(
    position: usize,
    stack: &StackSpec,
    scope: &Scope<'_>,
    upstream_summaries: &[StackSummary],
    registry: &mut ParameterRegistry,
) -> TopologyResult<(StackSummary, Vec<PlannedNode>)> {
    let name = stack.name().to_string();

    // Inputs first: every later substitution reads them.
    let mut inputs: BTreeMap<String, Value> = BTreeMap::new();
    for (input, source) in stack.inputs() {
        let value = match source {
            StackInput::Literal(value) => value.clone(),
            StackInput::Output { stack: upstream, output } => {
                let p = scope.upstream_position(position, &name, upstream)?;
                upstream_summaries[p]
                    .outputs
                    .get(output)
                    .cloned()
                    .ok_or_else(|| ConstructionError::UnknownOutput {
                        stack: upstream.clone(),
                        output: output.clone(),
                    })?
            }
        };
        inputs.insert(input.clone(), value);
    }

    let substitute = |value: &Value| -> Result<Value, ConstructionError> {
        value
            .resolve_inputs(&|input: &str| inputs.get(input).cloned())
            .map_err(|input| ConstructionError::UnknownInput {
                stack: name.clone(),
                input,
            })
    };

    let (_, _, nodes, outputs, publications) = stack.clone().into_parts();

    let mut resolved_nodes = Vec::with_capacity(nodes.len());
    for mut node in nodes {
        for value in node.attributes.values_mut() {
            *value = substitute(value)?;
        }
        let origin = format!("{}/{}", name, node.id);
        for reference in node.references() {
            scope.check_reference(position, &name, &origin, reference)?;
        }
        resolved_nodes.push(node);
    }

    let mut resolved_outputs = BTreeMap::new();
    for (output, value) in outputs {
        let value = substitute(&value)?;
        let origin = format!("{} output {}", name, output);
        for reference in value.references() {
            scope.check_reference(position, &name, &origin, reference)?;
        }
        resolved_outputs.insert(output, value);
    }

    // In-stack forward references are fine; in-stack cycles are not.
    let planned: Vec<PlannedNode> = resolved_nodes
        .into_iter()
        .map(|node| PlannedNode::from_node(&name, node))
        .collect();
    let addresses: Vec<NodeAddress> = planned.iter().map(PlannedNode::address).collect();
    let edges: BTreeMap<NodeAddress, BTreeSet<NodeAddress>> =
        planned.iter().map(|n| (n.address(), n.depends_on.clone())).collect();
    topological_order(&addresses, &edges).map_err(|stuck| ConstructionError::CyclicResourceDependency {
        stack: stuck.stack,
        resource: stuck.resource,
    })?;

    for mut parameter in publications {
        parameter.value = substitute(&parameter.value)?;
        registry.publish_parameter(parameter)?;
    }

    let summary = StackSummary {
        name: name.clone(),
        upstream: stack.upstream(),
        outputs: resolved_outputs,
    };
    Ok((summary, planned))
}
