// Copyright (c) 2025 - Cowboy AI, Inc.
//! Application stack
//!
//! One service on its foundation's cluster, fronted by a load balancer in
//! the public subnets, with an image repository and the build role that
//! pulls from it. Everything the foundation owns arrives as stack inputs.

use serde_json::json;
use tracing::info;

use super::foundation::{
    FoundationExports, APPLICATION_TIER_ID, CLUSTER_ID, CLUSTER_NAME, PRIVATE_SUBNETS, PUBLIC_SUBNETS,
    PUBLIC_TIER_ID, VPC_ID,
};
use super::network::declare_provider;
use super::{StackBuilder, StackSpec};
use crate::compute::{ClusterHandle, LoadBalancerBinding, NetworkBinding, PortMapping, ServiceHandle, ServiceSpec};
use crate::config::ApplicationConfig;
use crate::domain::ResourceKind;
use crate::errors::{TopologyError, TopologyResult};
use crate::parameters::{keys, ParameterType};
use crate::plan::{ResourceNode, Value};

/// A declared application stack and its service
#[derive(Debug, Clone)]
pub struct ApplicationStack {
    pub stack: StackSpec,
    pub service: ServiceHandle,
}

/// Declare the application stack described by `config` on `foundation`
pub fn build_application(config: &ApplicationConfig, foundation: &FoundationExports) -> TopologyResult<ApplicationStack> {
    if config.environment != foundation.environment {
        return Err(TopologyError::Configuration(format!(
            "application '{}' is in environment '{}' but foundation '{}' is in '{}'",
            config.name, config.environment, foundation.stack, foundation.environment
        )));
    }

    let mut stack = StackBuilder::new(config.name.clone())?;
    let env = config.environment.as_str();
    let prefix = format!("{}-{}", env, config.profile);

    declare_provider(&mut stack, &config.region, &config.profile)?;

    let vpc_id = stack.input(VPC_ID, foundation.input(VPC_ID))?;
    let public_subnets = stack.input(PUBLIC_SUBNETS, foundation.input(PUBLIC_SUBNETS))?;
    let private_subnets = stack.input(PRIVATE_SUBNETS, foundation.input(PRIVATE_SUBNETS))?;
    let cluster_id = stack.input(CLUSTER_ID, foundation.input(CLUSTER_ID))?;
    let cluster_name = stack.input(CLUSTER_NAME, foundation.input(CLUSTER_NAME))?;
    let public_tier = stack.input(PUBLIC_TIER_ID, foundation.input(PUBLIC_TIER_ID))?;
    let application_tier = stack.input(APPLICATION_TIER_ID, foundation.input(APPLICATION_TIER_ID))?;

    let repository_name = format!("{}-{}", env, config.project);
    let repository = stack.add(
        ResourceNode::new(format!("{}-ecr", prefix), ResourceKind::ContainerRepository)
            .with("name", repository_name.clone()),
    )?;

    let assume_role_policy = json!({
        "Version": "2008-10-17",
        "Statement": [{
            "Sid": "",
            "Effect": "Allow",
            "Principal": { "Service": "codebuild.amazonaws.com" },
            "Action": "sts:AssumeRole"
        }]
    });
    let role = stack.add(
        ResourceNode::new(format!("{}-role", prefix), ResourceKind::Role)
            .with("name", format!("{}-role", prefix))
            .with("assume_role_policy", serde_json::to_string(&assume_role_policy)?),
    )?;

    let pull_policy = json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Action": [
                "ecr:GetDownloadUrlForLayer",
                "ecr:BatchGetImage",
                "ecr:BatchCheckLayerAvailability"
            ],
            "Effect": "Allow",
            "Resource": "*"
        }]
    });
    stack.add(
        ResourceNode::new(format!("{}-role-policy", prefix), ResourceKind::RolePolicy)
            .with("name", format!("{}-policy", env))
            .with("role", role.value("id"))
            .with("policy", serde_json::to_string(&pull_policy)?),
    )?;

    let load_balancer = stack.add(
        ResourceNode::new(format!("{}-lb", prefix), ResourceKind::LoadBalancer)
            .with("name", format!("{}-lb", prefix))
            .with("load_balancer_type", "application")
            .with("security_groups", Value::list([public_tier]))
            .with("subnets", public_subnets),
    )?;

    let cluster = ClusterHandle::imported(cluster_id, cluster_name, foundation.capacity_mode);
    let service = cluster.create_service(
        &mut stack,
        ServiceSpec {
            name: config.project.clone(),
            container_name: config.project.clone(),
            image: config.image.clone(),
            cpu: config.cpu,
            memory: config.memory,
            port_mappings: vec![PortMapping::container(config.container_port)],
            desired_count: config.desired_count,
            network: NetworkBinding {
                vpc_id,
                subnets: private_subnets,
                security_groups: vec![application_tier],
                assign_public_ip: false,
            },
            load_balancer: LoadBalancerBinding {
                load_balancer_arn: load_balancer.value("arn"),
                listener_port: config.listener_port,
                container_port: config.container_port,
            },
        },
    )?;

    stack.publish(env, keys::IMAGE_REPO_NAME, repository_name.as_str(), ParameterType::String)?;
    stack.publish(
        env,
        keys::TASK_DEFINITION_CONTAINER_NAME,
        service.container_name.as_str(),
        ParameterType::String,
    )?;
    stack.publish(env, keys::ECS_SERVICE, service.name.as_str(), ParameterType::String)?;

    stack.output("service_name", service.name.as_str())?;
    stack.output("repository_url", repository.value("repository_url"))?;
    stack.output("load_balancer_dns", load_balancer.value("dns_name"))?;

    let spec = stack.build();
    info!(
        stack = %spec.name(),
        foundation = %foundation.stack,
        service = %service.name,
        image = %config.image,
        "Declared application stack"
    );

    Ok(ApplicationStack { stack: spec, service })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::CapacityMode;
    use crate::stack::StackInput;
    use std::collections::BTreeSet;

    fn dev_foundation() -> FoundationExports {
        FoundationExports {
            stack: "dev".into(),
            environment: "dev".into(),
            region: "ap-southeast-1".into(),
            capacity_mode: CapacityMode::Fargate,
        }
    }

    #[test]
    fn test_inputs_come_from_foundation() {
        let app = build_application(&ApplicationConfig::default(), &dev_foundation()).unwrap();

        assert_eq!(
            app.stack.inputs().get(CLUSTER_ID),
            Some(&StackInput::output("dev", CLUSTER_ID))
        );
        assert_eq!(app.stack.upstream(), BTreeSet::from(["dev".to_string()]));
    }

    #[test]
    fn test_policies_are_encoded_documents() {
        let app = build_application(&ApplicationConfig::default(), &dev_foundation()).unwrap();
        let role = app.stack.node("dev-aws-test-role").unwrap();

        let encoded = role.attribute("assume_role_policy").and_then(Value::as_str).unwrap();
        let document: serde_json::Value = serde_json::from_str(encoded).unwrap();
        assert_eq!(document["Statement"][0]["Principal"]["Service"], "codebuild.amazonaws.com");
    }

    #[test]
    fn test_application_publishes_well_known_keys() {
        let app = build_application(&ApplicationConfig::default(), &dev_foundation()).unwrap();
        let keys: Vec<String> = app.stack.publications().iter().map(|p| p.key.path()).collect();
        assert_eq!(
            keys,
            vec![
                "/dev/image_repo_name",
                "/dev/task_definition_container_name",
                "/dev/ecs_service"
            ]
        );
    }

    #[test]
    fn test_environment_mismatch() {
        let config = ApplicationConfig {
            environment: "prod".into(),
            ..ApplicationConfig::default()
        };
        assert!(matches!(
            build_application(&config, &dev_foundation()),
            Err(TopologyError::Configuration(_))
        ));
    }
}
