// Copyright (c) 2025 - Cowboy AI, Inc.
//! Services and their load balancer binding
//!
//! [`ClusterHandle::create_service`] declares four nodes in one call:
//!
//! ```text
//! task definition <──task_definition── service ──cluster──> cluster
//!                                         │
//! target group <──target_group_arn────────┤
//!      ^                                  └── after ──> listener
//!      └──────── default_action ── listener ──> load balancer
//! ```
//!
//! Everything is validated before the first node is added, so a failed call
//! leaves the stack untouched and a service never exists without its task.

use tracing::debug;

use super::cluster::ClusterHandle;
use super::task::{PortMapping, TaskSpec};
use crate::domain::invariants::{validate_name, validate_port};
use crate::domain::ResourceKind;
use crate::errors::{ConstructionError, TopologyResult};
use crate::plan::{NodeHandle, ResourceNode, ResourceRef, Value};
use crate::stack::StackBuilder;

/// Where service tasks attach to the network
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkBinding {
    pub vpc_id: Value,
    pub subnets: Value,
    pub security_groups: Vec<Value>,
    pub assign_public_ip: bool,
}

/// Which load balancer fronts the service, and on which ports
#[derive(Debug, Clone, PartialEq)]
pub struct LoadBalancerBinding {
    pub load_balancer_arn: Value,
    pub listener_port: u16,
    /// Must be one of the task's mapped container ports
    pub container_port: u16,
}

/// Caller's description of a service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSpec {
    pub name: String,
    pub container_name: String,
    pub image: String,
    pub cpu: i64,
    pub memory: i64,
    pub port_mappings: Vec<PortMapping>,
    pub desired_count: i64,
    pub network: NetworkBinding,
    pub load_balancer: LoadBalancerBinding,
}

/// A declared service and the nodes created with it
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceHandle {
    pub name: String,
    pub container_name: String,
    pub container_port: u16,
    pub service: NodeHandle,
    pub task: NodeHandle,
    pub target_group: NodeHandle,
    pub listener: NodeHandle,
}

impl ServiceHandle {
    pub fn identity(&self) -> Value {
        self.service.value("id")
    }

    /// What the service node points at for its task
    pub fn task_reference(&self) -> ResourceRef {
        self.task.attr("arn")
    }
}

impl ClusterHandle {
    /// Declare a service on this cluster together with its task, target
    /// group and listener
    pub fn create_service(&self, stack: &mut StackBuilder, spec: ServiceSpec) -> TopologyResult<ServiceHandle> {
        validate_name("service name", &spec.name)?;
        validate_port("listener port", spec.load_balancer.listener_port)?;
        if spec.desired_count < 0 {
            return Err(ConstructionError::InvalidNumber {
                field: "desired count".to_string(),
                value: spec.desired_count,
            }
            .into());
        }

        let task = TaskSpec::new(
            &spec.name,
            &spec.container_name,
            &spec.image,
            spec.cpu,
            spec.memory,
            spec.port_mappings.clone(),
        )?;
        if !task.exposes(spec.load_balancer.container_port) {
            return Err(ConstructionError::UnmappedPort {
                task: task.family.clone(),
                port: spec.load_balancer.container_port,
            }
            .into());
        }

        let ids = ServiceIds::new(&spec.name);
        if let Some(taken) = ids.all().into_iter().find(|id| stack.contains(id)) {
            return Err(ConstructionError::DuplicateResource {
                stack: stack.name().to_string(),
                resource: taken.to_string(),
            }
            .into());
        }
        let task_node = task.to_node(ids.task.clone())?;

        let task = stack.add(task_node)?;

        let target_group = stack.add(
            ResourceNode::new(ids.target_group.clone(), ResourceKind::TargetGroup)
                .with("name", ids.target_group.clone())
                .with("port", spec.load_balancer.container_port)
                .with("protocol", "HTTP")
                .with("target_type", "ip")
                .with("vpc_id", spec.network.vpc_id.clone()),
        )?;

        let listener = stack.add(
            ResourceNode::new(ids.listener.clone(), ResourceKind::Listener)
                .with("load_balancer_arn", spec.load_balancer.load_balancer_arn.clone())
                .with("port", spec.load_balancer.listener_port)
                .with("protocol", "HTTP")
                .with(
                    "default_action",
                    Value::list([Value::map([
                        ("type", Value::from("forward")),
                        ("target_group_arn", target_group.value("arn")),
                    ])]),
                ),
        )?;

        let service = stack.add(
            ResourceNode::new(ids.service.clone(), ResourceKind::Service)
                .with("name", spec.name.clone())
                .with("cluster", self.identity.clone())
                .with("task_definition", task.value("arn"))
                .with("desired_count", spec.desired_count)
                .with("launch_type", "FARGATE")
                .with(
                    "network_configuration",
                    Value::map([
                        ("subnets", spec.network.subnets.clone()),
                        ("security_groups", Value::List(spec.network.security_groups.clone())),
                        ("assign_public_ip", Value::from(spec.network.assign_public_ip)),
                    ]),
                )
                .with(
                    "load_balancer",
                    Value::list([Value::map([
                        ("target_group_arn", target_group.value("arn")),
                        ("container_name", Value::from(spec.container_name.clone())),
                        ("container_port", Value::from(spec.load_balancer.container_port)),
                    ])]),
                )
                // target group registration needs the listener in place
                .after(listener.attr("arn")),
        )?;

        debug!(stack = %stack.name(), service = %spec.name, "Declared service");

        Ok(ServiceHandle {
            name: spec.name,
            container_name: spec.container_name,
            container_port: spec.load_balancer.container_port,
            service,
            task,
            target_group,
            listener,
        })
    }
}

struct ServiceIds {
    task: String,
    target_group: String,
    listener: String,
    service: String,
}

impl ServiceIds {
    fn new(name: &str) -> Self {
        Self {
            task: format!("{}-task-definition", name),
            target_group: format!("{}-target", name),
            listener: format!("{}-forward", name),
            service: format!("{}-service", name),
        }
    }

    fn all(&self) -> [&str; 4] {
        [&self.task, &self.target_group, &self.listener, &self.service]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{create_cluster, CapacityMode};
    use crate::errors::TopologyError;

    fn spec(container_port: u16, mapped: u16) -> ServiceSpec {
        ServiceSpec {
            name: "petapp".into(),
            container_name: "petapp".into(),
            image: "nginx".into(),
            cpu: 256,
            memory: 512,
            port_mappings: vec![PortMapping::container(mapped)],
            desired_count: 1,
            network: NetworkBinding {
                vpc_id: Value::from("vpc-123"),
                subnets: Value::from(vec!["subnet-a", "subnet-b"]),
                security_groups: vec![Value::from("sg-app")],
                assign_public_ip: false,
            },
            load_balancer: LoadBalancerBinding {
                load_balancer_arn: Value::from("arn:lb"),
                listener_port: 80,
                container_port,
            },
        }
    }

    fn cluster(stack: &mut StackBuilder) -> ClusterHandle {
        create_cluster(stack, "ecs-demo", "dev", CapacityMode::Fargate).unwrap()
    }

    #[test]
    fn test_service_references_task_and_cluster() {
        let mut stack = StackBuilder::new("dev").unwrap();
        let cluster = cluster(&mut stack);
        let handle = cluster.create_service(&mut stack, spec(80, 80)).unwrap();
        let built = stack.build();

        let service = built.node(handle.service.id()).unwrap();
        assert_eq!(
            service.attribute("task_definition"),
            Some(&Value::Ref(handle.task_reference()))
        );
        assert_eq!(service.attribute("cluster"), Some(&cluster.identity));
        assert!(built.node(handle.task.id()).is_some());
    }

    #[test]
    fn test_unmapped_load_balancer_port_adds_nothing() {
        let mut stack = StackBuilder::new("dev").unwrap();
        let cluster = cluster(&mut stack);
        let before = stack.clone().build().nodes().len();

        let err = cluster.create_service(&mut stack, spec(8080, 80)).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::Construction(ConstructionError::UnmappedPort { port: 8080, .. })
        ));
        assert_eq!(stack.build().nodes().len(), before);
    }

    #[test]
    fn test_invalid_task_adds_nothing() {
        let mut stack = StackBuilder::new("dev").unwrap();
        let cluster = cluster(&mut stack);
        let mut bad = spec(80, 80);
        bad.memory = 0;

        assert!(cluster.create_service(&mut stack, bad).is_err());
        assert!(!stack.contains("petapp-task-definition"));
        assert!(!stack.contains("petapp-service"));
    }

    #[test]
    fn test_service_twice_is_duplicate() {
        let mut stack = StackBuilder::new("dev").unwrap();
        let cluster = cluster(&mut stack);
        cluster.create_service(&mut stack, spec(80, 80)).unwrap();

        let err = cluster.create_service(&mut stack, spec(80, 80)).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::Construction(ConstructionError::DuplicateResource { .. })
        ));
    }

    #[test]
    fn test_listener_forwards_to_target_group() {
        let mut stack = StackBuilder::new("dev").unwrap();
        let cluster = cluster(&mut stack);
        let handle = cluster.create_service(&mut stack, spec(80, 80)).unwrap();
        let built = stack.build();

        let listener = built.node(handle.listener.id()).unwrap();
        let actions = listener.attribute("default_action").and_then(Value::as_list).unwrap();
        let action = actions[0].as_map().unwrap();
        assert_eq!(action.get("type"), Some(&Value::from("forward")));
        assert_eq!(action.get("target_group_arn"), Some(&handle.target_group.value("arn")));

        let service = built.node(handle.service.id()).unwrap();
        assert!(service.depends_on.contains(&handle.listener.attr("arn")));
    }
}
