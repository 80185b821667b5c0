// Copyright (c) 2025 - Cowboy AI, Inc.
//! Parameter store integration tests

mod fixtures;

use cim_topology::compose;
use cim_topology::parameters::{
    keys, sync_literal_parameters, InMemoryParameterStore, NatsConfig, NatsParameterStore, ParameterKey,
};
use cim_topology::ParameterStore;
use fixtures::*;
use pretty_assertions::assert_eq;
use std::time::Duration;

#[tokio::test]
async fn test_sync_writes_literals_and_defers_computed() -> anyhow::Result<()> {
    // Given the dev composition
    let (foundation, exports) = dev_foundation();
    let plan = compose(vec![foundation, nginx_application(&exports)])?;
    let store = InMemoryParameterStore::new();

    // When its parameters are synced
    let report = sync_literal_parameters(&store, plan.parameters()).await?;

    // Then literal values land in the store
    let region = ParameterKey::new("dev", keys::AWS_DEFAULT_REGION)?;
    assert_eq!(store.get(&region).await?.as_deref(), Some(REGION));
    let container = ParameterKey::new("dev", keys::TASK_DEFINITION_CONTAINER_NAME)?;
    assert_eq!(store.get(&container).await?.as_deref(), Some("petapp"));

    // And the cluster identity waits for the reconciliation engine
    let cluster = ParameterKey::new("dev", keys::ECS_CLUSTER)?;
    assert!(report.deferred.contains(&cluster));
    assert_eq!(store.get(&cluster).await?, None);

    assert_eq!(report.written + report.deferred.len(), plan.parameters().len());
    assert_eq!(store.len().await, report.written);
    Ok(())
}

#[tokio::test]
async fn test_sync_is_idempotent() -> anyhow::Result<()> {
    let (foundation, _) = dev_foundation();
    let plan = compose(vec![foundation])?;
    let store = InMemoryParameterStore::new();

    let first = sync_literal_parameters(&store, plan.parameters()).await?;
    let second = sync_literal_parameters(&store, plan.parameters()).await?;

    assert_eq!(first, second);
    assert_eq!(store.len().await, first.written);
    Ok(())
}

#[test]
fn test_sync_from_blocking_context() -> anyhow::Result<()> {
    // Given a composition driven from synchronous code
    let (foundation, _) = dev_foundation();
    let plan = compose(vec![foundation])?;
    let store = InMemoryParameterStore::new();

    // When the sync is run to completion on a blocking executor
    let report = tokio_test::block_on(sync_literal_parameters(&store, plan.parameters()))?;

    // Then the region is readable the same way
    let region = ParameterKey::new("dev", keys::AWS_DEFAULT_REGION)?;
    assert_eq!(tokio_test::block_on(store.get(&region))?.as_deref(), Some(REGION));
    assert_eq!(tokio_test::block_on(store.len()), report.written);
    Ok(())
}

#[test]
fn test_nats_config_defaults() {
    let config = NatsConfig::default();
    assert_eq!(config.servers, vec!["nats://localhost:4222".to_string()]);
    assert_eq!(config.bucket, "PARAMETERS");
    assert_eq!(config.connect_timeout, Duration::from_secs(10));

    let pointed = NatsConfig::with_url("nats://10.0.20.1:4222");
    assert_eq!(pointed.servers, vec!["nats://10.0.20.1:4222".to_string()]);
    assert_eq!(pointed.name, config.name);
}

#[tokio::test]
#[ignore = "requires NATS server"]
async fn test_nats_store_roundtrip() -> anyhow::Result<()> {
    let config = NatsConfig {
        bucket: format!("TEST_PARAMETERS_{}", uuid::Uuid::now_v7().simple()),
        ..NatsConfig::default()
    };
    let store = NatsParameterStore::connect(config).await?;

    let key = ParameterKey::new("dev", keys::AWS_DEFAULT_REGION)?;
    assert_eq!(store.get(&key).await?, None);

    store.put(&key, REGION).await?;
    assert_eq!(store.get(&key).await?.as_deref(), Some(REGION));

    store.put(&key, "us-east-1").await?;
    assert_eq!(store.get(&key).await?.as_deref(), Some("us-east-1"));
    Ok(())
}
