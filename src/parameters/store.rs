// Copyright (c) 2025 - Cowboy AI, Inc.
//! Apply-time parameter stores

use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{ParameterKey, ParameterRegistry};
use crate::errors::TopologyResult;

/// Durable key/value store the published parameters land in
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Write a value, replacing any previous one
    async fn put(&self, key: &ParameterKey, value: &str) -> TopologyResult<()>;

    /// Read the current value
    async fn get(&self, key: &ParameterKey) -> TopologyResult<Option<String>>;

    /// Store name for logging
    fn name(&self) -> &str;
}

/// Process-local store, used by tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct InMemoryParameterStore {
    values: Arc<RwLock<HashMap<ParameterKey, String>>>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn put(&self, key: &ParameterKey, value: &str) -> TopologyResult<()> {
        self.values.write().await.insert(key.clone(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &ParameterKey) -> TopologyResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

/// Outcome of [`sync_literal_parameters`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub written: usize,
    /// Computed values left for the reconciliation engine
    pub deferred: Vec<ParameterKey>,
}

/// Write every parameter whose value is already known to `store`
///
/// Values that reference resource attributes only exist once the plan is
/// applied, so they are deferred.
pub async fn sync_literal_parameters(
    store: &dyn ParameterStore,
    registry: &ParameterRegistry,
) -> TopologyResult<SyncReport> {
    let mut report = SyncReport::default();
    let mut writes = Vec::new();

    for parameter in registry.iter() {
        match parameter.value.render_literal() {
            Some(value) => writes.push((parameter.key.clone(), value)),
            None => {
                debug!(key = %parameter.key, "Deferring computed parameter");
                report.deferred.push(parameter.key.clone());
            }
        }
    }

    try_join_all(writes.iter().map(|(key, value)| store.put(key, value))).await?;
    report.written = writes.len();

    info!(
        store = store.name(),
        written = report.written,
        deferred = report.deferred.len(),
        "Synced literal parameters"
    );

    Ok(report)
}
