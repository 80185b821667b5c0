// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS JetStream key/value parameter store

use async_nats::jetstream::{self, kv};
use async_nats::ConnectOptions;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{ParameterKey, ParameterStore};
use crate::errors::{TopologyError, TopologyResult};

/// Configuration for the NATS connection backing the store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
    /// Key/value bucket holding the parameters
    pub bucket: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "synth-topology".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
            bucket: "PARAMETERS".to_string(),
        }
    }
}

impl NatsConfig {
    /// Default configuration pointed at `url`
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            servers: vec![url.into()],
            ..Self::default()
        }
    }
}

/// Parameter store on a JetStream key/value bucket
///
/// `/dev/ecs_cluster` is stored under the bucket key `dev.ecs_cluster`.
#[derive(Clone)]
pub struct NatsParameterStore {
    kv: kv::Store,
    bucket: String,
}

impl NatsParameterStore {
    /// Connect and open (or create) the configured bucket
    pub async fn connect(config: NatsConfig) -> TopologyResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| TopologyError::ParameterStore(e.to_string()))?;

        info!("Connected to NATS at {:?}", config.servers);

        let kv = jetstream::new(client)
            .create_key_value(kv::Config {
                bucket: config.bucket.clone(),
                history: 1,
                ..Default::default()
            })
            .await
            .map_err(|e| TopologyError::ParameterStore(e.to_string()))?;

        Ok(Self {
            kv,
            bucket: config.bucket,
        })
    }
}

#[async_trait]
impl ParameterStore for NatsParameterStore {
    async fn put(&self, key: &ParameterKey, value: &str) -> TopologyResult<()> {
        self.kv
            .put(key.subject_token(), value.as_bytes().to_vec().into())
            .await
            .map_err(|e| TopologyError::ParameterStore(e.to_string()))?;

        debug!(key = %key, bucket = %self.bucket, "Stored parameter");
        Ok(())
    }

    async fn get(&self, key: &ParameterKey) -> TopologyResult<Option<String>> {
        let entry = self
            .kv
            .get(key.subject_token())
            .await
            .map_err(|e| TopologyError::ParameterStore(e.to_string()))?;

        entry
            .map(|bytes| {
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| TopologyError::ParameterStore(format!("{} is not UTF-8: {}", key, e)))
            })
            .transpose()
    }

    fn name(&self) -> &str {
        &self.bucket
    }
}
