// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Synthesizer
//!
//! Composes the configured deployment and prints the plan document to
//! stdout for the reconciliation engine.
//!
//! Run with: cargo run --bin synth-topology
//!
//! Environment:
//! 1. TOPOLOGY_CONFIG - JSON deployment file (default: dev + prod foundations, one app on dev)
//! 2. NATS_URL - when set, literal parameters are synced to the NATS key/value bucket
//! 3. NATS_BUCKET - bucket name (default: PARAMETERS)

use anyhow::{Context, Result};
use cim_topology::parameters::{sync_literal_parameters, NatsConfig, NatsParameterStore};
use cim_topology::DeploymentConfig;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the plan
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("🚀 Starting topology synthesis");

    let config = DeploymentConfig::from_env().context("Failed to load deployment configuration")?;
    info!("📋 Configuration loaded:");
    info!("  - Foundations: {}", config.foundations.len());
    info!("  - Applications: {}", config.applications.len());

    let plan = config.synthesize().context("Composition failed")?;
    for collision in plan.collisions() {
        warn!(
            "⚠️ {} published by {:?} and {:?}",
            collision.key, collision.previous_stack, collision.current_stack
        );
    }

    println!("{}", plan.to_json().context("Failed to render plan")?);
    info!("✅ Plan {} with {} nodes written", plan.plan_id, plan.nodes().len());

    let Ok(nats_url) = std::env::var("NATS_URL") else {
        info!("NATS_URL not set, skipping parameter sync");
        return Ok(());
    };

    let mut nats = NatsConfig::with_url(nats_url);
    if let Ok(bucket) = std::env::var("NATS_BUCKET") {
        nats.bucket = bucket;
    }

    info!("🔌 Connecting to NATS at {:?}", nats.servers);
    let store = NatsParameterStore::connect(nats)
        .await
        .context("Failed to open parameter store")?;

    let report = sync_literal_parameters(&store, plan.parameters())
        .await
        .context("Failed to sync parameters")?;
    info!(
        "✅ Synced {} parameters, {} left for apply time",
        report.written,
        report.deferred.len()
    );

    Ok(())
}
