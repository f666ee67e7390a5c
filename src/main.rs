// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wildfire-Tracker API Server
//!
//! Serves Copernicus EMS wildfire activations, their product polygons and
//! extracted archive layers to the map front end.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wildfire_tracker::{
    config::Config,
    db::{ArchiveStore, MemoryCache},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Wildfire-Tracker API");

    // Archive store: Firestore when a project is configured
    let store = match config.gcp_project_id.as_deref() {
        Some(project) => ArchiveStore::new(project).await?,
        None => {
            tracing::warn!("GCP_PROJECT_ID not set, archive store is in-memory");
            ArchiveStore::new_in_memory()
        }
    };

    tracing::info!(
        dir = %config.artifacts_dir.display(),
        ttl_secs = config.response_cache_ttl.as_secs(),
        "Response cache and artifacts initialized"
    );

    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        Arc::new(MemoryCache::new()),
    )?);

    // Build router
    let app = wildfire_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wildfire_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
