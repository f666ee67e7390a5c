// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wildfire-Tracker: Copernicus EMS wildfire activations as a JSON API
//!
//! This crate scrapes the Copernicus Emergency Management Service rapid
//! mapping listing and feeds, keeps the wildfire activations, and serves
//! them with their product polygons, extracted archive layers and a news
//! image to the map front end.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{ArchiveStore, ResponseCache};
use services::{ArchivePipeline, CopernicusClient, ImageResolver};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub client: CopernicusClient,
    pub cache: Arc<dyn ResponseCache>,
    pub archives: ArchivePipeline,
    pub images: ImageResolver,
}

impl AppState {
    /// Wire services from configuration and the injected stores.
    pub fn new(
        config: Config,
        store: ArchiveStore,
        cache: Arc<dyn ResponseCache>,
    ) -> Result<Self, error::AppError> {
        let client = CopernicusClient::new(&config)?;
        let archives = ArchivePipeline::new(
            client.clone(),
            store,
            config.artifacts_dir.clone(),
            config.archive_max_age,
        );
        let images = ImageResolver::new(client.http().clone(), &config);

        Ok(Self {
            config,
            client,
            cache,
            archives,
            images,
        })
    }
}
