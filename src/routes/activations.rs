// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activation endpoints consumed by the map front end.

use crate::error::{AppError, Result};
use crate::routes::cached::cached_json;
use crate::routes::validate_activation_id;
use crate::services::{fetch_activation, fetch_feed, scan_activations};
use crate::AppState;
use axum::{
    extract::{OriginalUri, Path, State},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/activations", get(list_activations))
        .route("/activations-xml", get(list_feed))
        .route("/activations/{id}", get(get_activation))
        .route("/activations/{id}/geojson", get(get_activation_geojson))
        .route("/activations/{id}/image", get(get_activation_image))
}

/// Wildfire activations scraped from the listing page.
async fn list_activations(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response> {
    let ttl = state.config.response_cache_ttl;
    cached_json(&state, &uri, ttl, || scan_activations(&state.client)).await
}

/// Wildfire items of the global RSS feed.
async fn list_feed(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response> {
    let ttl = state.config.response_cache_ttl;
    cached_json(&state, &uri, ttl, || {
        fetch_feed(&state.client, state.client.feed_url())
    })
    .await
}

/// Products of one activation, newest first.
async fn get_activation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response> {
    validate_activation_id(&id)?;
    let ttl = state.config.response_cache_ttl;
    cached_json(&state, &uri, ttl, || fetch_activation(&state.client, &id)).await
}

/// Extracted archive layer of one activation.
async fn get_activation_geojson(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response> {
    validate_activation_id(&id)?;
    let ttl = state.config.response_cache_ttl;
    cached_json(&state, &uri, ttl, || state.archives.geojson(&id)).await
}

/// Best-ranked news image for the latest product of an activation.
async fn get_activation_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response> {
    validate_activation_id(&id)?;
    let ttl = state.config.image_cache_ttl;
    let (client, images, id) = (&state.client, &state.images, id.as_str());
    cached_json(&state, &uri, ttl, || async move {
        let details = fetch_activation(client, id).await?;
        let latest = details
            .first()
            .ok_or_else(|| AppError::NotFound(format!("Activation {} has no products", id)))?;
        images.resolve(&latest.source).await
    })
    .await
}
