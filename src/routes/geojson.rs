// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Standalone geojson endpoint backed by the archive store only.

use crate::error::Result;
use crate::models::GeojsonResponse;
use crate::routes::validate_activation_id;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/geojson/{id}", get(get_geojson))
}

async fn get_geojson(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GeojsonResponse>> {
    validate_activation_id(&id)?;
    Ok(Json(state.archives.geojson(&id).await?))
}
