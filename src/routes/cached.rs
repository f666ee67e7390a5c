// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON responses backed by the response cache.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// Serve the cached body for `uri` or compute, cache and serve it.
///
/// The key is the request path and query, so each endpoint/id/query
/// combination is cached separately. Errors are never cached.
pub async fn cached_json<T, F, Fut>(
    state: &AppState,
    uri: &Uri,
    ttl: Duration,
    compute: F,
) -> Result<Response>
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let key = uri.to_string();

    if let Some(body) = state.cache.get(&key) {
        tracing::debug!(key = %key, "Response cache hit");
        return Ok(json_response(body, ttl, "HIT"));
    }

    tracing::debug!(key = %key, "Response cache miss");
    let value = compute().await?;
    let body = serde_json::to_string(&value).map_err(|e| AppError::Internal(e.into()))?;
    state.cache.put(&key, body.clone(), ttl);

    Ok(json_response(body, ttl, "MISS"))
}

fn json_response(body: String, ttl: Duration, cache_status: &'static str) -> Response {
    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::CACHE_CONTROL, cache_control(ttl));
    headers.insert("X-Cache", HeaderValue::from_static(cache_status));

    response
}

fn cache_control(ttl: Duration) -> HeaderValue {
    HeaderValue::from_str(&format!("public, max-age={}", ttl.as_secs()))
        .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
}
