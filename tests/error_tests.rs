// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use wildfire_tracker::error::AppError;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_client_errors_include_details() {
    let (status, body) = render(AppError::NotFound("No image found".to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["details"], "No image found");

    let (status, body) = render(AppError::BadRequest("Invalid activation id".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_upstream_errors_are_bad_gateway() {
    let (status, body) =
        render(AppError::UpstreamUnavailable("HTTP 503".to_string())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_unavailable");
    assert_eq!(body["details"], "HTTP 503");

    let (status, body) = render(AppError::Parse("No <channel> element".to_string())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "parse_error");
}

#[tokio::test]
async fn test_server_errors_hide_details() {
    let (status, body) = render(AppError::Storage("disk full".to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "storage_error");
    assert!(body.get("details").is_none());

    let (status, body) = render(AppError::Internal(anyhow::anyhow!("join error"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert!(body.get("details").is_none());
}

#[test]
fn test_io_errors_map_to_storage() {
    let err: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
    assert!(matches!(err, AppError::Storage(_)));
}
