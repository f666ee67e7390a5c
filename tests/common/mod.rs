// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: fake upstream server and app construction.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use wildfire_tracker::config::Config;
use wildfire_tracker::db::{ArchiveStore, MemoryCache};
use wildfire_tracker::routes::create_router;
use wildfire_tracker::AppState;

pub const LISTING_HTML: &str = include_str!("../fixtures/listing.html");
pub const FEED_XML: &str = include_str!("../fixtures/feed.xml");
pub const AEMFEED_XML: &str = include_str!("../fixtures/aemfeed_EMSR999.xml");
pub const COMPONENTS_HTML: &str = include_str!("../fixtures/components.html");

/// Activations the fake upstream knows about. EMSR998 is located in Evros,
/// has no image search results and its archive has no observed-event or
/// footprint layer.
pub const KNOWN_ACTIVATIONS: [&str; 2] = ["EMSR999", "EMSR998"];

/// Minimal observed-event layer served inside fixture archives.
pub const OBSERVED_EVENT: &str = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"obj_type":"Burnt area"},"geometry":{"type":"Polygon","coordinates":[[[23.0,38.0],[24.0,38.0],[24.0,39.0],[23.0,38.0]]]}}]}"#;

#[derive(Clone, Default)]
struct UpstreamState {
    hits: Arc<DashMap<&'static str, usize>>,
    /// Answer downloads with a 200 HTML page instead of the archive
    html_downloads: Arc<AtomicBool>,
}

impl UpstreamState {
    fn hit(&self, route: &'static str) {
        *self.hits.entry(route).or_insert(0) += 1;
    }
}

/// Local stand-in for the Copernicus EMS site and the image search API.
pub struct FakeUpstream {
    pub base_url: String,
    state: UpstreamState,
}

impl FakeUpstream {
    /// Number of requests received by `route` ("listing", "feed", "aemfeed",
    /// "components", "download", "search").
    pub fn hits(&self, route: &str) -> usize {
        self.state.hits.get(route).map(|v| *v).unwrap_or(0)
    }

    /// Make archive downloads return an HTML page with status 200.
    pub fn serve_html_downloads(&self, enabled: bool) {
        self.state.html_downloads.store(enabled, Ordering::SeqCst);
    }
}

/// Start the fake upstream on an ephemeral port.
pub async fn spawn_upstream() -> FakeUpstream {
    let state = UpstreamState::default();

    let app = Router::new()
        .route("/mapping/list-of-activations-rapid", get(listing))
        .route("/mapping/activations-rapid/feed", get(feed))
        .route("/mapping/list-of-components/{id}/aemfeed", get(aemfeed))
        .route("/mapping/list-of-components/{id}/ALL/{aoi}", get(components))
        .route("/mapping/download-component/{file}", post(download))
        .route("/search.json", get(search))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake upstream");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeUpstream {
        base_url: format!("http://{}", addr),
        state,
    }
}

async fn listing(State(state): State<UpstreamState>) -> &'static str {
    state.hit("listing");
    LISTING_HTML
}

async fn feed(State(state): State<UpstreamState>) -> &'static str {
    state.hit("feed");
    FEED_XML
}

async fn aemfeed(State(state): State<UpstreamState>, Path(id): Path<String>) -> Response {
    state.hit("aemfeed");
    if !KNOWN_ACTIVATIONS.contains(&id.as_str()) {
        return (StatusCode::NOT_FOUND, "Page not found").into_response();
    }
    let xml = AEMFEED_XML.replace("EMSR999", &id);
    if id == "EMSR998" {
        return xml.replace("Attica", "Evros").into_response();
    }
    xml.into_response()
}

async fn components(
    State(state): State<UpstreamState>,
    Path((id, aoi)): Path<(String, String)>,
) -> Response {
    state.hit("components");
    if aoi != "2991" {
        return (StatusCode::NOT_FOUND, "Unknown area of interest").into_response();
    }
    COMPONENTS_HTML.replace("ACTIVATION_ID", &id).into_response()
}

async fn download(
    State(state): State<UpstreamState>,
    Path(file): Path<String>,
    body: String,
) -> Response {
    state.hit("download");
    if !body.contains("emsmapping_disclaimer_download_form") || !body.contains("Download file") {
        return (StatusCode::FORBIDDEN, "Accept the disclaimer first").into_response();
    }
    if state.html_downloads.load(Ordering::SeqCst) {
        return "<html><body>Please accept the disclaimer</body></html>".into_response();
    }

    match file.as_str() {
        "EMSR999_vector.zip" => fixture_zip(&[
            ("EMSR999_AOI01_DEL_PRODUCT_imageFootprintA_v1.json", "{\"type\":\"FeatureCollection\",\"features\":[]}"),
            ("EMSR999_AOI01_DEL_PRODUCT_observedEventA_v1.json", OBSERVED_EVENT),
            ("EMSR999_AOI01_DEL_PRODUCT_observedEventA_v1.shp", "not json"),
            ("README.txt", "Copernicus EMS"),
        ])
        .into_response(),
        "EMSR998_vector.zip" => fixture_zip(&[(
            "EMSR998_AOI01_DEL_PRODUCT_hydrographyA_v1.json",
            "{\"type\":\"FeatureCollection\",\"features\":[]}",
        )])
        .into_response(),
        _ => (StatusCode::NOT_FOUND, "No such file").into_response(),
    }
}

async fn search(
    State(state): State<UpstreamState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hit("search");
    if params.get("q").map(String::as_str) != Some("Wildfire in Attica, Greece") {
        return Json(serde_json::json!({ "images_results": [] })).into_response();
    }

    Json(serde_json::json!({
        "images_results": [
            { "title": "Smoke over Athens", "source": "UnknownWire", "original": "https://img.test/unknown.jpg" },
            { "title": "Firefighters in Attica", "source": "AP", "original": "https://img.test/ap.jpg", "thumbnail": "https://img.test/ap_t.jpg" },
            { "title": "Evacuations", "source": "Reuters", "original": "https://img.test/reuters.jpg" }
        ]
    }))
    .into_response()
}

/// Build a zip archive in memory.
pub fn fixture_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Create a test app wired to the fake upstream, with in-memory stores.
/// Returns the router and the shared state.
pub fn create_test_app(
    upstream: &FakeUpstream,
    artifacts_dir: &std::path::Path,
) -> (axum::Router, Arc<AppState>) {
    let config = Config::for_upstream(&upstream.base_url, artifacts_dir);
    let state = Arc::new(
        AppState::new(
            config,
            ArchiveStore::new_in_memory(),
            Arc::new(MemoryCache::new()),
        )
        .expect("Failed to build app state"),
    );

    (create_router(state.clone()), state)
}

/// Read a response body as JSON.
pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
