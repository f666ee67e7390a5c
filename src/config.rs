// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://emergency.copernicus.eu";
const DEFAULT_IMAGE_SEARCH_URL: &str = "https://serpapi.com/search.json";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Origin of the Copernicus EMS mapping site (no trailing slash)
    pub copernicus_base_url: String,
    /// Global activations RSS feed
    pub activations_feed_url: String,
    /// Image search endpoint
    pub image_search_url: String,
    /// Image search API key, if the endpoint requires one
    pub image_search_api_key: Option<String>,
    /// Directory holding downloaded archives and their unpacked contents
    pub artifacts_dir: PathBuf,
    /// GCP project for the Firestore archive store. In-memory store when unset.
    pub gcp_project_id: Option<String>,
    /// TTL for cached listing, detail and geojson responses
    pub response_cache_ttl: Duration,
    /// TTL for cached image lookups
    pub image_cache_ttl: Duration,
    /// Age after which an archive store record is refreshed
    pub archive_max_age: Duration,
    /// Connect timeout for outbound requests
    pub http_connect_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            copernicus_base_url: DEFAULT_BASE_URL.to_string(),
            activations_feed_url: default_feed_url(DEFAULT_BASE_URL),
            image_search_url: DEFAULT_IMAGE_SEARCH_URL.to_string(),
            image_search_api_key: None,
            artifacts_dir: PathBuf::from("artifacts"),
            gcp_project_id: None,
            response_cache_ttl: Duration::from_secs(24 * 60 * 60),
            image_cache_ttl: Duration::from_secs(30 * 24 * 60 * 60),
            archive_max_age: Duration::from_secs(24 * 60 * 60),
            http_connect_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to the defaults; malformed numeric values
    /// are rejected rather than silently replaced.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        let copernicus_base_url = env::var("COPERNICUS_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.copernicus_base_url);

        let activations_feed_url = env::var("ACTIVATIONS_FEED_URL")
            .unwrap_or_else(|_| default_feed_url(&copernicus_base_url));

        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            activations_feed_url,
            copernicus_base_url,
            image_search_url: env::var("IMAGE_SEARCH_URL").unwrap_or(defaults.image_search_url),
            image_search_api_key: env::var("IMAGE_SEARCH_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            artifacts_dir: env::var("ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.artifacts_dir),
            gcp_project_id: env::var("GCP_PROJECT_ID").ok().filter(|v| !v.is_empty()),
            response_cache_ttl: parse_var("RESPONSE_CACHE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.response_cache_ttl),
            image_cache_ttl: parse_var("IMAGE_CACHE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.image_cache_ttl),
            archive_max_age: parse_var("ARCHIVE_MAX_AGE_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.archive_max_age),
            http_connect_timeout: parse_var("HTTP_CONNECT_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_connect_timeout),
        })
    }

    /// Create a test configuration pointing every upstream at `base_url`.
    pub fn for_upstream(base_url: &str, artifacts_dir: impl Into<PathBuf>) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            activations_feed_url: default_feed_url(&base),
            image_search_url: format!("{}/search.json", base),
            artifacts_dir: artifacts_dir.into(),
            copernicus_base_url: base,
            ..Self::default()
        }
    }
}

fn default_feed_url(base: &str) -> String {
    format!("{}/mapping/activations-rapid/feed", base)
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
