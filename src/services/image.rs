// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! News image lookup for an activation.

use crate::config::Config;
use crate::error::AppError;
use crate::models::ImageResult;
use crate::services::copernicus::check_response;
use serde::Deserialize;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Publishers preferred for activation images, best first.
pub const PRIORITY_SOURCES: [&str; 7] = [
    "Bloomberg.com",
    "DW",
    "RTVE.es",
    "EFE",
    "AP",
    "AFP",
    "Reuters",
];

/// Length of the `"[EMSRnnn] "` prefix on product source text.
const SOURCE_PREFIX_CHARS: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    images_results: Vec<ImageResult>,
}

/// Image search client.
#[derive(Clone)]
pub struct ImageResolver {
    http: reqwest::Client,
    search_url: String,
    api_key: Option<String>,
}

impl ImageResolver {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            search_url: config.image_search_url.clone(),
            api_key: config.image_search_api_key.clone(),
        }
    }

    /// Search images for a product source text and return the best-ranked one.
    pub async fn resolve(&self, source_text: &str) -> Result<ImageResult, AppError> {
        let query = search_query(source_text);
        if query.is_empty() {
            return Err(AppError::NotFound(
                "No searchable text for activation image".to_string(),
            ));
        }

        let results = self.search(&query).await?;
        tracing::debug!(query = %query, count = results.len(), "Image search returned");

        rank_images(results)
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("No image found for '{}'", query)))
    }

    async fn search(&self, query: &str) -> Result<Vec<ImageResult>, AppError> {
        let mut params = vec![("engine", "google_images"), ("q", query)];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("api_key", key));
        }

        let response = self
            .http
            .get(&self.search_url)
            .query(&params)
            .send()
            .await?;
        let response = check_response(response).await?;

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Image search JSON error: {}", e)))?;
        Ok(body.images_results)
    }
}

/// Build the search query: drop the activation-code prefix and fold accents.
pub fn search_query(source_text: &str) -> String {
    let stripped: String = source_text.chars().skip(SOURCE_PREFIX_CHARS).collect();
    fold_accents(&stripped).trim().to_string()
}

/// Replace accented letters by their base letter ("Évora" -> "Evora").
pub fn fold_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Stable sort by position of `source` in [`PRIORITY_SOURCES`].
///
/// Unlisted sources go after every listed one, in their original order.
pub fn rank_images(mut results: Vec<ImageResult>) -> Vec<ImageResult> {
    results.sort_by_key(|r| source_rank(&r.source));
    results
}

fn source_rank(source: &str) -> usize {
    PRIORITY_SOURCES
        .iter()
        .position(|s| *s == source)
        .unwrap_or(PRIORITY_SOURCES.len())
}
