// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the Copernicus EMS mapping site.
//!
//! Handles:
//! - Listing, feed and components page fetches (text)
//! - Archive downloads behind the disclaimer form (streamed to disk)

use crate::config::Config;
use crate::error::AppError;
use futures_util::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Path of the rapid-mapping activations listing, relative to the base URL.
const LISTING_PATH: &str = "mapping/list-of-activations-rapid";

/// Fields of the download disclaimer form that gates archive downloads.
const DISCLAIMER_FORM: [(&str, &str); 3] = [
    ("confirmation", "1"),
    ("op", "Download file"),
    ("form_id", "emsmapping_disclaimer_download_form"),
];

/// Copernicus EMS client.
#[derive(Clone)]
pub struct CopernicusClient {
    http: reqwest::Client,
    base_url: String,
    feed_url: String,
}

impl CopernicusClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.http_connect_timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed building HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.copernicus_base_url.trim_end_matches('/').to_string(),
            feed_url: config.activations_feed_url.clone(),
        })
    }

    /// Shared HTTP client, for other services talking to third parties.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn listing_url(&self) -> String {
        format!("{}/{}", self.base_url, LISTING_PATH)
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    /// Per-activation product feed.
    pub fn activation_feed_url(&self, activation_id: &str) -> String {
        format!(
            "{}/mapping/list-of-components/{}/aemfeed",
            self.base_url, activation_id
        )
    }

    /// Components page listing the archives of one area of interest.
    pub fn components_url(&self, activation_id: &str, internal_id: &str) -> String {
        format!(
            "{}/mapping/list-of-components/{}/ALL/{}",
            self.base_url, activation_id, internal_id
        )
    }

    /// Resolve an href from a scraped page against `base`.
    ///
    /// The listing uses hrefs relative to `/mapping/`, the components page
    /// relative to the site root.
    pub fn resolve(&self, base: &str, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        let base = base.trim_end_matches('/');
        let href = href.trim_start_matches('/');
        if base.is_empty() {
            format!("{}/{}", self.base_url, href)
        } else {
            format!("{}/{}/{}", self.base_url, base, href)
        }
    }

    /// GET a page and return its body.
    pub async fn get_text(&self, url: &str) -> Result<String, AppError> {
        tracing::debug!(url, "Fetching upstream page");
        let response = self.http.get(url).send().await?;
        let response = check_response(response).await?;
        Ok(response.text().await?)
    }

    /// Accept the download disclaimer for `zip_url` and stream the archive to `dest`.
    ///
    /// `dest` is written in place; callers pass a temporary path and move it
    /// once this returns.
    pub async fn download_archive(&self, zip_url: &str, dest: &Path) -> Result<u64, AppError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in DISCLAIMER_FORM {
            form = form.text(name, value);
        }

        tracing::info!(url = zip_url, "Downloading activation archive");
        let response = self.http.post(zip_url).multipart(form).send().await?;
        let response = check_response(response).await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        tracing::info!(url = zip_url, bytes = written, "Archive downloaded");
        Ok(written)
    }
}

/// Map non-success statuses to `UpstreamUnavailable`.
pub(crate) async fn check_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();

    Err(AppError::UpstreamUnavailable(format!(
        "HTTP {} from {}: {}",
        status, url, snippet
    )))
}
