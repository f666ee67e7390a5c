// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activation archive records and the geojson endpoint payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A JSON file unpacked from an activation archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ArchiveFile {
    /// File name (e.g., "EMSR699_AOI01_DEL_PRODUCT_observedEventA_v1.json")
    pub name: String,
    /// Path relative to the artifacts directory
    pub path: String,
}

/// Response body of the geojson endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeojsonResponse {
    pub files: Vec<ArchiveFile>,
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub geojson: serde_json::Value,
}

/// Archive store document, keyed by activation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub activation_id: String,
    /// Serialized geojson payload
    pub geojson: String,
    #[serde(default)]
    pub files: Vec<ArchiveFile>,
    pub updated_at: DateTime<Utc>,
}

impl ArchiveRecord {
    pub fn new(activation_id: &str, response: &GeojsonResponse, now: DateTime<Utc>) -> Self {
        Self {
            activation_id: activation_id.to_string(),
            geojson: response.geojson.to_string(),
            files: response.files.clone(),
            updated_at: now,
        }
    }

    /// Whether the record is younger than `max_age` at `now`.
    ///
    /// Age is measured as an absolute difference, so clock skew in either
    /// direction counts against freshness. A record exactly `max_age` old is stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: std::time::Duration) -> bool {
        let age_ms = (now - self.updated_at).num_milliseconds().unsigned_abs();
        u128::from(age_ms) < max_age.as_millis()
    }

    /// Rebuild the endpoint payload from the stored blob.
    pub fn to_response(&self) -> Result<GeojsonResponse, serde_json::Error> {
        Ok(GeojsonResponse {
            files: self.files.clone(),
            geojson: serde_json::from_str(&self.geojson)?,
        })
    }
}

/// Marker written into an unpacked archive directory once extraction completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveManifest {
    pub activation_id: String,
    pub extracted_at: DateTime<Utc>,
    pub files: Vec<ArchiveFile>,
}
