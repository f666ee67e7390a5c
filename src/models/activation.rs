// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Copernicus EMS activation records.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One row of the rapid-mapping activations listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivationSummary {
    /// Listing shows the green "active" marker for this row
    pub is_active: bool,
    /// Activation code (e.g., "EMSR699")
    pub activation_code: String,
    pub activation_name: String,
    pub activation_date: String,
    /// Event type (e.g., "Wildfire")
    pub activation_type: String,
    pub activation_country: String,
    /// Absolute URL of the per-activation RSS feed
    pub rss_link: String,
}

/// One product of an activation, read from its `aemfeed` RSS feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivationDetail {
    pub title: String,
    pub link: String,
    pub description: String,
    pub category: String,
    pub guid: String,
    pub source: String,
    /// Area-of-interest id (`gdacs:cemsaoi`), used to locate the component archives
    pub internal_id: String,
    /// Raw `georss:polygon` text in lat/lon order
    pub polygon: String,
    /// Polygon as a GeoJSON feature in lon/lat order; null when the raw polygon is malformed
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub geojson: Option<geojson::Feature>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
    #[serde(rename = "gdacs:thumbnail")]
    pub thumbnail: Option<String>,
    #[serde(rename = "gdacs:cemsptype")]
    pub product_type: Option<String>,
    #[serde(rename = "gdacs:cemsctype")]
    pub component_type: Option<String>,
    #[serde(rename = "gdacs:cemsmonit")]
    pub monitoring: Option<String>,
}

/// One wildfire item from the global activations feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub category: String,
    pub guid: String,
    pub pub_date: String,
    pub source: String,
    pub thumbnail: String,
    /// `georss:point`, "lat lon"
    pub point: String,
    pub actor: String,
    #[serde(rename = "activationGUID")]
    pub activation_guid: String,
    pub activation_name: String,
    pub activation_event_type: String,
    pub activation_published: String,
    pub activation_location: String,
    pub activation_affected_countries: String,
    pub activation_description: String,
    pub activation_link: String,
    pub activation_status: String,
    pub activation_preview: String,
    #[serde(rename = "activationRSS")]
    pub activation_rss: String,
    pub event_type: Option<String>,
    pub event_id: Option<String>,
    pub id: Option<String>,
    pub gdacs_link: Option<String>,
}
