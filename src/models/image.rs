// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! News image search results.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A single image returned by the image search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ImageResult {
    #[serde(default)]
    pub title: String,
    /// Publisher name (e.g., "Reuters"), used for ranking
    #[serde(default)]
    pub source: String,
    /// Full-size image URL
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Page the image was found on
    #[serde(default)]
    pub link: Option<String>,
}
