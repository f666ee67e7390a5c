// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence: response cache and archive store.

pub mod archive_store;
pub mod cache;

pub use archive_store::ArchiveStore;
pub use cache::{MemoryCache, ResponseCache};

/// Collection names as constants.
pub mod collections {
    /// Geojson payloads extracted from activation archives (keyed by activation id)
    pub const ARCHIVES: &str = "archives";
}
