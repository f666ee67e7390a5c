// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - fetching, parsing and archive handling.

pub mod archive;
pub mod copernicus;
pub mod detail;
pub mod feed;
pub mod image;
pub mod listing;
pub mod xml;

pub use archive::ArchivePipeline;
pub use copernicus::CopernicusClient;
pub use detail::fetch_activation;
pub use feed::fetch_feed;
pub use image::ImageResolver;
pub use listing::scan_activations;
