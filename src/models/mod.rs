// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activation;
pub mod archive;
pub mod image;

pub use activation::{ActivationDetail, ActivationSummary, FeedItem};
pub use archive::{ArchiveFile, ArchiveManifest, ArchiveRecord, GeojsonResponse};
pub use image::ImageResult;
