// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activation archive pipeline.
//!
//! Resolves the latest vector archive of an activation, downloads it
//! behind the disclaimer form, unpacks it and returns the observed-event
//! (or image-footprint) layer. Results are kept in the [`ArchiveStore`]
//! for `max_age`.
//!
//! On disk, under the artifacts directory:
//! - `{id}.zip` is only ever created by renaming a fully written temp file.
//! - `{id}/` is only ever created by renaming a staging directory that
//!   already holds every extracted file plus `.manifest.json`. A directory
//!   without a readable manifest is discarded and rebuilt.

use crate::db::ArchiveStore;
use crate::error::AppError;
use crate::models::{ArchiveFile, ArchiveManifest, ArchiveRecord, GeojsonResponse};
use crate::services::detail::fetch_activation;
use crate::services::listing::selector;
use crate::services::CopernicusClient;
use chrono::Utc;
use dashmap::DashMap;
use scraper::Html;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

const MANIFEST_FILE: &str = ".manifest.json";

/// Layer names to serve, in order of preference.
const PREFERRED_LAYERS: [&str; 2] = ["observedEventA", "imageFootprintA"];

/// Per-activation locks serializing the pipeline within this process.
pub type ArchiveLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Archive download and extraction service.
#[derive(Clone)]
pub struct ArchivePipeline {
    client: CopernicusClient,
    store: ArchiveStore,
    artifacts_dir: PathBuf,
    max_age: Duration,
    locks: ArchiveLocks,
}

impl ArchivePipeline {
    pub fn new(
        client: CopernicusClient,
        store: ArchiveStore,
        artifacts_dir: PathBuf,
        max_age: Duration,
    ) -> Self {
        Self {
            client,
            store,
            artifacts_dir,
            max_age,
            locks: Arc::new(DashMap::new()),
        }
    }

    pub fn store(&self) -> &ArchiveStore {
        &self.store
    }

    /// Return the geojson layer of an activation, refreshing it when the
    /// stored copy is missing or older than `max_age`.
    pub async fn geojson(&self, activation_id: &str) -> Result<GeojsonResponse, AppError> {
        let lock = self
            .locks
            .entry(activation_id.to_string())
            .or_default()
            .clone();
        let result = {
            let _guard = lock.lock().await;
            self.refresh(activation_id).await
        };

        // Drop the lock entry unless another request is waiting on it.
        drop(lock);
        self.locks
            .remove_if(activation_id, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    /// Serve the stored record or rebuild it. Callers hold the activation lock.
    async fn refresh(&self, activation_id: &str) -> Result<GeojsonResponse, AppError> {
        let existing = self.store.get(activation_id).await?;
        if let Some(record) = &existing {
            if record.is_fresh(Utc::now(), self.max_age) {
                tracing::info!(activation_id, "Archive store hit");
                return record.to_response().map_err(|e| {
                    AppError::Storage(format!("Stored geojson for {} is corrupt: {}", activation_id, e))
                });
            }
            tracing::info!(
                activation_id,
                updated_at = %record.updated_at,
                "Archive store record expired"
            );
        } else {
            tracing::info!(activation_id, "Archive store miss");
        }

        let response = self.build(activation_id).await?;
        let record = ArchiveRecord::new(activation_id, &response, Utc::now());

        if existing.is_some() {
            self.store.update(&record).await?;
        } else {
            self.store.insert(&record).await?;
        }

        Ok(response)
    }

    /// Produce the payload from disk, downloading and unpacking as needed.
    async fn build(&self, activation_id: &str) -> Result<GeojsonResponse, AppError> {
        tokio::fs::create_dir_all(&self.artifacts_dir).await?;

        let manifest = match self.read_manifest(activation_id).await {
            Some(manifest) => {
                tracing::debug!(activation_id, "Reusing unpacked archive");
                manifest
            }
            None => {
                let zip_path = self.ensure_zip(activation_id).await?;
                let artifacts_dir = self.artifacts_dir.clone();
                let id = activation_id.to_string();

                tracing::info!(activation_id, zip = %zip_path.display(), "Decompressing archive");
                let extract_from = zip_path.clone();
                let extracted = tokio::task::spawn_blocking(move || {
                    extract_archive(&extract_from, &artifacts_dir, &id)
                })
                .await
                .map_err(|e| AppError::Internal(e.into()))?;
                let manifest = match extracted {
                    Ok(manifest) => manifest,
                    Err(e) => {
                        // An archive that cannot be unpacked must be downloaded again.
                        tracing::warn!(activation_id, error = %e, "Discarding unusable archive");
                        if let Err(remove_err) = tokio::fs::remove_file(&zip_path).await {
                            tracing::warn!(activation_id, error = %remove_err, "Failed to remove archive");
                        }
                        return Err(e);
                    }
                };
                tracing::info!(
                    activation_id,
                    files = manifest.files.len(),
                    "Archive decompressed"
                );
                manifest
            }
        };

        let target = select_layer(&manifest.files).ok_or_else(|| {
            AppError::NotFound(format!(
                "Archive for {} has no observedEventA or imageFootprintA layer",
                activation_id
            ))
        })?;

        let raw = tokio::fs::read_to_string(self.artifacts_dir.join(&target.path)).await?;
        let geojson: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| AppError::Parse(format!("{} is not JSON: {}", target.name, e)))?;
        geojson::GeoJson::from_json_value(geojson.clone())
            .map_err(|e| AppError::Parse(format!("{} is not GeoJSON: {}", target.name, e)))?;

        Ok(GeojsonResponse {
            files: manifest.files,
            geojson,
        })
    }

    /// Read the manifest of a previously unpacked archive, if it is still fresh.
    async fn read_manifest(&self, activation_id: &str) -> Option<ArchiveManifest> {
        let path = self.artifacts_dir.join(activation_id).join(MANIFEST_FILE);
        let raw = tokio::fs::read_to_string(&path).await.ok()?;

        match serde_json::from_str::<ArchiveManifest>(&raw) {
            Ok(manifest) => {
                let age = (Utc::now() - manifest.extracted_at)
                    .to_std()
                    .unwrap_or_default();
                (age < self.max_age).then_some(manifest)
            }
            Err(e) => {
                tracing::warn!(activation_id, error = %e, "Discarding unreadable archive manifest");
                None
            }
        }
    }

    /// Return the path of a complete, fresh `{id}.zip`, downloading it if needed.
    async fn ensure_zip(&self, activation_id: &str) -> Result<PathBuf, AppError> {
        let zip_path = self.artifacts_dir.join(format!("{}.zip", activation_id));

        if let Ok(metadata) = tokio::fs::metadata(&zip_path).await {
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| SystemTime::now().duration_since(modified).ok())
                .unwrap_or(Duration::MAX);
            if age < self.max_age {
                tracing::debug!(activation_id, "Reusing downloaded archive");
                return Ok(zip_path);
            }
        }

        let zip_url = self.latest_zip_url(activation_id).await?;

        let partial = tempfile::Builder::new()
            .prefix(&format!(".{}-", activation_id))
            .suffix(".zip.part")
            .tempfile_in(&self.artifacts_dir)?;
        self.client
            .download_archive(&zip_url, partial.path())
            .await?;

        // A 2xx HTML page must never take the archive's name.
        let downloaded = partial.reopen()?;
        zip::ZipArchive::new(downloaded).map_err(|e| {
            AppError::Parse(format!(
                "Download for {} is not a zip archive: {}",
                activation_id, e
            ))
        })?;

        partial
            .persist(&zip_path)
            .map_err(|e| AppError::from(e.error))?;

        Ok(zip_path)
    }

    /// Resolve the newest archive URL from the activation's components page.
    async fn latest_zip_url(&self, activation_id: &str) -> Result<String, AppError> {
        let details = fetch_activation(&self.client, activation_id).await?;
        let internal_id = details
            .first()
            .map(|d| d.internal_id.as_str())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::NotFound(format!("Activation {} has no products", activation_id))
            })?;

        let components_url = self.client.components_url(activation_id, internal_id);
        let html = self.client.get_text(&components_url).await?;
        let href = find_archive_link(&html)?.ok_or_else(|| {
            AppError::NotFound(format!("No archive link for activation {}", activation_id))
        })?;

        let zip_url = self.client.resolve("", &href);
        tracing::info!(activation_id, url = %zip_url, "Resolved latest archive");
        Ok(zip_url)
    }
}

/// First link on a components page whose href mentions "zip".
pub fn find_archive_link(html: &str) -> Result<Option<String>, AppError> {
    let document = Html::parse_document(html);
    let link_sel = selector(r#"a[href*="zip"]"#)?;
    Ok(document
        .select(&link_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string))
}

/// Pick the layer to serve: observed event first, image footprint second.
pub fn select_layer(files: &[ArchiveFile]) -> Option<&ArchiveFile> {
    PREFERRED_LAYERS
        .iter()
        .find_map(|layer| files.iter().find(|f| f.name.contains(layer)))
}

/// Unpack `zip_path` into `{artifacts_dir}/{activation_id}` via a staging directory.
fn extract_archive(
    zip_path: &Path,
    artifacts_dir: &Path,
    activation_id: &str,
) -> Result<ArchiveManifest, AppError> {
    let staging = tempfile::Builder::new()
        .prefix(&format!(".{}-", activation_id))
        .tempdir_in(artifacts_dir)?;

    let file = std::fs::File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        AppError::Parse(format!("Archive for {} is not a zip: {}", activation_id, e))
    })?;
    archive.extract(staging.path()).map_err(|e| {
        AppError::Parse(format!("Failed to unpack archive for {}: {}", activation_id, e))
    })?;

    let mut files = Vec::new();
    collect_json_files(staging.path(), staging.path(), activation_id, &mut files)?;
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let manifest = ArchiveManifest {
        activation_id: activation_id.to_string(),
        extracted_at: Utc::now(),
        files,
    };
    let manifest_json = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| AppError::Internal(e.into()))?;
    std::fs::write(staging.path().join(MANIFEST_FILE), manifest_json)?;

    let target = artifacts_dir.join(activation_id);
    if target.exists() {
        std::fs::remove_dir_all(&target)?;
    }
    std::fs::rename(staging.path(), &target)?;

    Ok(manifest)
}

/// Recursively list `.json` files under `dir`, with paths relative to the
/// artifacts directory (`{activation_id}/...`).
fn collect_json_files(
    root: &Path,
    dir: &Path,
    activation_id: &str,
    out: &mut Vec<ArchiveFile>,
) -> Result<(), AppError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(root, &path, activation_id, out)?;
            continue;
        }

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if name.ends_with(".json") => name.to_string(),
            _ => continue,
        };
        let relative = path
            .strip_prefix(root)
            .map_err(|e| AppError::Internal(e.into()))?;
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        out.push(ArchiveFile {
            name,
            path: format!("{}/{}", activation_id, relative),
        });
    }
    Ok(())
}
