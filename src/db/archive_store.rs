// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Archive store: geojson payloads keyed by activation id.
//!
//! Backed by Firestore in production. Without a GCP project the store
//! runs in-memory, which is also what the tests use.

use crate::db::collections;
use crate::error::AppError;
use crate::models::ArchiveRecord;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<DashMap<String, ArchiveRecord>>),
}

/// Archive store client.
#[derive(Clone)]
pub struct ArchiveStore {
    backend: Backend,
}

impl ArchiveStore {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Storage(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create an in-memory store (local development and tests).
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(DashMap::new())),
        }
    }

    /// Get the record for an activation.
    pub async fn get(&self, activation_id: &str) -> Result<Option<ArchiveRecord>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::ARCHIVES)
                .obj()
                .one(activation_id)
                .await
                .map_err(|e| AppError::Storage(e.to_string())),
            Backend::Memory(map) => Ok(map.get(activation_id).map(|r| r.clone())),
        }
    }

    /// Insert a record for an activation that has none yet.
    ///
    /// Fails if a record already exists.
    pub async fn insert(&self, record: &ArchiveRecord) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .insert()
                    .into(collections::ARCHIVES)
                    .document_id(&record.activation_id)
                    .object(record)
                    .execute()
                    .await
                    .map_err(|e| AppError::Storage(e.to_string()))?;
            }
            Backend::Memory(map) => match map.entry(record.activation_id.clone()) {
                Entry::Occupied(_) => {
                    return Err(AppError::Storage(format!(
                        "Archive record {} already exists",
                        record.activation_id
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(record.clone());
                }
            },
        }

        tracing::debug!(activation_id = %record.activation_id, "Archive record inserted");
        Ok(())
    }

    /// Replace the geojson payload and timestamp of an existing record.
    pub async fn update(&self, record: &ArchiveRecord) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::ARCHIVES)
                    .document_id(&record.activation_id)
                    .object(record)
                    .execute()
                    .await
                    .map_err(|e| AppError::Storage(e.to_string()))?;
            }
            Backend::Memory(map) => {
                map.insert(record.activation_id.clone(), record.clone());
            }
        }

        tracing::debug!(activation_id = %record.activation_id, "Archive record updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(geojson: &str) -> ArchiveRecord {
        ArchiveRecord {
            activation_id: "EMSR999".to_string(),
            geojson: geojson.to_string(),
            files: vec![],
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_get_update() {
        let store = ArchiveStore::new_in_memory();
        assert!(store.get("EMSR999").await.unwrap().is_none());

        store.insert(&record("{}")).await.unwrap();
        assert_eq!(store.get("EMSR999").await.unwrap().unwrap().geojson, "{}");

        store.update(&record("[]")).await.unwrap();
        assert_eq!(store.get("EMSR999").await.unwrap().unwrap().geojson, "[]");
    }

    #[tokio::test]
    async fn test_double_insert_is_storage_error() {
        let store = ArchiveStore::new_in_memory();
        store.insert(&record("{}")).await.unwrap();
        assert!(matches!(
            store.insert(&record("{}")).await,
            Err(AppError::Storage(_))
        ));
    }
}
