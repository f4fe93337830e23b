//! JSON-file lead store.

use std::path::PathBuf;

use async_trait::async_trait;
use tablescout_core::Lead;

use crate::{LeadStore, StoreError};

/// Leads persisted as one pretty-printed JSON array, overwritten in full on
/// every save. Same single-instance assumption as the tracking store.
pub struct JsonLeadStore {
    path: PathBuf,
}

impl JsonLeadStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LeadStore for JsonLeadStore {
    async fn load(&self) -> Result<Vec<Lead>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Json {
                path: self.path.display().to_string(),
                source: e,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::Io {
                path: self.path.display().to_string(),
                source: e,
            }),
        }
    }

    async fn save(&self, leads: &[Lead]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io {
                    path: parent.display().to_string(),
                    source: e,
                })?;
        }
        let json = serde_json::to_vec_pretty(leads).map_err(|e| StoreError::Json {
            path: self.path.display().to_string(),
            source: e,
        })?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| StoreError::Io {
                path: self.path.display().to_string(),
                source: e,
            })
    }
}
