use std::sync::Arc;

use log::warn;
use thiserror::Error;

use super::KeyValueStore;
use crate::models::{ProgressKey, ProgressRecord};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("malformed progress record for {key}: {source}")]
    MalformedRecord {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read progress record for {key}")]
    StoreRead {
        key: String,
        #[source]
        source: BoxError,
    },
    #[error("failed to write progress record for {key}")]
    StoreWrite {
        key: String,
        #[source]
        source: BoxError,
    },
}

/// Typed access to progress records on top of any [`KeyValueStore`].
#[derive(Clone)]
pub struct ProgressStore {
    backend: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn load(&self, key: &ProgressKey) -> Result<Option<ProgressRecord>, ProgressError> {
        let storage_key = key.storage_key();
        let raw = self
            .backend
            .get(&storage_key)
            .map_err(|err| ProgressError::StoreRead {
                key: storage_key.clone(),
                source: err.into(),
            })?;

        match raw {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| ProgressError::MalformedRecord {
                    key: storage_key,
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Overwrites whatever is stored under `key`.
    pub fn save(&self, key: &ProgressKey, record: &ProgressRecord) -> Result<(), ProgressError> {
        let storage_key = key.storage_key();
        let serialized = serde_json::to_string(record).map_err(|err| ProgressError::StoreWrite {
            key: storage_key.clone(),
            source: err.into(),
        })?;

        self.backend
            .set(&storage_key, &serialized)
            .map_err(|err| ProgressError::StoreWrite {
                key: storage_key,
                source: err.into(),
            })
    }

    pub fn discard(&self, key: &ProgressKey) -> Result<(), ProgressError> {
        let storage_key = key.storage_key();
        self.backend
            .remove(&storage_key)
            .map_err(|err| ProgressError::StoreWrite {
                key: storage_key,
                source: err.into(),
            })
    }

    /// Every readable record belonging to `user_id`, keyed by video id.
    /// Malformed entries are skipped.
    ///
    /// Matching is by key prefix, so the result is only exact for user ids
    /// accepted by [`ProgressKey::is_valid_user_id`]. Otherwise records of a
    /// user named `{user_id}_...` are reported too.
    pub fn list_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<(String, ProgressRecord)>, ProgressError> {
        let prefix = ProgressKey::user_prefix(user_id);
        let keys = self
            .backend
            .keys_with_prefix(&prefix)
            .map_err(|err| ProgressError::StoreRead {
                key: prefix.clone(),
                source: err.into(),
            })?;

        let mut records = Vec::with_capacity(keys.len());
        for storage_key in keys {
            let video_id = storage_key[prefix.len()..].to_string();
            match self.load(&ProgressKey::new(user_id, video_id.clone())) {
                Ok(Some(record)) => records.push((video_id, record)),
                Ok(None) => {}
                Err(err @ ProgressError::MalformedRecord { .. }) => {
                    warn!("Skipping unreadable progress entry: {err}");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(records)
    }
}
