//! File-backed feed store.
//!
//! Persists the whole snapshot as one JSON document in a single file.
//! Concurrency follows a reader/writer discipline: `insert` and
//! `delete_feed` hold the write half of a FIFO-fair gate and never
//! overlap any other operation, while `retrieve` holds the read half and
//! may run alongside other reads. A retrieve queued behind a writer only
//! runs once that writer has finished, so writers complete in submission
//! order and readers observe them.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use feedstash_core::{CachedFeed, LocalFeedItem, StoreError, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::store::FeedStore;

/// On-disk document shape.
///
/// Private storage twin of [`CachedFeed`] so the file schema can move
/// independently of the in-memory type.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCache {
    feed: Vec<LocalFeedItem>,
    timestamp: Timestamp,
}

/// Feed store persisting one JSON-encoded snapshot at a fixed path.
///
/// The file is exclusively owned by this instance; pointing two
/// instances at the same path requires external coordination.
pub struct JsonFeedStore {
    store_path: PathBuf,
    gate: RwLock<()>,
}

impl JsonFeedStore {
    /// Create a store over `store_path`. The file is not touched until
    /// the first operation; a missing file is the empty state.
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            gate: RwLock::new(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        self.store_path.with_extension("tmp")
    }
}

#[async_trait]
impl FeedStore for JsonFeedStore {
    async fn delete_feed(&self) -> Result<(), StoreError> {
        let _writer = self.gate.write().await;

        if !self.store_path.exists() {
            return Ok(());
        }
        std::fs::remove_file(&self.store_path).map_err(|e| StoreError::WriteFailed {
            reason: e.to_string(),
        })
    }

    async fn insert(
        &self,
        feed: Vec<LocalFeedItem>,
        timestamp: Timestamp,
    ) -> Result<(), StoreError> {
        let _writer = self.gate.write().await;

        let cache = StoredCache { feed, timestamp };
        let encoded = serde_json::to_vec(&cache).map_err(|e| StoreError::WriteFailed {
            reason: e.to_string(),
        })?;

        // Write-then-rename keeps the prior snapshot intact if the write
        // dies halfway.
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, &encoded).map_err(|e| StoreError::WriteFailed {
            reason: e.to_string(),
        })?;
        std::fs::rename(&temp_path, &self.store_path).map_err(|e| StoreError::WriteFailed {
            reason: e.to_string(),
        })
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, StoreError> {
        let _reader = self.gate.read().await;

        let bytes = match std::fs::read(&self.store_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::ReadFailed {
                    reason: e.to_string(),
                })
            }
        };

        let cache: StoredCache =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                reason: e.to_string(),
            })?;

        Ok(Some(CachedFeed {
            feed: cache.feed,
            timestamp: cache.timestamp,
        }))
    }
}
