//! LMDB-backed structured feed store.
//!
//! Uses the heed crate (Rust bindings for LMDB) to persist the snapshot
//! as linked entities in a transactional embedded store, and doubles as
//! the image blob store - one store file serves both contracts.
//!
//! # Serial execution context
//!
//! Every public operation is submitted as a [`Job`] to one long-lived
//! background worker thread bound to the store file. The worker drains
//! jobs strictly in arrival order, which is the store's entire
//! concurrency mechanism: no locks, just a single-consumer queue. The
//! thread exits when the last handle to the store is dropped.
//!
//! # Atomicity
//!
//! Each job runs inside one LMDB transaction. A failed insert aborts its
//! transaction, leaving the prior snapshot (or the empty state) intact.

mod entities;

use std::path::Path;

use async_trait::async_trait;
use feedstash_core::{CachedFeed, LocalFeedItem, StoreError, Timestamp};
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn};
use tokio::sync::{mpsc, oneshot};
use url::Url;

use crate::store::{FeedStore, ImageStore};
use entities::{item_key, CacheEntity, FeedItemEntity, CACHE_KEY};

/// Unit of work submitted to the store's serial execution context.
enum Job {
    DeleteFeed {
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
    InsertFeed {
        feed: Vec<LocalFeedItem>,
        timestamp: Timestamp,
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
    RetrieveFeed {
        reply: oneshot::Sender<Result<Option<CachedFeed>, StoreError>>,
    },
    InsertImage {
        url: Url,
        data: Vec<u8>,
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
    RetrieveImage {
        url: Url,
        reply: oneshot::Sender<Result<Option<Vec<u8>>, StoreError>>,
    },
}

/// Structured persistent store over one LMDB environment.
///
/// Implements both [`FeedStore`] and [`ImageStore`]. The environment is
/// exclusively owned by this instance; opening a second instance on the
/// same directory requires external coordination.
pub struct LmdbFeedStore {
    jobs: mpsc::UnboundedSender<Job>,
}

impl LmdbFeedStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where the LMDB files live
    /// * `max_size_mb` - Maximum size of the environment in megabytes
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OpenFailed`] if the directory cannot be
    /// created, the environment cannot be opened, or the databases
    /// cannot be initialized. This is the construction-time error class:
    /// a store that failed to open is never handed out.
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, StoreError> {
        let open_failed = |reason: String| StoreError::OpenFailed {
            path: path.as_ref().display().to_string(),
            reason,
        };

        std::fs::create_dir_all(&path).map_err(|e| open_failed(e.to_string()))?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(2)
                .open(path.as_ref())
        }
        .map_err(|e| open_failed(e.to_string()))?;

        let mut wtxn = env.write_txn().map_err(|e| open_failed(e.to_string()))?;
        let feed_db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, Some("feed"))
            .map_err(|e| open_failed(e.to_string()))?;
        let image_db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, Some("images"))
            .map_err(|e| open_failed(e.to_string()))?;
        wtxn.commit().map_err(|e| open_failed(e.to_string()))?;

        let (jobs, queue) = mpsc::unbounded_channel();
        let worker = Worker {
            env,
            feed_db,
            image_db,
        };
        std::thread::Builder::new()
            .name("lmdb-feed-store".to_string())
            .spawn(move || worker.run(queue))
            .map_err(|e| open_failed(e.to_string()))?;

        Ok(Self { jobs })
    }

    async fn submit<T>(
        &self,
        make_job: impl FnOnce(oneshot::Sender<Result<T, StoreError>>) -> Job,
    ) -> Result<T, StoreError> {
        let (reply, response) = oneshot::channel();
        self.jobs
            .send(make_job(reply))
            .map_err(|_| StoreError::TransactionFailed {
                reason: "store worker terminated".to_string(),
            })?;
        response.await.map_err(|_| StoreError::TransactionFailed {
            reason: "store worker dropped the reply".to_string(),
        })?
    }
}

#[async_trait]
impl FeedStore for LmdbFeedStore {
    async fn delete_feed(&self) -> Result<(), StoreError> {
        self.submit(|reply| Job::DeleteFeed { reply }).await
    }

    async fn insert(
        &self,
        feed: Vec<LocalFeedItem>,
        timestamp: Timestamp,
    ) -> Result<(), StoreError> {
        self.submit(|reply| Job::InsertFeed {
            feed,
            timestamp,
            reply,
        })
        .await
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, StoreError> {
        self.submit(|reply| Job::RetrieveFeed { reply }).await
    }
}

#[async_trait]
impl ImageStore for LmdbFeedStore {
    async fn insert_image(&self, data: Vec<u8>, url: &Url) -> Result<(), StoreError> {
        let url = url.clone();
        self.submit(|reply| Job::InsertImage { url, data, reply })
            .await
    }

    async fn retrieve_image(&self, url: &Url) -> Result<Option<Vec<u8>>, StoreError> {
        let url = url.clone();
        self.submit(|reply| Job::RetrieveImage { url, reply }).await
    }
}

/// The background execution context. Owns the environment; runs every
/// job serially on its own thread.
struct Worker {
    env: Env,
    feed_db: Database<Bytes, Bytes>,
    image_db: Database<Bytes, Bytes>,
}

fn txn_failed(e: impl ToString) -> StoreError {
    StoreError::TransactionFailed {
        reason: e.to_string(),
    }
}

impl Worker {
    fn run(self, mut queue: mpsc::UnboundedReceiver<Job>) {
        while let Some(job) = queue.blocking_recv() {
            match job {
                Job::DeleteFeed { reply } => {
                    let _ = reply.send(self.delete_feed());
                }
                Job::InsertFeed {
                    feed,
                    timestamp,
                    reply,
                } => {
                    let _ = reply.send(self.insert_feed(feed, timestamp));
                }
                Job::RetrieveFeed { reply } => {
                    let _ = reply.send(self.retrieve_feed());
                }
                Job::InsertImage { url, data, reply } => {
                    let _ = reply.send(self.insert_image(&url, &data));
                }
                Job::RetrieveImage { url, reply } => {
                    let _ = reply.send(self.retrieve_image(&url));
                }
            }
        }
    }

    /// Read the unique cache entity, if present.
    fn cache_entity(&self, txn: &RoTxn) -> Result<Option<CacheEntity>, StoreError> {
        match self.feed_db.get(txn, CACHE_KEY).map_err(txn_failed)? {
            Some(bytes) => {
                let entity = serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt {
                    reason: e.to_string(),
                })?;
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    fn delete_feed(&self) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(txn_failed)?;

        let Some(entity) = self.cache_entity(&wtxn)? else {
            // Nothing cached; deleting is a no-op success.
            return Ok(());
        };
        for index in 0..entity.item_count {
            self.feed_db
                .delete(&mut wtxn, &item_key(index))
                .map_err(txn_failed)?;
        }
        self.feed_db
            .delete(&mut wtxn, CACHE_KEY)
            .map_err(txn_failed)?;

        wtxn.commit().map_err(txn_failed)
    }

    fn insert_feed(
        &self,
        feed: Vec<LocalFeedItem>,
        timestamp: Timestamp,
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(txn_failed)?;

        // Replace the unique cache entity and its owned records. Reading
        // the prior entity tells us which record keys to purge; a corrupt
        // prior entity cannot be trusted for that, so fall back to zero
        // and let the new snapshot overwrite.
        let prior_count = match self.cache_entity(&wtxn) {
            Ok(Some(entity)) => entity.item_count,
            Ok(None) | Err(StoreError::Corrupt { .. }) => 0,
            Err(e) => return Err(e),
        };
        for index in 0..prior_count {
            self.feed_db
                .delete(&mut wtxn, &item_key(index))
                .map_err(txn_failed)?;
        }

        let entity = CacheEntity {
            timestamp,
            item_count: feed.len() as u32,
        };
        let encoded = serde_json::to_vec(&entity).map_err(|e| StoreError::WriteFailed {
            reason: e.to_string(),
        })?;
        self.feed_db
            .put(&mut wtxn, CACHE_KEY, &encoded)
            .map_err(txn_failed)?;

        for (index, item) in feed.iter().enumerate() {
            let record = FeedItemEntity::from_local(item);
            let encoded = serde_json::to_vec(&record).map_err(|e| StoreError::WriteFailed {
                reason: e.to_string(),
            })?;
            self.feed_db
                .put(&mut wtxn, &item_key(index as u32), &encoded)
                .map_err(txn_failed)?;
        }

        wtxn.commit().map_err(txn_failed)
    }

    fn retrieve_feed(&self) -> Result<Option<CachedFeed>, StoreError> {
        let rtxn = self.env.read_txn().map_err(txn_failed)?;

        let Some(entity) = self.cache_entity(&rtxn)? else {
            return Ok(None);
        };

        let mut feed = Vec::with_capacity(entity.item_count as usize);
        for index in 0..entity.item_count {
            let bytes = self
                .feed_db
                .get(&rtxn, &item_key(index))
                .map_err(txn_failed)?
                .ok_or_else(|| StoreError::Corrupt {
                    reason: format!("record entity {index} missing from cache"),
                })?;
            let record: FeedItemEntity =
                serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt {
                    reason: e.to_string(),
                })?;
            feed.push(record.into_local());
        }

        Ok(Some(CachedFeed {
            feed,
            timestamp: entity.timestamp,
        }))
    }

    fn insert_image(&self, url: &Url, data: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(txn_failed)?;
        self.image_db
            .put(&mut wtxn, url.as_str().as_bytes(), data)
            .map_err(txn_failed)?;
        wtxn.commit().map_err(txn_failed)
    }

    fn retrieve_image(&self, url: &Url) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(txn_failed)?;
        let blob = self
            .image_db
            .get(&rtxn, url.as_str().as_bytes())
            .map_err(txn_failed)?
            .map(<[u8]>::to_vec);
        Ok(blob)
    }
}
