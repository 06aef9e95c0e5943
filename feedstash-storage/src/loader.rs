//! Feed caching use-cases: load, save, validate.
//!
//! [`LocalFeedLoader`] composes a [`FeedStore`] with the
//! [`FeedCachePolicy`]; it owns no storage logic of its own. Operations
//! run as spawned tasks on the store's schedule and deliver through
//! [`InFlight`] handles gated on the loader's [`Liveness`], so a loader
//! released by its owner silently drops in-flight results.

use std::sync::Arc;

use feedstash_core::{feed, FeedCacheError, FeedItem};

use crate::policy::FeedCachePolicy;
use crate::store::FeedStore;
use crate::task::{Clock, InFlight, Liveness};

/// Result of a cache load: the usable feed, or a surfaced store error.
pub type LoadResult = Result<Vec<FeedItem>, FeedCacheError>;

/// Result of a cache save.
pub type SaveResult = Result<(), FeedCacheError>;

/// The feed caching use-case layer.
///
/// Holds its store by shared reference and stamps snapshots with the
/// injected clock. Neither the loader nor its store ever retries; every
/// failure is reported upward once.
pub struct LocalFeedLoader {
    store: Arc<dyn FeedStore>,
    clock: Clock,
    live: Liveness,
}

impl LocalFeedLoader {
    pub fn new(store: Arc<dyn FeedStore>, clock: Clock) -> Self {
        Self {
            store,
            clock,
            live: Liveness::new(),
        }
    }

    /// Load the cached feed.
    ///
    /// Retrieval errors are surfaced. An empty cache is a normal
    /// cold-start state and delivers an empty collection, as does a
    /// stale snapshot - stale data is withheld, not deleted here.
    pub fn load(&self) -> InFlight<LoadResult> {
        let (delivery, handle) = InFlight::channel();
        let store = Arc::clone(&self.store);
        let clock = Arc::clone(&self.clock);
        let live = self.live.clone();

        tokio::spawn(async move {
            let result = match store.retrieve().await {
                Err(e) => Err(FeedCacheError::from(e)),
                Ok(Some(cache)) if FeedCachePolicy::validate(cache.timestamp, clock()) => {
                    Ok(feed::to_models(&cache.feed))
                }
                Ok(_) => Ok(Vec::new()),
            };
            delivery.deliver(&live, result);
        });

        handle
    }

    /// Replace the cached feed with `items`.
    ///
    /// Sequences delete-then-insert. A delete failure short-circuits:
    /// it is reported as-is and no insert is attempted. The snapshot
    /// timestamp comes from the injected clock at insert time.
    pub fn save(&self, items: Vec<FeedItem>) -> InFlight<SaveResult> {
        let (delivery, handle) = InFlight::channel();
        let store = Arc::clone(&self.store);
        let clock = Arc::clone(&self.clock);
        let live = self.live.clone();

        tokio::spawn(async move {
            match store.delete_feed().await {
                Err(e) => delivery.deliver(&live, Err(FeedCacheError::from(e))),
                Ok(()) => {
                    if !live.is_live() {
                        return;
                    }
                    let result = store
                        .insert(feed::to_local(&items), clock())
                        .await
                        .map_err(FeedCacheError::from);
                    delivery.deliver(&live, result);
                }
            }
        });

        handle
    }

    /// Fire-and-forget cache maintenance.
    ///
    /// An unreadable or stale cache is purged; a fresh or empty one is
    /// left alone. The corrective delete is best-effort and its outcome
    /// is swallowed.
    pub fn validate_cache(&self) {
        let store = Arc::clone(&self.store);
        let clock = Arc::clone(&self.clock);
        let live = self.live.clone();

        tokio::spawn(async move {
            let purge = match store.retrieve().await {
                Err(_) => true,
                Ok(Some(cache)) => !FeedCachePolicy::validate(cache.timestamp, clock()),
                Ok(None) => false,
            };
            if purge && live.is_live() {
                let _ = store.delete_feed().await;
            }
        });
    }
}

impl Drop for LocalFeedLoader {
    fn drop(&mut self) {
        self.live.revoke();
    }
}
