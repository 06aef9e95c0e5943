//! Store contracts the backing implementations must satisfy.
//!
//! Both traits are object-safe so use-cases can hold `Arc<dyn FeedStore>`
//! without caring which backing store they got.
//!
//! # Ordering
//!
//! Every implementation must be linearizable per store instance:
//! results read as if all operations executed in one global submission
//! order, even when physically run on multiple threads. A `retrieve`
//! queued after an `insert` or `delete_feed` observes that mutation.
//! No ordering is guaranteed across distinct store instances.

use async_trait::async_trait;
use feedstash_core::{CachedFeed, LocalFeedItem, StoreError, Timestamp};
use url::Url;

/// Single-slot store for the cached feed snapshot.
///
/// A failed `insert` must leave the store holding the prior snapshot or
/// nothing - never a half-written one. `insert` is always-replace: the
/// caching use-case sequences a `delete_feed` before it, but an insert
/// without a prior delete still replaces the slot rather than merging.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Remove the cached feed, if any. Absence is a no-op success.
    async fn delete_feed(&self) -> Result<(), StoreError>;

    /// Replace the cached feed with `feed` stamped at `timestamp`.
    async fn insert(&self, feed: Vec<LocalFeedItem>, timestamp: Timestamp)
        -> Result<(), StoreError>;

    /// Fetch the cached feed. `Ok(None)` means the store is empty;
    /// `Err` is reserved for genuine read failures.
    async fn retrieve(&self) -> Result<Option<CachedFeed>, StoreError>;
}

/// Keyed binary-blob store for feed images.
///
/// Key is the image URL, value the raw bytes. No timestamp, no policy,
/// no expiry: only an explicit insert overwrites an entry, and nothing
/// in this layer ever deletes one.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `data` under `url`, overwriting any existing blob.
    async fn insert_image(&self, data: Vec<u8>, url: &Url) -> Result<(), StoreError>;

    /// Fetch the blob stored under `url`, or `Ok(None)` if absent.
    async fn retrieve_image(&self, url: &Url) -> Result<Option<Vec<u8>>, StoreError>;
}
