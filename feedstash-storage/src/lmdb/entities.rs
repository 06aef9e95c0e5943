//! On-store entity shapes for the LMDB feed store.
//!
//! The snapshot is persisted as two linked entity kinds: one unique
//! cache entity under a fixed key, owning an ordered collection of
//! record entities under index-suffixed keys. The cache entity carries
//! the record count, so a purge or load always knows exactly which
//! record keys belong to it.

use feedstash_core::{LocalFeedItem, Timestamp};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Fixed key of the unique cache entity. At most one exists; insert
/// replaces it (find-or-create-unique semantics enforced here, not by a
/// schema constraint).
pub(crate) const CACHE_KEY: &[u8] = b"cache";

const ITEM_KEY_PREFIX: &[u8] = b"item/";

/// The unique cache entity: the snapshot timestamp plus the size of its
/// owned record collection.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CacheEntity {
    pub timestamp: Timestamp,
    pub item_count: u32,
}

/// A record entity owned by the cache entity.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct FeedItemEntity {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub image_url: Url,
}

impl FeedItemEntity {
    pub(crate) fn from_local(item: &LocalFeedItem) -> Self {
        Self {
            id: item.id,
            description: item.description.clone(),
            location: item.location.clone(),
            image_url: item.image_url.clone(),
        }
    }

    pub(crate) fn into_local(self) -> LocalFeedItem {
        LocalFeedItem {
            id: self.id,
            description: self.description,
            location: self.location,
            image_url: self.image_url,
        }
    }
}

/// Key of the record entity at `index`. Big-endian index bytes keep the
/// owned collection ordered under lexicographic key order.
pub(crate) fn item_key(index: u32) -> Vec<u8> {
    let mut key = Vec::with_capacity(ITEM_KEY_PREFIX.len() + 4);
    key.extend_from_slice(ITEM_KEY_PREFIX);
    key.extend_from_slice(&index.to_be_bytes());
    key
}
