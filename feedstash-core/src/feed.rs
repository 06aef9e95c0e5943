//! Transfer and persisted shapes for feed records.
//!
//! The transfer shape ([`FeedItem`]) is what the remote boundary produces;
//! the persisted shape ([`LocalFeedItem`]) is what stores write. The two
//! hierarchies carry identical fields but stay distinct on purpose: the
//! on-store schema must be able to drift without touching the API shape.

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::Timestamp;

/// A feed record as delivered by the remote feed boundary.
///
/// Immutable value type; equality covers all fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub image_url: Url,
}

/// Storage-shape twin of [`FeedItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFeedItem {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub image_url: Url,
}

/// The single cached snapshot held by a feed store.
///
/// Stores hold at most one of these at any time; every insert replaces
/// it wholesale. `feed` preserves insertion order and permits duplicate
/// ids. The timestamp is assigned by the caching use-case, never by a
/// store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFeed {
    pub feed: Vec<LocalFeedItem>,
    pub timestamp: Timestamp,
}

impl FeedItem {
    /// Map to the persisted shape.
    pub fn to_local(&self) -> LocalFeedItem {
        LocalFeedItem {
            id: self.id,
            description: self.description.clone(),
            location: self.location.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

impl LocalFeedItem {
    /// Map back to the transfer shape.
    pub fn to_model(&self) -> FeedItem {
        FeedItem {
            id: self.id,
            description: self.description.clone(),
            location: self.location.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Map a transfer-shape collection to its persisted twin, preserving order.
pub fn to_local(items: &[FeedItem]) -> Vec<LocalFeedItem> {
    items.iter().map(FeedItem::to_local).collect()
}

/// Map a persisted collection back to the transfer shape, preserving order.
pub fn to_models(items: &[LocalFeedItem]) -> Vec<FeedItem> {
    items.iter().map(LocalFeedItem::to_model).collect()
}
