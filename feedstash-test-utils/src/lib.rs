//! Feedstash Test Utilities
//!
//! Centralized test infrastructure for the feedstash workspace:
//! - Fixtures for feed items, feeds, and image URLs
//! - Spy stores re-exported from their source crate
//! - Clock helpers for policy-sensitive tests

// Re-export the spy stores from their source crate
pub use feedstash_storage::{FeedStoreOp, ImageStoreOp, SpyFeedStore, SpyImageStore};

// Re-export clock helpers for convenience
pub use feedstash_storage::{fixed_clock, system_clock, Clock};

use chrono::{Duration, Utc};
use feedstash_core::{feed, CachedFeed, FeedItem, LocalFeedItem, Timestamp};
use url::Url;
use uuid::Uuid;

/// A unique image URL.
pub fn unique_image_url() -> Url {
    Url::parse(&format!("https://a-url.com/{}.png", Uuid::now_v7()))
        .expect("fixture URL should parse")
}

/// A unique feed item with every optional field populated.
pub fn unique_feed_item() -> FeedItem {
    FeedItem {
        id: Uuid::now_v7(),
        description: Some("a description".to_string()),
        location: Some("a location".to_string()),
        image_url: unique_image_url(),
    }
}

/// A small unique feed.
pub fn unique_feed() -> Vec<FeedItem> {
    vec![unique_feed_item(), unique_feed_item()]
}

/// The persisted twin of [`unique_feed`].
pub fn unique_local_feed() -> Vec<LocalFeedItem> {
    feed::to_local(&unique_feed())
}

/// A cached snapshot of `items` stamped at `timestamp`.
pub fn cached_feed(items: &[FeedItem], timestamp: Timestamp) -> CachedFeed {
    CachedFeed {
        feed: feed::to_local(items),
        timestamp,
    }
}

/// A timestamp exactly at the staleness boundary relative to `now`
/// (seven calendar days old, which the policy rejects).
pub fn expired_timestamp(now: Timestamp) -> Timestamp {
    now - Duration::days(7)
}

/// A timestamp comfortably inside the freshness window.
pub fn fresh_timestamp(now: Timestamp) -> Timestamp {
    now - Duration::days(6)
}

/// Current instant, for tests that do not pin a clock.
pub fn now() -> Timestamp {
    Utc::now()
}
