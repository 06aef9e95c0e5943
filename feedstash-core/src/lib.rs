//! Feedstash Core - Feed Record Shapes
//!
//! Pure data structures with no behavior beyond shape mapping. All other
//! crates depend on this. This crate contains ONLY data types and the
//! error taxonomy - no storage or policy logic.

use chrono::{DateTime, Utc};

pub mod error;
pub mod feed;

pub use error::{
    FeedCacheError, FeedCacheResult, ImageLoadError, ImageSaveError, StoreError,
};
pub use feed::{CachedFeed, FeedItem, LocalFeedItem};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;
