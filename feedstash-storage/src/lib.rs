//! Feedstash Storage - Store Contracts and Caching Use-Cases
//!
//! The cache orchestration and storage layer: the freshness policy, the
//! store contracts, two feed-store backends with different durability
//! and concurrency mechanics, the per-URL image blob store, and the
//! use-case layer composing them.
//!
//! # Layering
//!
//! ```text
//! caller -> LocalFeedLoader -> FeedStore  -> JsonFeedStore | LmdbFeedStore
//! caller -> LocalImageLoader -> ImageStore -> LmdbFeedStore
//! ```
//!
//! Stores are policy-agnostic; the seven-day freshness rule is applied
//! only by [`LocalFeedLoader`]. Each store is linearizable per instance:
//! [`JsonFeedStore`] through a FIFO reader/writer gate, [`LmdbFeedStore`]
//! through a single serial worker bound to the store file.

pub mod image_loader;
pub mod json_store;
pub mod lmdb;
pub mod loader;
pub mod policy;
pub mod spy;
pub mod store;
pub mod task;

pub use image_loader::LocalImageLoader;
pub use json_store::JsonFeedStore;
pub use lmdb::LmdbFeedStore;
pub use loader::{LoadResult, LocalFeedLoader, SaveResult};
pub use policy::FeedCachePolicy;
pub use spy::{FeedStoreOp, ImageStoreOp, SpyFeedStore, SpyImageStore};
pub use store::{FeedStore, ImageStore};
pub use task::{fixed_clock, system_clock, Clock, InFlight, Liveness};
