//! Spy stores for exercising the use-case layer without real storage.
//!
//! Each spy records the operations it receives, in order, and replays
//! programmed results. An operation with no programmed result falls back
//! to the success default (`Ok(())` for mutations, `Ok(None)` for
//! retrievals), so tests only stub what they care about.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use feedstash_core::{CachedFeed, LocalFeedItem, StoreError, Timestamp};
use url::Url;

use crate::store::{FeedStore, ImageStore};

/// An operation received by a [`SpyFeedStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStoreOp {
    DeleteFeed,
    Insert {
        feed: Vec<LocalFeedItem>,
        timestamp: Timestamp,
    },
    Retrieve,
}

/// In-memory spy implementation of [`FeedStore`].
#[derive(Debug, Default)]
pub struct SpyFeedStore {
    ops: Mutex<Vec<FeedStoreOp>>,
    delete_results: Mutex<VecDeque<Result<(), StoreError>>>,
    insert_results: Mutex<VecDeque<Result<(), StoreError>>>,
    retrieve_results: Mutex<VecDeque<Result<Option<CachedFeed>, StoreError>>>,
}

impl SpyFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next `delete_feed`.
    pub fn stub_delete(&self, result: Result<(), StoreError>) {
        self.delete_results.lock().unwrap().push_back(result);
    }

    /// Queue the result of the next `insert`.
    pub fn stub_insert(&self, result: Result<(), StoreError>) {
        self.insert_results.lock().unwrap().push_back(result);
    }

    /// Queue the result of the next `retrieve`.
    pub fn stub_retrieve(&self, result: Result<Option<CachedFeed>, StoreError>) {
        self.retrieve_results.lock().unwrap().push_back(result);
    }

    /// The operations received so far, in submission order.
    pub fn received(&self) -> Vec<FeedStoreOp> {
        self.ops.lock().unwrap().clone()
    }

    fn record(&self, op: FeedStoreOp) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait]
impl FeedStore for SpyFeedStore {
    async fn delete_feed(&self) -> Result<(), StoreError> {
        self.record(FeedStoreOp::DeleteFeed);
        self.delete_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn insert(
        &self,
        feed: Vec<LocalFeedItem>,
        timestamp: Timestamp,
    ) -> Result<(), StoreError> {
        self.record(FeedStoreOp::Insert { feed, timestamp });
        self.insert_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, StoreError> {
        self.record(FeedStoreOp::Retrieve);
        self.retrieve_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

/// An operation received by a [`SpyImageStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStoreOp {
    Insert { url: Url, data: Vec<u8> },
    Retrieve { url: Url },
}

/// In-memory spy implementation of [`ImageStore`].
#[derive(Debug, Default)]
pub struct SpyImageStore {
    ops: Mutex<Vec<ImageStoreOp>>,
    insert_results: Mutex<VecDeque<Result<(), StoreError>>>,
    retrieve_results: Mutex<VecDeque<Result<Option<Vec<u8>>, StoreError>>>,
}

impl SpyImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next `insert_image`.
    pub fn stub_insert(&self, result: Result<(), StoreError>) {
        self.insert_results.lock().unwrap().push_back(result);
    }

    /// Queue the result of the next `retrieve_image`.
    pub fn stub_retrieve(&self, result: Result<Option<Vec<u8>>, StoreError>) {
        self.retrieve_results.lock().unwrap().push_back(result);
    }

    /// The operations received so far, in submission order.
    pub fn received(&self) -> Vec<ImageStoreOp> {
        self.ops.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for SpyImageStore {
    async fn insert_image(&self, data: Vec<u8>, url: &Url) -> Result<(), StoreError> {
        self.ops.lock().unwrap().push(ImageStoreOp::Insert {
            url: url.clone(),
            data,
        });
        self.insert_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn retrieve_image(&self, url: &Url) -> Result<Option<Vec<u8>>, StoreError> {
        self.ops
            .lock()
            .unwrap()
            .push(ImageStoreOp::Retrieve { url: url.clone() });
        self.retrieve_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_spy_feed_store_defaults_to_success() {
        let store = SpyFeedStore::new();

        assert_eq!(store.delete_feed().await, Ok(()));
        assert_eq!(store.insert(Vec::new(), Utc::now()).await, Ok(()));
        assert_eq!(store.retrieve().await, Ok(None));
    }

    #[tokio::test]
    async fn test_spy_feed_store_records_operations_in_order() {
        let store = SpyFeedStore::new();
        let timestamp = Utc::now();

        store.retrieve().await.unwrap();
        store.delete_feed().await.unwrap();
        store.insert(Vec::new(), timestamp).await.unwrap();

        assert_eq!(
            store.received(),
            vec![
                FeedStoreOp::Retrieve,
                FeedStoreOp::DeleteFeed,
                FeedStoreOp::Insert {
                    feed: Vec::new(),
                    timestamp,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_spy_feed_store_replays_stubbed_results_in_order() {
        let store = SpyFeedStore::new();
        store.stub_retrieve(Err(StoreError::ReadFailed {
            reason: "first".to_string(),
        }));
        store.stub_retrieve(Ok(None));

        assert!(store.retrieve().await.is_err());
        assert_eq!(store.retrieve().await, Ok(None));
    }

    #[tokio::test]
    async fn test_spy_image_store_records_url_and_blob() {
        let store = SpyImageStore::new();
        let url = Url::parse("https://a-url.com/image.png").unwrap();

        store.insert_image(vec![1, 2], &url).await.unwrap();

        assert_eq!(
            store.received(),
            vec![ImageStoreOp::Insert {
                url,
                data: vec![1, 2],
            }]
        );
    }
}
