//! End-to-end cache scenarios against the real backing stores.
//!
//! Separate use-case instances share one store, which is how the cache
//! is wired in an application: the store exclusively owns its file, and
//! every loader holds it by reference.

use std::sync::Arc;

use feedstash_storage::{
    FeedStore, ImageStore, JsonFeedStore, LmdbFeedStore, LocalFeedLoader, LocalImageLoader,
    fixed_clock, system_clock,
};
use feedstash_test_utils::{expired_timestamp, now, unique_feed, unique_image_url};
use tempfile::TempDir;

fn lmdb_store() -> (Arc<LmdbFeedStore>, TempDir) {
    let temp_dir = TempDir::new().expect("TempDir creation should succeed");
    let store = LmdbFeedStore::open(temp_dir.path(), 10).expect("store should open");
    (Arc::new(store), temp_dir)
}

fn json_store() -> (Arc<JsonFeedStore>, TempDir) {
    let temp_dir = TempDir::new().expect("TempDir creation should succeed");
    let store = JsonFeedStore::new(temp_dir.path().join("feed-cache.json"));
    (Arc::new(store), temp_dir)
}

fn feed_loader(store: Arc<dyn FeedStore>) -> LocalFeedLoader {
    LocalFeedLoader::new(store, system_clock())
}

/// Drive the scheduler until the fire-and-forget maintenance task has
/// had a chance to finish. Each probe retrieve forces a full round trip
/// through the store's execution context.
async fn settle_until_empty(store: &dyn FeedStore) -> bool {
    for _ in 0..1_000 {
        if store.retrieve().await.unwrap().is_none() {
            return true;
        }
        tokio::task::yield_now().await;
    }
    false
}

/// Give an already-submitted maintenance task ample scheduling turns.
async fn settle(store: &dyn FeedStore) {
    for _ in 0..50 {
        let _ = store.retrieve().await;
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_load_from_empty_cache_delivers_no_items() {
    let (store, _temp_dir) = lmdb_store();
    let loader = feed_loader(store);

    let result = loader.load().outcome().await.unwrap();

    assert_eq!(result, Ok(Vec::new()));
}

#[tokio::test]
async fn test_separate_loader_instance_delivers_saved_items() {
    let (store, _temp_dir) = lmdb_store();
    let save_loader = feed_loader(Arc::clone(&store) as Arc<dyn FeedStore>);
    let load_loader = feed_loader(store);
    let expected = unique_feed();

    save_loader
        .save(expected.clone())
        .outcome()
        .await
        .unwrap()
        .unwrap();
    let result = load_loader.load().outcome().await.unwrap();

    assert_eq!(result, Ok(expected));
}

#[tokio::test]
async fn test_save_overrides_items_saved_by_separate_instance() {
    let (store, _temp_dir) = lmdb_store();
    let first_saver = feed_loader(Arc::clone(&store) as Arc<dyn FeedStore>);
    let last_saver = feed_loader(Arc::clone(&store) as Arc<dyn FeedStore>);
    let load_loader = feed_loader(store);

    let first_items = unique_feed();
    let last_items = unique_feed();

    first_saver.save(first_items).outcome().await.unwrap().unwrap();
    last_saver
        .save(last_items.clone())
        .outcome()
        .await
        .unwrap()
        .unwrap();
    let result = load_loader.load().outcome().await.unwrap();

    assert_eq!(result, Ok(last_items));
}

#[tokio::test]
async fn test_json_store_round_trips_through_separate_loaders() {
    let (store, _temp_dir) = json_store();
    let save_loader = feed_loader(Arc::clone(&store) as Arc<dyn FeedStore>);
    let load_loader = feed_loader(store);
    let expected = unique_feed();

    save_loader
        .save(expected.clone())
        .outcome()
        .await
        .unwrap()
        .unwrap();
    let result = load_loader.load().outcome().await.unwrap();

    assert_eq!(result, Ok(expected));
}

#[tokio::test]
async fn test_validate_cache_purges_expired_snapshot() {
    let (store, _temp_dir) = lmdb_store();
    let at = now();

    // Stamp a snapshot exactly at the staleness boundary.
    let expired_saver = LocalFeedLoader::new(
        Arc::clone(&store) as Arc<dyn FeedStore>,
        fixed_clock(expired_timestamp(at)),
    );
    expired_saver
        .save(unique_feed())
        .outcome()
        .await
        .unwrap()
        .unwrap();

    let validator =
        LocalFeedLoader::new(Arc::clone(&store) as Arc<dyn FeedStore>, fixed_clock(at));
    validator.validate_cache();

    assert!(settle_until_empty(store.as_ref()).await);
}

#[tokio::test]
async fn test_validate_cache_keeps_fresh_snapshot() {
    let (store, _temp_dir) = lmdb_store();
    let items = unique_feed();

    let saver = feed_loader(Arc::clone(&store) as Arc<dyn FeedStore>);
    saver.save(items.clone()).outcome().await.unwrap().unwrap();

    let validator = feed_loader(Arc::clone(&store) as Arc<dyn FeedStore>);
    validator.validate_cache();
    settle(store.as_ref()).await;

    let loader = feed_loader(store);
    assert_eq!(loader.load().outcome().await.unwrap(), Ok(items));
}

#[tokio::test]
async fn test_corrupt_file_cache_is_purged_by_validate() {
    let (store, temp_dir) = json_store();
    std::fs::write(temp_dir.path().join("feed-cache.json"), b"not json").unwrap();

    let validator = feed_loader(Arc::clone(&store) as Arc<dyn FeedStore>);
    validator.validate_cache();

    for _ in 0..1_000 {
        match store.retrieve().await {
            Ok(None) => return,
            _ => tokio::task::yield_now().await,
        }
    }
    panic!("corrupt cache was never purged");
}

#[tokio::test]
async fn test_image_saved_by_one_loader_is_loaded_by_another() {
    let (store, _temp_dir) = lmdb_store();
    let save_loader = LocalImageLoader::new(Arc::clone(&store) as Arc<dyn ImageStore>);
    let load_loader = LocalImageLoader::new(store);
    let url = unique_image_url();
    let blob = vec![0u8, 1, 2, 3];

    save_loader
        .save_image(blob.clone(), url.clone())
        .outcome()
        .await
        .unwrap()
        .unwrap();
    let result = load_loader.load_image(url).outcome().await.unwrap();

    assert_eq!(result, Ok(blob));
}

#[tokio::test]
async fn test_feed_and_image_caches_share_one_store_file() {
    let (store, _temp_dir) = lmdb_store();
    let feed_cache = feed_loader(Arc::clone(&store) as Arc<dyn FeedStore>);
    let image_cache = LocalImageLoader::new(Arc::clone(&store) as Arc<dyn ImageStore>);

    let items = unique_feed();
    let url = items[0].image_url.clone();
    let blob = vec![9u8, 9];

    feed_cache.save(items.clone()).outcome().await.unwrap().unwrap();
    image_cache
        .save_image(blob.clone(), url.clone())
        .outcome()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(feed_cache.load().outcome().await.unwrap(), Ok(items));
    assert_eq!(
        image_cache.load_image(url).outcome().await.unwrap(),
        Ok(blob)
    );
}
