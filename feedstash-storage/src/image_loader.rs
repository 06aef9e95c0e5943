//! Image caching use-cases: per-URL blob load and save.
//!
//! Unlike the feed cache, absence here is an error: an image load always
//! follows an explicit save, so a missing blob means something went
//! wrong upstream. Store errors never cross this boundary raw; they are
//! normalized to [`ImageLoadError`] / [`ImageSaveError`].

use std::sync::Arc;

use feedstash_core::{ImageLoadError, ImageSaveError};
use url::Url;

use crate::store::ImageStore;
use crate::task::{InFlight, Liveness};

/// The image caching use-case layer.
///
/// Every request gets its own cancellable [`InFlight`] handle;
/// cancelling one suppresses delivery to that caller only and never
/// aborts the underlying store operation, so other in-flight requests
/// sharing the store are untouched.
pub struct LocalImageLoader {
    store: Arc<dyn ImageStore>,
    live: Liveness,
}

impl LocalImageLoader {
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self {
            store,
            live: Liveness::new(),
        }
    }

    /// Load the blob cached for `url`.
    pub fn load_image(&self, url: Url) -> InFlight<Result<Vec<u8>, ImageLoadError>> {
        let (delivery, handle) = InFlight::channel();
        let store = Arc::clone(&self.store);
        let live = self.live.clone();

        tokio::spawn(async move {
            let result = match store.retrieve_image(&url).await {
                Err(_) => Err(ImageLoadError::Failed),
                Ok(None) => Err(ImageLoadError::NotFound),
                Ok(Some(blob)) => Ok(blob),
            };
            delivery.deliver(&live, result);
        });

        handle
    }

    /// Cache `data` as the blob for `url`.
    pub fn save_image(&self, data: Vec<u8>, url: Url) -> InFlight<Result<(), ImageSaveError>> {
        let (delivery, handle) = InFlight::channel();
        let store = Arc::clone(&self.store);
        let live = self.live.clone();

        tokio::spawn(async move {
            let result = store
                .insert_image(data, &url)
                .await
                .map_err(|_| ImageSaveError::Failed);
            delivery.deliver(&live, result);
        });

        handle
    }
}

impl Drop for LocalImageLoader {
    fn drop(&mut self) {
        self.live.revoke();
    }
}
