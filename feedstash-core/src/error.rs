//! Error types for feedstash operations

use thiserror::Error;

/// Store layer errors.
///
/// `OpenFailed` is a construction-time error: the store instance is
/// unusable and the failure is surfaced once at creation. The remaining
/// variants are per-operation errors. Staleness is not an error anywhere
/// in this taxonomy; the caching use-case represents it as "no data".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Failed to open store at {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    #[error("Read failed: {reason}")]
    ReadFailed { reason: String },

    #[error("Corrupt cache: {reason}")]
    Corrupt { reason: String },

    #[error("Write failed: {reason}")]
    WriteFailed { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },
}

/// Normalized errors reported by the image-loading use-case.
///
/// Raw store errors never cross this boundary; callers only learn
/// whether the load failed or the image was never cached.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ImageLoadError {
    #[error("Image load failed")]
    Failed,

    #[error("Image not found in cache")]
    NotFound,
}

/// Normalized error reported by the image-saving use-case.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ImageSaveError {
    #[error("Image save failed")]
    Failed,
}

/// Master error type for all feedstash errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedCacheError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Image load error: {0}")]
    ImageLoad(#[from] ImageLoadError),

    #[error("Image save error: {0}")]
    ImageSave(#[from] ImageSaveError),
}

/// Result type alias for feedstash operations.
pub type FeedCacheResult<T> = Result<T, FeedCacheError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_open_failed() {
        let err = StoreError::OpenFailed {
            path: "/tmp/cache".to_string(),
            reason: "permission denied".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Failed to open store"));
        assert!(msg.contains("/tmp/cache"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_store_error_display_corrupt() {
        let err = StoreError::Corrupt {
            reason: "unexpected end of input".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Corrupt cache"));
        assert!(msg.contains("unexpected end of input"));
    }

    #[test]
    fn test_image_load_error_display() {
        assert_eq!(format!("{}", ImageLoadError::Failed), "Image load failed");
        assert_eq!(
            format!("{}", ImageLoadError::NotFound),
            "Image not found in cache"
        );
    }

    #[test]
    fn test_feed_cache_error_from_variants() {
        let store = FeedCacheError::from(StoreError::ReadFailed {
            reason: "io".to_string(),
        });
        assert!(matches!(store, FeedCacheError::Store(_)));

        let load = FeedCacheError::from(ImageLoadError::NotFound);
        assert!(matches!(load, FeedCacheError::ImageLoad(_)));

        let save = FeedCacheError::from(ImageSaveError::Failed);
        assert!(matches!(save, FeedCacheError::ImageSave(_)));
    }
}
