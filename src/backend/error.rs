use thiserror::Error;

use crate::cache::CacheError;
use crate::key::KeyError;
use crate::store::StoreError;

/// 解決処理が失敗した理由
///
/// A key that simply has no translation is not an error; lookups report
/// that as `Ok(None)`.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error when the lookup key cannot be normalized
    #[error("Invalid lookup key: {0}")]
    Key(#[from] KeyError),

    /// Error from the record store
    #[error("Translation store failed: {0}")]
    Store(#[from] StoreError),

    /// Error from the cache layer
    #[error("Translation cache failed: {0}")]
    Cache(#[from] CacheError),
}
