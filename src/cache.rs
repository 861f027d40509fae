//! External-cache abstraction and caching strategy selection.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::settings::{
    BackendSettings,
    CacheSource,
    SettingsError,
    ValidationError,
};

/// Cache-aside read/write layer over a [`TranslationCache`]
mod gateway;
/// In-memory cache for tests and single-process setups
mod memory;

pub use gateway::CacheGateway;
pub use memory::MemoryCache;

/// キャッシュ操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The cache service could not be reached or answered abnormally.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// A deletion pattern was rejected by the cache.
    #[error("invalid cache pattern {pattern:?}: {message}")]
    Pattern {
        /// 対象パターン
        pattern: String,
        /// エラー内容
        message: String,
    },

    /// A cached payload could not be encoded or decoded.
    #[error("cache payload for {key:?} is unreadable: {message}")]
    Codec {
        /// 対象キャッシュキー
        key: String,
        /// エラー内容
        message: String,
    },
}

/// External key/value cache with glob-style bulk deletion.
///
/// Payloads are opaque strings; the gateway handles serialization. Patterns
/// passed to `delete_matched` use `*` as a wildcard that crosses segment
/// boundaries.
#[async_trait]
pub trait TranslationCache: Send + Sync {
    /// Fetch the payload stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `payload` under `key`, replacing any existing entry.
    async fn set(&self, key: &str, payload: &str) -> Result<(), CacheError>;

    /// Delete every entry whose key matches `pattern`. Returns the count.
    async fn delete_matched(&self, pattern: &str) -> Result<usize, CacheError>;
}

/// How lookups interact with caching.
#[derive(Clone)]
pub enum CacheStrategy {
    /// Every lookup queries the store directly.
    NoCache,
    /// The whole store is materialized once and reads never hit it again.
    Snapshot,
    /// Cache-aside reads through an external cache service.
    External(Arc<dyn TranslationCache>),
}

impl CacheStrategy {
    /// 設定からキャッシュ戦略を選択する
    ///
    /// `cacheTranslations` が無効ならキャッシュなし。有効なら `cacheSource`
    /// に従い、`external` は `client` が必須。
    ///
    /// # Errors
    /// 外部キャッシュ指定時に `client` が渡されていない場合。
    pub fn from_settings(
        settings: &BackendSettings,
        client: Option<Arc<dyn TranslationCache>>,
    ) -> Result<Self, SettingsError> {
        if !settings.cache_translations {
            return Ok(Self::NoCache);
        }
        match settings.cache_source {
            CacheSource::Memory => Ok(Self::Snapshot),
            CacheSource::External => client.map(Self::External).ok_or_else(|| {
                SettingsError::ValidationErrors(vec![ValidationError::new(
                    "cacheSource",
                    "external cache source requires a cache client",
                )])
            }),
        }
    }
}

impl std::fmt::Debug for CacheStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCache => f.write_str("NoCache"),
            Self::Snapshot => f.write_str("Snapshot"),
            Self::External(_) => f.write_str("External(<TranslationCache>)"),
        }
    }
}
