//! Cache-aside access to an external translation cache.

use std::future::Future;
use std::sync::Arc;

use crate::cache::{
    CacheError,
    TranslationCache,
};
use crate::types::Resolved;

/// Namespaced cache-aside gateway over a [`TranslationCache`].
///
/// Entries are keyed `{namespace}.{locale}.{key}` and hold the resolved
/// value as JSON. Misses are deliberately not cached so that later writes
/// to the store become visible without an invalidation.
#[derive(Clone)]
pub struct CacheGateway {
    /// 外部キャッシュのクライアント
    client: Arc<dyn TranslationCache>,
    /// キャッシュキーの名前空間プレフィックス
    namespace: String,
}

impl CacheGateway {
    /// 新しいゲートウェイを作成
    pub fn new(client: Arc<dyn TranslationCache>, namespace: impl Into<String>) -> Self {
        Self { client, namespace: namespace.into() }
    }

    /// キャッシュキーの名前空間
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// ロケールとキーからキャッシュキーを組み立てる
    #[must_use]
    pub fn cache_key(&self, locale: &str, key: &str) -> String {
        format!("{}.{locale}.{key}", self.namespace)
    }

    /// Return the cached entry for `cache_key`, or run `loader` and cache
    /// its result. A `None` from the loader is returned but never cached.
    ///
    /// # Errors
    /// Cache failures fail the lookup; they are not treated as misses.
    pub async fn fetch_or_load<F, Fut, E>(
        &self,
        cache_key: &str,
        loader: F,
    ) -> Result<Option<Resolved>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Resolved>, E>>,
        E: From<CacheError>,
    {
        if let Some(payload) = self.client.get(cache_key).await.map_err(E::from)? {
            tracing::debug!(cache_key, "translation cache hit");
            let resolved = serde_json::from_str(&payload).map_err(|e| {
                E::from(CacheError::Codec { key: cache_key.to_string(), message: e.to_string() })
            })?;
            return Ok(Some(resolved));
        }

        let loaded = loader().await?;
        match &loaded {
            Some(resolved) => self.write_key(cache_key, resolved).await.map_err(E::from)?,
            None => tracing::debug!(cache_key, "lookup missed; cache left unset"),
        }
        Ok(loaded)
    }

    /// Store `resolved` under `cache_key`, replacing any existing entry.
    ///
    /// # Errors
    pub async fn write_key(&self, cache_key: &str, resolved: &Resolved) -> Result<(), CacheError> {
        let payload = serde_json::to_string(resolved).map_err(|e| CacheError::Codec {
            key: cache_key.to_string(),
            message: e.to_string(),
        })?;
        self.client.set(cache_key, &payload).await
    }

    /// Drop the single entry stored under `cache_key`.
    ///
    /// # Errors
    pub async fn invalidate_key(&self, cache_key: &str) -> Result<usize, CacheError> {
        self.client.delete_matched(&globset::escape(cache_key)).await
    }

    /// Drop every entry whose key starts with `prefix`.
    ///
    /// # Errors
    pub async fn invalidate_all(&self, prefix: &str) -> Result<usize, CacheError> {
        let pattern = format!("{}*", globset::escape(prefix));
        let deleted = self.client.delete_matched(&pattern).await?;
        tracing::debug!(pattern, deleted, "invalidated cached translations");
        Ok(deleted)
    }
}

impl std::fmt::Debug for CacheGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheGateway")
            .field("client", &"<TranslationCache>")
            .field("namespace", &self.namespace)
            .finish()
    }
}
