//! In-memory translation cache.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use globset::Glob;
use tokio::sync::RwLock;

use crate::cache::{
    CacheError,
    TranslationCache,
};

/// [`TranslationCache`] backed by a process-local map.
///
/// Pattern deletion compiles the pattern as a glob; `*` matches across
/// segment boundaries, matching what namespace-wide invalidation expects.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    /// キャッシュキーとペイロードのマップ
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryCache {
    /// 空のキャッシュを作成
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// 保持しているエントリ数
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// エントリが空かどうか
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl TranslationCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, payload: &str) -> Result<(), CacheError> {
        self.entries.write().await.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    async fn delete_matched(&self, pattern: &str) -> Result<usize, CacheError> {
        let matcher = Glob::new(pattern)
            .map_err(|e| CacheError::Pattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?
            .compile_matcher();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !matcher.is_match(key));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_payload() {
        let cache = MemoryCache::new();

        cache.set("i18n.en.greeting", "\"Hello\"").await.unwrap();

        assert_eq!(
            cache.get("i18n.en.greeting").await.unwrap(),
            Some("\"Hello\"".to_string())
        );
        assert_eq!(cache.get("i18n.en.missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_replaces_existing_payload() {
        let cache = MemoryCache::new();
        cache.set("i18n.en.greeting", "\"Hello\"").await.unwrap();

        cache.set("i18n.en.greeting", "\"Howdy\"").await.unwrap();

        assert_eq!(
            cache.get("i18n.en.greeting").await.unwrap(),
            Some("\"Howdy\"".to_string())
        );
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn delete_matched_with_literal_pattern() {
        let cache = MemoryCache::new();
        cache.set("i18n.en.a", "1").await.unwrap();
        cache.set("i18n.en.ab", "2").await.unwrap();

        let deleted = cache.delete_matched("i18n.en.a").await.unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(cache.get("i18n.en.ab").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn delete_matched_wildcard_crosses_segments() {
        let cache = MemoryCache::new();
        cache.set("i18n.en.greeting.formal", "1").await.unwrap();
        cache.set("i18n.ja.greeting.formal", "2").await.unwrap();
        cache.set("other.en.greeting", "3").await.unwrap();

        let deleted = cache.delete_matched("i18n*").await.unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("other.en.greeting").await.unwrap(), Some("3".to_string()));
    }

    #[tokio::test]
    async fn delete_matched_rejects_invalid_pattern() {
        let cache = MemoryCache::new();

        let result = cache.delete_matched("i18n.[invalid").await;

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, CacheError::Pattern { .. }));
    }
}
