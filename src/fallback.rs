//! Read-only fallback translations.
//!
//! A fallback source answers lookups the store cannot, typically from
//! catalogs bundled with the application. Hits are persisted back into the
//! store by the resolver, so a fallback only has to answer each key once.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::key::DEFAULT_SEPARATOR;

/// Secondary lookup consulted when the store has no answer.
///
/// Keys arrive in canonical dotted form. Failures are indistinguishable
/// from misses by design; a fallback can never fail a lookup.
#[async_trait]
pub trait FallbackSource: Send + Sync {
    /// Return the fallback text for `key` in `locale`, if known.
    async fn translate(&self, locale: &str, key: &str) -> Option<String>;
}

/// [`FallbackSource`] over nested in-memory catalogs, one per locale.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    /// ロケールごとのネストしたカタログ
    catalogs: HashMap<String, Value>,
}

impl StaticCatalog {
    /// 空のカタログ集合を作成
    #[must_use]
    pub fn new() -> Self {
        Self { catalogs: HashMap::new() }
    }

    /// ロケールのカタログを登録する
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>, catalog: Value) -> Self {
        self.catalogs.insert(locale.into(), catalog);
        self
    }

    /// ドット区切りキーでカタログを辿る
    fn resolve(&self, locale: &str, key: &str) -> Option<String> {
        let mut node = self.catalogs.get(locale)?;
        for segment in key.split(DEFAULT_SEPARATOR).filter(|segment| !segment.is_empty()) {
            node = node.get(segment)?;
        }
        match node {
            Value::String(text) => Some(text.clone()),
            // サブツリーと null はフォールバック不可
            Value::Object(_) | Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[async_trait]
impl FallbackSource for StaticCatalog {
    async fn translate(&self, locale: &str, key: &str) -> Option<String> {
        self.resolve(locale, key)
    }
}
