//! Whole-store materialization for snapshot caching.

use std::collections::HashMap;

use serde_json::Value;

use crate::key::{
    CanonicalKey,
    build_subtree,
};
use crate::store::{
    RecordStore,
    StoreError,
};
use crate::types::Resolved;

/// Every translation in the store, one nested tree per locale.
///
/// Built once when the first lookup arrives and replaced wholesale on
/// invalidation. Reads never touch the store again while a snapshot is live.
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    /// ロケールごとのネストした翻訳ツリー
    by_locale: HashMap<String, Value>,
}

impl Snapshot {
    /// ストア全体を読み込んでロケールごとのツリーを組み立てる
    pub(crate) async fn load(store: &dyn RecordStore) -> Result<Self, StoreError> {
        let mut by_locale = HashMap::new();
        for locale in store.available_locales().await? {
            let records = store.find_by_key_or_prefix(&locale, "").await?;
            let entries = records.iter().map(|r| (r.key.as_str(), r.value.as_str()));
            by_locale.insert(locale, Value::Object(build_subtree("", entries)));
        }
        tracing::debug!(locales = by_locale.len(), "materialized translation snapshot");
        Ok(Self { by_locale })
    }

    /// ロケールのツリーをキーで辿る。ルートキーはロケール全体を返す
    pub(crate) fn navigate(&self, locale: &str, key: &CanonicalKey) -> Option<Resolved> {
        let mut node = self.by_locale.get(locale)?;
        for segment in key.segments() {
            node = node.get(segment)?;
        }
        match node {
            Value::String(text) => Some(Resolved::Value(text.clone())),
            Value::Object(map) => Some(Resolved::Subtree(map.clone())),
            // 型付きリーフは保存テキストと同じ JSON 表現で返す
            other => Some(Resolved::Value(other.to_string())),
        }
    }
}
