//! In-memory record store.

use std::collections::{
    BTreeMap,
    BTreeSet,
};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::key::is_descendant;
use crate::store::{
    RecordStore,
    StoreError,
    TranslationRecord,
};

/// [`RecordStore`] backed by a process-local sorted map.
///
/// Suited to tests and single-process setups. Deletion is always physical;
/// the `destroy` flag only matters for stores that keep soft-deleted rows.
#[derive(Clone, Debug, Default)]
pub struct MemoryRecordStore {
    /// (ロケール, キー) で引くレコードのマップ
    records: Arc<RwLock<BTreeMap<(String, String), TranslationRecord>>>,
}

impl MemoryRecordStore {
    /// 空のストアを作成
    #[must_use]
    pub fn new() -> Self {
        Self { records: Arc::new(RwLock::new(BTreeMap::new())) }
    }

    /// Seed or overwrite a record, bypassing the duplicate check.
    pub async fn put(&self, locale: &str, key: &str, value: &str) {
        let record = TranslationRecord {
            locale: locale.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            interpolations: Vec::new(),
        };
        self.records.write().await.insert((locale.to_string(), key.to_string()), record);
    }

    /// 保持しているレコード数
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// レコードが空かどうか
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Snapshot of every record, ordered by locale then key.
    pub async fn all_records(&self) -> Vec<TranslationRecord> {
        self.records.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(
        &self,
        locale: &str,
        key: &str,
        value: &str,
        interpolations: &[String],
    ) -> Result<TranslationRecord, StoreError> {
        let mut records = self.records.write().await;
        let id = (locale.to_string(), key.to_string());
        if records.contains_key(&id) {
            return Err(StoreError::Duplicate {
                locale: locale.to_string(),
                key: key.to_string(),
            });
        }
        let record = TranslationRecord {
            locale: locale.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            interpolations: interpolations.to_vec(),
        };
        records.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_key_or_prefix(
        &self,
        locale: &str,
        key: &str,
    ) -> Result<Vec<TranslationRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|record| {
                record.locale == locale
                    && (key.is_empty() || record.key == key || is_descendant(&record.key, key))
            })
            .cloned()
            .collect())
    }

    async fn delete_where(
        &self,
        locale: &str,
        keys: &[String],
        descendants_of: Option<&str>,
        _destroy: bool,
    ) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|(record_locale, record_key), _| {
            if record_locale != locale {
                return true;
            }
            let matched = keys.contains(record_key)
                || descendants_of.is_some_and(|ancestor| is_descendant(record_key, ancestor));
            !matched
        });
        Ok(before - records.len())
    }

    async fn exists_where(&self, locale: &str, key: &str) -> Result<bool, StoreError> {
        let records = self.records.read().await;
        Ok(records.keys().any(|(record_locale, record_key)| {
            record_locale == locale && (record_key == key || is_descendant(record_key, key))
        }))
    }

    async fn available_locales(&self) -> Result<Vec<String>, StoreError> {
        let records = self.records.read().await;
        let locales: BTreeSet<String> =
            records.keys().map(|(locale, _)| locale.clone()).collect();
        Ok(locales.into_iter().collect())
    }
}
