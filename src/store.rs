//! Persistent translation-record storage.
//!
//! A [`RecordStore`] holds one row per flat dotted key and locale. The
//! resolver queries it by exact key or key prefix and never interprets the
//! rows itself; shape decisions happen in [`crate::key`].

use async_trait::async_trait;
use thiserror::Error;

/// In-memory store for tests and single-process setups
mod memory;

pub use memory::MemoryRecordStore;

/// One stored translation: a locale, a flat dotted key and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    /// ロケールコード (例: `"en"`, `"ja"`)
    pub locale: String,
    /// ドット区切りのフラットキー
    pub key: String,
    /// 翻訳テキスト。未翻訳スタブは空文字列
    pub value: String,
    /// Interpolation argument names captured when the record was stubbed.
    pub interpolations: Vec<String>,
}

/// ストア操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store could not be reached or answered abnormally.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A record with the same locale and key already exists.
    #[error("duplicate record for locale {locale:?} key {key:?}")]
    Duplicate {
        /// 対象ロケール
        locale: String,
        /// 衝突したキー
        key: String,
    },
}

/// Storage backend for translation records.
///
/// `find_by_key_or_prefix` with an empty key returns every record of the
/// locale; with a non-empty key it returns the exact match plus all records
/// whose key lies strictly below it.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record. Fails with [`StoreError::Duplicate`] when the
    /// locale/key pair is already present.
    async fn create(
        &self,
        locale: &str,
        key: &str,
        value: &str,
        interpolations: &[String],
    ) -> Result<TranslationRecord, StoreError>;

    /// Fetch the records matching `key` exactly or lying below it.
    async fn find_by_key_or_prefix(
        &self,
        locale: &str,
        key: &str,
    ) -> Result<Vec<TranslationRecord>, StoreError>;

    /// Delete the records whose key is in `keys`, plus every descendant of
    /// `descendants_of` when given. `destroy` requests a hard delete where
    /// the store distinguishes soft deletion. Returns the affected count.
    async fn delete_where(
        &self,
        locale: &str,
        keys: &[String],
        descendants_of: Option<&str>,
        destroy: bool,
    ) -> Result<usize, StoreError>;

    /// Whether a record exists for this key or any key below it.
    async fn exists_where(&self, locale: &str, key: &str) -> Result<bool, StoreError>;

    /// The distinct locales present in the store.
    async fn available_locales(&self) -> Result<Vec<String>, StoreError>;
}
