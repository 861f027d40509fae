//! Recording of translation keys nobody could resolve.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::error::BackendError;
use super::resolver::Resolver;
use crate::key::{
    CanonicalKey,
    KeyInput,
    normalize,
};
use crate::plural::PluralRegistry;
use crate::store::RecordStore;
use crate::types::{
    LookupOptions,
    Resolved,
};

/// Lookup argument names that never count as interpolation names.
const RESERVED_KEYS: [&str; 4] = ["count", "scope", "default", "separator"];

/// Strategy run when the primary store had no answer for a lookup.
#[async_trait]
pub trait MissHandler: Send + Sync {
    /// 一次ストアで解決できなかったルックアップの通知
    async fn on_miss(&self, locale: &str, key: &CanonicalKey, options: &LookupOptions);
}

/// Default [`MissHandler`]: one debug log line per miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnMiss;

#[async_trait]
impl MissHandler for LogOnMiss {
    async fn on_miss(&self, locale: &str, key: &CanonicalKey, _options: &LookupOptions) {
        tracing::debug!(locale, key = key.as_str(), "translation missing");
    }
}

/// Writes empty stub records for missed keys so translators find them in
/// the store.
///
/// With a pluralization count on the lookup, one stub per plural suffix of
/// the locale is written instead of the bare key. Interpolation argument
/// names are captured onto the stubs. Existing records always win; nothing
/// here ever overwrites a translation or fails the caller.
pub struct MissingRecorder {
    /// スタブの書き込み先ストア
    store: Arc<dyn RecordStore>,
    /// ロケールごとの複数形サフィックス
    plurals: Arc<dyn PluralRegistry>,
    /// ルックアップキーの既定の区切り文字
    separator: String,
}

impl MissingRecorder {
    /// レコーダーを作成する
    pub fn new(
        store: Arc<dyn RecordStore>,
        plurals: Arc<dyn PluralRegistry>,
        separator: impl Into<String>,
    ) -> Self {
        Self { store, plurals, separator: separator.into() }
    }

    /// Record stub rows for a key that resolved to nothing.
    ///
    /// Skipped when a record already exists for the key or below it. Every
    /// failure is swallowed and logged so the surrounding lookup is never
    /// broken by recording.
    pub async fn store_default_translations(
        &self,
        locale: &str,
        key: impl Into<KeyInput<'_>>,
        options: &LookupOptions,
    ) {
        let separator = options.separator.as_deref().unwrap_or(&self.separator);
        let base = match normalize(key.into(), &options.scope, separator) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!(locale, "cannot record malformed missing key: {e}");
                return;
            }
        };
        if base.is_root() {
            return;
        }

        match self.store.exists_where(locale, base.as_str()).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(
                    locale,
                    key = base.as_str(),
                    "missing-key existence check failed: {e}"
                );
                return;
            }
        }

        let interpolations: Vec<String> = options
            .args
            .keys()
            .filter(|name| !RESERVED_KEYS.contains(&name.as_str()))
            .cloned()
            .collect();

        let keys: Vec<String> = if options.count.is_some() {
            self.plurals
                .plural_suffixes(locale)
                .into_iter()
                .map(|suffix| format!("{}.{suffix}", base.as_str()))
                .collect()
        } else {
            vec![base.as_str().to_string()]
        };

        for stub_key in &keys {
            match self.store.create(locale, stub_key, "", &interpolations).await {
                Ok(_) => {
                    tracing::debug!(locale, key = stub_key.as_str(), "recorded missing translation");
                }
                Err(e) => {
                    tracing::warn!(
                        locale,
                        key = stub_key.as_str(),
                        "failed to record missing translation: {e}"
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for MissingRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MissingRecorder")
            .field("store", &"<RecordStore>")
            .field("plurals", &"<PluralRegistry>")
            .field("separator", &self.separator)
            .finish()
    }
}

/// [`Resolver`] wrapper that records a stub whenever a lookup resolves to
/// nothing. Every other operation passes through unchanged.
#[derive(Debug)]
pub struct MissRecordingResolver {
    /// ラップされたリゾルバ
    inner: Resolver,
    /// ミスしたキーのレコーダー
    recorder: MissingRecorder,
}

impl MissRecordingResolver {
    /// リゾルバをラップし、そのストアと区切り文字でレコーダーを組む
    #[must_use]
    pub fn new(inner: Resolver, plurals: Arc<dyn PluralRegistry>) -> Self {
        let recorder =
            MissingRecorder::new(inner.store(), plurals, inner.settings().separator.clone());
        Self { inner, recorder }
    }

    /// ラップされたリゾルバ
    #[must_use]
    pub fn inner(&self) -> &Resolver {
        &self.inner
    }

    /// Resolve a key, recording stubs when every layer misses.
    ///
    /// # Errors
    /// Same as [`Resolver::lookup`]; recording failures never surface.
    pub async fn lookup(
        &self,
        locale: &str,
        key: impl Into<KeyInput<'_>>,
        options: &LookupOptions,
    ) -> Result<Option<Resolved>, BackendError> {
        let key = key.into();
        let resolved = self.inner.lookup(locale, key, options).await?;
        if resolved.is_none() {
            self.recorder.store_default_translations(locale, key, options).await;
        }
        Ok(resolved)
    }

    /// 委譲: [`Resolver::store_translations`]
    pub async fn store_translations(
        &self,
        locale: &str,
        data: &Value,
    ) -> Result<(), BackendError> {
        self.inner.store_translations(locale, data).await
    }

    /// 委譲: [`Resolver::invalidate`]
    pub async fn invalidate(&self) -> Result<(), BackendError> {
        self.inner.invalidate().await
    }

    /// 委譲: [`Resolver::reload_key`]
    pub async fn reload_key(
        &self,
        locale: &str,
        key: &str,
        value: &str,
    ) -> Result<(), BackendError> {
        self.inner.reload_key(locale, key, value).await
    }

    /// 委譲: [`Resolver::available_locales`]
    pub async fn available_locales(&self) -> Vec<String> {
        self.inner.available_locales().await
    }
}
