//! Translation resolution over the store, the cache and the fallback.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use super::error::BackendError;
use super::missing::{
    LogOnMiss,
    MissHandler,
};
use super::snapshot::Snapshot;
use crate::cache::{
    CacheGateway,
    CacheStrategy,
};
use crate::fallback::FallbackSource;
use crate::key::{
    CanonicalKey,
    DEFAULT_SEPARATOR,
    KeyInput,
    expand_prefix_chain,
    flatten_value,
    normalize,
    resolve_records,
};
use crate::settings::BackendSettings;
use crate::store::RecordStore;
use crate::types::{
    LookupOptions,
    Resolved,
};

/// 選択された戦略のランタイム状態
#[derive(Debug)]
enum CacheMode {
    /// キャッシュなし。毎回ストアを引く
    Disabled,
    /// ストア全体のスナップショット。初回ルックアップで構築される
    Snapshot(RwLock<Option<Arc<Snapshot>>>),
    /// 外部キャッシュへのキー単位の cache-aside
    External(CacheGateway),
}

/// Storage-backed translation resolver.
///
/// A lookup normalizes its key, consults the configured cache layer, then
/// the store, then the optional fallback. Fallback hits are persisted so a
/// key is answered from the store on every later lookup. A key nobody can
/// answer resolves to `Ok(None)` and is reported to the miss handler.
pub struct Resolver {
    /// 翻訳レコードの永続ストア
    store: Arc<dyn RecordStore>,
    /// キャッシュ層のランタイム状態
    cache: CacheMode,
    /// ストアに無いキーを補う翻訳ソース
    fallback: Option<Arc<dyn FallbackSource>>,
    /// 一次ストアのミス通知先
    miss_handler: Arc<dyn MissHandler>,
    /// 有効な設定
    settings: BackendSettings,
}

impl Resolver {
    /// ストアとキャッシュ戦略からリゾルバを構築する
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        strategy: CacheStrategy,
        settings: BackendSettings,
    ) -> Self {
        let cache = match strategy {
            CacheStrategy::NoCache => CacheMode::Disabled,
            CacheStrategy::Snapshot => CacheMode::Snapshot(RwLock::new(None)),
            CacheStrategy::External(client) => {
                CacheMode::External(CacheGateway::new(client, settings.cache_namespace.clone()))
            }
        };
        Self { store, cache, fallback: None, miss_handler: Arc::new(LogOnMiss), settings }
    }

    /// フォールバックを設定する
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackSource>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// ミスハンドラを差し替える
    #[must_use]
    pub fn with_miss_handler(mut self, handler: Arc<dyn MissHandler>) -> Self {
        self.miss_handler = handler;
        self
    }

    /// 有効な設定
    #[must_use]
    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    /// このリゾルバが使うストアへのハンドル
    #[must_use]
    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    /// Resolve `key` in `locale` to a scalar value or a subtree.
    ///
    /// `Ok(None)` means no layer had an answer; it is not an error.
    ///
    /// # Errors
    /// - [`BackendError::Key`] when the key cannot be normalized
    /// - [`BackendError::Store`] when the record store fails
    /// - [`BackendError::Cache`] when the cache layer fails; a broken cache
    ///   fails the lookup rather than silently degrading
    pub async fn lookup(
        &self,
        locale: &str,
        key: impl Into<KeyInput<'_>>,
        options: &LookupOptions,
    ) -> Result<Option<Resolved>, BackendError> {
        let separator = options.separator.as_deref().unwrap_or(&self.settings.separator);
        let key = normalize(key.into(), &options.scope, separator)?;

        match &self.cache {
            CacheMode::Snapshot(slot) => self.lookup_in_snapshot(slot, locale, &key).await,
            CacheMode::External(gateway) => {
                let cache_key = gateway.cache_key(locale, key.as_str());
                let loaded =
                    gateway.fetch_or_load(&cache_key, || self.query_store(locale, &key)).await?;
                match loaded {
                    Some(resolved) => Ok(Some(resolved)),
                    None => self.resolve_miss(locale, &key, options).await,
                }
            }
            CacheMode::Disabled => match self.query_store(locale, &key).await? {
                Some(resolved) => Ok(Some(resolved)),
                None => self.resolve_miss(locale, &key, options).await,
            },
        }
    }

    /// Write a nested mapping of translations for `locale`.
    ///
    /// The mapping is flattened to dotted keys. Each key replaces whatever
    /// occupied its path before: ancestor scalars, a previous value and
    /// descendant records are deleted, then the new record is created.
    ///
    /// # Errors
    /// Store and cache failures abort the write.
    pub async fn store_translations(
        &self,
        locale: &str,
        data: &Value,
    ) -> Result<(), BackendError> {
        let entries = flatten_value(data, DEFAULT_SEPARATOR);
        warn_on_shape_conflicts(locale, &entries);

        let mut stored: Vec<(&str, &str)> = Vec::new();
        for (key, value) in &entries {
            if key.split(DEFAULT_SEPARATOR).any(str::is_empty) {
                tracing::warn!(locale, key = key.as_str(), "skipping malformed translation key");
                continue;
            }
            let doomed = expand_prefix_chain(key);
            self.store
                .delete_where(locale, &doomed, Some(key), self.settings.cleanup_with_destroy)
                .await?;
            self.store.create(locale, key, value, &[]).await?;
            stored.push((key, value));
        }

        if stored.is_empty() {
            tracing::debug!(locale, "no storable translations in batch");
            return Ok(());
        }
        self.refresh_after_write(locale, &stored).await
    }

    /// Drop all cached translations. Safe to call repeatedly.
    ///
    /// # Errors
    /// External cache failures are reported; the snapshot variant cannot fail.
    pub async fn invalidate(&self) -> Result<(), BackendError> {
        match &self.cache {
            CacheMode::Disabled => Ok(()),
            CacheMode::Snapshot(slot) => {
                *slot.write().await = None;
                Ok(())
            }
            CacheMode::External(gateway) => {
                gateway.invalidate_all(gateway.namespace()).await?;
                Ok(())
            }
        }
    }

    /// Push one externally changed record into the cache layer.
    ///
    /// # Errors
    /// External cache failures are reported.
    pub async fn reload_key(
        &self,
        locale: &str,
        key: &str,
        value: &str,
    ) -> Result<(), BackendError> {
        match &self.cache {
            CacheMode::Disabled => Ok(()),
            CacheMode::Snapshot(slot) => {
                *slot.write().await = None;
                Ok(())
            }
            CacheMode::External(gateway) => {
                let cache_key = gateway.cache_key(locale, key);
                gateway.write_key(&cache_key, &Resolved::Value(value.to_string())).await?;
                tracing::debug!(locale, key, "reloaded cached translation");
                Ok(())
            }
        }
    }

    /// The distinct locales present in the store. A failing store degrades
    /// to an empty list instead of failing the caller.
    pub async fn available_locales(&self) -> Vec<String> {
        match self.store.available_locales().await {
            Ok(locales) => locales,
            Err(e) => {
                tracing::warn!("failed to list available locales: {e}");
                Vec::new()
            }
        }
    }

    /// スナップショットを必要なら構築してキーを辿る
    async fn lookup_in_snapshot(
        &self,
        slot: &RwLock<Option<Arc<Snapshot>>>,
        locale: &str,
        key: &CanonicalKey,
    ) -> Result<Option<Resolved>, BackendError> {
        {
            let guard = slot.read().await;
            if let Some(snapshot) = guard.as_ref() {
                return Ok(snapshot.navigate(locale, key));
            }
        }

        let mut guard = slot.write().await;
        // 書き込みロック待ちの間に別タスクが構築済みのことがある
        if guard.is_none() {
            *guard = Some(Arc::new(Snapshot::load(self.store.as_ref()).await?));
        }
        Ok(guard.as_ref().and_then(|snapshot| snapshot.navigate(locale, key)))
    }

    /// ストアへ問い合わせ、取れたレコードを値またはサブツリーへ整形する
    async fn query_store(
        &self,
        locale: &str,
        key: &CanonicalKey,
    ) -> Result<Option<Resolved>, BackendError> {
        let records = self.store.find_by_key_or_prefix(locale, key.as_str()).await?;
        let resolved = resolve_records(key, &records);
        if resolved.is_none() {
            tracing::debug!(locale, key = key.as_str(), "no stored translation");
        }
        Ok(resolved)
    }

    /// ストアに無かったキーをフォールバックで補い、ミスハンドラへ通知する
    async fn resolve_miss(
        &self,
        locale: &str,
        key: &CanonicalKey,
        options: &LookupOptions,
    ) -> Result<Option<Resolved>, BackendError> {
        let resolved = match &self.fallback {
            Some(fallback) => match fallback.translate(locale, key.as_str()).await {
                Some(text) => {
                    // フォールバックの回答は永続化し、次回からストアで解決する
                    if let Err(e) = self.store.create(locale, key.as_str(), &text, &[]).await {
                        tracing::warn!(
                            locale,
                            key = key.as_str(),
                            "failed to persist fallback hit: {e}"
                        );
                    }
                    Some(Resolved::Value(text))
                }
                None => None,
            },
            None => None,
        };

        self.miss_handler.on_miss(locale, key, options).await;
        Ok(resolved)
    }

    /// 書き込んだキーをキャッシュ層へ反映する
    async fn refresh_after_write(
        &self,
        locale: &str,
        stored: &[(&str, &str)],
    ) -> Result<(), BackendError> {
        match &self.cache {
            CacheMode::Disabled => Ok(()),
            CacheMode::Snapshot(slot) => {
                *slot.write().await = None;
                Ok(())
            }
            CacheMode::External(gateway) => {
                for &(key, value) in stored {
                    let cache_key = gateway.cache_key(locale, key);
                    gateway.write_key(&cache_key, &Resolved::Value(value.to_string())).await?;
                    // 祖先のサブツリーと子孫のエントリは陳腐化している
                    for ancestor in expand_prefix_chain(key) {
                        if ancestor != key {
                            gateway.invalidate_key(&gateway.cache_key(locale, &ancestor)).await?;
                        }
                    }
                    gateway.invalidate_all(&format!("{cache_key}{DEFAULT_SEPARATOR}")).await?;
                }
                // ロケール全体を載せた root エントリは prefix chain に現れない
                gateway.invalidate_key(&gateway.cache_key(locale, "")).await?;
                Ok(())
            }
        }
    }
}

/// 同一バッチ内でリーフと枝が衝突するキーを警告する
fn warn_on_shape_conflicts(locale: &str, entries: &BTreeMap<String, String>) {
    for (value_key, branch_key) in shape_conflicts(entries) {
        tracing::warn!(
            locale,
            branch = branch_key.as_str(),
            "conflicting key shape in batch: {value_key:?} is both value and branch"
        );
    }
}

/// 値としても枝としても現れるキーを `(値キー, 子孫キー)` の組で列挙する
fn shape_conflicts(entries: &BTreeMap<String, String>) -> Vec<(String, String)> {
    let mut conflicts = Vec::new();
    for key in entries.keys() {
        for ancestor in expand_prefix_chain(key) {
            if ancestor != *key && entries.contains_key(&ancestor) {
                conflicts.push((ancestor, key.clone()));
            }
        }
    }
    conflicts
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("store", &"<RecordStore>")
            .field("cache", &self.cache)
            .field("fallback", &self.fallback.as_ref().map(|_| "<FallbackSource>"))
            .field("miss_handler", &"<MissHandler>")
            .field("settings", &self.settings)
            .finish()
    }
}
