//! リゾルバの統合テスト

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]
#![allow(clippy::indexing_slicing)]
#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};

use async_trait::async_trait;
use i18n_record_backend::cache::{
    CacheError,
    MemoryCache,
    TranslationCache,
};
use i18n_record_backend::fallback::StaticCatalog;
use i18n_record_backend::plural::CldrPlurals;
use i18n_record_backend::store::{
    MemoryRecordStore,
    RecordStore,
    StoreError,
    TranslationRecord,
};
use i18n_record_backend::{
    BackendError,
    BackendSettings,
    CacheStrategy,
    LookupOptions,
    MissRecordingResolver,
    Resolved,
    Resolver,
};
use pretty_assertions::assert_eq;
use serde_json::{
    Value,
    json,
};

/// find の呼び出し回数を数えるストア
#[derive(Debug, Clone)]
struct CountingStore {
    inner: MemoryRecordStore,
    finds: Arc<AtomicUsize>,
}

impl CountingStore {
    fn new() -> Self {
        Self { inner: MemoryRecordStore::new(), finds: Arc::new(AtomicUsize::new(0)) }
    }

    fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn create(
        &self,
        locale: &str,
        key: &str,
        value: &str,
        interpolations: &[String],
    ) -> Result<TranslationRecord, StoreError> {
        self.inner.create(locale, key, value, interpolations).await
    }

    async fn find_by_key_or_prefix(
        &self,
        locale: &str,
        key: &str,
    ) -> Result<Vec<TranslationRecord>, StoreError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_key_or_prefix(locale, key).await
    }

    async fn delete_where(
        &self,
        locale: &str,
        keys: &[String],
        descendants_of: Option<&str>,
        destroy: bool,
    ) -> Result<usize, StoreError> {
        self.inner.delete_where(locale, keys, descendants_of, destroy).await
    }

    async fn exists_where(&self, locale: &str, key: &str) -> Result<bool, StoreError> {
        self.inner.exists_where(locale, key).await
    }

    async fn available_locales(&self) -> Result<Vec<String>, StoreError> {
        self.inner.available_locales().await
    }
}

/// 常に失敗するキャッシュ
#[derive(Debug, Clone, Copy)]
struct FailingCache;

#[async_trait]
impl TranslationCache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn set(&self, _key: &str, _payload: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn delete_matched(&self, _pattern: &str) -> Result<usize, CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }
}

/// キャッシュなしのリゾルバを作る
fn plain_resolver(store: MemoryRecordStore) -> Resolver {
    Resolver::new(Arc::new(store), CacheStrategy::NoCache, BackendSettings::default())
}

#[tokio::test]
async fn store_then_lookup_round_trips_nested_catalogs() {
    let resolver = plain_resolver(MemoryRecordStore::new());
    let catalog = json!({
        "greeting": {"formal": "Hello", "casual": "Hi"},
        "errors": {"http": {"404": "Not found", "500": "Server error"}},
        "title": "Home"
    });

    resolver.store_translations("en", &catalog).await.unwrap();

    let title = resolver.lookup("en", "title", &LookupOptions::default()).await.unwrap();
    assert_eq!(title, Some(Resolved::Value("Home".to_string())));

    let deep =
        resolver.lookup("en", "errors.http.404", &LookupOptions::default()).await.unwrap();
    assert_eq!(deep, Some(Resolved::Value("Not found".to_string())));

    let subtree =
        resolver.lookup("en", "errors", &LookupOptions::default()).await.unwrap().unwrap();
    let Resolved::Subtree(map) = subtree else { panic!("expected a subtree") };
    assert_eq!(
        Value::Object(map),
        json!({"http": {"404": "Not found", "500": "Server error"}})
    );

    // ルートキーはロケール全体を返す
    let root = resolver.lookup("en", "", &LookupOptions::default()).await.unwrap().unwrap();
    let Resolved::Subtree(map) = root else { panic!("expected a subtree") };
    assert_eq!(Value::Object(map), catalog);
}

#[tokio::test]
async fn typed_leaves_round_trip_through_store_and_lookup() {
    let resolver = plain_resolver(MemoryRecordStore::new());
    let catalog = json!({
        "inbox": {"limit": 42, "title": "Inbox"},
        "flags": {"beta": true}
    });

    resolver.store_translations("en", &catalog).await.unwrap();

    let subtree =
        resolver.lookup("en", "inbox", &LookupOptions::default()).await.unwrap().unwrap();
    let Resolved::Subtree(map) = subtree else { panic!("expected a subtree") };
    assert_eq!(Value::Object(map), json!({"limit": 42, "title": "Inbox"}));

    let root = resolver.lookup("en", "", &LookupOptions::default()).await.unwrap().unwrap();
    let Resolved::Subtree(map) = root else { panic!("expected a subtree") };
    assert_eq!(Value::Object(map), catalog);

    // 完全一致のルックアップは保存テキストをそのまま返す
    assert_eq!(
        resolver.lookup("en", "inbox.limit", &LookupOptions::default()).await.unwrap(),
        Some(Resolved::Value("42".to_string()))
    );
}

#[tokio::test]
async fn writes_replace_both_shapes_of_a_path() {
    let resolver = plain_resolver(MemoryRecordStore::new());

    resolver.store_translations("en", &json!({"menu": "Everything"})).await.unwrap();
    resolver.store_translations("en", &json!({"menu": {"file": "File"}})).await.unwrap();

    // 枝がスカラーを置き換える
    let branch = resolver.lookup("en", "menu", &LookupOptions::default()).await.unwrap().unwrap();
    assert!(branch.as_subtree().is_some());
    assert_eq!(
        resolver.lookup("en", "menu.file", &LookupOptions::default()).await.unwrap(),
        Some(Resolved::Value("File".to_string()))
    );

    // スカラーが枝を置き換える
    resolver.store_translations("en", &json!({"menu": "All"})).await.unwrap();
    assert_eq!(
        resolver.lookup("en", "menu", &LookupOptions::default()).await.unwrap(),
        Some(Resolved::Value("All".to_string()))
    );
    assert_eq!(resolver.lookup("en", "menu.file", &LookupOptions::default()).await.unwrap(), None);
}

#[tokio::test]
async fn custom_separator_segments_input_but_not_storage() {
    let settings = BackendSettings { separator: "|".to_string(), ..BackendSettings::default() };
    let store = MemoryRecordStore::new();
    let resolver = Resolver::new(Arc::new(store.clone()), CacheStrategy::NoCache, settings);
    resolver.store_translations("en", &json!({"menu": {"file": "File"}})).await.unwrap();

    let resolved = resolver.lookup("en", "menu|file", &LookupOptions::default()).await.unwrap();
    assert_eq!(resolved, Some(Resolved::Value("File".to_string())));

    // 保存キーは常にドット区切り
    let records = store.find_by_key_or_prefix("en", "menu.file").await.unwrap();
    assert_eq!(records.len(), 1);

    // ルックアップ単位の区切り文字指定が設定より優先される
    let options = LookupOptions::default().with_separator("/");
    let via_slash = resolver.lookup("en", "menu/file", &options).await.unwrap();
    assert_eq!(via_slash, Some(Resolved::Value("File".to_string())));
}

#[tokio::test]
async fn fallback_answers_are_persisted_for_the_next_lookup() {
    let store = MemoryRecordStore::new();
    let fallback = StaticCatalog::new().with_locale("en", json!({"farewell": "Goodbye"}));
    let resolver = Resolver::new(
        Arc::new(store.clone()),
        CacheStrategy::NoCache,
        BackendSettings::default(),
    )
    .with_fallback(Arc::new(fallback));

    let first = resolver.lookup("en", "farewell", &LookupOptions::default()).await.unwrap();
    assert_eq!(first, Some(Resolved::Value("Goodbye".to_string())));

    let records = store.find_by_key_or_prefix("en", "farewell").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value, "Goodbye");

    let second = resolver.lookup("en", "farewell", &LookupOptions::default()).await.unwrap();
    assert_eq!(second, first);
}

#[tokio::test]
async fn missing_lookups_are_recorded_as_plural_stubs() {
    let store = MemoryRecordStore::new();
    let resolver = plain_resolver(store.clone());
    let recording = MissRecordingResolver::new(resolver, Arc::new(CldrPlurals));
    let options = LookupOptions::default().with_count(3).with_arg("name", "Alice");

    assert_eq!(recording.lookup("en", "inbox.items", &options).await.unwrap(), None);

    let records = store.find_by_key_or_prefix("en", "inbox.items").await.unwrap();
    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["inbox.items.one", "inbox.items.other"]);
    assert!(records.iter().all(|r| r.value.is_empty()));
    assert!(records.iter().all(|r| r.interpolations == vec!["name".to_string()]));

    // スタブができた後は再記録されず、サブツリーとして解決される
    assert!(recording.lookup("en", "inbox.items", &options).await.unwrap().is_some());
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn snapshot_reads_never_requery_the_store() {
    let store = CountingStore::new();
    store.inner.put("en", "greeting.formal", "Hello").await;
    store.inner.put("en", "title", "Home").await;
    let settings = BackendSettings { cache_translations: true, ..BackendSettings::default() };
    let strategy = CacheStrategy::from_settings(&settings, None).unwrap();
    let resolver = Resolver::new(Arc::new(store.clone()), strategy, settings);

    resolver.lookup("en", "greeting.formal", &LookupOptions::default()).await.unwrap();
    // 初回ルックアップでロケールごとの一括読み込みが走る
    let after_first = store.finds();
    assert_eq!(after_first, 1);

    resolver.lookup("en", "title", &LookupOptions::default()).await.unwrap();
    resolver.lookup("en", "greeting", &LookupOptions::default()).await.unwrap();
    resolver.lookup("en", "missing", &LookupOptions::default()).await.unwrap();

    assert_eq!(store.finds(), after_first);
}

#[tokio::test]
async fn external_cache_never_serves_stale_after_store_translations() {
    let store = MemoryRecordStore::new();
    store.put("en", "menu.file", "File").await;
    let resolver = Resolver::new(
        Arc::new(store),
        CacheStrategy::External(Arc::new(MemoryCache::new())),
        BackendSettings::default(),
    );

    // 値・サブツリー・ルートの三種をキャッシュに載せてから書き込む
    assert_eq!(
        resolver.lookup("en", "menu.file", &LookupOptions::default()).await.unwrap(),
        Some(Resolved::Value("File".to_string()))
    );
    assert!(resolver.lookup("en", "menu", &LookupOptions::default()).await.unwrap().is_some());
    let root = resolver.lookup("en", "", &LookupOptions::default()).await.unwrap().unwrap();
    let Resolved::Subtree(map) = root else { panic!("expected a subtree") };
    assert_eq!(Value::Object(map), json!({"menu": {"file": "File"}}));

    resolver.store_translations("en", &json!({"menu": {"file": "Datei"}})).await.unwrap();

    assert_eq!(
        resolver.lookup("en", "menu.file", &LookupOptions::default()).await.unwrap(),
        Some(Resolved::Value("Datei".to_string()))
    );
    let subtree =
        resolver.lookup("en", "menu", &LookupOptions::default()).await.unwrap().unwrap();
    let Resolved::Subtree(map) = subtree else { panic!("expected a subtree") };
    assert_eq!(Value::Object(map), json!({"file": "Datei"}));

    // ロケール全体を返すルートエントリも書き込み後の姿を見る
    let root = resolver.lookup("en", "", &LookupOptions::default()).await.unwrap().unwrap();
    let Resolved::Subtree(map) = root else { panic!("expected a subtree") };
    assert_eq!(Value::Object(map), json!({"menu": {"file": "Datei"}}));
}

#[tokio::test]
async fn invalidate_restores_read_your_writes() {
    let store = MemoryRecordStore::new();
    store.put("en", "title", "Home").await;
    let resolver = Resolver::new(
        Arc::new(store.clone()),
        CacheStrategy::External(Arc::new(MemoryCache::new())),
        BackendSettings::default(),
    );

    assert_eq!(
        resolver.lookup("en", "title", &LookupOptions::default()).await.unwrap(),
        Some(Resolved::Value("Home".to_string()))
    );

    // リゾルバを迂回した外部変更はキャッシュに隠れる
    store.put("en", "title", "Start").await;
    assert_eq!(
        resolver.lookup("en", "title", &LookupOptions::default()).await.unwrap(),
        Some(Resolved::Value("Home".to_string()))
    );

    resolver.invalidate().await.unwrap();
    resolver.invalidate().await.unwrap();
    assert_eq!(
        resolver.lookup("en", "title", &LookupOptions::default()).await.unwrap(),
        Some(Resolved::Value("Start".to_string()))
    );
}

#[tokio::test]
async fn cache_namespace_prefixes_every_entry() {
    let cache = MemoryCache::new();
    let settings =
        BackendSettings { cache_namespace: "app".to_string(), ..BackendSettings::default() };
    let store = MemoryRecordStore::new();
    store.put("en", "title", "Home").await;
    let resolver =
        Resolver::new(Arc::new(store), CacheStrategy::External(Arc::new(cache.clone())), settings);

    resolver.lookup("en", "title", &LookupOptions::default()).await.unwrap();

    assert_eq!(cache.get("app.en.title").await.unwrap(), Some("\"Home\"".to_string()));
}

#[tokio::test]
async fn broken_cache_fails_lookups_loudly() {
    let store = MemoryRecordStore::new();
    store.put("en", "title", "Home").await;
    let resolver = Resolver::new(
        Arc::new(store),
        CacheStrategy::External(Arc::new(FailingCache)),
        BackendSettings::default(),
    );

    let result = resolver.lookup("en", "title", &LookupOptions::default()).await;

    assert!(matches!(result, Err(BackendError::Cache(_))));
}

#[tokio::test]
async fn available_locales_reflect_stored_translations() {
    let resolver = plain_resolver(MemoryRecordStore::new());
    resolver.store_translations("en", &json!({"title": "Home"})).await.unwrap();
    resolver.store_translations("ja", &json!({"title": "ホーム"})).await.unwrap();

    assert_eq!(resolver.available_locales().await, vec!["en".to_string(), "ja".to_string()]);
}
