//! バックエンドを一通り動かす最小構成のデモ
//!
//! `cargo run --example quickstart`

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use i18n_record_backend::cache::MemoryCache;
use i18n_record_backend::fallback::StaticCatalog;
use i18n_record_backend::plural::CldrPlurals;
use i18n_record_backend::settings::CacheSource;
use i18n_record_backend::store::MemoryRecordStore;
use i18n_record_backend::{
    BackendSettings,
    CacheStrategy,
    LookupOptions,
    MissRecordingResolver,
    Resolver,
};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let store = MemoryRecordStore::new();
    let settings = BackendSettings {
        cache_translations: true,
        cache_source: CacheSource::External,
        ..BackendSettings::default()
    };
    let strategy = CacheStrategy::from_settings(&settings, Some(Arc::new(MemoryCache::new())))?;

    let fallback = StaticCatalog::new().with_locale("en", json!({"farewell": "Goodbye"}));
    let resolver = Resolver::new(Arc::new(store.clone()), strategy, settings)
        .with_fallback(Arc::new(fallback));
    let backend = MissRecordingResolver::new(resolver, Arc::new(CldrPlurals));

    // ネストしたカタログを書き込む。保存形式はフラットなドット区切りキー
    backend
        .store_translations(
            "en",
            &json!({
                "greeting": {"formal": "Hello", "casual": "Hi"},
                "inbox": {"title": "Inbox"}
            }),
        )
        .await?;
    backend.store_translations("ja", &json!({"greeting": {"formal": "こんにちは"}})).await?;

    // スカラーとサブツリーの解決
    let formal = backend.lookup("en", "greeting.formal", &LookupOptions::default()).await?;
    println!("greeting.formal  -> {formal:?}");

    let scoped = LookupOptions::default().with_scope(["greeting"]);
    let casual = backend.lookup("en", "casual", &scoped).await?;
    println!("casual in scope  -> {casual:?}");

    let subtree = backend.lookup("ja", "greeting", &LookupOptions::default()).await?;
    println!("ja greeting      -> {subtree:?}");

    // ストアに無いキーはフォールバックで補われ、次回からストアで解決される
    let farewell = backend.lookup("en", "farewell", &LookupOptions::default()).await?;
    println!("farewell         -> {farewell:?}");

    // 誰も答えられないキーは複数形サフィックス付きのスタブとして記録される
    let options = LookupOptions::default().with_count(3);
    backend.lookup("en", "inbox.items", &options).await?;
    for record in store.all_records().await {
        if record.value.is_empty() {
            println!("recorded stub    -> {}.{}", record.locale, record.key);
        }
    }

    println!("locales          -> {:?}", backend.available_locales().await);
    Ok(())
}
