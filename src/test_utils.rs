//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]

use crate::store::MemoryRecordStore;

/// 代表的な翻訳を投入したメモリストアを作成する
///
/// # Returns
/// `en` と `ja` のレコードを持つストア
pub(crate) async fn seeded_store() -> MemoryRecordStore {
    let store = MemoryRecordStore::new();
    store.put("en", "greeting.formal", "Hello").await;
    store.put("en", "greeting.casual", "Hi").await;
    store.put("en", "title", "Home").await;
    store.put("ja", "greeting.formal", "こんにちは").await;
    store
}
