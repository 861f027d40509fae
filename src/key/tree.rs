//! Flat-key ↔ nested-mapping reconstruction.
//!
//! The store persists flat dotted keys; callers consume nested mappings.
//! [`flatten_value`] turns a nested catalog into flat entries for the write
//! path, [`build_subtree`] rebuilds the nested shape for subtree lookups.

use std::collections::BTreeMap;

use serde_json::{
    Map,
    Value,
};

use crate::key::codec::{
    CanonicalKey,
    DEFAULT_SEPARATOR,
};
use crate::store::TranslationRecord;
use crate::types::Resolved;

/// Flatten a nested JSON object into dot-separated leaf entries.
///
/// Strings pass through unchanged; any other leaf (numbers, booleans, arrays,
/// null) is stored as its compact JSON text, which [`build_subtree`] decodes
/// back to the typed value. The result is ordered so write batches are
/// deterministic.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use i18n_record_backend::key::flatten_value;
///
/// let catalog = json!({
///     "greeting": {
///         "formal": "Hello",
///         "casual": "Hi"
///     }
/// });
///
/// let entries = flatten_value(&catalog, ".");
/// assert_eq!(entries.get("greeting.formal"), Some(&"Hello".to_string()));
/// assert_eq!(entries.get("greeting.casual"), Some(&"Hi".to_string()));
/// ```
#[must_use]
pub fn flatten_value(value: &Value, separator: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    flatten_into(value, separator, None, &mut entries);
    entries
}

/// 再帰的に JSON の値を平坦化して `entries` へ追加する
fn flatten_into(
    value: &Value,
    separator: &str,
    prefix: Option<&str>,
    entries: &mut BTreeMap<String, String>,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let full_key =
                    prefix.map_or_else(|| key.clone(), |p| format!("{p}{separator}{key}"));
                flatten_into(child, separator, Some(&full_key), entries);
            }
        }
        Value::String(text) => {
            if let Some(key) = prefix {
                insert_entry(entries, key, text.clone());
            }
        }
        _ => {
            if let Some(key) = prefix {
                insert_entry(entries, key, value.to_string());
            }
        }
    }
}

/// 平坦化エントリを追加する。同一キーの衝突は後勝ちで警告を出す
fn insert_entry(entries: &mut BTreeMap<String, String>, key: &str, value: String) {
    if entries.insert(key.to_string(), value).is_some() {
        tracing::warn!("duplicate flattened key {key:?}; keeping the later value");
    }
}

/// Reconstruct a nested mapping from flat entries sharing `prefix`.
///
/// The prefix and its trailing separator are stripped from every key before
/// path insertion; an empty prefix takes keys whole. Leaf text holding the
/// compact JSON encoding of a non-string value is decoded back to that value,
/// inverting [`flatten_value`]. A leaf and a branch colliding at the same
/// path is malformed input: the branch wins and a warning is logged. An entry
/// whose key equals the prefix itself (a scalar at the subtree root) is the
/// same condition and is skipped.
#[must_use]
pub fn build_subtree<'a, I>(prefix: &str, entries: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut root = Map::new();
    for (key, value) in entries {
        let Some(path) = strip_key_prefix(key, prefix) else {
            tracing::warn!("entry {key:?} does not lie under prefix {prefix:?}; skipped");
            continue;
        };
        if path.is_empty() {
            tracing::warn!("conflicting key shape at {key:?}: branch wins over scalar");
            continue;
        }
        insert_path(&mut root, key, path, value);
    }
    root
}

/// `prefix` とその直後のセパレータを取り除いた残りのパスを返す
fn strip_key_prefix<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(key);
    }
    if key == prefix {
        return Some("");
    }
    key.strip_prefix(prefix)?.strip_prefix(DEFAULT_SEPARATOR)
}

/// Insert `value` at the dotted `path` below `root`, creating intermediate
/// objects as needed. Branch-wins on shape conflicts.
fn insert_path(root: &mut Map<String, Value>, full_key: &str, path: &str, value: &str) {
    let mut node = root;
    let mut segments =
        path.split(DEFAULT_SEPARATOR).filter(|segment| !segment.is_empty()).peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            match node.get(segment) {
                Some(Value::Object(_)) => {
                    tracing::warn!(
                        "conflicting key shape at {full_key:?}: branch wins over scalar"
                    );
                }
                _ => {
                    node.insert(segment.to_string(), decode_leaf(value));
                }
            }
            return;
        }

        if !matches!(node.get(segment), Some(Value::Object(_))) {
            if node.contains_key(segment) {
                tracing::warn!(
                    "conflicting key shape at {full_key:?}: replacing scalar with branch"
                );
            }
            node.insert(segment.to_string(), Value::Object(Map::new()));
        }
        let Some(Value::Object(child)) = node.get_mut(segment) else {
            return;
        };
        node = child;
    }
}

/// 平坦化時に JSON テキスト化された非文字列リーフを元の型へ戻す。
/// 再エンコードがテキストと一致するものだけを型付きとして扱う
fn decode_leaf(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(value) if !value.is_string() && value.to_string() == text => value,
        _ => Value::String(text.to_string()),
    }
}

/// Resolve a store batch for `key` into a scalar or a reconstructed subtree.
///
/// Exactly one record matching the key verbatim is a scalar lookup; any other
/// non-empty batch is a subtree reconstruction. An empty batch is a miss and
/// is left to the caller.
#[must_use]
pub fn resolve_records(key: &CanonicalKey, records: &[TranslationRecord]) -> Option<Resolved> {
    match records {
        [] => None,
        [record] if record.key == key.as_str() => Some(Resolved::Value(record.value.clone())),
        _ => {
            let entries = records.iter().map(|r| (r.key.as_str(), r.value.as_str()));
            Some(Resolved::Subtree(build_subtree(key.as_str(), entries)))
        }
    }
}
