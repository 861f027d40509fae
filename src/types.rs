//! Core types shared across the crate.

use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};

/// Successful lookup result: a single translation or a reconstructed subtree.
///
/// Serialization is untagged so cached payloads round-trip as plain JSON
/// (a string for scalars, an object for subtrees).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolved {
    /// Single translation value.
    Value(String),
    /// Nested mapping reconstructed from flat records.
    Subtree(Map<String, Value>),
}

impl Resolved {
    /// Scalar value, if this resolution is one.
    #[must_use]
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            Self::Subtree(_) => None,
        }
    }

    /// Nested mapping, if this resolution is one.
    #[must_use]
    pub const fn as_subtree(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Value(_) => None,
            Self::Subtree(subtree) => Some(subtree),
        }
    }
}

/// ルックアップに付随するオプション
///
/// Interpolation argument *values* are never applied by this crate; only the
/// argument names are captured onto stub records for translator review.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupOptions {
    /// Scope segments prepended to the key. Each part may itself be dotted.
    pub scope: Vec<String>,
    /// Input separator override for this lookup.
    pub separator: Option<String>,
    /// Pluralization count. Its presence drives plural stub expansion on
    /// a recorded miss.
    pub count: Option<i64>,
    /// Interpolation arguments by name, ordered for deterministic capture.
    pub args: BTreeMap<String, String>,
}

impl LookupOptions {
    /// Scope segments to prepend to the key.
    #[must_use]
    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    /// Input separator override.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Pluralization count.
    #[must_use]
    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    /// Add one interpolation argument.
    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }
}
