//! Lookup key normalization and ancestor-prefix expansion.
//!
//! Translation keys are persisted in flat dotted form (`errors.not_found`)
//! while callers may supply scoped, segmented, or custom-separated input.
//! Everything funnels through [`normalize`] into a [`CanonicalKey`].

use thiserror::Error;

/// Canonical path separator for flattened translation keys.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Caller-supplied lookup key, either a dotted string or pre-split segments.
#[derive(Debug, Clone, Copy)]
pub enum KeyInput<'a> {
    /// Dotted-string form (e.g. `"errors.not_found"`).
    Flat(&'a str),
    /// Pre-split segment form (e.g. `&["errors", "not_found"]`).
    Segments(&'a [&'a str]),
}

impl<'a> From<&'a str> for KeyInput<'a> {
    fn from(key: &'a str) -> Self {
        Self::Flat(key)
    }
}

impl<'a> From<&'a [&'a str]> for KeyInput<'a> {
    fn from(segments: &'a [&'a str]) -> Self {
        Self::Segments(segments)
    }
}

/// 不正なルックアップキー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The separator option was an empty string.
    #[error("key separator must not be empty")]
    EmptySeparator,
    /// The input contained characters but yielded no usable path segments.
    #[error("lookup key {input:?} has no usable segments")]
    NoSegments {
        /// Offending input, joined for display.
        input: String,
    },
}

/// Normalized lookup key: dotted, no leading or trailing separator, every
/// segment non-empty.
///
/// The empty key is valid and addresses the root of a locale (all of its
/// translations). Canonical keys are derived through [`normalize`] and never
/// stored independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// The dotted string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key addresses the locale root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path segments, in order. Empty for the root key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(DEFAULT_SEPARATOR).filter(|segment| !segment.is_empty())
    }
}

impl std::fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a caller-supplied key and scope into a [`CanonicalKey`].
///
/// Scope parts are joined in front of the key parts. `separator` controls how
/// the input is segmented; the default separator is always treated as a
/// boundary as well, so canonical keys come out dotted regardless of the
/// input notation. Empty segments produced by incidental leading or trailing
/// separators are dropped.
///
/// An entirely empty input (empty key, empty scope) is an intended
/// root-of-locale lookup and yields the empty canonical key. Non-empty input
/// that segments to nothing (e.g. `"..."`) is [`KeyError::NoSegments`].
pub fn normalize(
    key: KeyInput<'_>,
    scope: &[String],
    separator: &str,
) -> Result<CanonicalKey, KeyError> {
    if separator.is_empty() {
        return Err(KeyError::EmptySeparator);
    }

    let mut parts: Vec<&str> = scope.iter().map(String::as_str).collect();
    match key {
        KeyInput::Flat(flat) => parts.push(flat),
        KeyInput::Segments(segments) => parts.extend_from_slice(segments),
    }

    let segments: Vec<&str> = parts
        .iter()
        .flat_map(|part| part.split(separator))
        .flat_map(|part| part.split(DEFAULT_SEPARATOR))
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.is_empty() && parts.iter().any(|part| !part.is_empty()) {
        return Err(KeyError::NoSegments { input: parts.join(separator) });
    }

    Ok(CanonicalKey(segments.join(DEFAULT_SEPARATOR)))
}

/// Expand a dotted key into its ancestor-prefix chain, shortest first.
///
/// Used to clear decoy branch records (and their cache entries) when a full
/// value is stored over what used to be a branch. Empty for the root key.
///
/// # Examples
/// ```
/// use i18n_record_backend::key::expand_prefix_chain;
///
/// let chain = expand_prefix_chain("foo.bar.baz");
/// assert_eq!(chain, vec!["foo", "foo.bar", "foo.bar.baz"]);
/// ```
#[must_use]
pub fn expand_prefix_chain(key: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut prefix = String::new();
    for segment in key.split(DEFAULT_SEPARATOR).filter(|segment| !segment.is_empty()) {
        if !prefix.is_empty() {
            prefix.push_str(DEFAULT_SEPARATOR);
        }
        prefix.push_str(segment);
        chain.push(prefix.clone());
    }
    chain
}

/// Whether `key` lies strictly below `ancestor` (path-boundary aware, so
/// `ab.c` is not a descendant of `a`). Every non-root key descends from the
/// root key.
#[must_use]
pub fn is_descendant(key: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return !key.is_empty();
    }
    key.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with(DEFAULT_SEPARATOR))
}
