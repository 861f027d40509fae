//! Lookup-key normalization and flat-key ↔ tree conversion.

/// Key normalization and prefix expansion
mod codec;
/// Nested-mapping flattening and reconstruction
mod tree;

pub use codec::{
    CanonicalKey,
    DEFAULT_SEPARATOR,
    KeyError,
    KeyInput,
    expand_prefix_chain,
    is_descendant,
    normalize,
};
pub use tree::{
    build_subtree,
    flatten_value,
    resolve_records,
};
