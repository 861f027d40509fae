//! i18n-record-backend
//!
//! フラットなドット区切りキーで保存された翻訳を階層的に解決するバックエンド

pub mod backend;
pub mod cache;
pub mod fallback;
pub mod key;
pub mod plural;
pub mod settings;
pub mod store;
mod test_utils;
pub mod types;

// 主要な型を再エクスポート
pub use backend::{
    BackendError,
    MissRecordingResolver,
    Resolver,
};
pub use cache::CacheStrategy;
pub use settings::BackendSettings;
pub use types::{
    LookupOptions,
    Resolved,
};
