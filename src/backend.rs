//! Translation backend: the resolver, miss recording and the shared error
//! type.

/// バックエンド共通のエラー型
mod error;
/// ミスしたキーの記録
mod missing;
/// ルックアップと書き込みの本体
mod resolver;
/// ストア全体のスナップショット
mod snapshot;

pub use error::BackendError;
pub use missing::{
    LogOnMiss,
    MissHandler,
    MissRecordingResolver,
    MissingRecorder,
};
pub use resolver::Resolver;
