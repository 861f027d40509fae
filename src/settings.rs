//! Backend configuration.

/// Settings file loader
mod loader;
/// Settings types and validation
mod types;

pub use loader::load_from_workspace;
pub use types::{
    BackendSettings,
    CacheSource,
    SettingsError,
    ValidationError,
};
