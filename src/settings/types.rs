use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "cacheNamespace")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load settings file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// どこにキャッシュを置くか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheSource {
    /// プロセス内スナップショット
    #[default]
    Memory,
    /// 外部キャッシュサービス
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendSettings {
    /// Whether resolved translations are cached at all.
    pub cache_translations: bool,

    /// Where cached translations live when caching is enabled.
    pub cache_source: CacheSource,

    /// Hard-delete replaced records instead of soft-deleting them.
    pub cleanup_with_destroy: bool,

    /// Separator recognized in incoming lookup keys. Stored keys always
    /// use `"."`.
    pub separator: String,

    /// Prefix shared by every cache entry; bulk invalidation deletes
    /// everything under it.
    pub cache_namespace: String,
}

impl BackendSettings {
    /// # Errors
    /// - Required field is empty
    /// - Cache namespace unusable in deletion patterns
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.separator.is_empty() {
            errors.push(ValidationError::new(
                "separator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        }

        if self.cache_namespace.is_empty() {
            errors.push(ValidationError::new(
                "cacheNamespace",
                "The cache namespace cannot be empty. Example: \"i18n\"",
            ));
        } else if let Err(e) = globset::Glob::new(&self.cache_namespace) {
            errors.push(ValidationError::new(
                "cacheNamespace",
                format!(
                    "Invalid namespace '{}': {e}. It is embedded in cache deletion patterns",
                    self.cache_namespace
                ),
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            cache_translations: false,
            cache_source: CacheSource::default(),
            cleanup_with_destroy: false,
            separator: ".".to_string(),
            cache_namespace: "i18n".to_string(),
        }
    }
}
