//! 設定ファイルの読み込み関数

use std::path::Path;

use super::{
    BackendSettings,
    SettingsError,
};

/// ワークスペースから設定を読み込む
///
/// `.i18n-backend.json` ファイルを探して読み込み、検証する
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルが見つかり、読み込みに成功
/// - `Ok(None)`: 設定ファイルが見つからない
/// - `Err(SettingsError)`: 読み込み・パース・検証エラー
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
/// - 検証エラー
pub fn load_from_workspace(workspace_root: &Path) -> Result<Option<BackendSettings>, SettingsError> {
    let settings_path = workspace_root.join(".i18n-backend.json");

    if !settings_path.exists() {
        tracing::debug!("Settings file not found: {:?}", settings_path);
        return Ok(None);
    }

    tracing::debug!("Loading settings from: {:?}", settings_path);

    let content = std::fs::read_to_string(&settings_path)?;
    let settings: BackendSettings = serde_json::from_str(&content)?;
    settings.validate().map_err(SettingsError::ValidationErrors)?;

    Ok(Some(settings))
}
