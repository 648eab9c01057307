//! Configuration management
//!
//! Compatible with the mobile app's settings.json format:
//! ```json
//! {
//!   "app": { "mockMode": true, "apiBaseUrl": "https://...", "mockLatencyMs": 500 }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Latency the mock backend applies to every route when none is configured
pub const DEFAULT_MOCK_LATENCY_MS: u64 = 500;

/// Raw settings.json structure (matching the app format)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    mock_mode: bool,
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    mock_latency_ms: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// SplitMacha configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    /// Route all API calls to a local seeded mock backend
    pub mock_mode: bool,
    /// Base URL override for the real backend
    pub api_base_url: Option<String>,
    /// Artificial latency applied by the mock backend
    pub mock_latency_ms: u64,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mock_mode: false,
            api_base_url: None,
            mock_latency_ms: DEFAULT_MOCK_LATENCY_MS,
            _raw_settings: SettingsFile::default(),
        }
    }
}

/// Resolve mock mode from the settings value and an env override
fn resolve_mock_mode(from_settings: bool, env_value: Option<&str>) -> bool {
    match env_value {
        Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
        Some("false" | "0" | "no" | "FALSE" | "NO") => false,
        _ => from_settings,
    }
}

impl Config {
    /// Load config from the app directory
    ///
    /// Mock mode can be enabled via:
    /// 1. Settings file (`app.mockMode`)
    /// 2. Environment variable SPLITMACHA_MOCK_MODE (for CI/testing)
    pub fn load(app_dir: &Path) -> Result<Self> {
        let settings_path = app_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let mock_mode = resolve_mock_mode(
            raw.app.mock_mode,
            std::env::var("SPLITMACHA_MOCK_MODE").ok().as_deref(),
        );

        Ok(Self {
            mock_mode,
            api_base_url: raw.app.api_base_url.clone(),
            mock_latency_ms: raw.app.mock_latency_ms.unwrap_or(DEFAULT_MOCK_LATENCY_MS),
            _raw_settings: raw,
        })
    }

    /// Save config to the app directory
    /// Preserves other settings that this layer doesn't manage
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let settings_path = app_dir.join("settings.json");

        // Load existing settings to preserve fields we don't manage
        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        // Update only the fields we manage
        settings.app.mock_mode = self.mock_mode;
        settings.app.api_base_url = self.api_base_url.clone();
        settings.app.mock_latency_ms = Some(self.mock_latency_ms);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Enable mock mode
    pub fn enable_mock_mode(&mut self) {
        self.mock_mode = true;
    }

    /// Disable mock mode
    pub fn disable_mock_mode(&mut self) {
        self.mock_mode = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_env_override_wins_over_settings() {
        assert!(resolve_mock_mode(false, Some("true")));
        assert!(resolve_mock_mode(false, Some("1")));
        assert!(!resolve_mock_mode(true, Some("false")));
        assert!(resolve_mock_mode(true, Some("garbage")));
        assert!(!resolve_mock_mode(false, None));
    }

    #[test]
    fn test_load_defaults_when_no_settings_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.api_base_url.is_none());
        assert_eq!(config.mock_latency_ms, DEFAULT_MOCK_LATENCY_MS);
    }

    #[test]
    fn test_save_preserves_unmanaged_settings() {
        let dir = TempDir::new().unwrap();
        let settings_path = dir.path().join("settings.json");
        std::fs::write(
            &settings_path,
            r#"{"app": {"mockMode": true, "theme": "dark"}, "notifications": {"push": true}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.mock_latency_ms = 50;
        config.save(dir.path()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&settings_path).unwrap()).unwrap();
        assert_eq!(raw["app"]["mockLatencyMs"], 50);
        assert_eq!(raw["app"]["theme"], "dark");
        assert_eq!(raw["notifications"]["push"], true);
    }

    #[test]
    fn test_configured_latency_is_read() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"app": {"mockMode": true, "mockLatencyMs": 25}}"#,
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.mock_latency_ms, 25);
    }
}
