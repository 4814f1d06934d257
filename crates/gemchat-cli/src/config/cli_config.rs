//! CLI configuration file support
//!
//! Loads configuration from ~/.config/gemchat/config.toml

use gemchat_models::ChatSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default settings
    #[serde(default)]
    pub default: DefaultConfig,
    /// Generation settings applied at startup
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Default configuration values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultConfig {
    /// Chat proxy endpoint
    pub proxy_url: Option<String>,
    /// Default database path
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub system_message: Option<String>,
}

impl CliConfig {
    /// Load configuration from default path
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "Ignoring invalid config file");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gemchat").join("config.toml"))
    }

    /// Startup settings: defaults overridden by the `[settings]` table, clamped.
    pub fn chat_settings(&self) -> ChatSettings {
        let mut settings = ChatSettings::default();
        if let Some(temperature) = self.settings.temperature {
            settings = settings.with_temperature(temperature);
        }
        if let Some(tokens) = self.settings.max_output_tokens {
            settings = settings.with_max_output_tokens(tokens);
        }
        if let Some(message) = &self.settings.system_message {
            settings = settings.with_system_message(message.clone());
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemchat_models::DEFAULT_SYSTEM_MESSAGE;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = CliConfig::load_from_path(Some(dir.path().join("absent.toml")));
        assert!(config.default.proxy_url.is_none());
        assert_eq!(config.chat_settings(), ChatSettings::default());
    }

    #[test]
    fn test_settings_table_applied_and_clamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[default]
proxy_url = "http://chat.local/api/chat"

[settings]
temperature = 1.7
max_output_tokens = 2048
"#,
        )
        .unwrap();

        let config = CliConfig::load_from_path(Some(path));
        assert_eq!(
            config.default.proxy_url.as_deref(),
            Some("http://chat.local/api/chat")
        );

        let settings = config.chat_settings();
        assert_eq!(settings.temperature, 1.0);
        assert_eq!(settings.max_output_tokens, 2048);
        assert_eq!(settings.system_message, DEFAULT_SYSTEM_MESSAGE);
    }

    #[test]
    fn test_invalid_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings\n").unwrap();

        let config = CliConfig::load_from_path(Some(path));
        assert!(config.settings.temperature.is_none());
    }
}
