use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

use gemchat_ai::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub proxy: ProxyConfig,
    pub backend: BackendConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_proxy_port(),
            upstream_url: default_upstream_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_backend_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_backend_port(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    proxy: ProxyConfig,
    #[serde(default)]
    backend: BackendConfig,
    #[serde(default)]
    gemini: GeminiConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_proxy_port() -> u16 {
    3000
}

fn default_backend_port() -> u16 {
    8000
}

fn default_upstream_url() -> String {
    "http://localhost:8000/chat".to_string()
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        if let Some(file_config) = load_from_file()? {
            return Ok(file_config.into());
        }

        Ok(Self::from_env())
    }

    fn from_env() -> Self {
        let port = |name: &str, default: fn() -> u16| {
            env::var(name)
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or_else(default)
        };

        Self {
            proxy: ProxyConfig {
                host: env::var("GEMCHAT_PROXY_HOST").unwrap_or_else(|_| default_host()),
                port: port("GEMCHAT_PROXY_PORT", default_proxy_port),
                upstream_url: env::var("GEMCHAT_UPSTREAM_URL")
                    .unwrap_or_else(|_| default_upstream_url()),
            },
            backend: BackendConfig {
                host: env::var("GEMCHAT_BACKEND_HOST").unwrap_or_else(|_| default_host()),
                port: port("GEMCHAT_BACKEND_PORT", default_backend_port),
                allowed_origin: env::var("GEMCHAT_ALLOWED_ORIGIN")
                    .unwrap_or_else(|_| default_allowed_origin()),
            },
            gemini: GeminiConfig {
                model: env::var("GEMINI_MODEL").unwrap_or_else(|_| default_model()),
                base_url: env::var("GEMINI_BASE_URL").unwrap_or_else(|_| default_base_url()),
            },
        }
    }
}

impl From<FileConfig> for ServerConfig {
    fn from(file: FileConfig) -> Self {
        Self {
            proxy: file.proxy,
            backend: file.backend,
            gemini: file.gemini,
        }
    }
}

/// Read the Gemini API key. The backend refuses to start without it.
pub fn gemini_api_key() -> anyhow::Result<String> {
    match env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => anyhow::bail!("GEMINI_API_KEY environment variable not set"),
    }
}

fn load_from_file() -> anyhow::Result<Option<FileConfig>> {
    let config_path = env::var("GEMCHAT_SERVER_CONFIG").ok();
    let path = if let Some(path) = config_path {
        Some(path)
    } else if Path::new("server.toml").exists() {
        Some("server.toml".to_string())
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(None);
    };

    parse_file(&path).map(Some)
}

fn parse_file(path: &str) -> anyhow::Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path, err))?;
    toml::from_str(&contents)
        .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path, err))
}
