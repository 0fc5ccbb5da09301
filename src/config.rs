//! Configuration for cellmate
//!
//! Settings resolve in order: CLI args > environment variables >
//! ~/.cellmate/config.toml > built-in defaults. The file layer is
//! all-optional; the resolved [`Settings`] struct is what gets injected
//! into the relay and the conversation client at startup.

use serde::Deserialize;
use std::path::PathBuf;

/// Relay address the original deployment exposed.
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:5000";
/// Ollama's standard local endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Model the conversation client asks for.
pub const DEFAULT_MODEL: &str = "llama3:8b";
/// Model the relay falls back to when a request names none.
pub const DEFAULT_SERVER_MODEL: &str = "deepseek-coder:6.7b";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
/// Generation can be slow on local hardware; bound it rather than hang forever.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Acceptable clock skew for signed-request timestamps.
pub const DEFAULT_MAX_SKEW_SECS: i64 = 300;

/// Optional overrides loaded from ~/.cellmate/config.toml
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub relay_url: Option<String>,
    pub ollama_url: Option<String>,
    pub model: Option<String>,
    pub default_model: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub secret_file: Option<PathBuf>,
    pub transcript: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub max_skew_secs: Option<i64>,
}

impl FileConfig {
    /// Load config from ~/.cellmate/config.toml
    pub fn load() -> Self {
        let path = config_path();

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Fully resolved settings, one field per knob
#[derive(Debug, Clone)]
pub struct Settings {
    /// Where the conversation client sends its turns
    pub relay_url: String,
    /// Where the relay forwards generation requests
    pub ollama_url: String,
    /// Model the client requests per turn
    pub model: String,
    /// Model the relay substitutes when the request names none
    pub default_model: String,
    /// Relay bind address
    pub host: String,
    pub port: u16,
    pub secret_file: PathBuf,
    pub transcript: PathBuf,
    pub timeout_secs: u64,
    pub max_skew_secs: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            default_model: DEFAULT_SERVER_MODEL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            secret_file: cellmate_dir().join("secret"),
            transcript: cellmate_dir().join("transcript.json"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_skew_secs: DEFAULT_MAX_SKEW_SECS,
        }
    }
}

impl Settings {
    /// Merge file-level overrides into the defaults. CLI arguments are
    /// applied on top by the binary.
    pub fn from_file(file: FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            relay_url: file.relay_url.unwrap_or(defaults.relay_url),
            ollama_url: file.ollama_url.unwrap_or(defaults.ollama_url),
            model: file.model.unwrap_or(defaults.model),
            default_model: file.default_model.unwrap_or(defaults.default_model),
            host: file.host.unwrap_or(defaults.host),
            port: file.port.unwrap_or(defaults.port),
            secret_file: file.secret_file.unwrap_or(defaults.secret_file),
            transcript: file.transcript.unwrap_or(defaults.transcript),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
            max_skew_secs: file.max_skew_secs.unwrap_or(defaults.max_skew_secs),
        }
    }

    /// Relay bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Directory holding config, secret, transcript, and readline history
pub fn cellmate_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".cellmate")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    cellmate_dir().join("config.toml")
}
