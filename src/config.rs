//! Runtime configuration for chat-relay.
//!
//! Configuration can be loaded from a JSON file or constructed programmatically.
//! All backend knobs (host, port, decoding options) and the model allow-list live here.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "chat-relay", about = "Streaming chat proxy for a local Ollama server")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// HTTP listen address (overrides the config file).
    #[arg(long)]
    pub listen: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,

    /// Inference backend configuration.
    pub backend: BackendConfig,

    /// Chat endpoint policy.
    pub chat: ChatConfig,

    /// Outbound HTTP client pool settings.
    pub pool: PoolConfig,

    /// Static asset settings.
    pub assets: AssetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            backend: BackendConfig::default(),
            chat: ChatConfig::default(),
            pool: PoolConfig::default(),
            assets: AssetConfig::default(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g. "0.0.0.0:8080").
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Inference backend (Ollama) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend host including scheme (e.g. "http://localhost").
    pub host: String,

    /// Backend port.
    pub port: u16,

    /// Maximum tokens to generate per response (wire: num_predict).
    pub max_tokens: u32,

    /// Context window size in tokens (wire: num_ctx).
    pub context_size: usize,

    /// Sampling temperature.
    pub temperature: f64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".to_string(),
            port: 11434,
            max_tokens: 1024,
            context_size: 4096,
            temperature: 0.8,
        }
    }
}

/// Chat endpoint policy: the single accepted (model, provider) pair
/// and the system prompt prepended to every conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// The only model name accepted by the chat endpoint.
    pub default_model: String,

    /// The only model provider accepted by the chat endpoint.
    pub default_provider: String,

    /// System prompt prepended to every conversation.
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_model: "phi3".to_string(),
            default_provider: "OLLAMA".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
        }
    }
}

/// Outbound HTTP client pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum idle connections kept per backend host.
    pub max_connections: usize,

    /// Total request timeout in seconds, covering the full streamed response.
    pub request_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 100,
            request_timeout_secs: 300,
        }
    }
}

/// Static asset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Directory the index page and per-name assets are served from.
    pub root: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("static"),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when absent.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// The backend chat endpoint URL, e.g. "http://localhost:11434/api/chat".
    pub fn backend_chat_url(&self) -> String {
        format!("{}:{}/api/chat", self.backend.host, self.backend.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.backend.port, 11434);
        assert_eq!(cfg.chat.default_model, "phi3");
        assert_eq!(cfg.chat.default_provider, "OLLAMA");
        assert_eq!(cfg.assets.root, PathBuf::from("static"));
    }

    #[test]
    fn test_backend_chat_url() {
        let cfg = Config::default();
        assert_eq!(cfg.backend_chat_url(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let cfg = Config::load(std::path::Path::new("/nonexistent/chat-relay.json")).unwrap();
        assert_eq!(cfg.server.listen, "0.0.0.0:8080");
        assert_eq!(cfg.pool.max_connections, 100);
    }

    #[test]
    fn test_partial_file_round_trip() {
        let cfg = Config::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.backend.host, cfg.backend.host);
        assert_eq!(parsed.chat.system_prompt, cfg.chat.system_prompt);
    }
}
