//! Process configuration, read once from the environment at startup

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_OLLAMA_ADDR: &str = "http://localhost:11434";
const DEFAULT_STATIC_DIR: &str = "web/static";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid LLM_VERSUS_ADDR {value:?}: {source}")]
    InvalidListenAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("OLLAMA_ADDR must not be empty")]
    EmptyBackendAddr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `LLM_VERSUS_ADDR`; a bare `:port` listens on all interfaces
    pub listen_addr: SocketAddr,
    /// `OLLAMA_ADDR`, without trailing slash
    pub ollama_addr: String,
    /// `LLM_VERSUS_STATIC_DIR`
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let listen = lookup("LLM_VERSUS_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = parse_listen_addr(&listen)?;

        let ollama_addr = lookup("OLLAMA_ADDR")
            .unwrap_or_else(|| DEFAULT_OLLAMA_ADDR.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        if ollama_addr.is_empty() {
            return Err(ConfigError::EmptyBackendAddr);
        }

        let static_dir = lookup("LLM_VERSUS_STATIC_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from);

        Ok(Self {
            listen_addr,
            ollama_addr,
            static_dir,
        })
    }
}

fn parse_listen_addr(value: &str) -> Result<SocketAddr, ConfigError> {
    let trimmed = value.trim();
    let candidate = if trimmed.starts_with(':') {
        format!("0.0.0.0{trimmed}")
    } else {
        trimmed.to_string()
    };
    candidate
        .parse()
        .map_err(|source| ConfigError::InvalidListenAddr {
            value: value.to_string(),
            source,
        })
}
