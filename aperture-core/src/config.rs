//! Configuration for the aperture server
//!
//! Everything has a working default so `aperture-server` runs with no
//! config file at all. An optional TOML file (`aperture.toml`, or the path
//! in `APERTURE_CONFIG`) overrides the defaults, and `PORT` in the
//! environment overrides the listen port on top of that.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an alternate config file path.
pub const CONFIG_PATH_VAR: &str = "APERTURE_CONFIG";

/// Environment variable overriding the listen port.
pub const PORT_VAR: &str = "PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Admin panel credentials (username -> plaintext password).
    /// Development-grade by design; see the startup banner.
    #[serde(default = "default_users")]
    pub users: BTreeMap<String, String>,
}

/// Server-side configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of static front-end assets (portfolio, login, admin)
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Directory holding published gallery images
    #[serde(default = "default_gallery_dir")]
    pub gallery_dir: PathBuf,

    /// Per-upload size ceiling in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    crate::DEFAULT_PORT
}
fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}
fn default_gallery_dir() -> PathBuf {
    PathBuf::from("public/images/gallery")
}
fn default_max_upload_bytes() -> u64 {
    crate::gallery::DEFAULT_MAX_UPLOAD_BYTES
}
fn default_users() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("admin".to_string(), "password123".to_string()),
        ("akhil".to_string(), "akhil".to_string()),
        ("nikhil".to_string(), "nikhil".to_string()),
    ])
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            public_dir: default_public_dir(),
            gallery_dir: default_gallery_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            users: default_users(),
        }
    }
}

impl Config {
    /// Load config from the default location, applying environment
    /// overrides. A missing file means defaults; a malformed file is an
    /// error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("aperture.toml"));

        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };

        if let Ok(raw) = std::env::var(PORT_VAR) {
            match parse_port(&raw) {
                Some(port) => config.server.port = port,
                None => tracing::warn!("Ignoring invalid {} value: {}", PORT_VAR, raw),
            }
        }

        Ok(config)
    }

    /// Load config from a specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Parse a PORT override; zero is not a usable listen port.
fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|&p| p != 0)
}
