//! Configuration module for the admin backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (auth disabled when unset)
    pub api_psk: Option<String>,
    /// Path to the SQLite file backing local storage
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AddrParseError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("EDU_ADMIN_API_PSK")
            .ok()
            .filter(|psk| !psk.trim().is_empty());

        let db_path = env::var("EDU_ADMIN_DB_PATH")
            .unwrap_or_else(|_| "./data/admin.sqlite".to_string())
            .into();

        let bind_addr = env::var("EDU_ADMIN_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()?;

        let log_level = env::var("EDU_ADMIN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
        })
    }
}
