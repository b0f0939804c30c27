//! Configuration module for the engagement backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

pub const DEFAULT_SUMMARY_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_SUMMARY_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Seed the demo plant into an empty database
    pub seed_demo_data: bool,
    /// Optional JSON file replacing the built-in reward catalog
    pub catalog_path: Option<PathBuf>,
    /// Credential for the summarization service
    pub gemini_api_key: Option<String>,
    pub summary_model: String,
    pub summary_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("ENGAGE_API_PSK").ok();

        let db_path = env::var("ENGAGE_DB_PATH")
            .unwrap_or_else(|_| "./data/engagement.sqlite".to_string())
            .into();

        let bind_addr = env::var("ENGAGE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid ENGAGE_BIND_ADDR format: {}", e)))?;

        let log_level = env::var("ENGAGE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let seed_demo_data = match env::var("ENGAGE_SEED_DEMO") {
            Ok(value) => parse_flag(&value).ok_or_else(|| {
                AppError::Config(format!("Invalid ENGAGE_SEED_DEMO value: {}", value))
            })?,
            Err(_) => true,
        };

        let catalog_path = env::var("ENGAGE_CATALOG_PATH").ok().map(PathBuf::from);

        let gemini_api_key = env::var("ENGAGE_GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let summary_model =
            env::var("ENGAGE_SUMMARY_MODEL").unwrap_or_else(|_| DEFAULT_SUMMARY_MODEL.to_string());

        let summary_base_url =
            env::var("ENGAGE_SUMMARY_URL").unwrap_or_else(|_| DEFAULT_SUMMARY_URL.to_string());

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            seed_demo_data,
            catalog_path,
            gemini_api_key,
            summary_model,
            summary_base_url,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
