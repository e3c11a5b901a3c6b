//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `STUDYHALL_DB_PATH`: Database file path
//! - `STUDYHALL_DB_POOL_SIZE`: Connection pool size (optional, default 4)
//! - `STUDYHALL_HTTP_ADDR`: HTTP bind address (optional, default 127.0.0.1:8080)

use std::path::{Path, PathBuf};

use studyhall_domain::{Config, DatabaseConfig, Result, ServerConfig, StudyHallError};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `StudyHallError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `STUDYHALL_DB_PATH` is required; the remaining variables fall back to
/// defaults when absent.
///
/// # Errors
/// Returns `StudyHallError::Config` if the required variable is missing or
/// any value is invalid.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("STUDYHALL_DB_PATH")?;
    let pool_size = match std::env::var("STUDYHALL_DB_POOL_SIZE") {
        Ok(raw) => raw
            .parse::<u32>()
            .map_err(|e| StudyHallError::Config(format!("Invalid pool size: {e}")))?,
        Err(_) => 4,
    };
    let bind_addr = std::env::var("STUDYHALL_HTTP_ADDR")
        .unwrap_or_else(|_| ServerConfig::default().bind_addr);

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size },
        server: ServerConfig { bind_addr },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `StudyHallError::Config` if no file is found or the file cannot
/// be parsed.
pub fn load_from_file(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => probe_config_paths().ok_or_else(|| {
            StudyHallError::Config("no config file found in probed locations".into())
        })?,
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        StudyHallError::Config(format!("cannot read {}: {e}", path.display()))
    })?;

    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&contents)
            .map_err(|e| StudyHallError::Config(format!("invalid TOML config: {e}")))?,
        Some("json") => serde_json::from_str(&contents)
            .map_err(|e| StudyHallError::Config(format!("invalid JSON config: {e}")))?,
        _ => {
            return Err(StudyHallError::Config(format!(
                "unsupported config format: {}",
                path.display()
            )))
        }
    };

    tracing::info!(path = %path.display(), "Configuration loaded from file");
    Ok(config)
}

fn probe_config_paths() -> Option<PathBuf> {
    const CANDIDATES: [&str; 4] =
        ["config.toml", "config.json", "studyhall.toml", "studyhall.json"];

    CANDIDATES.iter().map(PathBuf::from).find(|candidate| candidate.is_file())
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| StudyHallError::Config(format!("missing environment variable {name}")))
}
