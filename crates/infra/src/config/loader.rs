//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `CLOUDCALL_HOST` is unset or a value is invalid, falls back to a file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Whatever the source, the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `CLOUDCALL_HOST`: Management server host (required)
//! - `CLOUDCALL_PORT`: Port, default 8080
//! - `CLOUDCALL_PROTOCOL`: `http` or `https`, default `http`
//! - `CLOUDCALL_PATH`: API path, default `/client/api`
//! - `CLOUDCALL_TIMEOUT_SECS`: Per-request timeout
//! - `CLOUDCALL_MAX_ATTEMPTS`: Transport attempts per request
//! - `CLOUDCALL_POLL_INTERVAL_SECS`: Async job poll interval
//! - `CLOUDCALL_JOB_BUDGET_SECS`: Async job budget
//! - `CLOUDCALL_API_KEY` / `CLOUDCALL_SECRET_KEY`: Credentials, both or neither
//!
//! ## File Locations
//! The loader probes the following names, first in the current working
//! directory and then next to the executable:
//! `cloudcall.toml`, `cloudcall.json`, `config.toml`, `config.json`.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cloudcall_domain::{ClientConfig, CloudCallError, CredentialsConfig, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["cloudcall.toml", "cloudcall.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If that fails, falls
/// back to loading from a config file.
///
/// # Errors
/// Returns `CloudCallError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded values fail validation
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `CLOUDCALL_HOST` is required; every other value falls back to its
/// default.
///
/// # Errors
/// Returns `CloudCallError::Config` if the host is missing, a value does not
/// parse, only one half of the credentials is set, or validation fails.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::default();

    config.endpoint.host = env_var("CLOUDCALL_HOST")?;
    if let Some(port) = env_parse("CLOUDCALL_PORT")? {
        config.endpoint.port = port;
    }
    if let Some(protocol) = env_opt("CLOUDCALL_PROTOCOL") {
        config.endpoint.protocol = protocol.to_ascii_lowercase();
    }
    if let Some(path) = env_opt("CLOUDCALL_PATH") {
        config.endpoint.path = path;
    }

    if let Some(timeout) = env_parse("CLOUDCALL_TIMEOUT_SECS")? {
        config.http.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse("CLOUDCALL_MAX_ATTEMPTS")? {
        config.http.max_attempts = attempts;
    }

    if let Some(interval) = env_parse("CLOUDCALL_POLL_INTERVAL_SECS")? {
        config.jobs.poll_interval_secs = interval;
    }
    if let Some(budget) = env_parse("CLOUDCALL_JOB_BUDGET_SECS")? {
        config.jobs.budget_secs = budget;
    }

    config.credentials = match (env_opt("CLOUDCALL_API_KEY"), env_opt("CLOUDCALL_SECRET_KEY")) {
        (Some(api_key), Some(secret_key)) => Some(CredentialsConfig { api_key, secret_key }),
        (None, None) => None,
        _ => {
            return Err(CloudCallError::Config(
                "CLOUDCALL_API_KEY and CLOUDCALL_SECRET_KEY must be set together".to_string(),
            ))
        }
    };

    finish(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CloudCallError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The loaded values fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CloudCallError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CloudCallError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CloudCallError::Config(format!("Failed to read config file: {e}")))?;

    finish(parse_config(&contents, &config_path)?)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CloudCallError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CloudCallError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CloudCallError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut directories = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        directories.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        directories.push(exe_dir);
    }

    probe_in(&directories)
}

fn probe_in(directories: &[PathBuf]) -> Option<PathBuf> {
    directories
        .iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Validate and flag settings that will misbehave at runtime.
fn finish(config: ClientConfig) -> Result<ClientConfig> {
    config.validate()?;

    if config.http.timeout_secs >= config.jobs.budget_secs {
        tracing::warn!(
            timeout_secs = config.http.timeout_secs,
            budget_secs = config.jobs.budget_secs,
            "HTTP timeout is not shorter than the async job budget; a single slow poll can consume it"
        );
    }

    Ok(config)
}

/// Get required environment variable
///
/// # Errors
/// Returns `CloudCallError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        CloudCallError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Non-empty environment variable, if set.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional environment variable.
///
/// # Errors
/// Returns `CloudCallError::Config` if the variable is set but does not parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| CloudCallError::Config(format!("Invalid {key}: {e}")))
        })
        .transpose()
}
