use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};

const APP_DIR_NAME: &str = "Photo Post Client";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // The web client talks to the API over same-origin relative URLs;
            // a desktop client needs the absolute origin instead.
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 120,
            log_level: "info".to_string(),
        }
    }
}

fn get_config_path() -> AppResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AppError::Config("Could not find config directory".to_string()))?
        .join(APP_DIR_NAME);

    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("config.json"))
}

pub fn load_config() -> AppResult<Config> {
    let config_path = get_config_path()?;

    if config_path.exists() {
        let config_str = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_str).unwrap_or_else(|e| {
            log::warn!("Failed to parse config file: {}. Using defaults.", e);
            Config::default()
        });

        // Validate config before returning
        validate_config(&config)?;

        Ok(config)
    } else {
        // Create default config
        let default_config = Config::default();
        save_config_internal(&default_config)?;
        Ok(default_config)
    }
}

pub fn save_config(config: &Config) -> AppResult<()> {
    validate_config(config)?;
    save_config_internal(config)
}

fn save_config_internal(config: &Config) -> AppResult<()> {
    let config_path = get_config_path()?;

    // Create backup of existing config
    if config_path.exists() {
        let backup_path = config_path.with_extension("json.bak");
        if let Err(e) = fs::copy(&config_path, &backup_path) {
            log::warn!("Failed to create config backup: {}", e);
        }
    }

    let config_str = serde_json::to_string_pretty(config)?;
    fs::write(&config_path, config_str)?;

    log::info!("Configuration saved successfully");
    Ok(())
}

pub fn get_data_directory() -> AppResult<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Config("Could not find data directory".to_string()))?
        .join(APP_DIR_NAME);

    fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

pub fn validate_config(config: &Config) -> AppResult<()> {
    let base_url = config.api_base_url.trim();

    if base_url.is_empty() {
        return Err(AppError::validation("api_base_url", "Must not be empty"));
    }

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(AppError::validation(
            "api_base_url",
            "Must be an http:// or https:// origin",
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(AppError::validation(
            "request_timeout_secs",
            "Must be greater than 0",
        ));
    }

    // Validate log level
    let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
    if !valid_log_levels.contains(&config.log_level.as_str()) {
        return Err(AppError::validation(
            "log_level",
            "Must be a valid log level",
        ));
    }

    Ok(())
}

/// Resolve the configured log level, falling back to Info when the config
/// file is missing or unreadable. Called before the logger is initialized.
pub fn load_log_level() -> log::LevelFilter {
    let level = match load_config() {
        Ok(config) => config.log_level,
        Err(_) => return log::LevelFilter::Info,
    };

    match level.as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    }
}

// Configuration migration for version updates
pub fn migrate_config() -> AppResult<()> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        return Ok(()); // Nothing to migrate
    }

    let config_str = fs::read_to_string(&config_path)?;

    // Try to parse as current version first
    if serde_json::from_str::<Config>(&config_str).is_ok() {
        return Ok(()); // Already current version
    }

    log::info!("Migrating configuration to new format");

    // Back up the old config, then start over from defaults
    let backup_path = config_path.with_extension("json.old");
    fs::copy(&config_path, &backup_path)?;

    let default_config = Config::default();
    save_config_internal(&default_config)?;

    log::info!("Old configuration backed up to {}", backup_path.display());

    Ok(())
}

// Reset configuration to defaults
pub fn reset_config() -> AppResult<()> {
    let config_path = get_config_path()?;

    // Backup existing config
    if config_path.exists() {
        let backup_path = config_path.with_extension("json.reset_backup");
        fs::copy(&config_path, &backup_path)?;
        log::info!("Existing config backed up to {}", backup_path.display());
    }

    // Save default config
    let default_config = Config::default();
    save_config_internal(&default_config)?;

    log::info!("Configuration reset to defaults");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_config_survives_serde_round_trip() {
        let config = Config::default();
        let serialized = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&serialized).unwrap();

        assert_eq!(parsed.api_base_url, config.api_base_url);
        assert_eq!(parsed.request_timeout_secs, config.request_timeout_secs);
        assert_eq!(parsed.log_level, config.log_level);
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let config = Config {
            api_base_url: "  ".to_string(),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_non_http_base_url_is_rejected() {
        let config = Config {
            api_base_url: "ftp://photos.example.com".to_string(),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let config = Config {
            log_level: "verbose".to_string(),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
