// Configuration loading and parsing (card.toml).

use crate::slots::FIRST_HIT_SLOT;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name inside `config/` (and `defaults/`).
pub const CONFIG_FILE: &str = "card.toml";

const EARLIEST_SEASON: u16 = 1871;
const LATEST_SEASON: u16 = 2100;
const MAX_TABLE_SLOT: u32 = 1_000_000;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub season: u16,
    pub table: TableConfig,
    pub data_paths: DataPaths,
    pub db_path: String,
}

// ---------------------------------------------------------------------------
// card.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire card.toml file.
#[derive(Debug, Clone, Deserialize)]
struct CardFile {
    season: SeasonSection,
    table: TableConfig,
    data_paths: DataPaths,
    database: DatabaseSection,
}

#[derive(Debug, Clone, Deserialize)]
struct SeasonSection {
    year: u16,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

/// Roll-table dimensions. The table size is fixed by the printed game, not
/// derived from any player's stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TableConfig {
    /// Highest slot number on the table; generic outs fill up to here.
    pub max_slot: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// TOML file of per-player stat bundles.
    pub stats: String,
    /// CSV file of season rosters.
    pub rosters: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/card.toml` under `base_dir`. Never creates the
/// file; run [`init_config`] first on a fresh checkout.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path(base_dir);
    let text = read_file(&path)?;
    let file: CardFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        season: file.season.year,
        table: file.table,
        data_paths: file.data_paths,
        db_path: file.database.path,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/card.toml` from the shipped `defaults/card.toml` when it is
/// missing. Returns the path written, or `None` if a config already exists;
/// an existing config is never touched.
pub fn init_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = config_path(base_dir);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let defaults = std::fs::read(&source).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!(
            "{} is missing and {} could not be read: {e}",
            target.display(),
            source.display()
        ),
    })?;

    let config_dir = base_dir.join("config");
    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;
    std::fs::write(&target, defaults).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", target.display()),
    })?;

    Ok(Some(target))
}

fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join("config").join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if !(EARLIEST_SEASON..=LATEST_SEASON).contains(&config.season) {
        return Err(ConfigError::ValidationError {
            field: "season.year".into(),
            message: format!(
                "must be between {EARLIEST_SEASON} and {LATEST_SEASON}, got {}",
                config.season
            ),
        });
    }

    let max_slot = config.table.max_slot;
    if !(FIRST_HIT_SLOT..=MAX_TABLE_SLOT).contains(&max_slot) {
        return Err(ConfigError::ValidationError {
            field: "table.max_slot".into(),
            message: format!(
                "must be between {FIRST_HIT_SLOT} and {MAX_TABLE_SLOT}, got {max_slot}"
            ),
        });
    }

    let path_fields: &[(&str, &str)] = &[
        ("data_paths.stats", config.data_paths.stats.as_str()),
        ("data_paths.rosters", config.data_paths.rosters.as_str()),
        ("database.path", config.db_path.as_str()),
    ];
    for (name, value) in path_fields {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
