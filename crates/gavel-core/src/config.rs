// Configuration loading and parsing (config/auction.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::auction::{DEFAULT_COUNTDOWN_SECS, MAX_SQUAD_SIZE};
use crate::fixtures::{DEFAULT_PLAYER_COUNT, DEFAULT_STARTING_BUDGET};
use crate::guard::GuardRules;
use crate::money::LAKH;

pub const CONFIG_FILE: &str = "auction.toml";

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
// auction.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auction: AuctionConfig,
    #[serde(default)]
    pub teams: TeamsConfig,
    #[serde(default)]
    pub players: PlayersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuctionConfig {
    /// Seconds on the clock per round and after each bid.
    pub countdown_secs: u32,
    /// Smallest raise over the current bid that the entry guard accepts.
    pub min_increment: u64,
    pub max_squad_size: usize,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        AuctionConfig {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            min_increment: LAKH,
            max_squad_size: MAX_SQUAD_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TeamsConfig {
    pub starting_budget: u64,
}

impl Default for TeamsConfig {
    fn default() -> Self {
        TeamsConfig {
            starting_budget: DEFAULT_STARTING_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayersConfig {
    /// How many players to generate when no CSV is given.
    pub count: usize,
    pub seed: u64,
    /// Fixed player pool, relative to the config base directory.
    pub csv: Option<String>,
}

impl Default for PlayersConfig {
    fn default() -> Self {
        PlayersConfig {
            count: DEFAULT_PLAYER_COUNT,
            seed: 2024,
            csv: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "gavel=info,gavel_core=info,gavel_app=info,warn".into(),
            dir: "logs".into(),
        }
    }
}

impl Config {
    pub fn rules(&self) -> GuardRules {
        GuardRules {
            min_increment: self.auction.min_increment,
            max_squad_size: self.auction.max_squad_size,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/auction.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;
    Ok(config)
}

/// Copy `defaults/auction.toml` into `config/` if it is not there yet.
/// Returns the path that was created, if any.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);

    if target.exists() {
        return Ok(None);
    }
    if !source.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither defaults/{CONFIG_FILE} nor config/{CONFIG_FILE} found in {}",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", source.display()),
    })?;
    Ok(Some(target))
}

/// Load config relative to `base_dir`, seeding it from defaults first.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_file(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.auction.countdown_secs == 0 {
        return Err(invalid("auction.countdown_secs", "must be greater than 0"));
    }
    if config.auction.max_squad_size == 0 {
        return Err(invalid("auction.max_squad_size", "must be greater than 0"));
    }
    if config.teams.starting_budget == 0 {
        return Err(invalid("teams.starting_budget", "must be greater than 0"));
    }
    match config.players.csv.as_deref() {
        Some(path) if path.trim().is_empty() => {
            return Err(invalid("players.csv", "must not be empty when set"));
        }
        Some(_) => {}
        None if config.players.count == 0 => {
            return Err(invalid(
                "players.count",
                "must be greater than 0 when no csv is configured",
            ));
        }
        None => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
