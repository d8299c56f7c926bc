// Configuration loading and parsing (market.toml).

use crate::market::evaluator::FilterSelection;
use crate::market::history::Timeframe;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

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
    pub thresholds: Thresholds,
    pub display: DisplayDefaults,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// market.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire market.toml file. Every section
/// is optional; missing sections and fields fall back to the defaults below.
#[derive(Debug, Clone, Deserialize)]
struct MarketFile {
    #[serde(default)]
    thresholds: Thresholds,
    #[serde(default)]
    display: DisplayDefaults,
    #[serde(default)]
    data: DataPaths,
}

/// Deviation thresholds, in percent. A listing priced more than `deal`
/// percent below its reference average is a deal; more than `overpriced`
/// percent above is overpriced; listings at or inside both bounds are
/// neutral. `hot_deal` marks the discount at which a deal is called out in
/// the deal summary.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub deal: f64,
    pub overpriced: f64,
    pub hot_deal: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            deal: -10.0,
            overpriced: 10.0,
            hot_deal: 15.0,
        }
    }
}

/// Initial view selections for a front end: which filter and history
/// timeframe to start on. Stored as strings and validated against the
/// parsers for the corresponding types.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayDefaults {
    pub default_filter: String,
    pub default_timeframe: String,
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        DisplayDefaults {
            default_filter: "all".into(),
            default_timeframe: "12m".into(),
        }
    }
}

/// Locations of the CSV exports, relative to the working directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub listings: String,
    pub console_metrics: String,
    pub market_share: String,
    pub price_history: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths {
            listings: "data/listings.csv".into(),
            console_metrics: "data/console_metrics.csv".into(),
            market_share: "data/market_share.csv".into(),
            price_history: "data/price_history.csv".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/market.toml` relative to the
/// given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let market_path = base_dir.join("config").join("market.toml");
    let market_text = read_file(&market_path)?;
    let market_file: MarketFile =
        toml::from_str(&market_text).map_err(|e| ConfigError::ParseError {
            path: market_path.clone(),
            source: e,
        })?;

    let config = Config {
        thresholds: market_file.thresholds,
        display: market_file.display,
        data_paths: market_file.data,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        // With no defaults to copy and no config/ either, loading is going
        // to fail anyway; report the missing defaults directory clearly.
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        // Skip non-files and entries without a file name
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };

        // Skip .example template files
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // File already exists in config/, skip it
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    // Threshold validations
    let t = &config.thresholds;
    let threshold_fields: &[(&str, f64)] = &[
        ("thresholds.deal", t.deal),
        ("thresholds.overpriced", t.overpriced),
        ("thresholds.hot_deal", t.hot_deal),
    ];
    for (name, val) in threshold_fields {
        if !val.is_finite() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be finite, got {val}"),
            });
        }
    }

    if t.deal >= t.overpriced {
        return Err(ConfigError::ValidationError {
            field: "thresholds.deal".into(),
            message: format!(
                "must be below thresholds.overpriced ({}), got {}",
                t.overpriced, t.deal
            ),
        });
    }

    if t.hot_deal <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "thresholds.hot_deal".into(),
            message: format!("must be > 0, got {}", t.hot_deal),
        });
    }

    // Display validations: the defaults must parse as a filter/timeframe
    if FilterSelection::from_str_filter(&config.display.default_filter).is_err() {
        return Err(ConfigError::ValidationError {
            field: "display.default_filter".into(),
            message: format!(
                "unknown filter '{}' (expected all, deals, overpriced, or neutral)",
                config.display.default_filter
            ),
        });
    }

    if Timeframe::from_str_tf(&config.display.default_timeframe).is_none() {
        return Err(ConfigError::ValidationError {
            field: "display.default_timeframe".into(),
            message: format!(
                "unknown timeframe '{}' (expected 3m, 6m, or 12m)",
                config.display.default_timeframe
            ),
        });
    }

    // Data path validations
    let d = &config.data_paths;
    let path_fields: &[(&str, &str)] = &[
        ("data.listings", &d.listings),
        ("data.console_metrics", &d.console_metrics),
        ("data.market_share", &d.market_share),
        ("data.price_history", &d.price_history),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
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
