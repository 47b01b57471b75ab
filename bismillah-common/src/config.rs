//! Configuration loading and data folder resolution
//!
//! Bootstrap settings come from a small TOML file. Every field has a
//! built-in default, and a missing config file is not an error: the bot
//! starts with defaults and logs a warning.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments
//! 2. Environment variables (`BISMILLAH_DATA_FOLDER`, `BISMILLAH_TOKEN`)
//! 3. TOML configuration file
//! 4. Built-in defaults

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the data folder
pub const DATA_FOLDER_ENV: &str = "BISMILLAH_DATA_FOLDER";

/// Environment variable carrying the Bot API token
pub const TOKEN_ENV: &str = "BISMILLAH_TOKEN";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Bot API token (prefer the environment variable in production)
    pub bot_token: Option<String>,

    /// Bot username advertised in the help text
    pub bot_username: String,

    /// Folder holding the corpus files and rendered assets
    pub data_folder: Option<PathBuf>,

    /// SQLite database for session and file-token storage
    ///
    /// Default: `<data_folder>/bismillah.db`
    pub database_path: Option<PathBuf>,

    /// Prefix prepended to every stored key
    pub namespace: String,

    /// Append-only feedback log (relative to the data folder)
    pub feedback_file: PathBuf,

    /// Long-poll wait passed to getUpdates
    pub poll_timeout_secs: u64,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Corpus source files
    pub corpus: CorpusConfig,

    /// Where these settings came from
    #[serde(skip)]
    pub source: ConfigSource,
}

/// Origin of a loaded [`TomlConfig`]
///
/// `load` runs before logging is configured, so it records the outcome here
/// and [`TomlConfig::log_source`] reports it once a subscriber is installed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Constructed in code
    #[default]
    Builtin,
    /// The config file was absent; defaults apply
    Missing(PathBuf),
    /// Parsed from this file
    File(PathBuf),
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

/// Format of the commentary source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TafsirFormat {
    /// pdftotext output of the Jalalayn PDF
    Jalalayn,
    /// `surah|ayah|text` lines
    Tanzil,
}

/// Corpus file locations, relative to the data folder unless absolute
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub translation_file: PathBuf,
    pub tafsir_file: PathBuf,
    pub tafsir_format: TafsirFormat,
    pub metadata_file: PathBuf,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            bot_username: "BismillahBot".to_string(),
            data_folder: None,
            database_path: None,
            namespace: String::new(),
            feedback_file: PathBuf::from("feedback.txt"),
            poll_timeout_secs: 10,
            logging: LoggingConfig::default(),
            corpus: CorpusConfig::default(),
            source: ConfigSource::Builtin,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            translation_file: PathBuf::from("en.ahmedraza"),
            tafsir_file: PathBuf::from("Al_Jalalain_Eng.txt"),
            tafsir_format: TafsirFormat::Jalalayn,
            metadata_file: PathBuf::from("quran-data.xml"),
        }
    }
}

impl TomlConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read or parsed is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                source: ConfigSource::Missing(path.to_path_buf()),
                ..Self::default()
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))?;
        config.source = ConfigSource::File(path.to_path_buf());
        Ok(config)
    }

    /// Log where the configuration came from
    pub fn log_source(&self) {
        match &self.source {
            ConfigSource::Builtin => info!("Using built-in configuration"),
            ConfigSource::Missing(path) => {
                warn!("Config file {} not found, using defaults", path.display())
            }
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
        }
    }

    /// Resolve the Bot API token: CLI/env value first, then TOML
    pub fn resolve_token(&self, cli_or_env: Option<&str>) -> Result<String> {
        cli_or_env
            .map(str::to_string)
            .or_else(|| self.bot_token.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "No bot token configured (use --token, {} or bot_token in config)",
                    TOKEN_ENV
                ))
            })
    }

    /// Database path, defaulting to `bismillah.db` inside the data folder
    pub fn database_path(&self, data_folder: &Path) -> PathBuf {
        match &self.database_path {
            Some(path) => resolve_relative(data_folder, path),
            None => data_folder.join("bismillah.db"),
        }
    }
}

/// Join `path` onto `base` unless it is already absolute
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Data folder resolution following the priority order:
/// 1. Command-line argument (highest priority)
/// 2. `BISMILLAH_DATA_FOLDER` environment variable
/// 3. `data_folder` from the TOML config
/// 4. OS-dependent default (fallback)
pub struct DataFolderResolver<'a> {
    cli_arg: Option<PathBuf>,
    config: &'a TomlConfig,
}

impl<'a> DataFolderResolver<'a> {
    pub fn new(cli_arg: Option<PathBuf>, config: &'a TomlConfig) -> Self {
        Self { cli_arg, config }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.config.data_folder {
            return path.clone();
        }

        default_data_folder()
    }
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("bismillah"))
        .unwrap_or_else(|| PathBuf::from("./bismillah_data"))
}
