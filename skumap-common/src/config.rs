//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is never fatal: built-in defaults are used and the
//! returned [`ConfigSource`] logs a warning once tracing is up.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "SKUMAP_ROOT_FOLDER";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Folder holding the database, feeds and export (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// SQLite database file name, relative to the root folder
    #[serde(default = "default_database_file")]
    pub database_file: PathBuf,

    /// POS catalog export (header-less CSV)
    #[serde(default = "default_pos_feed")]
    pub pos_feed: PathBuf,

    /// WEB catalog export (CSV with header row)
    #[serde(default = "default_web_feed")]
    pub web_feed: PathBuf,

    /// Banner lines preceding the POS data rows
    #[serde(default = "default_pos_skip_rows")]
    pub pos_skip_rows: usize,

    /// Destination of the WEB-to-POS identifier correspondence
    #[serde(default = "default_export_file")]
    pub export_file: PathBuf,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            database_file: default_database_file(),
            pos_feed: default_pos_feed(),
            web_feed: default_web_feed(),
            pos_skip_rows: default_pos_skip_rows(),
            export_file: default_export_file(),
            port: default_port(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_database_file() -> PathBuf {
    PathBuf::from("skus.db")
}

fn default_pos_feed() -> PathBuf {
    PathBuf::from("POSsample.csv")
}

fn default_web_feed() -> PathBuf {
    PathBuf::from("WEBsample.csv")
}

fn default_pos_skip_rows() -> usize {
    2
}

fn default_export_file() -> PathBuf {
    PathBuf::from("sku2sku.csv")
}

fn default_port() -> u16 {
    5790
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where a loaded [`TomlConfig`] came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    BuiltIn,
}

impl ConfigSource {
    /// Log the outcome of [`TomlConfig::load`]
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::BuiltIn => warn!("No config file found, using built-in defaults"),
        }
    }
}

/// Fully resolved file locations for one run
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPaths {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub pos_feed: PathBuf,
    pub web_feed: PathBuf,
    pub export_path: PathBuf,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the platform config file is
    /// tried and built-in defaults are used when it is absent. Nothing is
    /// logged here; callers report the returned source after installing
    /// their subscriber.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        Self::load_from(explicit, default_config_file())
    }

    /// [`TomlConfig::load`] with the fallback file given explicitly
    pub fn load_from(
        explicit: Option<&Path>,
        fallback: Option<PathBuf>,
    ) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
            return Ok((Self::from_toml_str(&content)?, ConfigSource::File(path.to_path_buf())));
        }

        match fallback {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                Ok((Self::from_toml_str(&content)?, ConfigSource::File(path)))
            }
            _ => Ok((Self::default(), ConfigSource::BuiltIn)),
        }
    }

    /// Resolve every configured file against `root_folder`
    ///
    /// Absolute entries are kept as-is.
    pub fn resolve_paths(&self, root_folder: &Path) -> ResolvedPaths {
        let under_root = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                root_folder.join(p)
            }
        };

        ResolvedPaths {
            root_folder: root_folder.to_path_buf(),
            database_path: under_root(&self.database_file),
            pos_feed: under_root(&self.pos_feed),
            web_feed: under_root(&self.web_feed),
            export_path: under_root(&self.export_file),
        }
    }
}

/// Resolve the root folder following the priority order in the module docs
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Platform config file path (`<config dir>/skumap/config.toml`)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("skumap").join("config.toml"))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("skumap"))
        .unwrap_or_else(|| PathBuf::from("./skumap_data"))
}
