//! Configuration for the suggestion engine.
//!
//! Values are resolved from built-in defaults, then an optional TOML file, then
//! environment variables (a `.env` file is loaded by the binary beforehand), and
//! finally CLI flags applied by the caller.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::repository::DbContext;

/// Minimum similarity for a fragment to count as a match.
pub const DEFAULT_THRESHOLD: f64 = 0.9;

/// Longest word n-gram compared against candidate terms.
pub const DEFAULT_MAX_NGRAM: usize = 3;

/// Upper bound on `max_ngram`; longer phrases never name a single entity.
pub const MAX_NGRAM_LIMIT: usize = 16;

/// Default database filename inside the data directory.
pub const DEFAULT_DATABASE_FILENAME: &str = "annosuggest.db";

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "annosuggest.toml";

/// Matching parameters. Fixed for the duration of a refresh run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub threshold: f64,
    pub max_ngram: usize,
    /// Matcher pool size.
    pub workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_ngram: DEFAULT_MAX_NGRAM,
            workers: default_workers(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }
        if self.max_ngram == 0 {
            return Err(ConfigError::Invalid("max_ngram must be at least 1".into()));
        }
        if self.max_ngram > MAX_NGRAM_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_ngram must be at most {}, got {}",
                MAX_NGRAM_LIMIT, self.max_ngram
            )));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        Ok(())
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// File-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base data directory (holds the SQLite database).
    pub data_dir: Option<PathBuf>,
    /// Database URL or path; overrides `data_dir`.
    pub database: Option<String>,
    pub engine: EngineConfig,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from `path`, or from `annosuggest.toml` in the working directory if it
    /// exists, then apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_toml_str(&fs::read_to_string(p)?)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    tracing::debug!("Loading config from {}", default_path.display());
                    Self::from_toml_str(&fs::read_to_string(default_path)?)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Apply `DATABASE_URL` and `ANNOSUGGEST_*` overrides from a lookup function.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database = Some(url);
        }
        if let Some(dir) = lookup("ANNOSUGGEST_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(shellexpand::tilde(&dir).into_owned()));
        }
        if let Some(v) = lookup("ANNOSUGGEST_THRESHOLD") {
            self.engine.threshold = v
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("ANNOSUGGEST_THRESHOLD: {}", v)))?;
        }
        if let Some(v) = lookup("ANNOSUGGEST_MAX_NGRAM") {
            self.engine.max_ngram = v
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("ANNOSUGGEST_MAX_NGRAM: {}", v)))?;
        }
        if let Some(v) = lookup("ANNOSUGGEST_WORKERS") {
            self.engine.workers = v
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("ANNOSUGGEST_WORKERS: {}", v)))?;
        }
        Ok(())
    }

    /// Resolve runtime settings.
    pub fn settings(&self) -> Settings {
        let mut settings = match &self.data_dir {
            Some(dir) => Settings::with_data_dir(dir.clone()),
            None => Settings::default(),
        };
        settings.database_url = self.database.clone();
        settings
    }
}

/// Runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    pub database_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        // Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("annosuggest");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
        }
    }
}

impl Settings {
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        if let Some(ref url) = self.database_url {
            url.clone()
        } else {
            format!("sqlite:{}", self.database_path().display())
        }
    }

    /// Full path to the SQLite file when no explicit URL is set.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create data directory '{}': {}",
                    self.data_dir.display(),
                    e
                ),
            )
        })
    }

    pub fn create_db_context(&self) -> DbContext {
        DbContext::from_url(&self.database_url())
    }
}
