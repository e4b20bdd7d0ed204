//! Configuration for polyglot
//!
//! Supports loading config from:
//! - Environment variables (`POLYGLOT_FLOOR`, `POLYGLOT_MAX_READ_SIZE`)
//! - An explicit `--config` file
//! - `polyglot.toml` in the working directory
//! - ~/.config/polyglot/config.toml
//!
//! ```toml
//! [classifier]
//! floor = 1e-7
//!
//! [detect]
//! max_read_size = 65536
//!
//! [models]
//! language = "/path/to/language.json"
//! commit = "/path/to/commit.json"
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classifier::DEFAULT_FLOOR;
use crate::detect::DEFAULT_MAX_READ_SIZE;

/// Project-local config file name
pub const LOCAL_CONFIG: &str = "polyglot.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub classifier: ClassifierSettings,

    #[serde(default)]
    pub detect: DetectSettings,

    #[serde(default)]
    pub models: ModelSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierSettings {
    /// Probability for unseen (label, token) pairs (default: 1e-7)
    pub floor: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DetectSettings {
    /// Bytes read from each file (default: 65536)
    pub max_read_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSettings {
    /// Language model path
    pub language: Option<PathBuf>,

    /// Commit-message model path
    pub commit: Option<PathBuf>,
}

impl Settings {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. `explicit` file, if given
    /// 3. ./polyglot.toml
    /// 4. User config (~/.config/polyglot/config.toml)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            settings.merge(Self::from_file(&path)?);
        }

        let local = Path::new(LOCAL_CONFIG);
        if local.exists() {
            settings.merge(Self::from_file(local)?);
        }

        if let Some(path) = explicit {
            settings.merge(Self::from_file(path)?);
        }

        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("polyglot").join("config.toml"))
    }

    /// Directory holding default model files
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("polyglot"))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Settings) {
        if other.classifier.floor.is_some() {
            self.classifier.floor = other.classifier.floor;
        }
        if other.detect.max_read_size.is_some() {
            self.detect.max_read_size = other.detect.max_read_size;
        }
        if other.models.language.is_some() {
            self.models.language = other.models.language;
        }
        if other.models.commit.is_some() {
            self.models.commit = other.models.commit;
        }
    }

    /// Apply environment overrides. `lookup` returns the variable's value
    /// if it is set.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("POLYGLOT_FLOOR") {
            let floor = value
                .trim()
                .parse::<f64>()
                .with_context(|| format!("POLYGLOT_FLOOR is not a number: {value:?}"))?;
            self.classifier.floor = Some(floor);
        }
        if let Some(value) = lookup("POLYGLOT_MAX_READ_SIZE") {
            let size = value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("POLYGLOT_MAX_READ_SIZE is not a size: {value:?}"))?;
            self.detect.max_read_size = Some(size);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(floor) = self.classifier.floor {
            if !floor.is_finite() || floor <= 0.0 || floor > 1.0 {
                bail!("classifier.floor must be in (0, 1], got {floor}");
            }
        }
        if self.detect.max_read_size == Some(0) {
            bail!("detect.max_read_size must be positive");
        }
        Ok(())
    }

    pub fn floor(&self) -> f64 {
        self.classifier.floor.unwrap_or(DEFAULT_FLOOR)
    }

    pub fn max_read_size(&self) -> usize {
        self.detect.max_read_size.unwrap_or(DEFAULT_MAX_READ_SIZE)
    }

    /// Configured language model, falling back to the data directory
    pub fn language_model(&self) -> Option<PathBuf> {
        self.models
            .language
            .clone()
            .or_else(|| Self::data_dir().map(|d| d.join("language.json")))
    }

    /// Configured commit model, falling back to the data directory
    pub fn commit_model(&self) -> Option<PathBuf> {
        self.models
            .commit
            .clone()
            .or_else(|| Self::data_dir().map(|d| d.join("commit.json")))
    }
}
