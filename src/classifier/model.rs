//! Trained Naive-Bayes model and its JSON file format
//!
//! On disk a model is a prior table plus a sparse list of frequency
//! records, because most (class, token) pairs never occur:
//!
//! ```json
//! {
//!   "classes": { "python": 0.5, "js": 0.5 },
//!   "freq": [
//!     { "class": "js", "token": "require", "value": 1.0 },
//!     { "class": "python", "token": "import", "value": 1.0 }
//!   ]
//! }
//! ```
//!
//! Decoding validates the whole file up front. A model that loads is safe
//! to classify with.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allowed drift of the prior sum from 1.
const PRIOR_SUM_TOLERANCE: f64 = 1e-6;

/// Errors raised while encoding, decoding or storing a model
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write model file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed model: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to encode model: {0}")]
    Encode(serde_json::Error),

    #[error("invalid prior {value} for class {class:?}")]
    InvalidPrior { class: String, value: f64 },

    #[error("class priors sum to {sum}, expected 1")]
    PriorSum { sum: f64 },

    #[error("invalid frequency {value} for class {class:?}, token {token:?}")]
    InvalidFrequency {
        class: String,
        token: String,
        value: f64,
    },

    #[error("frequency record for unknown class {class:?}")]
    UnknownClass { class: String },

    #[error("duplicate frequency record for class {class:?}, token {token:?}")]
    DuplicateRecord { class: String, token: String },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Class priors and per-class token frequencies.
///
/// Frequencies are stored unsmoothed; the classifier applies its floor to
/// missing pairs at scoring time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    classes: BTreeMap<String, f64>,
    freq: BTreeMap<String, BTreeMap<String, f64>>,
}

/// On-disk layout (decode side)
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelFile {
    classes: BTreeMap<String, f64>,
    freq: Vec<FrequencyRecord>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FrequencyRecord {
    class: String,
    token: String,
    value: f64,
}

/// On-disk layout (encode side, borrows from the model)
#[derive(Serialize)]
struct ModelFileRef<'a> {
    classes: &'a BTreeMap<String, f64>,
    freq: Vec<FrequencyRecordRef<'a>>,
}

#[derive(Serialize)]
struct FrequencyRecordRef<'a> {
    class: &'a str,
    token: &'a str,
    value: f64,
}

impl Model {
    pub(crate) fn from_parts(
        classes: BTreeMap<String, f64>,
        freq: BTreeMap<String, BTreeMap<String, f64>>,
    ) -> Self {
        Self { classes, freq }
    }

    /// True when no label was ever trained.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Known labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes.keys().map(String::as_str)
    }

    /// Labels with their priors, sorted by label.
    pub fn priors(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.classes.iter().map(|(label, &p)| (label.as_str(), p))
    }

    pub fn prior(&self, label: &str) -> Option<f64> {
        self.classes.get(label).copied()
    }

    /// Stored frequency of `token` given `label`, if the pair was seen.
    pub fn frequency(&self, label: &str, token: &str) -> Option<f64> {
        self.freq.get(label)?.get(token).copied()
    }

    pub(crate) fn row(&self, label: &str) -> Option<&BTreeMap<String, f64>> {
        self.freq.get(label)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of stored (class, token) records.
    pub fn record_count(&self) -> usize {
        self.freq.values().map(BTreeMap::len).sum()
    }

    /// Pretty-printed JSON, records sorted by (class, token).
    pub fn encode(&self) -> ModelResult<String> {
        let freq = self
            .freq
            .iter()
            .flat_map(|(class, tokens)| {
                tokens.iter().map(move |(token, &value)| FrequencyRecordRef {
                    class: class.as_str(),
                    token: token.as_str(),
                    value,
                })
            })
            .collect();
        let file = ModelFileRef {
            classes: &self.classes,
            freq,
        };
        serde_json::to_string_pretty(&file).map_err(ModelError::Encode)
    }

    /// Parse and validate a model.
    pub fn decode(json: &str) -> ModelResult<Self> {
        let file: ModelFile = serde_json::from_str(json)?;

        for (class, &value) in &file.classes {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(ModelError::InvalidPrior {
                    class: class.clone(),
                    value,
                });
            }
        }
        if !file.classes.is_empty() {
            let sum: f64 = file.classes.values().sum();
            if (sum - 1.0).abs() > PRIOR_SUM_TOLERANCE {
                return Err(ModelError::PriorSum { sum });
            }
        }

        let mut freq: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for FrequencyRecord {
            class,
            token,
            value,
        } in file.freq
        {
            if !file.classes.contains_key(&class) {
                return Err(ModelError::UnknownClass { class });
            }
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(ModelError::InvalidFrequency {
                    class,
                    token,
                    value,
                });
            }
            let row = freq.entry(class.clone()).or_default();
            if row.contains_key(&token) {
                return Err(ModelError::DuplicateRecord { class, token });
            }
            row.insert(token, value);
        }

        Ok(Self {
            classes: file.classes,
            freq,
        })
    }

    /// Write the model to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ModelResult<()> {
        let write_err = |source: std::io::Error| ModelError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = self.encode()?;
        std::fs::write(path, content).map_err(write_err)?;
        tracing::info!(
            "Saved model with {} classes and {} records to {}",
            self.class_count(),
            self.record_count(),
            path.display()
        );
        Ok(())
    }

    /// Read and validate a model file.
    pub fn load(path: &Path) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::decode(&content)?;
        tracing::debug!(
            "Loaded model from {}: {} classes, {} records",
            path.display(),
            model.class_count(),
            model.record_count()
        );
        Ok(model)
    }
}
