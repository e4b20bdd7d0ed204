//! Labeled training samples
//!
//! A corpus directory holds one sub-directory per label:
//!
//! ```text
//! samples/
//!   python/  a.py  b.py
//!   rust/    main.rs
//! ```
//!
//! Every regular file anywhere under the corpus becomes a sample labeled
//! with the name of its immediate parent directory.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while reading a sample corpus
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("sample corpus {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to walk sample corpus: {0}")]
    Walk(#[from] ignore::Error),

    #[error("failed to read sample {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Raw text with its class label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub text: String,
    pub label: String,
}

impl Sample {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Load every file under `dir` as a sample, in sorted path order.
///
/// Hidden files and ignore files are not filtered. Files that are not
/// valid UTF-8 are skipped with a warning.
pub fn load_samples(dir: &Path) -> Result<Vec<Sample>, CorpusError> {
    if !dir.is_dir() {
        return Err(CorpusError::NotADirectory(dir.to_path_buf()));
    }

    let walker = ignore::WalkBuilder::new(dir)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut samples = Vec::new();
    let mut skipped = 0usize;
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        let Some(label) = label_for(path) else {
            continue;
        };
        let bytes = std::fs::read(path).map_err(|source| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        match String::from_utf8(bytes) {
            Ok(text) => samples.push(Sample::new(text, label)),
            Err(_) => {
                tracing::warn!("Skipping non-UTF-8 sample {}", path.display());
                skipped += 1;
            }
        }
    }

    tracing::info!(
        "Loaded {} samples from {} ({} skipped)",
        samples.len(),
        dir.display(),
        skipped
    );
    Ok(samples)
}

/// Name of the directory directly containing `path`.
fn label_for(path: &Path) -> Option<String> {
    path.parent()?
        .file_name()?
        .to_str()
        .map(str::to_string)
}
