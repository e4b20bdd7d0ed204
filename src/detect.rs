//! File-language detection
//!
//! Wraps a source-file [`Classifier`] with bounded file reads. Only the
//! first `max_read_size` bytes of a file are scored; larger files are
//! classified from that prefix.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::classifier::{Classifier, Model, UNKNOWN};
use crate::tokenize::SourceTokenizer;

/// Default number of bytes read from each file.
pub const DEFAULT_MAX_READ_SIZE: usize = 1 << 16;

/// Language classifier for source files.
#[derive(Debug)]
pub struct LanguageDetector {
    classifier: Classifier<SourceTokenizer>,
    max_read_size: usize,
}

impl LanguageDetector {
    pub fn new(classifier: Classifier<SourceTokenizer>) -> Self {
        Self {
            classifier,
            max_read_size: DEFAULT_MAX_READ_SIZE,
        }
    }

    /// Load a language model from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let model = Model::load(path)
            .with_context(|| format!("Failed to load language model {}", path.display()))?;
        Ok(Self::new(Classifier::new(SourceTokenizer::new(), model)))
    }

    pub fn with_max_read_size(mut self, max_read_size: usize) -> Self {
        self.max_read_size = max_read_size;
        self
    }

    pub fn max_read_size(&self) -> usize {
        self.max_read_size
    }

    pub fn classifier(&self) -> &Classifier<SourceTokenizer> {
        &self.classifier
    }

    /// Language of in-memory text.
    pub fn detect(&self, text: &str) -> &str {
        self.classifier.classify(text)
    }

    /// Language of the file at `path`. Binary files are [`UNKNOWN`].
    pub fn detect_file(&self, path: &Path) -> Result<&str> {
        let Some(text) = read_prefix(path, self.max_read_size)? else {
            tracing::debug!("{} is not UTF-8 text", path.display());
            return Ok(UNKNOWN);
        };
        Ok(self.detect(&text))
    }

    /// Like [`detect_file`], with the file's extension as a hint. Scoring
    /// uses content only, so the hint does not change the result.
    ///
    /// [`detect_file`]: LanguageDetector::detect_file
    pub fn detect_file_with_hint(&self, path: &Path, extension: Option<&str>) -> Result<&str> {
        tracing::trace!("{} (extension hint {:?})", path.display(), extension);
        self.detect_file(path)
    }
}

/// Read at most `limit` bytes of `path` as text.
///
/// A multi-byte character cut by the limit is dropped. Returns `None` for
/// content that is not UTF-8.
pub fn read_prefix(path: &Path, limit: usize) -> Result<Option<String>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut bytes = Vec::new();
    file.take(limit as u64)
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(Some(text)),
        Err(err) => {
            let valid = err.utf8_error().valid_up_to();
            // Only an incomplete trailing character is tolerated
            if err.utf8_error().error_len().is_some() {
                return Ok(None);
            }
            let mut bytes = err.into_bytes();
            bytes.truncate(valid);
            Ok(String::from_utf8(bytes).ok())
        }
    }
}
