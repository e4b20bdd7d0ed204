//! Commit-message tokenizer
//!
//! Words are lower-cased; doc file names, test mentions and version
//! numbers are collapsed into `#!DOCS`, `#!TEST` and `#!VERSION` so the
//! classifier sees one vocabulary entry per category.

use super::pipeline::{Pipeline, Tokens};
use super::rules::{Capture, Marker, Skip};
use super::{Token, Tokenizer};

pub const DOCS: &str = "#!DOCS";
pub const TEST: &str = "#!TEST";
pub const VERSION: &str = "#!VERSION";

const SEPARATORS: &str = r"[\s;{}()\[\],?!$\\]+";
const DOCS_PATTERN: &str = r"(?i)\w+\.(?:md|rst)|readme|changelog|doc(?:umentation)?s?";
const TEST_PATTERN: &str = r"(?i)(?:test(?:-?(?:case|suite)|s)?|e2e)\S?\s*";
const VERSION_PATTERN: &str = r"(?i)(?:v|version)?(?:\d+\.)+\d+\S?\s*";
const WORD: &str = r"[A-Za-z]+";

/// Tokenizer for commit messages.
#[derive(Debug)]
pub struct CommitTokenizer {
    pipeline: Pipeline,
}

impl CommitTokenizer {
    pub fn new() -> Self {
        let pipeline = Pipeline::new()
            .rule(Skip::new(SEPARATORS).expect("valid regex"))
            // Doc names only count as a whole word
            .rule(Marker::followed_by(DOCS, DOCS_PATTERN, r"\s|$").expect("valid regex"))
            .rule(Marker::new(TEST, TEST_PATTERN).expect("valid regex"))
            .rule(Marker::new(VERSION, VERSION_PATTERN).expect("valid regex"))
            .rule(Capture::new(WORD).expect("valid regex").lowercase());
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn scan<'a>(&'a self, text: &'a str) -> Tokens<'a, 'a> {
        self.pipeline.scan(text)
    }
}

impl Default for CommitTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for CommitTokenizer {
    fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Token> + 'a {
        self.scan(text)
    }
}
