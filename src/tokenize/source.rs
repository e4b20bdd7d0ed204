//! Source-file tokenizer
//!
//! Scans file contents for language detection. Whitespace, numbers,
//! comments and string literals carry little signal about the language
//! and are skipped. Shebang lines and markup tags are turned into
//! synthetic tokens; everything else (keywords, identifiers, punctuation,
//! operators) is emitted as-is.

use super::pipeline::{Pipeline, Tokens};
use super::rules::{Capture, Delimited, Nested, Shebang, Skip};
use super::{Token, Tokenizer};

/// Comment and literal delimiters, most specific first.
const DELIMITERS: &[(&str, &str)] = &[
    // Line comments run to end of line (or end of text)
    (r"\s*//|\s*#|\s*%", r"\n|\z"),
    (r"/\*", r"\*/"),
    (r"<!--", r"-->"),
    (r"\{-", r"-\}"),
    (r#"""""#, r#"""""#),
    (r"'''", r"'''"),
    (r"'", r"[^\\]?'"),
    (r#"""#, r#"[^\\]?""#),
    (r"`", r"[^\\]`"),
];

const WHITESPACE: &str = r"\s+";
const NUMBER: &str = r"(?:0x)?\d[\d.]*";
const TAG: &str = r"<[^\s<>][^<>]*>";
const PUNCTUATION: &str = r"[;{}()\[\],?!$\\]";
const WORD: &str = r"[\w.@#/*]+";
const OPERATOR: &str = r"<<?|\+|-|\*|/|%|&&?|\|\|?|=|:=|:|>|\^=|\^|!==|==|!=";

/// Tokenizer for source-file contents.
#[derive(Debug)]
pub struct SourceTokenizer {
    pipeline: Pipeline,
}

impl SourceTokenizer {
    pub fn new() -> Self {
        let mut pipeline = Pipeline::new()
            .rule(skip(WHITESPACE))
            .rule(skip(NUMBER))
            .rule(Shebang::new());
        for (start, end) in DELIMITERS {
            pipeline.push(Box::new(delimited(start, end)));
        }
        let pipeline = pipeline
            .rule(nested(TAG, tag_pipeline()))
            .rule(capture(PUNCTUATION))
            .rule(capture(WORD))
            .rule(capture(OPERATOR));
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Token stream over `text` with a leading byte-order mark and
    /// surrounding whitespace trimmed, so a shebang preceded by blank lines
    /// is still recognized.
    pub fn scan<'a>(&'a self, text: &'a str) -> Tokens<'a, 'a> {
        self.pipeline.scan(text.trim_start_matches('\u{feff}').trim())
    }
}

impl Default for SourceTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for SourceTokenizer {
    fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Token> + 'a {
        self.scan(text)
    }
}

/// Inside of a markup tag: `<a href="x" class=nav>` → `<a>`, `href=`, `class=`, `nav`.
fn tag_pipeline() -> Pipeline {
    Pipeline::new()
        .rule(skip(WHITESPACE))
        .rule(capture(r"</?[^\s>]+").with_suffix(">"))
        .rule(nested(r"\w+=\S+", attribute_pipeline()))
        .rule(capture(r"\w+"))
}

/// A single `name=value` attribute. Quoted values are dropped.
fn attribute_pipeline() -> Pipeline {
    Pipeline::new()
        .rule(capture(r"\w+="))
        .rule(delimited(r"'", r"[^\\]?'"))
        .rule(delimited(r#"""#, r#"[^\\]?""#))
        .rule(capture(r"\w+"))
}

fn skip(pattern: &str) -> Skip {
    Skip::new(pattern).expect("valid regex")
}

fn capture(pattern: &str) -> Capture {
    Capture::new(pattern).expect("valid regex")
}

fn delimited(start: &str, end: &str) -> Delimited {
    Delimited::new(start, end).expect("valid regex")
}

fn nested(pattern: &str, pipeline: Pipeline) -> Nested {
    Nested::new(pattern, pipeline).expect("valid regex")
}
