//! Rule-driven lexical scanner
//!
//! Text is turned into a stream of [`Token`]s by a [`Pipeline`]: an ordered
//! list of [`Rule`]s tried at the current position. The first rule that
//! matches decides what happens (emit a token, skip, or hand a span to a
//! nested pipeline). When no rule matches, the scanner steps over one
//! character and tries again, so any input is tokenized without errors.
//!
//! Two domain pipelines are provided:
//! - [`SourceTokenizer`] for source-file contents (comments and string
//!   literals skipped, shebang and markup tags decomposed)
//! - [`CommitTokenizer`] for commit messages (versions, docs and tests
//!   collapsed into synthetic markers)

mod commit;
mod pipeline;
pub mod rules;
mod source;

pub use commit::CommitTokenizer;
pub use pipeline::{Emission, Pipeline, Rule, Step, Tokens};
pub use source::SourceTokenizer;

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Anything that turns text into a token sequence.
///
/// The classifier is generic over this trait, so each domain only has to
/// provide its own rule list.
pub trait Tokenizer: Send + Sync {
    fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Token> + 'a;
}

/// An immutable string atom emitted by the scanner.
///
/// Either literal matched text (`import`, `{`) or a synthetic marker standing
/// in for a whole class of values (`SHEBANG#!python`, `#!VERSION`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(String);

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Synthetic markers start with `#!` (or `SHEBANG#!`).
    pub fn is_marker(&self) -> bool {
        self.0.starts_with("#!") || self.0.starts_with("SHEBANG#!")
    }
}

impl Deref for Token {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl From<String> for Token {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
