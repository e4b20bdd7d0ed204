//! Polyglot - rule-driven lexical scanning and Naive-Bayes classification
//!
//! Detects the language of source files and the kind of commit messages.
//! Text is tokenized by an ordered list of pattern rules, then scored
//! against per-label token frequencies learned from a labeled corpus.
//!
//! ```rust,ignore
//! use polyglot::{Classifier, SourceTokenizer};
//!
//! let classifier = Classifier::from_samples(SourceTokenizer::new(), "samples/".as_ref())?;
//! classifier.into_model().save("language.json".as_ref())?;
//! ```

pub mod classifier;
pub mod config;
pub mod detect;
pub mod samples;
pub mod tokenize;

pub use classifier::{Classifier, Model, ModelError, Score, DEFAULT_FLOOR, UNKNOWN};
pub use config::Settings;
pub use detect::LanguageDetector;
pub use samples::{load_samples, CorpusError, Sample};
pub use tokenize::{CommitTokenizer, Pipeline, Rule, SourceTokenizer, Token, Tokenizer};

/// Classifier over source-file contents
pub type LanguageClassifier = Classifier<SourceTokenizer>;

/// Classifier over commit messages
pub type CommitClassifier = Classifier<CommitTokenizer>;
