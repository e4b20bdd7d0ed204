//! Naive-Bayes text classifier
//!
//! A [`Classifier`] pairs a [`Tokenizer`] with a trained [`Model`]. The
//! engine itself knows nothing about languages or commit messages: each
//! domain only supplies its tokenizer.
//!
//! Scoring is done in negative log space so long token sequences cannot
//! underflow:
//!
//! ```text
//! score(label) = -ln(prior[label]) + Σ -ln(freq[label][token] or floor)
//! ```
//!
//! The label with the lowest score wins. Ties go to the label that sorts
//! first.

pub mod model;
pub mod train;

pub use model::{Model, ModelError, ModelResult};
pub use train::Counts;

use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;

use crate::samples::{load_samples, CorpusError, Sample};
use crate::tokenize::{Token, Tokenizer};

/// Label returned when the model has no classes.
pub const UNKNOWN: &str = "UNKNOWN";

/// Probability used for (label, token) pairs never seen in training.
pub const DEFAULT_FLOOR: f64 = 1e-7;

/// One label with its negative log-likelihood score (lower is better).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score<'a> {
    pub label: &'a str,
    pub score: f64,
}

/// Tokenizer plus trained model.
///
/// Immutable once built, so one instance can serve classification calls
/// from many threads.
#[derive(Debug, Clone)]
pub struct Classifier<T> {
    tokenizer: T,
    model: Model,
    floor: f64,
}

/// Count `samples` on one thread.
pub fn count<'s, T: Tokenizer>(
    tokenizer: &T,
    samples: impl IntoIterator<Item = &'s Sample>,
) -> Counts {
    let mut counts = Counts::new();
    for sample in samples {
        counts.observe(&sample.label, tokenizer.tokenize(&sample.text));
    }
    counts
}

/// Count `samples` on the rayon pool, merging per-thread partial counts.
pub fn count_parallel<T: Tokenizer>(tokenizer: &T, samples: &[Sample]) -> Counts {
    samples
        .par_iter()
        .fold(Counts::new, |mut counts, sample| {
            counts.observe(&sample.label, tokenizer.tokenize(&sample.text));
            counts
        })
        .reduce(Counts::new, Counts::merge)
}

impl<T: Tokenizer> Classifier<T> {
    pub fn new(tokenizer: T, model: Model) -> Self {
        Self {
            tokenizer,
            model,
            floor: DEFAULT_FLOOR,
        }
    }

    /// Override the probability used for unseen pairs.
    ///
    /// The floor must lie in `(0, 1]`. Values above 1 are clamped to 1;
    /// NaN, zero and negative values fall back to [`DEFAULT_FLOOR`].
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = if floor.is_nan() || floor <= 0.0 {
            tracing::warn!("Invalid floor {floor}, using {DEFAULT_FLOOR}");
            DEFAULT_FLOOR
        } else {
            floor.min(1.0)
        };
        self
    }

    /// Train on `samples` serially.
    pub fn train<'s>(tokenizer: T, samples: impl IntoIterator<Item = &'s Sample>) -> Self {
        let counts = count(&tokenizer, samples);
        Self::from_counts(tokenizer, counts)
    }

    /// Train on `samples` in parallel. Produces the same model as [`train`].
    ///
    /// [`train`]: Classifier::train
    pub fn train_parallel(tokenizer: T, samples: &[Sample]) -> Self {
        let counts = count_parallel(&tokenizer, samples);
        Self::from_counts(tokenizer, counts)
    }

    /// Train from a corpus directory laid out as `<dir>/<label>/<file>`.
    pub fn from_samples(tokenizer: T, dir: &Path) -> Result<Self, CorpusError> {
        let samples = load_samples(dir)?;
        Ok(Self::train_parallel(tokenizer, &samples))
    }

    fn from_counts(tokenizer: T, counts: Counts) -> Self {
        tracing::info!(
            "Trained on {} samples across {} labels",
            counts.samples(),
            counts.label_count()
        );
        Self::new(tokenizer, counts.into_model())
    }

    /// Best label for `text`, or [`UNKNOWN`] if the model is empty.
    pub fn classify(&self, text: &str) -> &str {
        let tokens: Vec<Token> = self.tokenizer.tokenize(text).collect();
        self.scores(&tokens)
            .into_iter()
            .min_by(|a, b| a.score.total_cmp(&b.score))
            .map_or(UNKNOWN, |best| best.label)
    }

    /// Every label with its score, best first. Equal scores are ordered
    /// by label.
    pub fn rank(&self, text: &str) -> Vec<Score<'_>> {
        let tokens: Vec<Token> = self.tokenizer.tokenize(text).collect();
        let mut scores = self.scores(&tokens);
        scores.sort_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| a.label.cmp(b.label))
        });
        scores
    }

    /// Classify many texts in parallel, preserving input order.
    pub fn classify_batch<S>(&self, texts: &[S]) -> Vec<&str>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.classify(text.as_ref()))
            .collect()
    }

    /// Fraction of `texts` assigned to each label, rounded to two decimals.
    pub fn label_shares<S>(&self, texts: &[S]) -> BTreeMap<String, f64>
    where
        S: AsRef<str> + Sync,
    {
        shares(self.classify_batch(texts))
    }

    /// Score of every label, in label order. `classify` relies on that
    /// order for tie-breaking.
    fn scores(&self, tokens: &[Token]) -> Vec<Score<'_>> {
        self.model
            .priors()
            .map(|(label, prior)| {
                let row = self.model.row(label);
                let likelihood: f64 = tokens
                    .iter()
                    .map(|token| {
                        let p = row
                            .and_then(|row| row.get(token.as_str()))
                            .copied()
                            .unwrap_or(self.floor);
                        -p.ln()
                    })
                    .sum();
                Score {
                    label,
                    score: -prior.ln() + likelihood,
                }
            })
            .collect()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn into_model(self) -> Model {
        self.model
    }
}

/// Label distribution over a list of classification results.
pub fn shares<'a>(labels: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0usize;
    for label in labels {
        *counts.entry(label.to_string()).or_default() += 1;
        total += 1;
    }
    counts
        .into_iter()
        .map(|(label, n)| {
            let share = n as f64 / total as f64;
            (label, (share * 100.0).round() / 100.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::{Pipeline, SourceTokenizer};
    use crate::tokenize::rules::Capture;

    fn words() -> Pipeline {
        Pipeline::new().rule(Capture::new(r"\w+").unwrap())
    }

    #[test]
    fn test_empty_model_is_unknown() {
        let classifier = Classifier::new(words(), Model::default());
        assert_eq!(classifier.classify("anything at all"), UNKNOWN);
        assert_eq!(classifier.classify(""), UNKNOWN);
        assert!(classifier.rank("x").is_empty());
    }

    #[test]
    fn test_classify_scenario() {
        let samples = vec![
            Sample::new("import os", "python"),
            Sample::new(r#"require("fs")"#, "js"),
        ];
        let classifier = Classifier::train(SourceTokenizer::new(), &samples);
        assert_eq!(classifier.classify("import sys"), "python");
        assert_eq!(classifier.classify(r#"require("path")"#), "js");
    }

    #[test]
    fn test_ties_go_to_first_label() {
        let samples = vec![Sample::new("x", "b"), Sample::new("x", "a")];
        let classifier = Classifier::train(words(), &samples);
        assert_eq!(classifier.classify("x"), "a");
        let ranked = classifier.rank("x");
        assert_eq!(ranked[0].label, "a");
        assert_eq!(ranked[1].label, "b");
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn test_rank_head_matches_classify() {
        let samples = vec![
            Sample::new("fn main let mut", "rust"),
            Sample::new("def self import", "python"),
            Sample::new("func package import", "go"),
        ];
        let classifier = Classifier::train(words(), &samples);
        for text in ["let mut x", "def f(self)", "package main", "unseen words"] {
            let ranked = classifier.rank(text);
            assert_eq!(ranked.len(), 3);
            assert_eq!(ranked[0].label, classifier.classify(text));
            assert!(ranked.windows(2).all(|w| w[0].score <= w[1].score));
        }
    }

    #[test]
    fn test_floor_changes_scores() {
        let samples = vec![Sample::new("a", "x"), Sample::new("b", "y")];
        let default = Classifier::train(words(), &samples);
        let custom = Classifier::train(words(), &samples).with_floor(0.5);
        assert_eq!(custom.floor(), 0.5);
        let d = default.rank("zzz")[0].score;
        let c = custom.rank("zzz")[0].score;
        assert!(c < d);
    }

    #[test]
    fn test_floor_kept_in_range() {
        let samples = vec![Sample::new("a", "x"), Sample::new("b", "y")];
        for bad in [f64::NAN, 0.0, -0.5, f64::NEG_INFINITY] {
            let classifier = Classifier::train(words(), &samples).with_floor(bad);
            assert_eq!(classifier.floor(), DEFAULT_FLOOR);
            assert_eq!(classifier.classify("b"), "y");
            assert!(classifier.rank("zzz").iter().all(|s| s.score.is_finite()));
        }
        let high = Classifier::train(words(), &samples).with_floor(f64::INFINITY);
        assert_eq!(high.floor(), 1.0);
        assert!(high.rank("zzz").iter().all(|s| s.score.is_finite()));
    }

    #[test]
    fn test_parallel_training_matches_serial() {
        let samples: Vec<Sample> = (0..200)
            .map(|i| {
                let label = ["alpha", "beta", "gamma"][i % 3];
                Sample::new(format!("w{} w{} common", i % 7, i % 11), label)
            })
            .collect();
        let serial = Classifier::train(words(), &samples);
        let parallel = Classifier::train_parallel(words(), &samples);
        assert_eq!(serial.model(), parallel.model());
    }

    #[test]
    fn test_batch_and_shares() {
        let samples = vec![Sample::new("cat", "animal"), Sample::new("car", "vehicle")];
        let classifier = Classifier::train(words(), &samples);
        let texts = ["cat", "car", "cat"];
        assert_eq!(
            classifier.classify_batch(&texts),
            vec!["animal", "vehicle", "animal"]
        );
        let shares = classifier.label_shares(&texts);
        assert_eq!(shares.get("animal"), Some(&0.67));
        assert_eq!(shares.get("vehicle"), Some(&0.33));
    }

    #[test]
    fn test_shares_of_nothing() {
        assert!(shares(Vec::<&str>::new()).is_empty());
    }
}
