//! Count accumulation for Naive-Bayes training
//!
//! Training is a single counting pass followed by one normalization.
//! Counting is commutative and associative, so partial [`Counts`] built on
//! separate threads can be merged before normalizing.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use super::model::Model;
use crate::tokenize::Token;

/// Raw label and (label, token) counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counts {
    total: usize,
    labels: FxHashMap<String, usize>,
    pairs: FxHashMap<String, FxHashMap<String, usize>>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one sample. Each distinct token is counted once per sample,
    /// so frequencies are "fraction of samples containing the token".
    pub fn observe(&mut self, label: &str, tokens: impl IntoIterator<Item = Token>) {
        self.total += 1;
        *self.labels.entry(label.to_string()).or_default() += 1;

        let distinct: FxHashSet<Token> = tokens.into_iter().collect();
        if distinct.is_empty() {
            return;
        }
        let per_label = self.pairs.entry(label.to_string()).or_default();
        for token in distinct {
            *per_label.entry(token.into_string()).or_default() += 1;
        }
    }

    /// Fold another partial count into this one.
    pub fn merge(mut self, other: Counts) -> Self {
        self.total += other.total;
        for (label, count) in other.labels {
            *self.labels.entry(label).or_default() += count;
        }
        for (label, tokens) in other.pairs {
            let per_label = self.pairs.entry(label).or_default();
            for (token, count) in tokens {
                *per_label.entry(token).or_default() += count;
            }
        }
        self
    }

    /// Number of samples observed.
    pub fn samples(&self) -> usize {
        self.total
    }

    /// Number of distinct labels observed.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Normalize into priors and conditional frequencies.
    pub fn into_model(self) -> Model {
        if self.total == 0 {
            return Model::default();
        }
        let total = self.total as f64;

        let classes: BTreeMap<String, f64> = self
            .labels
            .iter()
            .map(|(label, &count)| (label.clone(), count as f64 / total))
            .collect();

        let mut freq: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for (label, tokens) in self.pairs {
            let samples = self.labels.get(&label).copied().unwrap_or(0);
            if samples == 0 {
                continue;
            }
            let samples = samples as f64;
            let row = tokens
                .into_iter()
                .map(|(token, count)| (token, count as f64 / samples))
                .collect();
            freq.insert(label, row);
        }

        Model::from_parts(classes, freq)
    }
}
