//! `polyglot train` - build a model from a labeled sample directory

use anyhow::{bail, Context, Result};
use std::path::Path;

use polyglot::{load_samples, Classifier, CommitTokenizer, Model, Sample, SourceTokenizer, Tokenizer};

use super::Kind;

pub fn run(kind: Kind, samples_dir: &Path, out: &Path, serial: bool) -> Result<()> {
    let samples = load_samples(samples_dir)
        .with_context(|| format!("Failed to load samples from {}", samples_dir.display()))?;
    if samples.is_empty() {
        bail!("No samples found under {}", samples_dir.display());
    }

    let model = match kind {
        Kind::Language => fit(SourceTokenizer::new(), &samples, serial),
        Kind::Commit => fit(CommitTokenizer::new(), &samples, serial),
    };

    model
        .save(out)
        .with_context(|| format!("Failed to save model to {}", out.display()))?;

    println!(
        "Trained {} model on {} samples: {} labels, {} records -> {}",
        kind.name(),
        samples.len(),
        model.class_count(),
        model.record_count(),
        out.display()
    );
    Ok(())
}

fn fit<T: Tokenizer>(tokenizer: T, samples: &[Sample], serial: bool) -> Model {
    let classifier = if serial {
        Classifier::train(tokenizer, samples)
    } else {
        Classifier::train_parallel(tokenizer, samples)
    };
    classifier.into_model()
}
