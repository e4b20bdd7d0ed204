//! Classification commands: detect, commit, rank, tokens, shares

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use polyglot::classifier::shares as label_shares;
use polyglot::detect::read_prefix;
use polyglot::{
    Classifier, CommitTokenizer, LanguageDetector, Model, Settings, SourceTokenizer, Token,
    Tokenizer,
};

use super::Kind;

fn language_detector(settings: &Settings, model: Model) -> LanguageDetector {
    let classifier = Classifier::new(SourceTokenizer::new(), model).with_floor(settings.floor());
    LanguageDetector::new(classifier).with_max_read_size(settings.max_read_size())
}

fn commit_classifier(settings: &Settings, model: Model) -> Classifier<CommitTokenizer> {
    Classifier::new(CommitTokenizer::new(), model).with_floor(settings.floor())
}

/// Print `path<TAB>label` for every file. Unreadable files are reported
/// and make the command fail after the rest are printed.
pub fn detect(settings: &Settings, model: Model, files: &[PathBuf]) -> Result<()> {
    let detector = language_detector(settings, model);
    let results: Vec<(&PathBuf, Result<&str>)> = files
        .par_iter()
        .map(|path| {
            let extension = path.extension().and_then(|e| e.to_str());
            (path, detector.detect_file_with_hint(path, extension))
        })
        .collect();

    let mut failed = 0usize;
    for (path, result) in results {
        match result {
            Ok(label) => println!("{}\t{}", path.display(), label),
            Err(err) => {
                tracing::warn!("{:#}", err);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("Failed to classify {} of {} files", failed, files.len());
    }
    Ok(())
}

pub fn commit(settings: &Settings, model: Model, messages: &[String]) -> Result<()> {
    let classifier = commit_classifier(settings, model);
    for label in classifier.classify_batch(messages) {
        println!("{}", label);
    }
    Ok(())
}

pub fn rank(settings: &Settings, kind: Kind, model: Model, text: &str) -> Result<()> {
    match kind {
        Kind::Language => print_rank(language_detector(settings, model).classifier(), text),
        Kind::Commit => print_rank(&commit_classifier(settings, model), text),
    }
    Ok(())
}

fn print_rank<T: Tokenizer>(classifier: &Classifier<T>, text: &str) {
    for score in classifier.rank(text) {
        println!("{}\t{:.4}", score.label, score.score);
    }
}

pub fn tokens(settings: &Settings, kind: Kind, file: &Path) -> Result<()> {
    let text = match kind {
        Kind::Language => read_prefix(file, settings.max_read_size())?
            .with_context(|| format!("{} is not UTF-8 text", file.display()))?,
        Kind::Commit => std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?,
    };
    let tokens: Vec<Token> = match kind {
        Kind::Language => SourceTokenizer::new().tokenize(&text).collect(),
        Kind::Commit => CommitTokenizer::new().tokenize(&text).collect(),
    };
    for token in tokens {
        println!("{}", token);
    }
    Ok(())
}

pub fn shares(settings: &Settings, kind: Kind, model: Model, files: &[PathBuf]) -> Result<()> {
    let distribution = match kind {
        Kind::Language => {
            let detector = language_detector(settings, model);
            let labels = files
                .par_iter()
                .map(|path| detector.detect_file(path))
                .collect::<Result<Vec<&str>>>()?;
            label_shares(labels)
        }
        Kind::Commit => {
            let mut messages = Vec::new();
            for file in files {
                let content = std::fs::read_to_string(file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                messages.extend(
                    content
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(str::to_string),
                );
            }
            tracing::info!("Classifying {} commit messages", messages.len());
            commit_classifier(settings, model).label_shares(&messages)
        }
    };
    println!("{}", serde_json::to_string_pretty(&distribution)?);
    Ok(())
}
