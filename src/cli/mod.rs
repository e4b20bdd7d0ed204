//! CLI command definitions and handlers

mod classify;
mod train;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use polyglot::{Model, Settings};

/// Polyglot - language and commit-kind classifier
///
/// Trains Naive-Bayes models from labeled sample directories and uses them
/// to label source files and commit messages. Everything runs locally.
#[derive(Parser, Debug)]
#[command(name = "polyglot")]
#[command(
    version,
    about = "Detect source-file languages and commit-message kinds with a trainable Naive-Bayes classifier",
    after_help = "\
Examples:
  polyglot train --kind language --samples samples/ --out language.json
  polyglot detect src/main.rs scripts/build --model language.json
  polyglot commit \"Bump version 1.2.3\" --model commit.json
  polyglot shares --kind language src/*.py --model language.json"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file (overrides ./polyglot.toml and the user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which tokenizer/model pair a command works with
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Source-file languages
    Language,
    /// Commit-message kinds
    Commit,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Language => "language",
            Kind::Commit => "commit",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a model from a directory of labeled samples (<DIR>/<label>/<file>)
    Train {
        /// Model kind
        #[arg(long, value_enum)]
        kind: Kind,

        /// Sample corpus directory
        #[arg(long)]
        samples: PathBuf,

        /// Output model file
        #[arg(long, short = 'o')]
        out: PathBuf,

        /// Count samples on a single thread
        #[arg(long)]
        serial: bool,
    },

    /// Detect the language of source files (prints path<TAB>label)
    Detect {
        /// Files to classify
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Language model (default: from config)
        #[arg(long, short = 'm')]
        model: Option<PathBuf>,
    },

    /// Classify commit messages (prints one label per message)
    Commit {
        /// Commit messages
        #[arg(required = true)]
        messages: Vec<String>,

        /// Commit model (default: from config)
        #[arg(long, short = 'm')]
        model: Option<PathBuf>,
    },

    /// Print every label with its score for a piece of text, best first
    Rank {
        /// Model kind
        #[arg(long, value_enum)]
        kind: Kind,

        /// Model file (default: from config)
        #[arg(long, short = 'm')]
        model: Option<PathBuf>,

        /// Text to score
        text: String,
    },

    /// Print the token stream of a file
    Tokens {
        /// Tokenizer kind
        #[arg(long, value_enum)]
        kind: Kind,

        /// File to tokenize
        file: PathBuf,
    },

    /// Print the label distribution over many inputs as JSON
    ///
    /// For --kind language every file is one input. For --kind commit every
    /// non-empty line of every file is one commit message.
    Shares {
        /// Model kind
        #[arg(long, value_enum)]
        kind: Kind,

        /// Model file (default: from config)
        #[arg(long, short = 'm')]
        model: Option<PathBuf>,

        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Train {
            kind,
            samples,
            out,
            serial,
        } => train::run(kind, &samples, &out, serial),

        Commands::Detect { files, model } => {
            let model = load_model(&settings, Kind::Language, model.as_deref())?;
            classify::detect(&settings, model, &files)
        }

        Commands::Commit { messages, model } => {
            let model = load_model(&settings, Kind::Commit, model.as_deref())?;
            classify::commit(&settings, model, &messages)
        }

        Commands::Rank { kind, model, text } => {
            let model = load_model(&settings, kind, model.as_deref())?;
            classify::rank(&settings, kind, model, &text)
        }

        Commands::Tokens { kind, file } => classify::tokens(&settings, kind, &file),

        Commands::Shares { kind, model, files } => {
            let model = load_model(&settings, kind, model.as_deref())?;
            classify::shares(&settings, kind, model, &files)
        }
    }
}

/// Load the model given on the command line, or the configured one.
fn load_model(settings: &Settings, kind: Kind, explicit: Option<&Path>) -> Result<Model> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => match kind {
            Kind::Language => settings.language_model(),
            Kind::Commit => settings.commit_model(),
        },
    }
    .context("No model given and no default model location is available; pass --model")?;
    Model::load(&path).with_context(|| {
        format!(
            "Failed to load model {} (train one with `polyglot train`)",
            path.display()
        )
    })
}
