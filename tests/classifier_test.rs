//! Library-level behavior of the tokenizers and the classifier
//!
//! Covers the end-to-end properties that span modules:
//! - Tokenizing always terminates and never fails
//! - Training, classification and tie-breaking are deterministic
//! - Persisted models classify exactly like the in-memory ones

use polyglot::tokenize::rules::Capture;
use polyglot::{
    Classifier, CommitTokenizer, Model, ModelError, Pipeline, Sample, SourceTokenizer, Token,
    Tokenizer, UNKNOWN,
};

fn tokens<T: Tokenizer>(tokenizer: &T, text: &str) -> Vec<String> {
    tokenizer.tokenize(text).map(Token::into_string).collect()
}

fn language_samples() -> Vec<Sample> {
    vec![
        Sample::new("import os\nimport sys\ndef main():\n    print(os.name)\n", "python"),
        Sample::new("from collections import defaultdict\nclass A(object):\n    pass\n", "python"),
        Sample::new("const fs = require(\"fs\");\nfunction main() { return fs; }\n", "javascript"),
        Sample::new("let x = require('path');\nmodule.exports = { x };\n", "javascript"),
        Sample::new("fn main() {\n    let mut v = Vec::new();\n    v.push(1);\n}\n", "rust"),
        Sample::new("pub struct A;\nimpl A {\n    pub fn new() -> Self { A }\n}\n", "rust"),
        Sample::new("#!/bin/bash\necho hello\nfor f in *; do echo $f; done\n", "shell"),
    ]
}

const PROBES: &[&str] = &[
    "import json",
    "const path = require('path');",
    "fn helper(x: u32) -> u32 { x }",
    "#!/usr/bin/env bash\nls",
    "",
    "completely unrelated words",
    "<div class=\"x\">hi</div>",
];

// ============================================================================
// Tokenizer
// ============================================================================

#[test]
fn test_triple_quoted_block_skipped() {
    assert_eq!(
        tokens(&SourceTokenizer::new(), "\"\"\"doc\"\"\"\nimport os\n"),
        vec!["import", "os"]
    );
}

#[test]
fn test_shebang_names_interpreter() {
    assert_eq!(
        tokens(&SourceTokenizer::new(), "#!/usr/bin/env python3"),
        vec!["SHEBANG#!python"]
    );
}

#[test]
fn test_unterminated_quote_keeps_scanning() {
    let toks = tokens(&SourceTokenizer::new(), "print(\"abc");
    assert_eq!(toks, vec!["print", "(", "abc"]);
}

#[test]
fn test_tag_attributes() {
    assert_eq!(
        tokens(&SourceTokenizer::new(), r#"<a href="x.html" class=nav>"#),
        vec!["<a>", "href=", "class=", "nav"]
    );
}

#[test]
fn test_commit_markers() {
    assert_eq!(
        tokens(&CommitTokenizer::new(), "Bump version 1.2.3 and update README"),
        vec!["bump", "version", "#!VERSION", "and", "update", "#!DOCS"]
    );
}

#[test]
fn test_forward_progress_on_assorted_input() {
    let inputs = [
        "",
        " ",
        "\"",
        "'''",
        "/* never closed",
        "<<<<>>>>",
        "<a b='c",
        "ünïcödé ✓ 漢字 🦀",
        "\0\u{1}\u{7f}",
        "#!",
        "#!/usr/bin/env",
        "x = \"a\\\"b\" + 'c",
        "{- haskell -} <!-- html --> `tick",
    ];
    let source = SourceTokenizer::new();
    let commit = CommitTokenizer::new();
    for text in inputs {
        let mut stream = source.scan(text);
        stream.by_ref().for_each(drop);
        assert!(
            stream.iterations() <= text.chars().count(),
            "source scan of {:?} took {} iterations",
            text,
            stream.iterations()
        );

        let mut stream = commit.scan(text);
        stream.by_ref().for_each(drop);
        assert!(stream.iterations() <= text.chars().count());
    }
}

#[test]
fn test_scan_restarts_from_the_top() {
    let tokenizer = SourceTokenizer::new();
    let text = "fn main() { println!(\"hi\"); }";
    assert_eq!(tokens(&tokenizer, text), tokens(&tokenizer, text));
}

// ============================================================================
// Classifier
// ============================================================================

#[test]
fn test_two_label_scenario() {
    let samples = vec![
        Sample::new("import os", "python"),
        Sample::new("require(\"fs\")", "js"),
    ];
    let classifier = Classifier::train(SourceTokenizer::new(), &samples);
    assert_eq!(classifier.classify("import sys"), "python");
}

#[test]
fn test_untrained_classifier_is_unknown() {
    let classifier = Classifier::train(SourceTokenizer::new(), &Vec::<Sample>::new());
    assert!(classifier.model().is_empty());
    for probe in PROBES {
        assert_eq!(classifier.classify(probe), UNKNOWN);
    }
}

#[test]
fn test_priors_sum_to_one() {
    let classifier = Classifier::train(SourceTokenizer::new(), &language_samples());
    let sum: f64 = classifier.model().priors().map(|(_, p)| p).sum();
    assert!((sum - 1.0).abs() < 1e-9);
    assert_eq!(classifier.model().class_count(), 4);
}

#[test]
fn test_classification_is_deterministic() {
    let samples = language_samples();
    let first = Classifier::train(SourceTokenizer::new(), &samples);
    let second = Classifier::train_parallel(SourceTokenizer::new(), &samples);
    for probe in PROBES {
        assert_eq!(first.classify(probe), first.classify(probe));
        assert_eq!(first.classify(probe), second.classify(probe));
    }
}

#[test]
fn test_expected_languages() {
    let classifier = Classifier::train(SourceTokenizer::new(), &language_samples());
    assert_eq!(classifier.classify("import json"), "python");
    assert_eq!(classifier.classify("const path = require('path');"), "javascript");
    assert_eq!(classifier.classify("#!/bin/bash\necho hi"), "shell");
}

#[test]
fn test_parallel_equals_serial() {
    let samples: Vec<Sample> = language_samples()
        .into_iter()
        .cycle()
        .take(70)
        .collect();
    let serial = Classifier::train(SourceTokenizer::new(), &samples);
    let parallel = Classifier::train_parallel(SourceTokenizer::new(), &samples);
    assert_eq!(serial.model(), parallel.model());
}

#[test]
fn test_identical_labels_tie_break_by_name() {
    let words = || Pipeline::new().rule(Capture::new(r"\w+").unwrap());
    let samples = vec![
        Sample::new("same text", "zeta"),
        Sample::new("same text", "alpha"),
        Sample::new("same text", "mid"),
    ];
    let classifier = Classifier::train(words(), &samples);
    assert_eq!(classifier.classify("same text"), "alpha");
    assert_eq!(classifier.classify("other"), "alpha");
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_round_trip_classifies_identically() {
    let trained = Classifier::train(SourceTokenizer::new(), &language_samples());
    let decoded = Model::decode(&trained.model().encode().unwrap()).unwrap();
    let restored = Classifier::new(SourceTokenizer::new(), decoded);
    for probe in PROBES {
        assert_eq!(trained.classify(probe), restored.classify(probe), "probe {:?}", probe);
    }
    assert_eq!(trained.model(), restored.model());
}

#[test]
fn test_round_trip_exact_with_uneven_counts() {
    let words = Pipeline::new().rule(Capture::new(r"\w+").unwrap());
    let mut samples = Vec::new();
    for label in 1..=59 {
        for i in 0..label {
            let text = format!("w{} w{} shared", i % 7, (i * label) % 13);
            samples.push(Sample::new(text, format!("label{label}")));
        }
    }
    let trained = Classifier::train(words, &samples);
    let model = trained.model();

    let encoded = model.encode().unwrap();
    let decoded = Model::decode(&encoded).unwrap();
    assert_eq!(&decoded, model);
    assert_eq!(decoded.encode().unwrap(), encoded);
}

#[test]
fn test_save_and_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("language.json");
    let trained = Classifier::train(SourceTokenizer::new(), &language_samples());
    trained.model().save(&path).unwrap();

    let loaded = Model::load(&path).unwrap();
    assert_eq!(&loaded, trained.model());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(json["classes"].is_object());
    let record = &json["freq"][0];
    assert!(record["class"].is_string());
    assert!(record["token"].is_string());
    assert!(record["value"].is_number());
}

#[test]
fn test_malformed_models_rejected() {
    let cases = [
        "",
        "[]",
        r#"{"classes": {}}"#,
        r#"{"freq": []}"#,
        r#"{"classes": {"a": 1.0}, "freq": [{"class": "a", "value": 1.0}]}"#,
        r#"{"classes": {"a": 1.0}, "freq": [{"class": "a", "token": "x", "value": null}]}"#,
        r#"{"classes": {"a": 1.0}, "freq": [], "extra": true}"#,
        r#"{"classes": {"a": "high"}, "freq": []}"#,
        r#"{"classes": {"a": 0.7}, "freq": []}"#,
        r#"{"classes": {"a": 1.0}, "freq": [{"class": "b", "token": "x", "value": 0.5}]}"#,
        r#"{"classes": {"a": 1.0}, "freq": [{"class": "a", "token": "x", "value": -0.5}]}"#,
    ];
    for json in cases {
        assert!(Model::decode(json).is_err(), "accepted {:?}", json);
    }
}

#[test]
fn test_load_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    match Model::load(&path) {
        Err(ModelError::Decode(_)) => {}
        other => panic!("expected decode error, got {:?}", other),
    }
}

// ============================================================================
// Corpus
// ============================================================================

#[test]
fn test_from_samples_directory() {
    let dir = tempfile::tempdir().unwrap();
    for (label, name, text) in [
        ("python", "a.py", "import os\nprint(os.getcwd())"),
        ("python", "b.py", "def f(self):\n    return None"),
        ("rust", "a.rs", "fn main() { let x = 1; }"),
        ("rust", "b.rs", "impl Foo { pub fn bar(&self) {} }"),
    ] {
        let label_dir = dir.path().join(label);
        std::fs::create_dir_all(&label_dir).unwrap();
        std::fs::write(label_dir.join(name), text).unwrap();
    }

    let classifier = Classifier::from_samples(SourceTokenizer::new(), dir.path()).unwrap();
    assert_eq!(classifier.model().prior("python"), Some(0.5));
    assert_eq!(classifier.classify("import sys"), "python");
    assert_eq!(classifier.classify("fn helper() { let y = 2; }"), "rust");
}
