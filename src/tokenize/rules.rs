//! Built-in rules
//!
//! All patterns are anchored at the scan position: a rule only matches if
//! its pattern matches starting exactly there. Constructors return
//! `regex::Error` so custom pipelines can be built from user patterns.

use regex::Regex;

use super::pipeline::{Pipeline, Rule, Step};

/// Compile `pattern` so it only matches at the start of the haystack.
fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\A(?:{pattern})"))
}

/// End offset of an anchored match at `pos`.
fn match_end(regex: &Regex, text: &str, pos: usize) -> Option<usize> {
    regex.find(&text[pos..]).map(|m| pos + m.end())
}

/// Emits the matched text as a token.
#[derive(Debug, Clone)]
pub struct Capture {
    pattern: Regex,
    lowercase: bool,
    suffix: Option<&'static str>,
}

impl Capture {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: anchored(pattern)?,
            lowercase: false,
            suffix: None,
        })
    }

    /// Emit the match lower-cased.
    pub fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    /// Append a fixed suffix to every emitted token (`<div` → `<div>`).
    pub fn with_suffix(mut self, suffix: &'static str) -> Self {
        self.suffix = Some(suffix);
        self
    }
}

impl Rule for Capture {
    fn apply(&self, text: &str, pos: usize) -> Option<Step<'_>> {
        let end = match_end(&self.pattern, text, pos)?;
        let matched = &text[pos..end];
        let mut token = if self.lowercase {
            matched.to_lowercase()
        } else {
            matched.to_string()
        };
        if let Some(suffix) = self.suffix {
            token.push_str(suffix);
        }
        Some(Step::token(token, end))
    }
}

/// Consumes the match without emitting anything.
#[derive(Debug, Clone)]
pub struct Skip {
    pattern: Regex,
}

impl Skip {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: anchored(pattern)?,
        })
    }
}

impl Rule for Skip {
    fn apply(&self, text: &str, pos: usize) -> Option<Step<'_>> {
        match_end(&self.pattern, text, pos).map(Step::skip)
    }
}

/// Emits a fixed synthetic token in place of the matched text.
///
/// Used to collapse open-ended value classes (versions, ticket numbers,
/// doc file names) into one vocabulary entry.
#[derive(Debug, Clone)]
pub struct Marker {
    token: &'static str,
    pattern: Regex,
    lookahead: bool,
}

impl Marker {
    pub fn new(token: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            token,
            pattern: anchored(pattern)?,
            lookahead: false,
        })
    }

    /// Match `pattern` only when `lookahead` matches right after it.
    /// The lookahead text is checked but not consumed.
    pub fn followed_by(
        token: &'static str,
        pattern: &str,
        lookahead: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            token,
            pattern: Regex::new(&format!(r"\A({pattern})(?:{lookahead})"))?,
            lookahead: true,
        })
    }
}

impl Rule for Marker {
    fn apply(&self, text: &str, pos: usize) -> Option<Step<'_>> {
        let end = if self.lookahead {
            let caps = self.pattern.captures(&text[pos..])?;
            pos + caps.get(1)?.end()
        } else {
            match_end(&self.pattern, text, pos)?
        };
        Some(Step::token(self.token, end))
    }
}

/// Delimiter skipper for comments and quoted literals.
///
/// Matches `start` at the position, then searches for the first `end`
/// match after it and consumes through that match. Emits nothing. If the
/// end delimiter never shows up the rule does not apply, which lets the
/// executor recover one character at a time.
#[derive(Debug, Clone)]
pub struct Delimited {
    start: Regex,
    end: Regex,
}

impl Delimited {
    pub fn new(start: &str, end: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            start: anchored(start)?,
            end: Regex::new(end)?,
        })
    }
}

impl Rule for Delimited {
    fn apply(&self, text: &str, pos: usize) -> Option<Step<'_>> {
        let open = match_end(&self.start, text, pos)?;
        let close = self.end.find(&text[open..])?;
        Some(Step::skip(open + close.end()))
    }
}

/// Hands the matched span to its own pipeline.
///
/// The inner tokens are emitted in place, before the outer scan resumes
/// after the span.
#[derive(Debug)]
pub struct Nested {
    pattern: Regex,
    pipeline: Pipeline,
}

impl Nested {
    pub fn new(pattern: &str, pipeline: Pipeline) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: anchored(pattern)?,
            pipeline,
        })
    }
}

impl Rule for Nested {
    fn apply(&self, text: &str, pos: usize) -> Option<Step<'_>> {
        let end = match_end(&self.pattern, text, pos)?;
        Some(Step::nested(&self.pipeline, pos..end))
    }
}

/// Interpreter line (`#!/usr/bin/env python3`) at the very start of the text.
///
/// Emits `SHEBANG#!<interpreter>` with the interpreter's path and trailing
/// version stripped, and consumes the rest of the line.
#[derive(Debug, Clone)]
pub struct Shebang {
    pattern: Regex,
}

impl Shebang {
    pub const PREFIX: &'static str = "SHEBANG#!";

    pub fn new() -> Self {
        Self {
            pattern: anchored(r"#!.+").expect("valid regex"),
        }
    }
}

impl Default for Shebang {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for Shebang {
    fn apply(&self, text: &str, pos: usize) -> Option<Step<'_>> {
        if pos != 0 {
            return None;
        }
        let end = match_end(&self.pattern, text, pos)?;
        let name = interpreter(&text[..end])?;
        Some(Step::token(format!("{}{}", Self::PREFIX, name), end))
    }
}

/// Interpreter name from a shebang line, if there is one.
///
/// `env` is looked through: the first argument that is not an option names
/// the interpreter.
pub fn interpreter(line: &str) -> Option<&str> {
    let mut words = line.trim_start_matches("#!").split_whitespace();
    let program = last_segment(words.next()?);
    let name = if program == "env" {
        last_segment(words.find(|word| !word.starts_with('-'))?)
    } else {
        program
    };
    Some(strip_version(name))
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// `python3.11` → `python`, `node` → `node`, `3` → `3`.
fn strip_version(name: &str) -> &str {
    let stripped = name.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    if stripped.is_empty() {
        name
    } else {
        stripped
    }
}
