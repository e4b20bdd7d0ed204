//! Pipeline executor
//!
//! A [`Pipeline`] is an ordered, fixed list of rules. [`Pipeline::scan`]
//! returns a lazy [`Tokens`] stream that walks the text once:
//!
//! 1. Try every rule at the current position, in declared order.
//! 2. The first rule that matches and moves the position forward wins.
//! 3. If none does, step over one character (forward progress).
//!
//! Nested emissions (e.g. the inside of a markup tag) are not expanded
//! recursively. The stream keeps an explicit stack of frames, one per
//! pipeline being scanned, and always reads from the innermost one. This
//! flattens nested sequences depth-first in encounter order with bounded
//! native stack usage.

use std::fmt;
use std::iter::FusedIterator;
use std::ops::Range;

use super::{Token, Tokenizer};

/// One pattern-match step tried at the current scan position.
///
/// Returning `None` means the rule does not apply here. That is never an
/// error: the executor simply tries the next rule.
pub trait Rule: Send + Sync + fmt::Debug {
    fn apply(&self, text: &str, pos: usize) -> Option<Step<'_>>;
}

/// What a matching rule produced and where scanning resumes.
#[derive(Debug)]
pub struct Step<'p> {
    pub emission: Emission<'p>,
    /// Byte offset where the scan continues
    pub end: usize,
}

/// Output of a single rule match.
#[derive(Debug)]
pub enum Emission<'p> {
    /// Emit one token
    Token(Token),
    /// Consume without emitting (whitespace, comments, literals)
    Skip,
    /// Scan `span` with another pipeline before resuming
    Nested {
        pipeline: &'p Pipeline,
        span: Range<usize>,
    },
}

impl<'p> Step<'p> {
    pub fn token(token: impl Into<Token>, end: usize) -> Self {
        Self {
            emission: Emission::Token(token.into()),
            end,
        }
    }

    pub fn skip(end: usize) -> Self {
        Self {
            emission: Emission::Skip,
            end,
        }
    }

    /// Hand `span` to `pipeline`, resuming the outer scan after it.
    pub fn nested(pipeline: &'p Pipeline, span: Range<usize>) -> Self {
        let end = span.end;
        Self {
            emission: Emission::Nested { pipeline, span },
            end,
        }
    }

    /// A step is only accepted if it moves forward and stays on character
    /// boundaries inside `text`.
    fn is_progress(&self, text: &str, pos: usize) -> bool {
        if self.end <= pos || self.end > text.len() || !text.is_char_boundary(self.end) {
            return false;
        }
        match &self.emission {
            Emission::Nested { span, .. } => {
                span.start >= pos
                    && span.start <= span.end
                    && span.end <= self.end
                    && text.is_char_boundary(span.start)
                    && text.is_char_boundary(span.end)
            }
            _ => true,
        }
    }
}

/// Ordered list of rules defining one scanning configuration.
///
/// Order matters: specific rules (shebang, tags, comment and quote
/// delimiters) must come before generic word/operator capture.
#[derive(Debug, Default)]
pub struct Pipeline {
    rules: Vec<Box<dyn Rule>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule (builder style).
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn push(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Lazily tokenize `text`. Calling this again restarts from the top.
    pub fn scan<'p, 't>(&'p self, text: &'t str) -> Tokens<'p, 't> {
        Tokens {
            frames: vec![Frame {
                pipeline: self,
                text,
                pos: 0,
            }],
            iterations: 0,
            skipped: 0,
        }
    }

    /// First rule that makes progress at `pos`.
    fn step(&self, text: &str, pos: usize) -> Option<Step<'_>> {
        self.rules
            .iter()
            .filter_map(|rule| rule.apply(text, pos))
            .find(|step| step.is_progress(text, pos))
    }
}

impl Tokenizer for Pipeline {
    fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Token> + 'a {
        self.scan(text)
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame<'p, 't> {
    pipeline: &'p Pipeline,
    text: &'t str,
    pos: usize,
}

impl Frame<'_, '_> {
    fn is_done(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Step over exactly one character.
    fn advance_char(&mut self) {
        let width = self.text[self.pos..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.pos += width;
    }
}

/// Lazy token stream produced by [`Pipeline::scan`].
///
/// Cloning a stream forks it: both copies continue independently from the
/// same position.
#[derive(Debug, Clone)]
pub struct Tokens<'p, 't> {
    frames: Vec<Frame<'p, 't>>,
    iterations: usize,
    skipped: usize,
}

impl Tokens<'_, '_> {
    /// Executor iterations spent on the top-level text so far.
    ///
    /// Every iteration moves the position forward by at least one
    /// character, so this never exceeds the character count of the input.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Characters stepped over because no rule matched (any depth).
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Current nesting depth (0 once the stream is exhausted).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Iterator for Tokens<'_, '_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let top_level = self.frames.len() == 1;
            let frame = self.frames.last_mut()?;
            if frame.is_done() {
                self.frames.pop();
                continue;
            }
            if top_level {
                self.iterations += 1;
            }

            let pipeline = frame.pipeline;
            let text = frame.text;
            let Some(step) = pipeline.step(text, frame.pos) else {
                frame.advance_char();
                self.skipped += 1;
                continue;
            };

            frame.pos = step.end;
            match step.emission {
                Emission::Token(token) => return Some(token),
                Emission::Skip => {}
                Emission::Nested { pipeline, span } => self.frames.push(Frame {
                    pipeline,
                    text: &text[span],
                    pos: 0,
                }),
            }
        }
    }
}

impl FusedIterator for Tokens<'_, '_> {}
