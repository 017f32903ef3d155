//! Fenced code blocks: per-block context, highlighting and transformers.
//!
//! A block flows through three stages:
//!
//! ```text
//! pre > code  ──► CodeBlock ──preprocess──► highlight ──decorate──► Element
//!                  (lines, lang, meta)       (read-only from here on)
//! ```
//!
//! [`CodePipeline::process`] drives the stages and returns an error instead
//! of a partial result; the caller falls back to the plain block.

pub mod highlight;
mod meta;
pub mod transformer;

pub use highlight::Highlighter;
pub use meta::{Meta, MetaError, parse_ranges};
pub use transformer::{CodePipeline, Transformer};

use thiserror::Error;

/// Why a single block could not be processed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("malformed meta string: {0}")]
    Meta(#[from] MetaError),

    #[error("highlighting failed on line {line}: {message}")]
    Highlight { line: usize, message: String },
}

/// Per-line annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineClass {
    Added,
    Removed,
    Highlighted,
}

impl LineClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Highlighted => "highlighted",
        }
    }
}

/// One source line and its annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub classes: Vec<LineClass>,
    /// 1-based line number in the fence, kept when earlier lines are removed.
    pub source_line: usize,
}

impl Line {
    pub fn new(text: impl Into<String>, source_line: usize) -> Self {
        Self {
            text: text.into(),
            classes: Vec::new(),
            source_line,
        }
    }

    pub fn add_class(&mut self, class: LineClass) {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
    }

    pub fn has_class(&self, class: LineClass) -> bool {
        self.classes.contains(&class)
    }
}

/// Code Block Context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub lines: Vec<Line>,
    /// Declared language; `None` means plain text.
    pub lang: Option<String>,
    pub meta: Meta,
    /// Set when the meta string could not be parsed; `meta` is then empty.
    pub meta_error: Option<MetaError>,
}

impl CodeBlock {
    /// Build the context from a block's source text, language and meta string.
    ///
    /// One trailing newline (always present in fenced blocks) is dropped
    /// before splitting into lines.
    pub fn new(source: &str, lang: Option<&str>, meta: &str) -> Self {
        let source = source.strip_suffix('\n').unwrap_or(source);
        let lines = if source.is_empty() {
            Vec::new()
        } else {
            source
                .split('\n')
                .enumerate()
                .map(|(i, l)| Line::new(l.strip_suffix('\r').unwrap_or(l), i + 1))
                .collect()
        };

        let (meta, meta_error) = match Meta::parse(meta) {
            Ok(meta) => (meta, None),
            Err(err) => (Meta::default(), Some(err)),
        };

        Self {
            lines,
            lang: lang.map(str::trim).filter(|l| !l.is_empty()).map(str::to_string),
            meta,
            meta_error,
        }
    }

    /// Parsed meta, or the parse error for transformers that depend on it.
    pub fn require_meta(&self) -> Result<&Meta, BlockError> {
        match &self.meta_error {
            Some(err) => Err(BlockError::Meta(err.clone())),
            None => Ok(&self.meta),
        }
    }

    /// Line texts joined with `\n`: what the reader gets when copying.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn any_line(&self, class: LineClass) -> bool {
        self.lines.iter().any(|l| l.has_class(class))
    }
}
