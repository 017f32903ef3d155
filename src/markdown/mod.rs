//! Markdown source to document tree.

mod convert;

pub use convert::{MarkdownOptions, from_markdown};
