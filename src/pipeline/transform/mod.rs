//! Document transforms run by the [`Renderer`](super::Renderer).
//!
//! # Modules
//!
//! - `heading_id`: Assigns slug ids to headings without one
//! - `anchor`: Injects `a` links pointing at heading ids
//! - `code`: Runs fenced code blocks through the code pipeline

mod anchor;
mod code;
mod heading_id;

pub use anchor::{AnchorInjector, AnchorOptions, DEFAULT_SENTINEL};
pub use code::{CodeBlocks, PLAIN_CLASS};
pub use heading_id::HeadingIds;
