//! Plume - a markdown rendering pipeline for static sites.
//!
//! Markdown is converted into a small owned [`dom`] tree, then rewritten by
//! a fixed chain of passes: heading ids, heading anchors, and fenced code
//! blocks (syntax highlighting plus a configurable transformer list).
//!
//! ```ignore
//! let renderer = Renderer::from_config(&config.markdown)?;
//! let html = renderer.render_html("## Intro {#intro}", &RenderConfig::default());
//! ```

pub mod cli;
pub mod code;
pub mod config;
pub mod dom;
pub mod logger;
pub mod markdown;
pub mod pipeline;
pub mod utils;

pub use pipeline::Renderer;
