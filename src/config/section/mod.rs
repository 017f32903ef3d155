//! Configuration section definitions.
//!
//! | Section                     | Purpose                                     |
//! |-----------------------------|---------------------------------------------|
//! | `[build]`                   | Content/output directories, minification    |
//! | `[markdown]`                | Parser extensions                           |
//! | `[markdown.heading_ids]`    | Heading id assignment                       |
//! | `[markdown.anchor]`         | Heading anchor links                        |
//! | `[markdown.code]`           | Highlighting and code-block transformers    |

mod anchor;
mod build;
mod code;
mod markdown;

pub use anchor::{AnchorBehavior, AnchorConfig, AnchorContent};
pub use build::BuildConfig;
pub use code::{CodeConfig, CopyConfig, LanguageConfig, StyleVarsConfig, ThemesConfig, TransformerKind};
pub use markdown::{HeadingIdsConfig, MarkdownConfig, SlugMode};
