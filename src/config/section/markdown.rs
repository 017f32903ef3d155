//! `[markdown]` section configuration.
//!
//! ```toml
//! [markdown]
//! tables = true
//! footnotes = true
//! strikethrough = true
//! task_lists = true
//! heading_attributes = true   # `## Intro {#intro}`
//! math = true                 # `$x$` and `$$x$$`
//! frontmatter = true          # drop `---` / `+++` metadata blocks
//!
//! [markdown.heading_ids]
//! enable = true
//! mode = "safe"               # safe | ascii
//! ```
//!
//! Sub-sections: [`AnchorConfig`], [`CodeConfig`].

use serde::{Deserialize, Serialize};

use super::{AnchorConfig, CodeConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    /// Heading attribute syntax (`# Heading {#custom-id .class}`).
    pub heading_attributes: bool,
    /// Inline and display math.
    pub math: bool,
    /// Drop YAML/TOML front matter blocks.
    pub frontmatter: bool,

    pub heading_ids: HeadingIdsConfig,
    pub anchor: AnchorConfig,
    pub code: CodeConfig,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
            math: true,
            frontmatter: true,
            heading_ids: HeadingIdsConfig::default(),
            anchor: AnchorConfig::default(),
            code: CodeConfig::default(),
        }
    }
}

/// Slug generation mode for heading ids.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlugMode {
    /// Keep Unicode letters, drop punctuation (default).
    #[default]
    Safe,
    /// Transliterate Unicode to ASCII first.
    Ascii,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingIdsConfig {
    /// Assign ids to headings that have none.
    pub enable: bool,
    pub mode: SlugMode,
}

impl Default for HeadingIdsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            mode: SlugMode::Safe,
        }
    }
}
