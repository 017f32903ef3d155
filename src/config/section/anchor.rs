//! `[markdown.anchor]` section configuration.
//!
//! ```toml
//! [markdown.anchor]
//! enable = true
//! behavior = "append"        # append | prepend | before | after | wrap
//! class_name = ["anchor"]
//! content = "#"              # text, { html = "<svg>..</svg>" },
//!                            # or { tag = "span", class = ["icon"], text = "#" }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{ConfigError, FieldPath};

/// Where the anchor goes relative to its heading.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnchorBehavior {
    /// Last child of the heading (default).
    #[default]
    Append,
    /// First child of the heading.
    Prepend,
    /// Sibling right before the heading.
    Before,
    /// Sibling right after the heading.
    After,
    /// Heading content moves inside the anchor.
    Wrap,
}

impl AnchorBehavior {
    pub const ALL: [Self; 5] = [
        Self::Append,
        Self::Prepend,
        Self::Before,
        Self::After,
        Self::Wrap,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Before => "before",
            Self::After => "after",
            Self::Wrap => "wrap",
        }
    }
}

impl fmt::Display for AnchorBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnchorBehavior {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| {
                ConfigError::invalid(
                    AnchorConfig::FIELDS.behavior,
                    format!("unknown behavior '{s}', expected one of append, prepend, before, after, wrap"),
                )
            })
    }
}

/// Anchor body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AnchorContent {
    /// Literal text.
    Text(String),
    /// Pre-rendered markup (e.g. an inline SVG icon).
    Html { html: String },
    /// A single inline element.
    Element {
        tag: String,
        #[serde(default)]
        class: Vec<String>,
        #[serde(default)]
        text: String,
    },
}

impl Default for AnchorContent {
    fn default() -> Self {
        Self::Text("#".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub enable: bool,
    pub behavior: AnchorBehavior,
    /// Classes on the anchor; the first one marks anchors already injected.
    pub class_name: Vec<String>,
    pub content: AnchorContent,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            enable: true,
            behavior: AnchorBehavior::Append,
            class_name: vec!["anchor".to_string()],
            content: AnchorContent::default(),
        }
    }
}

pub struct AnchorFields {
    pub behavior: FieldPath,
    pub class_name: FieldPath,
    pub content: FieldPath,
}

impl AnchorConfig {
    pub const FIELDS: AnchorFields = AnchorFields {
        behavior: FieldPath::new("markdown.anchor.behavior"),
        class_name: FieldPath::new("markdown.anchor.class_name"),
        content: FieldPath::new("markdown.anchor.content"),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlumeConfig, test_parse_config};

    #[test]
    fn test_defaults_match_site_setup() {
        let config = test_parse_config("");
        let anchor = &config.markdown.anchor;
        assert!(anchor.enable);
        assert_eq!(anchor.behavior, AnchorBehavior::Append);
        assert_eq!(anchor.class_name, vec!["anchor"]);
        assert_eq!(anchor.content, AnchorContent::Text("#".into()));
    }

    #[test]
    fn test_behavior_parsing() {
        for behavior in AnchorBehavior::ALL {
            let config = test_parse_config(&format!("[markdown.anchor]\nbehavior = \"{behavior}\""));
            assert_eq!(config.markdown.anchor.behavior, behavior);
            assert_eq!(behavior.as_str().parse::<AnchorBehavior>().unwrap(), behavior);
        }
    }

    #[test]
    fn test_unknown_behavior_rejected() {
        assert!(PlumeConfig::from_str("[markdown.anchor]\nbehavior = \"inside\"").is_err());
        let err = "inside".parse::<AnchorBehavior>().unwrap_err();
        assert!(err.to_string().contains("markdown.anchor.behavior"));
    }

    #[test]
    fn test_content_forms() {
        let config = test_parse_config("[markdown.anchor]\ncontent = { html = \"<svg></svg>\" }");
        assert_eq!(
            config.markdown.anchor.content,
            AnchorContent::Html { html: "<svg></svg>".into() }
        );

        let config = test_parse_config(
            "[markdown.anchor]\ncontent = { tag = \"span\", class = [\"icon\"], text = \"§\" }",
        );
        assert_eq!(
            config.markdown.anchor.content,
            AnchorContent::Element {
                tag: "span".into(),
                class: vec!["icon".into()],
                text: "§".into(),
            }
        );
    }
}
