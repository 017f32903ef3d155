//! `[markdown.code]` section configuration.
//!
//! ```toml
//! [markdown.code]
//! enable = true
//! highlight = true
//! # Applied in exactly this order.
//! transformers = [
//!     "notation-diff",
//!     "notation-highlight",
//!     "update-style",
//!     "title",
//!     "language",
//!     "copy-button",
//! ]
//!
//! [markdown.code.themes]
//! light = "InspiredGitHub"
//! dark = "base16-ocean.dark"
//! dir = "themes"              # optional folder of .tmTheme files
//!
//! [markdown.code.style]       # custom properties written by update-style
//! light = "--code-light"
//! dark = "--code-dark"
//! light_bg = "--code-light-bg"
//! dark_bg = "--code-dark-bg"
//!
//! [markdown.code.language]
//! fallback = "text"           # badge label for blocks without a language
//!
//! [markdown.code.copy]
//! timeout = 2000              # ms the "copied" state stays visible
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::config::FieldPath;

/// Code-block transformer names, as written in `transformers`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TransformerKind {
    NotationDiff,
    NotationHighlight,
    UpdateStyle,
    Title,
    Language,
    CopyButton,
}

impl TransformerKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotationDiff => "notation-diff",
            Self::NotationHighlight => "notation-highlight",
            Self::UpdateStyle => "update-style",
            Self::Title => "title",
            Self::Language => "language",
            Self::CopyButton => "copy-button",
        }
    }
}

impl fmt::Display for TransformerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    /// Process fenced code blocks at all.
    pub enable: bool,
    /// Run the syntax highlighter (off: plain tokens, transformers still run).
    pub highlight: bool,
    pub transformers: Vec<TransformerKind>,
    pub themes: ThemesConfig,
    pub style: StyleVarsConfig,
    pub language: LanguageConfig,
    pub copy: CopyConfig,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            enable: true,
            highlight: true,
            transformers: vec![
                TransformerKind::NotationDiff,
                TransformerKind::NotationHighlight,
                TransformerKind::UpdateStyle,
                TransformerKind::Title,
                TransformerKind::Language,
                TransformerKind::CopyButton,
            ],
            themes: ThemesConfig::default(),
            style: StyleVarsConfig::default(),
            language: LanguageConfig::default(),
            copy: CopyConfig::default(),
        }
    }
}

pub struct CodeFields {
    pub transformers: FieldPath,
}

impl CodeConfig {
    pub const FIELDS: CodeFields = CodeFields {
        transformers: FieldPath::new("markdown.code.transformers"),
    };
}

/// Light/dark highlighting themes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemesConfig {
    pub light: String,
    pub dark: String,
    /// Extra `.tmTheme` directory (relative to the config file).
    pub dir: Option<PathBuf>,
}

impl Default for ThemesConfig {
    fn default() -> Self {
        Self {
            light: "InspiredGitHub".to_string(),
            dark: "base16-ocean.dark".to_string(),
            dir: None,
        }
    }
}

pub struct ThemesFields {
    pub light: FieldPath,
    pub dark: FieldPath,
    pub dir: FieldPath,
}

impl ThemesConfig {
    pub const FIELDS: ThemesFields = ThemesFields {
        light: FieldPath::new("markdown.code.themes.light"),
        dark: FieldPath::new("markdown.code.themes.dark"),
        dir: FieldPath::new("markdown.code.themes.dir"),
    };
}

/// CSS custom property names the style normalizer writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleVarsConfig {
    pub light: String,
    pub dark: String,
    pub light_bg: String,
    pub dark_bg: String,
}

impl Default for StyleVarsConfig {
    fn default() -> Self {
        Self {
            light: "--code-light".to_string(),
            dark: "--code-dark".to_string(),
            light_bg: "--code-light-bg".to_string(),
            dark_bg: "--code-dark-bg".to_string(),
        }
    }
}

pub struct StyleVarsFields {
    pub light: FieldPath,
    pub dark: FieldPath,
    pub light_bg: FieldPath,
    pub dark_bg: FieldPath,
}

impl StyleVarsConfig {
    pub const FIELDS: StyleVarsFields = StyleVarsFields {
        light: FieldPath::new("markdown.code.style.light"),
        dark: FieldPath::new("markdown.code.style.dark"),
        light_bg: FieldPath::new("markdown.code.style.light_bg"),
        dark_bg: FieldPath::new("markdown.code.style.dark_bg"),
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Badge label when a block declares no language.
    pub fallback: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            fallback: "text".to_string(),
        }
    }
}

pub struct LanguageFields {
    pub fallback: FieldPath,
}

impl LanguageConfig {
    pub const FIELDS: LanguageFields = LanguageFields {
        fallback: FieldPath::new("markdown.code.language.fallback"),
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyConfig {
    /// Milliseconds the confirmation state stays visible. Must be positive.
    pub timeout: i64,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self { timeout: 2000 }
    }
}

pub struct CopyFields {
    pub timeout: FieldPath,
}

impl CopyConfig {
    pub const FIELDS: CopyFields = CopyFields {
        timeout: FieldPath::new("markdown.code.copy.timeout"),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlumeConfig, test_parse_config};

    #[test]
    fn test_defaults_match_site_setup() {
        let config = test_parse_config("");
        let code = &config.markdown.code;
        assert!(code.enable && code.highlight);
        assert_eq!(
            code.transformers,
            vec![
                TransformerKind::NotationDiff,
                TransformerKind::NotationHighlight,
                TransformerKind::UpdateStyle,
                TransformerKind::Title,
                TransformerKind::Language,
                TransformerKind::CopyButton,
            ]
        );
        assert_eq!(code.copy.timeout, 2000);
        assert_eq!(code.language.fallback, "text");
    }

    #[test]
    fn test_transformer_order_is_kept() {
        let config = test_parse_config(
            "[markdown.code]\ntransformers = [\"copy-button\", \"title\", \"notation-diff\"]",
        );
        assert_eq!(
            config.markdown.code.transformers,
            vec![
                TransformerKind::CopyButton,
                TransformerKind::Title,
                TransformerKind::NotationDiff,
            ]
        );
    }

    #[test]
    fn test_unknown_transformer_rejected() {
        let result = PlumeConfig::from_str("[markdown.code]\ntransformers = [\"line-numbers\"]");
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_timeout_parses() {
        // Parsed as-is; rejected later when the pipeline is built.
        let config = test_parse_config("[markdown.code.copy]\ntimeout = -5");
        assert_eq!(config.markdown.code.copy.timeout, -5);
    }

    #[test]
    fn test_kind_names_roundtrip_through_display() {
        for kind in CodeConfig::default().transformers {
            let config = test_parse_config(&format!("[markdown.code]\ntransformers = [\"{kind}\"]"));
            assert_eq!(config.markdown.code.transformers, vec![kind]);
        }
    }
}
