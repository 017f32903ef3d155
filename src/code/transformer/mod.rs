//! Code-block transformers and the per-block pipeline.
//!
//! Transformers run in the configured order, never re-sorted. Each has two
//! hooks:
//!
//! | hook         | runs             | may change                         |
//! |--------------|------------------|------------------------------------|
//! | `preprocess` | before highlight | line text and line classes         |
//! | `decorate`   | after highlight  | the rendered block's structure     |
//!
//! Decorations receive the [`CodeBlock`] by shared reference, so lines are
//! fixed once preprocessing is over.

mod copy;
mod language;
mod notation;
mod style;
mod title;

pub use copy::CopyButton;
pub use language::LanguageBadge;
pub use notation::{NotationDiff, NotationHighlight};
pub use style::{CONTAINER_CLASS, StyleNormalizer};
pub use title::TitleInjector;

use rustc_hash::FxHashSet;

use super::highlight::{Highlighter, render_plain};
use super::{BlockError, CodeBlock};
use crate::config::{CodeConfig, ConfigDiagnostics, ConfigError, TransformerKind};
use crate::dom::{Element, Node};

/// One configured transformer.
pub enum Transformer {
    NotationDiff(NotationDiff),
    NotationHighlight(NotationHighlight),
    StyleNormalizer(StyleNormalizer),
    Title(TitleInjector),
    Language(LanguageBadge),
    CopyButton(CopyButton),
}

impl Transformer {
    /// Build and validate the transformer named by `kind`.
    pub fn from_kind(kind: TransformerKind, config: &CodeConfig) -> Result<Self, ConfigError> {
        Ok(match kind {
            TransformerKind::NotationDiff => Self::NotationDiff(NotationDiff::new()?),
            TransformerKind::NotationHighlight => Self::NotationHighlight(NotationHighlight::new()?),
            TransformerKind::UpdateStyle => Self::StyleNormalizer(StyleNormalizer::new(&config.style)?),
            TransformerKind::Title => Self::Title(TitleInjector),
            TransformerKind::Language => Self::Language(LanguageBadge::new(&config.language.fallback)),
            TransformerKind::CopyButton => Self::CopyButton(CopyButton::new(&config.copy)?),
        })
    }

    pub const fn kind(&self) -> TransformerKind {
        match self {
            Self::NotationDiff(_) => TransformerKind::NotationDiff,
            Self::NotationHighlight(_) => TransformerKind::NotationHighlight,
            Self::StyleNormalizer(_) => TransformerKind::UpdateStyle,
            Self::Title(_) => TransformerKind::Title,
            Self::Language(_) => TransformerKind::Language,
            Self::CopyButton(_) => TransformerKind::CopyButton,
        }
    }

    /// Line annotation, before highlighting.
    pub fn preprocess(&self, block: &mut CodeBlock) -> Result<(), BlockError> {
        match self {
            Self::NotationDiff(t) => t.preprocess(block),
            Self::NotationHighlight(t) => t.preprocess(block)?,
            Self::StyleNormalizer(_) | Self::Title(_) | Self::Language(_) | Self::CopyButton(_) => {}
        }
        Ok(())
    }

    /// Structural decoration of the rendered block.
    pub fn decorate(&self, block: &CodeBlock, root: &mut Element) -> Result<(), BlockError> {
        match self {
            Self::NotationDiff(t) => t.decorate(block, root),
            Self::NotationHighlight(t) => t.decorate(block, root),
            Self::StyleNormalizer(t) => t.decorate(root),
            Self::Title(t) => t.decorate(block, root)?,
            Self::Language(t) => t.decorate(block, root),
            Self::CopyButton(t) => t.decorate(block, root),
        }
        Ok(())
    }
}

/// The `pre` inside a (possibly wrapped) block.
fn find_pre_mut(root: &mut Element) -> Option<&mut Element> {
    if root.tag == "pre" {
        return Some(root);
    }
    root.children
        .iter_mut()
        .filter_map(Node::as_element_mut)
        .find_map(find_pre_mut)
}

/// Highlighter plus ordered transformers, shared by every document.
pub struct CodePipeline {
    highlighter: Option<Highlighter>,
    transformers: Vec<Transformer>,
}

impl CodePipeline {
    /// Validate every `[markdown.code]` option, reporting all problems at once.
    pub fn from_config(config: &CodeConfig) -> Result<Self, ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        let highlighter = if config.highlight {
            diag.absorb(Highlighter::from_config(&config.themes))?
        } else {
            None
        };

        let mut seen = FxHashSet::default();
        let mut transformers = Vec::with_capacity(config.transformers.len());
        for &kind in &config.transformers {
            if !seen.insert(kind) {
                diag.error_with_hint(
                    CodeConfig::FIELDS.transformers,
                    format!("`{kind}` is listed more than once"),
                    "each transformer runs at most once per block",
                );
                continue;
            }
            if let Some(t) = diag.absorb(Transformer::from_kind(kind, config))? {
                transformers.push(t);
            }
        }

        diag.into_result().map_err(ConfigError::Diagnostics)?;
        Ok(Self {
            highlighter,
            transformers,
        })
    }

    pub fn transformers(&self) -> &[Transformer] {
        &self.transformers
    }

    pub const fn highlights(&self) -> bool {
        self.highlighter.is_some()
    }

    /// Run one block through preprocess, highlight and decorate.
    pub fn process(&self, mut block: CodeBlock) -> Result<Element, BlockError> {
        for t in &self.transformers {
            t.preprocess(&mut block)?;
        }

        let block = block;
        let mut root = match &self.highlighter {
            Some(h) => h.render(&block)?,
            None => render_plain(&block),
        };

        for t in &self.transformers {
            t.decorate(&block, &mut root)?;
        }
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::LineClass;
    use crate::config::CopyConfig;

    fn plain_config() -> CodeConfig {
        CodeConfig {
            highlight: false,
            ..CodeConfig::default()
        }
    }

    #[test]
    fn test_order_is_config_order() {
        let config = CodeConfig {
            transformers: vec![TransformerKind::CopyButton, TransformerKind::Title],
            ..plain_config()
        };
        let pipeline = CodePipeline::from_config(&config).unwrap();
        let kinds: Vec<_> = pipeline.transformers().iter().map(Transformer::kind).collect();
        assert_eq!(kinds, vec![TransformerKind::CopyButton, TransformerKind::Title]);
    }

    #[test]
    fn test_duplicate_and_invalid_collected() {
        let config = CodeConfig {
            transformers: vec![
                TransformerKind::Title,
                TransformerKind::Title,
                TransformerKind::CopyButton,
            ],
            copy: CopyConfig { timeout: 0 },
            ..plain_config()
        };
        let Err(ConfigError::Diagnostics(diag)) = CodePipeline::from_config(&config) else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.errors().len(), 2);
    }

    #[test]
    fn test_default_scenario_block() {
        let pipeline = CodePipeline::from_config(&CodeConfig::default()).unwrap();
        assert!(pipeline.highlights());

        let block = CodeBlock::new("+import os\n os.getcwd()\n", Some("python"), r#"title="example.py""#);
        let root = pipeline.process(block).unwrap();

        assert!(root.has_class(CONTAINER_CLASS));
        let children: Vec<&Element> = root.child_elements().collect();
        assert_eq!(children.len(), 4);

        assert!(children[0].has_class("title"));
        assert_eq!(children[0].text_content(), "example.py");

        let pre = children[1];
        assert_eq!(pre.tag, "pre");
        assert!(pre.has_class("has-diff"));
        let lines: Vec<&Element> = pre.child_elements().next().unwrap().child_elements().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].has_class(LineClass::Added.as_str()));
        assert_eq!(lines[0].text_content(), "import os");
        assert_eq!(lines[1].attrs.classes(), vec!["line"]);
        assert_eq!(lines[1].text_content(), "os.getcwd()");

        assert!(children[2].has_class("language"));
        assert_eq!(children[2].text_content(), "python");

        assert_eq!(children[3].tag, "button");
        assert_eq!(children[3].get_attr("data-code"), Some("import os\nos.getcwd()"));
    }

    #[test]
    fn test_styles_rewritten_after_highlight() {
        let pipeline = CodePipeline::from_config(&CodeConfig::default()).unwrap();
        let root = pipeline.process(CodeBlock::new("x = 1", Some("python"), "")).unwrap();
        let mut styles = Vec::new();
        root.walk(&mut |e| styles.extend(e.get_attr("style").map(str::to_string)));
        assert!(!styles.is_empty());
        for style in styles {
            assert!(!style.contains("--plume-dark:"), "{style}");
            assert!(!style.starts_with("color:"), "{style}");
        }
    }

    #[test]
    fn test_malformed_meta_fails_block() {
        let pipeline = CodePipeline::from_config(&plain_config()).unwrap();
        let result = pipeline.process(CodeBlock::new("x", None, "title=\"oops"));
        assert!(matches!(result, Err(BlockError::Meta(_))));
    }

    #[test]
    fn test_no_transformers_only_renders() {
        let config = CodeConfig {
            transformers: Vec::new(),
            ..plain_config()
        };
        let pipeline = CodePipeline::from_config(&config).unwrap();
        let root = pipeline.process(CodeBlock::new("+a", None, "")).unwrap();
        assert_eq!(root.tag, "pre");
        assert_eq!(root.text_content(), "+a");
    }
}
