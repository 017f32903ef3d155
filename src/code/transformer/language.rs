//! Language badge.

use crate::code::CodeBlock;
use crate::dom::Element;

pub struct LanguageBadge {
    /// Label for blocks without a language. Empty: no badge for them.
    fallback: String,
}

impl LanguageBadge {
    pub fn new(fallback: &str) -> Self {
        Self {
            fallback: fallback.trim().to_string(),
        }
    }

    pub fn decorate(&self, block: &CodeBlock, root: &mut Element) {
        let label = block.lang.as_deref().unwrap_or(&self.fallback);
        if label.is_empty() {
            return;
        }
        root.push_elem(
            Element::new("span")
                .attr("class", vec!["language".to_string()])
                .text(label),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge(root: &Element) -> Option<String> {
        root.child_elements()
            .find(|e| e.has_class("language"))
            .map(Element::text_content)
    }

    #[test]
    fn test_declared_language() {
        let block = CodeBlock::new("x", Some("python"), "");
        let mut root = Element::new("pre");
        LanguageBadge::new("text").decorate(&block, &mut root);
        assert_eq!(badge(&root).as_deref(), Some("python"));
    }

    #[test]
    fn test_fallback_label() {
        let block = CodeBlock::new("x", None, "");
        let mut root = Element::new("pre");
        LanguageBadge::new("text").decorate(&block, &mut root);
        assert_eq!(badge(&root).as_deref(), Some("text"));
    }

    #[test]
    fn test_empty_fallback_omits_badge() {
        let block = CodeBlock::new("x", None, "");
        let mut root = Element::new("pre");
        LanguageBadge::new("").decorate(&block, &mut root);
        assert_eq!(badge(&root), None);
    }
}
