//! Title bar from the `title` meta key.

use crate::code::{BlockError, CodeBlock};
use crate::dom::{Element, Node};

pub struct TitleInjector;

impl TitleInjector {
    /// Insert `div.title` as the first child of the block.
    pub fn decorate(&self, block: &CodeBlock, root: &mut Element) -> Result<(), BlockError> {
        let meta = block.require_meta()?;
        if let Some(title) = meta.get("title") {
            let bar = Element::new("div")
                .attr("class", vec!["title".to_string()])
                .text(title);
            root.children.insert(0, Node::element(bar));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_is_first_child() {
        let block = CodeBlock::new("x", None, r#"title="main.rs""#);
        let mut root = Element::new("div").child(Node::element(Element::new("pre")));
        TitleInjector.decorate(&block, &mut root).unwrap();

        let first = root.child_elements().next().unwrap();
        assert!(first.has_class("title"));
        assert_eq!(first.text_content(), "main.rs");
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_no_title_no_bar() {
        let block = CodeBlock::new("x", None, "{1}");
        let mut root = Element::new("pre");
        TitleInjector.decorate(&block, &mut root).unwrap();
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_malformed_meta_fails() {
        let block = CodeBlock::new("x", None, "title='main.rs");
        let mut root = Element::new("pre");
        assert!(TitleInjector.decorate(&block, &mut root).is_err());
    }
}
