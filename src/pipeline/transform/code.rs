//! Fenced code blocks in the document.
//!
//! Finds every `pre > code` produced by the markdown converter, runs it
//! through the [`CodePipeline`] and splices the result in place. A block
//! that fails is put back as plain `pre.plume-plain > code`: language class
//! kept, meta dropped.

use crate::code::highlight::PRE_CLASS;
use crate::code::{CodeBlock, CodePipeline};
use crate::debug;
use crate::dom::{Document, Element, Node, Transform};

/// Marks a block that failed and was left plain, so later passes skip it.
pub const PLAIN_CLASS: &str = "plume-plain";

pub struct CodeBlocks {
    pipeline: CodePipeline,
}

/// What the tree records about one fenced block.
struct Source {
    text: String,
    lang: Option<String>,
    meta: String,
}

impl Source {
    /// `pre` whose only element child is `code`, not yet processed.
    fn from_pre(pre: &Element) -> Option<Self> {
        if pre.tag != "pre" || pre.has_class(PRE_CLASS) || pre.has_class(PLAIN_CLASS) {
            return None;
        }
        let stray_text = pre.children.iter().any(|n| match n {
            Node::Text(t) => !t.content.trim().is_empty(),
            Node::Element(_) => false,
        });
        if stray_text {
            return None;
        }
        let mut elements = pre.child_elements();
        let code = elements.next()?;
        if code.tag != "code" || elements.next().is_some() {
            return None;
        }

        let lang = code
            .attrs
            .classes()
            .into_iter()
            .find_map(|c| c.strip_prefix("language-"))
            .map(str::to_string);

        Some(Self {
            text: code.text_content(),
            lang,
            meta: code.get_attr("data-meta").unwrap_or_default().to_string(),
        })
    }

    /// Plain `pre > code` with nothing but the language class.
    fn into_plain(self) -> Element {
        let mut code = Element::new("code");
        if let Some(lang) = &self.lang {
            code.set_attr("class", format!("language-{lang}"));
        }
        code.push(Node::text(self.text));
        Element::new("pre")
            .attr("class", vec![PLAIN_CLASS.to_string()])
            .child(Node::element(code))
    }
}

impl CodeBlocks {
    pub const fn new(pipeline: CodePipeline) -> Self {
        Self { pipeline }
    }

    pub const fn pipeline(&self) -> &CodePipeline {
        &self.pipeline
    }

    fn render(&self, source: Source) -> Element {
        let block = CodeBlock::new(&source.text, source.lang.as_deref(), &source.meta);
        match self.pipeline.process(block) {
            Ok(elem) => elem,
            Err(err) => {
                debug!("code"; "{} block left plain: {}", source.lang.as_deref().unwrap_or("text"), err);
                source.into_plain()
            }
        }
    }

    fn process_children(&self, parent: &mut Element) {
        for child in parent.children.iter_mut() {
            let Node::Element(elem) = child else {
                continue;
            };
            match Source::from_pre(elem) {
                Some(source) => *child = Node::element(self.render(source)),
                None => self.process_children(elem),
            }
        }
    }
}

impl Transform for CodeBlocks {
    fn transform(&self, mut doc: Document) -> Document {
        self.process_children(&mut doc.root);
        doc
    }
}
