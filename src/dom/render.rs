//! HTML serialization.

use super::{AttrValue, Document, Element, Node};
use crate::utils::html::{escape, escape_attr, is_block_element, is_raw_text_element, is_void_element};

/// HTML output options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    /// Skip the newline after block-level closing tags.
    pub minify: bool,
}

impl RenderConfig {
    pub const fn new(minify: bool) -> Self {
        Self { minify }
    }
}

/// Render the document as an HTML fragment (children of the root).
pub fn render_document(doc: &Document, config: &RenderConfig) -> String {
    let mut out = String::with_capacity(4096);
    let mut writer = HtmlWriter {
        out: &mut out,
        config,
        pre_depth: 0,
    };
    writer.write_children(&doc.root);
    out
}

/// Render a single element including its own tag.
pub fn render_element(elem: &Element, config: &RenderConfig) -> String {
    let mut out = String::new();
    let mut writer = HtmlWriter {
        out: &mut out,
        config,
        pre_depth: 0,
    };
    writer.write_element(elem);
    out
}

struct HtmlWriter<'a> {
    out: &'a mut String,
    config: &'a RenderConfig,
    /// Inside `<pre>`: whitespace is significant, no formatting newlines.
    pre_depth: usize,
}

impl HtmlWriter<'_> {
    fn write_children(&mut self, elem: &Element) {
        let raw = is_raw_text_element(&elem.tag);
        for child in &elem.children {
            match child {
                Node::Element(e) => self.write_element(e),
                Node::Text(text) if text.raw || raw => self.out.push_str(&text.content),
                Node::Text(text) => self.out.push_str(&escape(&text.content)),
            }
        }
    }

    fn write_element(&mut self, elem: &Element) {
        self.out.push('<');
        self.out.push_str(&elem.tag);
        for (name, value) in elem.attrs.iter() {
            self.write_attr(name, value);
        }
        self.out.push('>');

        if is_void_element(&elem.tag) {
            self.newline_after(&elem.tag);
            return;
        }

        let is_pre = elem.tag == "pre";
        if is_pre {
            self.pre_depth += 1;
        }
        self.write_children(elem);
        if is_pre {
            self.pre_depth -= 1;
        }

        self.out.push_str("</");
        self.out.push_str(&elem.tag);
        self.out.push('>');
        self.newline_after(&elem.tag);
    }

    fn write_attr(&mut self, name: &str, value: &AttrValue) {
        self.out.push(' ');
        self.out.push_str(name);
        let value = value.to_value_string();
        // Boolean attributes (`disabled`, `checked`) render bare.
        if value.is_empty() && name != "class" && name != "alt" {
            return;
        }
        self.out.push_str("=\"");
        self.out.push_str(&escape_attr(&value));
        self.out.push('"');
    }

    fn newline_after(&mut self, tag: &str) {
        if !self.config.minify && self.pre_depth == 0 && is_block_element(tag) {
            self.out.push('\n');
        }
    }
}
