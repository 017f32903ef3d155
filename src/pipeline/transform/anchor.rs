//! Heading anchor links.
//!
//! For every heading with an `id`, builds
//! `<a href="#id" class="...">content</a>` and places it according to
//! [`AnchorBehavior`]:
//!
//! ```text
//! append   <h2>Intro<a>#</a></h2>
//! prepend  <h2><a>#</a>Intro</h2>
//! before   <a>#</a><h2>Intro</h2>
//! after    <h2>Intro</h2><a>#</a>
//! wrap     <h2><a>Intro</a></h2>
//! ```
//!
//! The first class name is the sentinel: a heading that already has a
//! sentinel anchor in place is left alone, so running the pass twice never
//! duplicates anchors.

use smallvec::SmallVec;

use crate::config::{
    AnchorBehavior, AnchorConfig, AnchorContent, ConfigDiagnostics, ConfigError,
};
use crate::dom::{Document, Element, Node, Text, Transform};
use crate::utils::html::is_valid_tag_name;

/// Sentinel class used when no class names are configured.
pub const DEFAULT_SENTINEL: &str = "heading-anchor";

/// Validated injector options.
#[derive(Debug, Clone)]
pub struct AnchorOptions {
    behavior: AnchorBehavior,
    /// Ordered, duplicate-free, never empty.
    class_name: Vec<String>,
    content: AnchorContent,
}

impl AnchorOptions {
    pub fn new(
        behavior: AnchorBehavior,
        class_name: &[String],
        content: AnchorContent,
    ) -> Result<Self, ConfigError> {
        let fields = AnchorConfig::FIELDS;
        let mut diag = ConfigDiagnostics::new();

        let mut classes: Vec<String> = Vec::with_capacity(class_name.len().max(1));
        for name in class_name {
            if let Err(problem) = check_class(name) {
                diag.error(fields.class_name, problem);
            } else if !classes.contains(name) {
                classes.push(name.clone());
            }
        }
        if classes.is_empty() && !diag.has_errors() {
            classes.push(DEFAULT_SENTINEL.to_string());
        }

        if let AnchorContent::Element { tag, class, .. } = &content {
            if !is_valid_tag_name(tag) {
                diag.error_with_hint(
                    fields.content,
                    format!("'{tag}' is not a valid element name"),
                    "use a plain tag such as `span`",
                );
            }
            for name in class {
                if let Err(problem) = check_class(name) {
                    diag.error(fields.content, problem);
                }
            }
        }

        diag.into_result().map_err(ConfigError::Diagnostics)?;
        Ok(Self {
            behavior,
            class_name: classes,
            content,
        })
    }

    pub fn from_config(config: &AnchorConfig) -> Result<Self, ConfigError> {
        Self::new(config.behavior, &config.class_name, config.content.clone())
    }

    pub const fn behavior(&self) -> AnchorBehavior {
        self.behavior
    }

    pub fn class_name(&self) -> &[String] {
        &self.class_name
    }

    /// The class that marks anchors this pass created.
    pub fn sentinel(&self) -> &str {
        self.class_name.first().map_or(DEFAULT_SENTINEL, String::as_str)
    }
}

fn check_class(name: &str) -> Result<(), String> {
    if name.is_empty() {
        Err("class names must not be empty".to_string())
    } else if name.chars().any(char::is_whitespace) {
        Err(format!("class name '{name}' contains whitespace"))
    } else {
        Ok(())
    }
}

/// Heading Anchor Injector.
pub struct AnchorInjector {
    options: AnchorOptions,
}

impl AnchorInjector {
    pub const fn new(options: AnchorOptions) -> Self {
        Self { options }
    }

    pub const fn options(&self) -> &AnchorOptions {
        &self.options
    }

    fn is_sentinel(&self, node: &Node) -> bool {
        node.as_element()
            .is_some_and(|e| e.tag == "a" && e.has_class(self.options.sentinel()))
    }

    fn content_nodes(&self) -> SmallVec<[Node; 4]> {
        let node = match &self.options.content {
            AnchorContent::Text(text) => Node::text(text.as_str()),
            AnchorContent::Html { html } => Node::Text(Text::raw(html.as_str())),
            AnchorContent::Element { tag, class, text } => {
                let mut elem = Element::new(tag.as_str());
                if !class.is_empty() {
                    elem.set_attr("class", class.clone());
                }
                if !text.is_empty() {
                    elem.push(Node::text(text.as_str()));
                }
                Node::element(elem)
            }
        };
        SmallVec::from_iter([node])
    }

    fn anchor(&self, id: &str, children: SmallVec<[Node; 4]>) -> Element {
        let mut a = Element::new("a")
            .attr("href", format!("#{id}"))
            .attr("class", self.options.class_name.clone());
        a.children = children;
        a
    }

    /// Walk `parent`'s children, placing anchors around or inside headings.
    /// Headings are not descended into.
    fn process_children(&self, parent: &mut Element) {
        let children = std::mem::take(&mut parent.children);
        let mut out: SmallVec<[Node; 4]> = SmallVec::with_capacity(children.len());
        let mut iter = children.into_iter().peekable();

        while let Some(node) = iter.next() {
            let mut elem = match node {
                Node::Element(elem) => elem,
                text => {
                    out.push(text);
                    continue;
                }
            };

            if elem.heading_level().is_none() {
                self.process_children(&mut elem);
                out.push(Node::Element(elem));
                continue;
            }

            let Some(id) = elem.get_attr("id").map(str::to_string) else {
                out.push(Node::Element(elem));
                continue;
            };

            match self.options.behavior {
                AnchorBehavior::Before => {
                    if !out.last().is_some_and(|n| self.is_sentinel(n)) {
                        out.push(Node::element(self.anchor(&id, self.content_nodes())));
                    }
                    out.push(Node::Element(elem));
                }
                AnchorBehavior::After => {
                    out.push(Node::Element(elem));
                    if !iter.peek().is_some_and(|n| self.is_sentinel(n)) {
                        out.push(Node::element(self.anchor(&id, self.content_nodes())));
                    }
                }
                AnchorBehavior::Append | AnchorBehavior::Prepend | AnchorBehavior::Wrap => {
                    self.inject_into(&mut elem, &id);
                    out.push(Node::Element(elem));
                }
            }
        }

        parent.children = out;
    }

    fn inject_into(&self, heading: &mut Element, id: &str) {
        if heading.children.iter().any(|n| self.is_sentinel(n)) {
            return;
        }
        match self.options.behavior {
            AnchorBehavior::Append => {
                let anchor = self.anchor(id, self.content_nodes());
                heading.push_elem(anchor);
            }
            AnchorBehavior::Prepend => {
                let anchor = self.anchor(id, self.content_nodes());
                heading.children.insert(0, Node::element(anchor));
            }
            AnchorBehavior::Wrap => {
                let inner = std::mem::take(&mut heading.children);
                heading.push_elem(self.anchor(id, inner));
            }
            AnchorBehavior::Before | AnchorBehavior::After => {}
        }
    }
}

impl Transform for AnchorInjector {
    fn transform(&self, mut doc: Document) -> Document {
        self.process_children(&mut doc.root);
        doc
    }
}
