//! Tree node types.

use serde::Serialize;
use smallvec::SmallVec;

// =============================================================================
// Attributes
// =============================================================================

/// Attribute value: a plain string or a token list (`class`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Str(String),
    List(Vec<String>),
}

impl AttrValue {
    /// Value as a single string (token lists are space-joined).
    pub fn to_value_string(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::List(items) => items.join(" "),
        }
    }

    /// Borrow the string form, if this is a plain string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::List(_) => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Ordered attribute map.
///
/// Insertion order is preserved so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Attrs(Vec<(String, AttrValue)>);

impl Attrs {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Get a plain string attribute.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_str)
    }

    /// Set (or replace in place) an attribute.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        let index = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Class tokens, whether stored as a list or a space-separated string.
    pub fn classes(&self) -> Vec<&str> {
        match self.get("class") {
            Some(AttrValue::List(items)) => items.iter().map(String::as_str).collect(),
            Some(AttrValue::Str(s)) => s.split_whitespace().collect(),
            None => Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    /// Add a class token (no-op if already present). Normalizes to a list.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let mut list: Vec<String> = self.classes().into_iter().map(str::to_string).collect();
        list.push(class.to_string());
        self.set("class", AttrValue::List(list));
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.set(&k.into(), v);
        }
        attrs
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Attrs {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs.into_iter().collect()
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// Text node. `raw` text is emitted verbatim (pre-rendered markup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    pub content: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub raw: bool,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            raw: false,
        }
    }

    pub fn raw(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            raw: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Element(Box<Element>),
    Text(Text),
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(Text::new(content))
    }

    pub fn element(element: Element) -> Self {
        Self::Element(Box::new(element))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(elem) => Some(elem),
            Self::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(elem) => Some(elem),
            Self::Text(_) => None,
        }
    }
}

/// Element node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: String,
    #[serde(skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
    #[serde(skip_serializing_if = "SmallVec::is_empty")]
    pub children: SmallVec<[Node; 4]>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attrs::new(),
            children: SmallVec::new(),
        }
    }

    pub fn with_attrs(tag: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            tag: tag.into(),
            attrs,
            children: SmallVec::new(),
        }
    }

    /// Builder: set an attribute.
    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.set(name, value);
        self
    }

    /// Builder: append a child.
    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    /// Builder: append a text child.
    pub fn text(self, content: impl Into<String>) -> Self {
        self.child(Node::text(content))
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn push_elem(&mut self, element: Element) {
        self.children.push(Node::element(element));
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get_str(name)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.attrs.set(name, value);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attrs.has_class(class)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(&text.content),
                Node::Element(elem) => elem.collect_text(out),
            }
        }
    }

    /// Element children only.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Depth-first pre-order visit of this element and all descendants.
    pub fn walk<F: FnMut(&Element)>(&self, f: &mut F) {
        f(self);
        for child in self.child_elements() {
            child.walk(f);
        }
    }

    /// Mutable depth-first pre-order visit.
    pub fn walk_mut<F: FnMut(&mut Element)>(&mut self, f: &mut F) {
        f(self);
        for child in &mut self.children {
            if let Node::Element(elem) = child {
                elem.walk_mut(f);
            }
        }
    }

    /// Heading level (1-6) if this is an `h1`..`h6` element.
    pub fn heading_level(&self) -> Option<u8> {
        heading_level(&self.tag)
    }
}

/// Check if a tag name is a heading (`h1`..`h6`).
#[inline]
pub fn is_heading(tag: &str) -> bool {
    heading_level(tag).is_some()
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag.as_bytes() {
        [b'h', d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

// =============================================================================
// Document
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub const fn new(root: Element) -> Self {
        Self { root }
    }

    /// Collect references to all elements matching `pred`, in document order.
    pub fn find_all<P: Fn(&Element) -> bool>(&self, pred: P) -> Vec<&Element> {
        fn visit<'a, P: Fn(&Element) -> bool>(elem: &'a Element, pred: &P, out: &mut Vec<&'a Element>) {
            if pred(elem) {
                out.push(elem);
            }
            for child in elem.child_elements() {
                visit(child, pred, out);
            }
        }

        let mut out = Vec::new();
        visit(&self.root, &pred, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attrs_set_replaces_in_place() {
        let mut attrs = Attrs::from([("id", "a"), ("href", "#x")]);
        attrs.set("id", "b");
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "href"]);
        assert_eq!(attrs.get_str("id"), Some("b"));
    }

    #[test]
    fn test_classes_from_string_and_list() {
        let attrs = Attrs::from([("class", "line  added")]);
        assert_eq!(attrs.classes(), vec!["line", "added"]);

        let mut attrs = Attrs::new();
        attrs.set("class", vec!["anchor".to_string()]);
        assert!(attrs.has_class("anchor"));
    }

    #[test]
    fn test_add_class_is_idempotent() {
        let mut attrs = Attrs::from([("class", "line")]);
        attrs.add_class("added");
        attrs.add_class("added");
        assert_eq!(attrs.classes(), vec!["line", "added"]);
    }

    #[test]
    fn test_text_content_is_recursive() {
        let elem = Element::new("h2")
            .text("Hello ")
            .child(Node::element(Element::new("em").text("world")));
        assert_eq!(elem.text_content(), "Hello world");
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(Element::new("h1").heading_level(), Some(1));
        assert_eq!(Element::new("h6").heading_level(), Some(6));
        assert_eq!(Element::new("h7").heading_level(), None);
        assert_eq!(Element::new("header").heading_level(), None);
        assert!(!is_heading("hr"));
    }

    #[test]
    fn test_find_all_document_order() {
        let root = Element::new("article")
            .child(Node::element(Element::new("h1").text("a")))
            .child(Node::element(
                Element::new("section").child(Node::element(Element::new("h2").text("b"))),
            ));
        let doc = Document::new(root);
        let headings = doc.find_all(|e| e.heading_level().is_some());
        let texts: Vec<_> = headings.iter().map(|h| h.text_content()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }
}
