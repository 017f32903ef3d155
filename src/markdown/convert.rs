//! Markdown to document tree conversion using pulldown-cmark.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::config::MarkdownConfig;
use crate::dom::{Attrs, Document, Element, Node, Text};
use crate::utils::html::{is_raw_text_element, unescape};

/// Options for markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
    /// Enable `$inline$` and `$$display$$` math
    pub math: bool,
    /// Recognise (and drop) YAML `---` / TOML `+++` metadata blocks
    pub frontmatter: bool,
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
            math: true,
            frontmatter: true,
        }
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        if self.math {
            opts.insert(Options::ENABLE_MATH);
        }
        if self.frontmatter {
            opts.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
            opts.insert(Options::ENABLE_PLUSES_DELIMITED_METADATA_BLOCKS);
        }
        opts
    }
}

impl From<&MarkdownConfig> for MarkdownOptions {
    fn from(config: &MarkdownConfig) -> Self {
        Self {
            tables: config.tables,
            footnotes: config.footnotes,
            strikethrough: config.strikethrough,
            task_lists: config.task_lists,
            heading_attributes: config.heading_attributes,
            math: config.math,
            frontmatter: config.frontmatter,
        }
    }
}

/// Markdown to tree converter
struct MarkdownConverter {
    /// Stack of open elements (for nested structures)
    stack: Vec<Element>,
    /// Root children (collected when stack is empty)
    root_children: Vec<Node>,
    /// Buffered source of the HTML block being read, parsed as a whole at its end.
    html_block: Option<String>,
    /// Inside a front matter block; its text is discarded.
    in_metadata: bool,
    /// Column alignments of the current table.
    alignments: Vec<Alignment>,
    /// Cell index within the current row.
    cell: usize,
    in_table_head: bool,
}

impl MarkdownConverter {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            root_children: Vec::new(),
            html_block: None,
            in_metadata: false,
            alignments: Vec::new(),
            cell: 0,
            in_table_head: false,
        }
    }

    /// Convert markdown string to a Document
    fn convert(mut self, markdown: &str, options: &MarkdownOptions) -> Document {
        let parser = Parser::new_ext(markdown, options.to_pulldown_options());

        for event in parser {
            self.handle_event(event);
        }

        // Unbalanced input cannot come out of pulldown-cmark, but close anything left.
        while let Some(elem) = self.stack.pop() {
            self.add_node(Node::element(elem));
        }

        Document::new(self.build_root())
    }

    /// Handle a single pulldown-cmark event
    fn handle_event(&mut self, event: Event) {
        if self.in_metadata {
            if let Event::End(TagEnd::MetadataBlock(_)) = event {
                self.in_metadata = false;
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.add_text(text.as_ref()),
            Event::Code(code) => self.add_inline_code(code.as_ref()),
            Event::Html(html) => match &mut self.html_block {
                Some(buffer) => buffer.push_str(&html),
                None => self.add_raw_html(html.as_ref()),
            },
            // Inline tags arrive one at a time (`<kbd>`, text, `</kbd>`), so they
            // are passed through untouched.
            Event::InlineHtml(html) => self.add_node(Node::Text(Text::raw(html.to_string()))),
            Event::SoftBreak => self.add_text("\n"),
            Event::HardBreak => self.add_element("br", Attrs::new()),
            Event::Rule => self.add_element("hr", Attrs::new()),
            Event::FootnoteReference(name) => self.add_footnote_ref(name.as_ref()),
            Event::TaskListMarker(checked) => self.add_task_marker(checked),
            Event::InlineMath(math) => self.add_math(math.as_ref(), false),
            Event::DisplayMath(math) => self.add_math(math.as_ref(), true),
        }
    }

    /// Start a new tag (push onto stack)
    fn start_tag(&mut self, tag: Tag) {
        match &tag {
            Tag::MetadataBlock(_) => {
                self.in_metadata = true;
                return;
            }
            Tag::HtmlBlock => {
                self.html_block = Some(String::new());
                return;
            }
            Tag::CodeBlock(kind) => {
                self.start_code_block(kind);
                return;
            }
            Tag::Table(alignments) => self.alignments.clone_from(alignments),
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell = 0;
            }
            Tag::TableRow => self.cell = 0,
            _ => {}
        }

        let element = self.tag_to_element(&tag);
        self.stack.push(element);
    }

    /// Fenced blocks become `pre > code`, with the info string split into
    /// language (first word) and meta (the rest).
    fn start_code_block(&mut self, kind: &CodeBlockKind) {
        let mut code = Element::new("code");
        if let CodeBlockKind::Fenced(info) = kind {
            let info = info.trim();
            let (lang, meta) = match info.split_once(char::is_whitespace) {
                Some((lang, meta)) => (lang, meta.trim()),
                None => (info, ""),
            };
            if !lang.is_empty() {
                code.set_attr("class", format!("language-{lang}"));
            }
            if !meta.is_empty() {
                code.set_attr("data-meta", meta);
            }
        }
        self.stack.push(Element::new("pre"));
        self.stack.push(code);
    }

    /// End a tag (pop from stack)
    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html_block.take() {
                    self.add_raw_html(&html);
                }
                return;
            }
            TagEnd::CodeBlock => {
                // code, then its pre
                for _ in 0..2 {
                    if let Some(elem) = self.stack.pop() {
                        self.add_node(Node::element(elem));
                    }
                }
                return;
            }
            TagEnd::TableHead => self.in_table_head = false,
            TagEnd::Table => self.alignments.clear(),
            TagEnd::TableCell => self.cell += 1,
            _ => {}
        }

        if let Some(mut elem) = self.stack.pop() {
            if elem.tag == "img" {
                // Alt text was collected as children.
                let alt = elem.text_content();
                elem.children.clear();
                elem.set_attr("alt", alt);
            }
            self.add_node(Node::element(elem));
        }
    }

    /// Add text content
    fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.add_node(Node::text(text));
    }

    fn add_inline_code(&mut self, code: &str) {
        self.add_node(Node::element(Element::new("code").text(code)));
    }

    /// Add raw HTML - parse with tl and convert to tree elements
    fn add_raw_html(&mut self, html: &str) {
        let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
            // Parse failed, keep the markup as-is
            self.add_node(Node::Text(Text::raw(html.to_string())));
            return;
        };

        let parser = dom.parser();
        for handle in dom.children() {
            if let Some(node) = tl_node_to_tree(*handle, parser, TextMode::Normal) {
                self.add_node(node);
            }
        }
    }

    /// Add a simple self-closing element
    fn add_element(&mut self, tag: &str, attrs: Attrs) {
        self.add_node(Node::element(Element::with_attrs(tag, attrs)));
    }

    /// Add footnote reference
    fn add_footnote_ref(&mut self, name: &str) {
        let href = format!("#fn-{name}");
        let id = format!("fnref-{name}");
        let link = Element::with_attrs("a", Attrs::from([("href", href.as_str()), ("id", id.as_str())]))
            .text(format!("[{name}]"));
        let sup = Element::with_attrs("sup", Attrs::from([("class", "footnote-ref")]))
            .child(Node::element(link));
        self.add_node(Node::element(sup));
    }

    /// Add task list marker
    fn add_task_marker(&mut self, checked: bool) {
        let mut attrs = Attrs::from([("type", "checkbox"), ("disabled", "")]);
        if checked {
            attrs.set("checked", "");
        }
        self.add_element("input", attrs);
    }

    /// Math keeps its TeX source; typesetting happens in the page.
    ///
    /// Display math arrives inside a paragraph, so both forms are `span`.
    fn add_math(&mut self, formula: &str, display: bool) {
        let class = if display { "math-display" } else { "math-inline" };
        let elem = Element::new("span")
            .attr("class", vec!["math".to_string(), class.to_string()])
            .text(formula);
        self.add_node(Node::element(elem));
    }

    /// Add a node to current context (top of stack or root)
    fn add_node(&mut self, node: Node) {
        if let Some(top) = self.stack.last_mut() {
            top.push(node);
        } else {
            self.root_children.push(node);
        }
    }

    /// Build the root element from collected children
    fn build_root(self) -> Element {
        let mut root = Element::new("article");
        root.children.extend(self.root_children);
        root
    }

    /// Convert pulldown-cmark Tag to an (empty) element
    fn tag_to_element(&self, tag: &Tag) -> Element {
        match tag {
            // Block elements
            Tag::Paragraph => Element::new("p"),
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let mut elem = Element::new(heading_level_to_tag(*level));
                if let Some(id) = id {
                    elem.set_attr("id", id.to_string());
                }
                if !classes.is_empty() {
                    elem.set_attr("class", classes.iter().map(|c| c.to_string()).collect::<Vec<_>>());
                }
                for (key, value) in attrs {
                    elem.set_attr(key, value.as_deref().unwrap_or_default());
                }
                elem
            }
            Tag::BlockQuote(_) => Element::new("blockquote"),
            Tag::List(Some(start)) if *start != 1 => Element::new("ol").attr("start", start.to_string()),
            Tag::List(Some(_)) => Element::new("ol"),
            Tag::List(None) => Element::new("ul"),
            Tag::Item => Element::new("li"),
            Tag::FootnoteDefinition(name) => Element::with_attrs(
                "div",
                Attrs::from([("class", "footnote"), ("id", format!("fn-{name}").as_str())]),
            ),

            // Table elements
            Tag::Table(_) => Element::new("table"),
            Tag::TableHead => Element::new("thead"),
            Tag::TableRow => Element::new("tr"),
            Tag::TableCell => {
                let tag = if self.in_table_head { "th" } else { "td" };
                let mut cell = Element::new(tag);
                let align = match self.alignments.get(self.cell) {
                    Some(Alignment::Left) => Some("left"),
                    Some(Alignment::Center) => Some("center"),
                    Some(Alignment::Right) => Some("right"),
                    Some(Alignment::None) | None => None,
                };
                if let Some(align) = align {
                    cell.set_attr("style", format!("text-align:{align}"));
                }
                cell
            }

            // Inline elements
            Tag::Emphasis => Element::new("em"),
            Tag::Strong => Element::new("strong"),
            Tag::Strikethrough => Element::new("del"),
            Tag::Link { dest_url, title, .. } => {
                let mut elem = Element::new("a").attr("href", dest_url.to_string());
                if !title.is_empty() {
                    elem.set_attr("title", title.to_string());
                }
                elem
            }
            Tag::Image { dest_url, title, .. } => {
                let mut elem = Element::new("img").attr("src", dest_url.to_string());
                if !title.is_empty() {
                    elem.set_attr("title", title.to_string());
                }
                elem
            }

            // Definition list (extended syntax)
            Tag::DefinitionList => Element::new("dl"),
            Tag::DefinitionListTitle => Element::new("dt"),
            Tag::DefinitionListDefinition => Element::new("dd"),

            // Extended inline elements
            Tag::Superscript => Element::new("sup"),
            Tag::Subscript => Element::new("sub"),

            // Handled in start_tag; never pushed
            Tag::MetadataBlock(_) | Tag::HtmlBlock | Tag::CodeBlock(_) => Element::new("div"),
        }
    }
}

/// How text under a raw-HTML element is carried into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextMode {
    /// Entities decoded, whitespace-only runs dropped.
    Normal,
    /// Inside `pre`: entities decoded, whitespace kept.
    Preformatted,
    /// Inside `script`/`style`: bytes kept as written.
    Raw,
}

impl TextMode {
    fn enter(self, tag: &str) -> Self {
        if is_raw_text_element(tag) {
            Self::Raw
        } else if tag == "pre" {
            Self::Preformatted
        } else {
            self
        }
    }
}

/// Convert a tl node handle to a tree node
fn tl_node_to_tree(handle: tl::NodeHandle, parser: &tl::Parser, mode: TextMode) -> Option<Node> {
    match handle.get(parser)? {
        tl::Node::Tag(tag) => {
            let tag_name = tag.name().as_utf8_str().to_lowercase();
            let child_mode = mode.enter(&tag_name);

            let mut elem = Element::new(tag_name);
            for (key, value) in tag.attributes().iter() {
                let value = value.map(|v| unescape(&v).into_owned()).unwrap_or_default();
                elem.set_attr(&key, value);
            }

            for child in tag.children().top().iter() {
                if let Some(node) = tl_node_to_tree(*child, parser, child_mode) {
                    elem.push(node);
                }
            }

            Some(Node::element(elem))
        }
        tl::Node::Raw(bytes) => {
            let text = bytes.as_utf8_str();
            match mode {
                TextMode::Raw => Some(Node::Text(Text::raw(text.to_string()))),
                TextMode::Normal if text.trim().is_empty() => None,
                TextMode::Normal | TextMode::Preformatted => {
                    Some(Node::text(unescape(&text).into_owned()))
                }
            }
        }
        tl::Node::Comment(_) => None,
    }
}

/// Convert heading level to tag name
const fn heading_level_to_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

/// Convert markdown string to a Document rooted at `article`
pub fn from_markdown(markdown: &str, options: &MarkdownOptions) -> Document {
    MarkdownConverter::new().convert(markdown, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(doc: &Document) -> &Element {
        doc.root.children[0].as_element().expect("element")
    }

    #[test]
    fn test_basic_paragraph() {
        let doc = from_markdown("Hello world", &MarkdownOptions::default());
        assert_eq!(doc.root.tag, "article");
        assert_eq!(doc.root.children.len(), 1);
        assert_eq!(first(&doc).tag, "p");
    }

    #[test]
    fn test_heading_attributes() {
        let doc = from_markdown("## Intro {#intro .lead}", &MarkdownOptions::all());
        let h2 = first(&doc);
        assert_eq!(h2.tag, "h2");
        assert_eq!(h2.get_attr("id"), Some("intro"));
        assert!(h2.has_class("lead"));
        assert_eq!(h2.children.as_slice(), &[Node::text("Intro")]);
    }

    #[test]
    fn test_heading_attributes_disabled() {
        let doc = from_markdown("## Intro {#intro}", &MarkdownOptions::default());
        let h2 = first(&doc);
        assert_eq!(h2.get_attr("id"), None);
        assert_eq!(h2.text_content(), "Intro {#intro}");
    }

    #[test]
    fn test_fenced_code_language_and_meta() {
        let md = "```python title=\"example.py\" {1}\nprint(1)\n```";
        let doc = from_markdown(md, &MarkdownOptions::all());
        let pre = first(&doc);
        assert_eq!(pre.tag, "pre");
        let code = pre.child_elements().next().unwrap();
        assert_eq!(code.tag, "code");
        assert_eq!(code.get_attr("class"), Some("language-python"));
        assert_eq!(code.get_attr("data-meta"), Some("title=\"example.py\" {1}"));
        assert_eq!(code.text_content(), "print(1)\n");
    }

    #[test]
    fn test_indented_code_has_no_language() {
        let doc = from_markdown("    let x = 1;", &MarkdownOptions::all());
        let code = first(&doc).child_elements().next().unwrap();
        assert!(code.attrs.is_empty());
    }

    #[test]
    fn test_frontmatter_dropped() {
        let md = "---\ntitle: Hello\n---\n\n# Body";
        let doc = from_markdown(md, &MarkdownOptions::all());
        assert_eq!(doc.root.children.len(), 1);
        assert_eq!(first(&doc).tag, "h1");
    }

    #[test]
    fn test_math_nodes() {
        let doc = from_markdown("$x^2$\n\n$$\\sum$$", &MarkdownOptions::all());
        let spans = doc.find_all(|e| e.has_class("math"));
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].tag, "span");
        assert!(spans[0].has_class("math-inline"));
        assert_eq!(spans[0].text_content(), "x^2");
        assert!(spans[1].has_class("math-display"));
    }

    #[test]
    fn test_display_math_stays_phrasing_content() {
        let doc = from_markdown("see $$\\int f$$ here", &MarkdownOptions::all());
        let p = first(&doc);
        assert_eq!(p.tag, "p");
        let math = p.child_elements().next().unwrap();
        assert_eq!(math.tag, "span");
        assert!(math.has_class("math-display"));
        assert!(doc.find_all(|e| e.tag == "div").is_empty());
    }

    #[test]
    fn test_html_block_heading_is_an_element() {
        let md = "<h2 id=\"raw\">Raw heading</h2>\n\ntext";
        let doc = from_markdown(md, &MarkdownOptions::default());
        let h2 = first(&doc);
        assert_eq!(h2.tag, "h2");
        assert_eq!(h2.get_attr("id"), Some("raw"));
        assert_eq!(h2.text_content(), "Raw heading");
    }

    #[test]
    fn test_html_block_entities_decoded() {
        let md = "<h2 title=\"Q &amp; A\">Q &amp; A</h2>\n\n<pre><code class=\"language-c\">a &lt; b\n  c</code></pre>\n";
        let doc = from_markdown(md, &MarkdownOptions::default());

        let h2 = first(&doc);
        assert_eq!(h2.get_attr("title"), Some("Q & A"));
        assert_eq!(h2.children.as_slice(), &[Node::text("Q & A")]);

        let code = doc.find_all(|e| e.tag == "code");
        assert_eq!(code[0].text_content(), "a < b\n  c");
    }

    #[test]
    fn test_html_block_script_kept_raw() {
        let md = "<div><script>if (a &lt; b) {}</script></div>\n";
        let doc = from_markdown(md, &MarkdownOptions::default());
        let script = doc.find_all(|e| e.tag == "script");
        assert_eq!(
            script[0].children.as_slice(),
            &[Node::Text(Text::raw("if (a &lt; b) {}"))]
        );
    }

    #[test]
    fn test_table_head_and_alignment() {
        let md = "| a | b |\n|:--|--:|\n| 1 | 2 |";
        let doc = from_markdown(md, &MarkdownOptions::all());
        let th = doc.find_all(|e| e.tag == "th");
        assert_eq!(th.len(), 2);
        assert_eq!(th[0].get_attr("style"), Some("text-align:left"));
        let td = doc.find_all(|e| e.tag == "td");
        assert_eq!(td[1].get_attr("style"), Some("text-align:right"));
    }

    #[test]
    fn test_image_alt() {
        let doc = from_markdown("![a cat](cat.png)", &MarkdownOptions::default());
        let img = doc.find_all(|e| e.tag == "img")[0];
        assert_eq!(img.get_attr("alt"), Some("a cat"));
        assert!(img.children.is_empty());
    }

    #[test]
    fn test_nested_list() {
        let doc = from_markdown("- Item 1\n  - Nested\n- Item 2", &MarkdownOptions::default());
        assert_eq!(first(&doc).tag, "ul");
        assert_eq!(doc.find_all(|e| e.tag == "li").len(), 3);
    }
}
