//! Markdown rendering pipeline.
//!
//! ```text
//! source ─► convert ─► heading ids ─► anchors ─► code blocks ─► Document
//!                       (optional)    (optional)  (optional)
//! ```
//!
//! A [`Renderer`] is built once from `[markdown]`, validating every option
//! and loading highlighting themes up front. It holds no per-document state
//! and is shared by reference across rayon workers.

pub mod transform;

use crate::config::{ConfigDiagnostics, ConfigError, MarkdownConfig};
use crate::dom::{Document, Pipeline, RenderConfig, render_document};
use crate::markdown::{MarkdownOptions, from_markdown};

pub use transform::{AnchorInjector, AnchorOptions, CodeBlocks, HeadingIds};

pub struct Renderer {
    options: MarkdownOptions,
    heading_ids: Option<HeadingIds>,
    anchors: Option<AnchorInjector>,
    code: Option<CodeBlocks>,
}

impl Renderer {
    /// Build every configured stage, collecting all option errors.
    pub fn from_config(config: &MarkdownConfig) -> Result<Self, ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        let anchors = if config.anchor.enable {
            diag.absorb(AnchorOptions::from_config(&config.anchor))?
                .map(AnchorInjector::new)
        } else {
            None
        };

        let code = if config.code.enable {
            diag.absorb(crate::code::CodePipeline::from_config(&config.code))?
                .map(CodeBlocks::new)
        } else {
            None
        };

        diag.into_result().map_err(ConfigError::Diagnostics)?;

        Ok(Self {
            options: MarkdownOptions::from(config),
            heading_ids: config
                .heading_ids
                .enable
                .then(|| HeadingIds::new(config.heading_ids.mode)),
            anchors,
            code,
        })
    }

    /// Render markdown into a document tree.
    pub fn render(&self, source: &str) -> Document {
        Pipeline::new(from_markdown(source, &self.options))
            .pipe_opt(self.heading_ids.as_ref())
            .pipe_opt(self.anchors.as_ref())
            .pipe_opt(self.code.as_ref())
            .into_inner()
    }

    /// Render markdown into an HTML fragment.
    pub fn render_html(&self, source: &str, config: &RenderConfig) -> String {
        render_document(&self.render(source), config)
    }

    /// Stage names in run order, for `plume check`.
    pub fn stages(&self) -> Vec<String> {
        let mut stages = vec!["convert".to_string()];
        if self.heading_ids.is_some() {
            stages.push("heading-ids".to_string());
        }
        if let Some(anchors) = &self.anchors {
            stages.push(format!("anchors ({})", anchors.options().behavior()));
        }
        if let Some(code) = &self.code {
            let pipeline = code.pipeline();
            let mut names: Vec<String> = Vec::new();
            if pipeline.highlights() {
                names.push("highlight".to_string());
            }
            names.extend(pipeline.transformers().iter().map(|t| t.kind().to_string()));
            stages.push(format!("code [{}]", names.join(", ")));
        }
        stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::dom::{Element, Node};

    fn renderer(toml: &str) -> Renderer {
        Renderer::from_config(&test_parse_config(toml).markdown).unwrap()
    }

    #[test]
    fn test_renderer_is_sync() {
        fn assert_sync<T: Sync + Send>() {}
        assert_sync::<Renderer>();
    }

    #[test]
    fn test_intro_heading_scenario() {
        let doc = renderer("").render("## Intro {#intro}");
        let h2 = doc.root.child_elements().next().unwrap();
        assert_eq!(h2.get_attr("id"), Some("intro"));
        assert_eq!(h2.children.len(), 2);
        assert_eq!(h2.children[0], Node::text("Intro"));
        let a = h2.children[1].as_element().unwrap();
        assert_eq!(a.get_attr("href"), Some("#intro"));
        assert_eq!(a.attrs.classes(), vec!["anchor"]);
        assert_eq!(a.text_content(), "#");
    }

    #[test]
    fn test_python_block_scenario() {
        let md = "```python title=\"example.py\"\n+import os\n os.getcwd()\n```\n";
        let doc = renderer("").render(md);

        let title = doc.find_all(|e| e.has_class("title"));
        assert_eq!(title.len(), 1);
        assert_eq!(title[0].text_content(), "example.py");

        let lines: Vec<&Element> = doc.find_all(|e| e.tag == "span" && e.has_class("line"));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].has_class("added"));
        assert_eq!(lines[0].text_content(), "import os");
        assert_eq!(lines[1].attrs.classes(), vec!["line"]);
        assert_eq!(lines[1].text_content(), "os.getcwd()");

        let badge = doc.find_all(|e| e.has_class("language"));
        assert_eq!(badge[0].text_content(), "python");

        let button = doc.find_all(|e| e.tag == "button" && e.has_class("copy"));
        assert_eq!(button.len(), 1);
        assert_eq!(button[0].get_attr("data-code"), Some("import os\nos.getcwd()"));
        assert_eq!(button[0].get_attr("data-timeout"), Some("2000"));
    }

    #[test]
    fn test_generated_ids_get_anchors() {
        let doc = renderer("").render("# Getting Started");
        let h1 = doc.root.child_elements().next().unwrap();
        assert_eq!(h1.get_attr("id"), Some("getting-started"));
        let a = h1.child_elements().next().unwrap();
        assert_eq!(a.get_attr("href"), Some("#getting-started"));
    }

    #[test]
    fn test_heading_ids_disabled_means_no_anchor() {
        let doc = renderer("[markdown.heading_ids]\nenable = false").render("# Plain");
        let h1 = doc.root.child_elements().next().unwrap();
        assert_eq!(h1.get_attr("id"), None);
        assert_eq!(h1.children.len(), 1);
    }

    #[test]
    fn test_all_config_errors_reported_once() {
        let config = test_parse_config(
            "[markdown.anchor]\nclass_name = [\"\"]\n[markdown.code.copy]\ntimeout = 0\n[markdown.code.themes]\nlight = \"missing\"",
        );
        let Err(ConfigError::Diagnostics(diag)) = Renderer::from_config(&config.markdown) else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.errors().len(), 3);
    }

    #[test]
    fn test_disabled_stages_skip_validation() {
        let config = test_parse_config(
            "[markdown.anchor]\nenable = false\nclass_name = [\"\"]\n[markdown.code]\nenable = false\n[markdown.code.copy]\ntimeout = 0",
        );
        let renderer = Renderer::from_config(&config.markdown).unwrap();
        assert_eq!(renderer.stages(), vec!["convert", "heading-ids"]);
    }

    #[test]
    fn test_raw_html_heading_slug_uses_decoded_text() {
        let doc = renderer("").render("<h2>Q &amp; A</h2>\n");
        let h2 = doc.root.child_elements().next().unwrap();
        assert_eq!(h2.get_attr("id"), Some("q--a"));
    }

    #[test]
    fn test_raw_html_code_block_escaped_once() {
        let md = "<pre><code class=\"language-c\">a &lt; b</code></pre>\n";
        let r = renderer("[markdown.code]\nhighlight = false");
        let html = r.render_html(md, &RenderConfig::new(true));
        assert!(html.contains(r#"<span class="line">a &lt; b</span>"#), "{html}");
        assert!(html.contains(r#"data-code="a &lt; b""#), "{html}");

        let doc = r.render(md);
        let button = doc.find_all(|e| e.tag == "button");
        assert_eq!(button[0].get_attr("data-code"), Some("a < b"));
    }

    #[test]
    fn test_render_html_fragment() {
        let html = renderer("[markdown.code]\nenable = false").render_html("## Hi {#hi}", &RenderConfig::new(true));
        assert_eq!(html, r##"<h2 id="hi">Hi<a href="#hi" class="anchor">#</a></h2>"##);
    }

    #[test]
    fn test_stages_listing() {
        let renderer = renderer("[markdown.code]\ntransformers = [\"title\", \"copy-button\"]");
        assert_eq!(
            renderer.stages(),
            vec![
                "convert",
                "heading-ids",
                "anchors (append)",
                "code [highlight, title, copy-button]",
            ]
        );
    }
}
