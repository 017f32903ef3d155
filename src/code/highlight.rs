//! Dual-theme syntax highlighting with syntect.
//!
//! Every token carries its light color inline and its dark color as a
//! custom property, so a stylesheet can switch themes without re-rendering:
//!
//! ```html
//! <pre class="plume-code" style="background-color:#fff;--plume-dark-bg:#2b303b;...">
//!   <code class="language-rust">
//!     <span class="line"><span style="color:#a71d5d;--plume-dark:#b48ead">fn</span>...</span>
//! ```

use syntect::highlighting::{
    Color, FontStyle, Highlighter as ThemeHighlighter, Style, Theme, ThemeSet,
};
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};

use super::{BlockError, CodeBlock, Line};
use crate::config::{ConfigDiagnostics, ConfigError, FieldPath, ThemesConfig};
use crate::dom::{Element, Node};

/// Class on every rendered `pre`.
pub const PRE_CLASS: &str = "plume-code";

/// Custom property carrying the dark foreground color.
pub const DARK_VAR: &str = "--plume-dark";
/// Custom property carrying the dark background color.
pub const DARK_BG_VAR: &str = "--plume-dark-bg";

/// Loaded syntaxes plus the light and dark themes.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    light: Theme,
    dark: Theme,
}

impl Highlighter {
    /// Load syntaxes and resolve both theme names.
    ///
    /// Unknown names for `light` and `dark` are reported together.
    pub fn from_config(config: &ThemesConfig) -> Result<Self, ConfigError> {
        let mut themes = ThemeSet::load_defaults();
        if let Some(dir) = &config.dir {
            themes.add_from_folder(dir).map_err(|e| {
                ConfigError::invalid(
                    ThemesConfig::FIELDS.dir,
                    format!("failed to load themes from '{}': {e}", dir.display()),
                )
            })?;
        }

        let mut diag = ConfigDiagnostics::new();
        let light = diag.absorb(pick_theme(&themes, &config.light, ThemesConfig::FIELDS.light))?;
        let dark = diag.absorb(pick_theme(&themes, &config.dark, ThemesConfig::FIELDS.dark))?;

        match (light, dark) {
            (Some(light), Some(dark)) => Ok(Self {
                syntaxes: SyntaxSet::load_defaults_newlines(),
                light,
                dark,
            }),
            _ => Err(ConfigError::Diagnostics(diag)),
        }
    }

    fn syntax_for(&self, lang: Option<&str>) -> &SyntaxReference {
        lang.and_then(|l| self.syntaxes.find_syntax_by_token(l))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    /// Highlight a block into `pre > code > span.line > span[style]`.
    pub fn render(&self, block: &CodeBlock) -> Result<Element, BlockError> {
        let syntax = self.syntax_for(block.lang.as_deref());
        let light = ThemeHighlighter::new(&self.light);
        let dark = ThemeHighlighter::new(&self.dark);

        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut lines = Vec::with_capacity(block.lines.len());

        for (index, line) in block.lines.iter().enumerate() {
            let fail = |message: String| BlockError::Highlight {
                line: index + 1,
                message,
            };

            // Newline-terminated input keeps the syntax state machine in step.
            let text = format!("{}\n", line.text);
            let limit = line.text.len();
            let ops = state
                .parse_line(&text, &self.syntaxes)
                .map_err(|e| fail(e.to_string()))?;

            let mut tokens: Vec<Token> = Vec::new();
            let mut last = 0;
            for (pos, op) in ops {
                if pos > last {
                    push_token(&mut tokens, &text[last.min(limit)..pos.min(limit)], &stack, &light, &dark);
                    last = pos;
                }
                stack.apply(&op).map_err(|e| fail(e.to_string()))?;
            }
            if last < limit {
                push_token(&mut tokens, &text[last..limit], &stack, &light, &dark);
            }

            lines.push(line_element(line, tokens.into_iter().map(Token::into_node)));
        }

        let mut pre = assemble(block, lines);
        pre.set_attr("style", self.pre_style());
        Ok(pre)
    }

    /// Theme colors for the `pre` element.
    fn pre_style(&self) -> String {
        let light = &self.light.settings;
        let dark = &self.dark.settings;
        let mut decls = Vec::with_capacity(4);
        if let Some(bg) = light.background {
            decls.push(format!("background-color:{}", hex(bg)));
        }
        if let Some(bg) = dark.background {
            decls.push(format!("{DARK_BG_VAR}:{}", hex(bg)));
        }
        if let Some(fg) = light.foreground {
            decls.push(format!("color:{}", hex(fg)));
        }
        if let Some(fg) = dark.foreground {
            decls.push(format!("{DARK_VAR}:{}", hex(fg)));
        }
        decls.join(";")
    }
}

fn pick_theme(themes: &ThemeSet, name: &str, field: FieldPath) -> Result<Theme, ConfigError> {
    themes.themes.get(name).cloned().ok_or_else(|| {
        let available = themes.themes.keys().map(String::as_str).collect::<Vec<_>>().join(", ");
        ConfigError::invalid(field, format!("unknown theme '{name}' (available: {available})"))
    })
}

/// Render without syntect: one text node per line, no colors.
pub fn render_plain(block: &CodeBlock) -> Element {
    let lines = block
        .lines
        .iter()
        .map(|line| {
            let text = (!line.text.is_empty()).then(|| Node::text(line.text.as_str()));
            line_element(line, text)
        })
        .collect();
    assemble(block, lines)
}

/// `pre.plume-code > code` with lines separated by newline text nodes.
fn assemble(block: &CodeBlock, lines: Vec<Element>) -> Element {
    let mut code = Element::new("code");
    if let Some(lang) = &block.lang {
        code.set_attr("class", format!("language-{lang}"));
    }
    for (i, line) in lines.into_iter().enumerate() {
        if i > 0 {
            code.push(Node::text("\n"));
        }
        code.push_elem(line);
    }

    Element::new("pre")
        .attr("class", vec![PRE_CLASS.to_string()])
        .child(Node::element(code))
}

fn line_element(line: &Line, children: impl IntoIterator<Item = Node>) -> Element {
    let mut classes = vec!["line".to_string()];
    classes.extend(line.classes.iter().map(|c| c.as_str().to_string()));
    let mut span = Element::new("span").attr("class", classes);
    span.children.extend(children);
    span
}

struct Token {
    text: String,
    light: Style,
    dark: Style,
}

impl Token {
    fn into_node(self) -> Node {
        Node::element(
            Element::new("span")
                .attr("style", token_style(&self.light, &self.dark))
                .text(self.text),
        )
    }
}

/// Append a segment, merging it into the previous token when both themes
/// style them identically.
fn push_token(
    tokens: &mut Vec<Token>,
    text: &str,
    stack: &ScopeStack,
    light: &ThemeHighlighter<'_>,
    dark: &ThemeHighlighter<'_>,
) {
    if text.is_empty() {
        return;
    }
    let light = light.style_for_stack(stack.as_slice());
    let dark = dark.style_for_stack(stack.as_slice());

    if let Some(prev) = tokens.last_mut()
        && prev.light == light
        && prev.dark == dark
    {
        prev.text.push_str(text);
        return;
    }
    tokens.push(Token {
        text: text.to_string(),
        light,
        dark,
    });
}

fn token_style(light: &Style, dark: &Style) -> String {
    let mut css = format!("color:{};{DARK_VAR}:{}", hex(light.foreground), hex(dark.foreground));
    font_decls(&mut css, light.font_style, "");
    font_decls(&mut css, dark.font_style, "--plume-dark-");
    css
}

fn font_decls(css: &mut String, font: FontStyle, prefix: &str) {
    if font.contains(FontStyle::ITALIC) {
        css.push_str(&format!(";{prefix}font-style:italic"));
    }
    if font.contains(FontStyle::BOLD) {
        css.push_str(&format!(";{prefix}font-weight:bold"));
    }
    if font.contains(FontStyle::UNDERLINE) {
        css.push_str(&format!(";{prefix}text-decoration:underline"));
    }
}

fn hex(c: Color) -> String {
    if c.a == 0xff {
        format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a)
    }
}
