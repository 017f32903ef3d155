//! Diff and highlight notations.
//!
//! Two sources of line annotations:
//!
//! - a leading marker column (`+` / `-` / space), diff only
//! - trailing notation comments, in any common comment style:
//!
//! ```text
//! let a = 1; // [!code ++]
//! # [!code hl:3]
//! <!-- [!code --] -->
//! ```
//!
//! A notation alone on its line removes that line and marks the next N lines
//! (default 1). Otherwise it marks its own line and the N-1 following ones.
//! Meta ranges (`{1,3-4}`) always refer to the fence's own line numbers.

use std::ops::Range;

use regex::Regex;

use crate::code::{BlockError, CodeBlock, Line, LineClass, parse_ranges};
use crate::config::ConfigError;
use crate::dom::Element;

use super::find_pre_mut;

/// Finds `[!code <name>(:N)]` comments at the end of a line.
struct NotationMatcher {
    pattern: Regex,
}

struct Notation<'t> {
    name: &'t str,
    count: usize,
    span: Range<usize>,
}

impl NotationMatcher {
    fn new(names: &[&str]) -> Result<Self, ConfigError> {
        let names = names.iter().map(|n| regex::escape(n)).collect::<Vec<_>>().join("|");
        let pattern = format!(
            r"\s*(?://|#|--|;|%|/\*|<!--)\s*\[!code\s+({names})(?::(\d+))?\]\s*(?:\*/|-->)?\s*$"
        );
        let pattern = Regex::new(&pattern).map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(Self { pattern })
    }

    fn find<'t>(&self, text: &'t str) -> Option<Notation<'t>> {
        let caps = self.pattern.captures(text)?;
        let whole = caps.get(0)?;
        let name = caps.get(1)?.as_str();
        let count = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        Some(Notation {
            name,
            count,
            span: whole.range(),
        })
    }

    /// Strip notations from `lines` and apply the class each one names.
    fn apply(&self, lines: &mut Vec<Line>, class_for: impl Fn(&str) -> LineClass) {
        let mut out = Vec::with_capacity(lines.len());
        // (class, lines still to mark)
        let mut pending: Vec<(LineClass, usize)> = Vec::new();

        for mut line in std::mem::take(lines) {
            let found = self
                .find(&line.text)
                .map(|n| (class_for(n.name), n.count, n.span));

            let Some((class, count, span)) = found else {
                apply_pending(&mut line, &mut pending);
                out.push(line);
                continue;
            };

            line.text.replace_range(span, "");
            if line.text.trim().is_empty() {
                pending.push((class, count));
                continue;
            }

            apply_pending(&mut line, &mut pending);
            line.add_class(class);
            if count > 1 {
                pending.push((class, count - 1));
            }
            out.push(line);
        }

        *lines = out;
    }
}

fn apply_pending(line: &mut Line, pending: &mut Vec<(LineClass, usize)>) {
    for (class, remaining) in pending.iter_mut() {
        line.add_class(*class);
        *remaining -= 1;
    }
    pending.retain(|(_, remaining)| *remaining > 0);
}

// ============================================================================
// notation-diff
// ============================================================================

/// `+` / `-` markers and `[!code ++]` / `[!code --]` comments.
pub struct NotationDiff {
    matcher: NotationMatcher,
}

impl NotationDiff {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            matcher: NotationMatcher::new(&["++", "--"])?,
        })
    }

    pub fn preprocess(&self, block: &mut CodeBlock) {
        strip_marker_column(&mut block.lines);
        self.matcher.apply(&mut block.lines, |name| {
            if name == "++" {
                LineClass::Added
            } else {
                LineClass::Removed
            }
        });
    }

    pub fn decorate(&self, block: &CodeBlock, root: &mut Element) {
        if (block.any_line(LineClass::Added) || block.any_line(LineClass::Removed))
            && let Some(pre) = find_pre_mut(root)
        {
            pre.attrs.add_class("has-diff");
        }
    }
}

/// A marker column exists only when every non-empty line starts with `+`,
/// `-` or a space and at least one starts with `+` or `-`.
fn has_marker_column(lines: &[Line]) -> bool {
    let mut marked = false;
    for line in lines.iter().filter(|l| !l.text.is_empty()) {
        match line.text.as_bytes()[0] {
            b'+' | b'-' => marked = true,
            b' ' => {}
            _ => return false,
        }
    }
    marked
}

fn strip_marker_column(lines: &mut [Line]) {
    if !has_marker_column(lines) {
        return;
    }
    for line in lines.iter_mut().filter(|l| !l.text.is_empty()) {
        let class = match line.text.as_bytes()[0] {
            b'+' => Some(LineClass::Added),
            b'-' => Some(LineClass::Removed),
            _ => None,
        };
        line.text.remove(0);
        if let Some(class) = class {
            line.add_class(class);
        }
    }
}

// ============================================================================
// notation-highlight
// ============================================================================

/// Meta line ranges and `[!code highlight]` / `[!code hl]` comments.
pub struct NotationHighlight {
    matcher: NotationMatcher,
}

impl NotationHighlight {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            matcher: NotationMatcher::new(&["highlight", "hl"])?,
        })
    }

    pub fn preprocess(&self, block: &mut CodeBlock) -> Result<(), BlockError> {
        let meta = block.require_meta()?;
        let mut ranges = meta.ranges().to_vec();
        if let Some(value) = meta.get("highlight") {
            ranges.extend(parse_ranges(value));
        }

        // Ranges count fence lines, including any a notation already removed.
        for line in &mut block.lines {
            if ranges.iter().any(|r| r.contains(&line.source_line)) {
                line.add_class(LineClass::Highlighted);
            }
        }

        self.matcher.apply(&mut block.lines, |_| LineClass::Highlighted);
        Ok(())
    }

    pub fn decorate(&self, block: &CodeBlock, root: &mut Element) {
        if block.any_line(LineClass::Highlighted)
            && let Some(pre) = find_pre_mut(root)
        {
            pre.attrs.add_class("has-highlighted");
        }
    }
}
