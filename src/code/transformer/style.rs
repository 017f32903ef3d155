//! Inline style normalization.
//!
//! Rewrites the highlighter's color declarations into the site's theme
//! custom properties and wraps the block in its container:
//!
//! ```text
//! <pre style="background-color:#fff;--plume-dark-bg:#000">
//!   ──►
//! <div class="code-block"><pre style="--code-light-bg:#fff;--code-dark-bg:#000">
//! ```

use crate::code::highlight::{DARK_BG_VAR, DARK_VAR};
use crate::config::{ConfigDiagnostics, ConfigError, FieldPath, StyleVarsConfig};
use crate::dom::Element;

/// Class of the container `div` wrapped around `pre`.
pub const CONTAINER_CLASS: &str = "code-block";

pub struct StyleNormalizer {
    vars: StyleVarsConfig,
}

impl StyleNormalizer {
    pub fn new(vars: &StyleVarsConfig) -> Result<Self, ConfigError> {
        let fields = StyleVarsConfig::FIELDS;
        let mut diag = ConfigDiagnostics::new();
        for (field, name) in [
            (fields.light, &vars.light),
            (fields.dark, &vars.dark),
            (fields.light_bg, &vars.light_bg),
            (fields.dark_bg, &vars.dark_bg),
        ] {
            diag.absorb(check_custom_property(field, name))?;
        }
        diag.into_result().map_err(ConfigError::Diagnostics)?;

        Ok(Self { vars: vars.clone() })
    }

    pub fn decorate(&self, root: &mut Element) {
        root.walk_mut(&mut |elem| {
            if let Some(style) = elem.get_attr("style") {
                let style = self.rewrite(style);
                elem.set_attr("style", style);
            }
        });

        if root.tag == "div" && root.has_class(CONTAINER_CLASS) {
            return;
        }
        let pre = std::mem::replace(
            root,
            Element::new("div").attr("class", vec![CONTAINER_CLASS.to_string()]),
        );
        root.push_elem(pre);
    }

    /// Map each known declaration onto its custom property; keep the rest.
    fn rewrite(&self, style: &str) -> String {
        style
            .split(';')
            .filter(|decl| !decl.trim().is_empty())
            .map(|decl| {
                let Some((prop, value)) = decl.split_once(':') else {
                    return decl.to_string();
                };
                let target = match prop.trim() {
                    "color" => &self.vars.light,
                    "background-color" => &self.vars.light_bg,
                    p if p == DARK_VAR => &self.vars.dark,
                    p if p == DARK_BG_VAR => &self.vars.dark_bg,
                    _ => return decl.to_string(),
                };
                format!("{target}:{}", value.trim())
            })
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn check_custom_property(field: FieldPath, name: &str) -> Result<(), ConfigError> {
    let valid = name.len() > 2
        && name.starts_with("--")
        && name[2..]
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("'{name}' is not a CSS custom property name (expected `--name`)"),
        ))
    }
}
