//! `[build]` section configuration.
//!
//! ```toml
//! [build]
//! content = "content"   # Markdown source directory (relative to config file)
//! output = "public"     # Rendered fragments directory
//! minify = false        # Drop formatting newlines between block elements
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::FieldPath;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Markdown source directory.
    pub content: PathBuf,
    /// Output directory.
    pub output: PathBuf,
    /// Minify HTML output.
    pub minify: bool,
}

pub struct BuildFields {
    pub content: FieldPath,
    pub output: FieldPath,
}

impl BuildConfig {
    pub const FIELDS: BuildFields = BuildFields {
        content: FieldPath::new("build.content"),
        output: FieldPath::new("build.output"),
    };
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content: "content".into(),
            output: "public".into(),
            minify: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.content, PathBuf::from("content"));
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert!(!config.build.minify);
    }

    #[test]
    fn test_override() {
        let config = test_parse_config("[build]\noutput = \"dist\"\nminify = true");
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert!(config.build.minify);
    }
}
