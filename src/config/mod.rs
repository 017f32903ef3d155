//! Configuration management for `plume.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── markdown   # [markdown], [markdown.heading_ids]
//! │   ├── anchor     # [markdown.anchor]
//! │   └── code       # [markdown.code] and sub-sections
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! └── mod.rs         # PlumeConfig (this file)
//! ```
//!
//! Loading only parses and resolves paths. Option values are checked when
//! the [`Renderer`](crate::pipeline::Renderer) is built from the
//! `[markdown]` section, which happens before any document is read.

pub mod section;
pub mod types;
mod util;

pub use section::{
    AnchorBehavior, AnchorConfig, AnchorContent, BuildConfig, CodeConfig, CopyConfig,
    HeadingIdsConfig, LanguageConfig, MarkdownConfig, SlugMode, StyleVarsConfig, ThemesConfig,
    TransformerKind,
};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};

use util::{find_config_file, resolve_against};

use crate::{
    cli::{Cli, Commands, RenderArgs},
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing plume.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlumeConfig {
    /// Absolute path to the config file; empty when running on defaults.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub markdown: MarkdownConfig,
}

impl PlumeConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file. A missing file is not an
    /// error: every section has defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.clone());
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "'{}' not found, using defaults", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.apply_command_options(cli);
        config.normalize_paths();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Get path relative to the root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Render { args } => self.apply_render_args(args),
            Commands::Check { verbose } => crate::logger::set_verbose(*verbose),
        }
    }

    fn apply_render_args(&mut self, args: &RenderArgs) {
        crate::logger::set_verbose(args.verbose);
        Self::update_option(&mut self.build.content, args.content.as_ref());
        Self::update_option(&mut self.build.output, args.output.as_ref());
        Self::update_option(&mut self.build.minify, args.minify.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve every relative path against the root.
    fn normalize_paths(&mut self) {
        self.build.content = resolve_against(&self.root, &self.build.content);
        self.build.output = resolve_against(&self.root, &self.build.output);
        if let Some(dir) = self.markdown.code.themes.dir.take() {
            self.markdown.code.themes.dir = Some(resolve_against(&self.root, &dir));
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate paths and other loader-level settings.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        if let Some(dir) = &self.markdown.code.themes.dir
            && !dir.is_dir()
        {
            diag.error(
                ThemesConfig::FIELDS.dir,
                format!("theme directory '{}' not found", dir.display()),
            );
        }

        if self.build.output == self.build.content {
            diag.error_with_hint(
                BuildConfig::FIELDS.output,
                "output directory is the content directory",
                "rendered files would sit next to their sources; pick another `output`",
            );
        }

        if self.markdown.code.enable && self.markdown.code.transformers.is_empty() {
            diag.warn(CodeConfig::FIELDS.transformers, "empty list, code blocks are only highlighted");
        }

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PlumeConfig {
    let (parsed, ignored) = PlumeConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
