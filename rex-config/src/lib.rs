//! Shared configuration loader for the rex tools.
//!
//! `defaults/rex.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`RexConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use rex_parser::rex::options::UnknownOption;
use rex_parser::rex::{ParserSettings, RegexOptions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/rex.default.toml");

/// Top-level configuration consumed by rex applications.
#[derive(Debug, Clone, Deserialize)]
pub struct RexConfig {
    pub parser: ParserConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Option list in the form accepted by [`RegexOptions::parse_list`]
    pub options: String,
    pub max_depth: usize,
}

impl ParserConfig {
    pub fn settings(&self) -> Result<ParserSettings, UnknownOption> {
        let options = RegexOptions::parse_list(&self.options)?;
        Ok(ParserSettings::new(options).with_max_depth(self.max_depth))
    }
}

/// How the pattern argument is read.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub literal: bool,
    pub base_offset: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Tag,
    Treeviz,
    Json,
}

impl OutputFormat {
    /// Name of the matching formatter in the parser's format registry
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Tag => "tag",
            OutputFormat::Treeviz => "treeviz",
            OutputFormat::Json => "json",
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<RexConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<RexConfig, ConfigError> {
    Loader::new().build()
}
