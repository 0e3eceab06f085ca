//! Loader settings.
//!
//! Read from an optional TOML file plus `OURLAB_`-prefixed environment
//! variables, e.g.
//!
//! ```toml
//! database       = "ourlab.db"
//! on_write_error = "skip"
//!
//! [[aliases]]
//! from = "한국과학기술원"
//! to   = "카이스트(KAIST/한국과학기술원)"
//! ```
//!
//! Aliases are an array of tables rather than a map: `config` lowercases map
//! keys and splits them on `.`, and alias lookup is exact.

use std::path::{Path, PathBuf};

use ourlab_core::normalize::NameNormalizer;
use serde::Deserialize;

use crate::loader::WriteFailurePolicy;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
  /// SQLite database file.
  pub database:       PathBuf,
  pub on_write_error: WriteFailurePolicy,
  /// Extra aliases for the name normaliser.
  pub aliases:        Vec<AliasEntry>,
}

/// One `base name → canonical name` alias.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AliasEntry {
  pub from: String,
  pub to:   String,
}

impl Default for SeedConfig {
  fn default() -> Self {
    Self {
      database:       PathBuf::from("ourlab.db"),
      on_write_error: WriteFailurePolicy::default(),
      aliases:        Vec::new(),
    }
  }
}

impl SeedConfig {
  /// Layer the file at `path` (if it exists) and the environment over the
  /// defaults.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("OURLAB"))
      .build()?
      .try_deserialize()
  }

  pub fn normalizer(&self) -> NameNormalizer {
    NameNormalizer::with_aliases(
      self.aliases.iter().map(|a| (a.from.clone(), a.to.clone())),
    )
  }
}
