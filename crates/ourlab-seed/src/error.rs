//! Error type for `ourlab-seed`.
//!
//! These are the fatal failures. Rows that merely fail to resolve are not
//! errors; they become [`crate::Warning`]s.

use std::path::PathBuf;

use ourlab_core::model::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The source is missing columns the stage needs. Raised before any write.
  #[error("[{kind}] CSV is missing required columns {missing:?}; observed columns: {observed:?}")]
  MissingColumns {
    kind:     EntityKind,
    missing:  Vec<String>,
    observed: Vec<String>,
  },

  #[error("no {0} source was given")]
  MissingSource(EntityKind),

  #[error("failed to read {}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("[{kind}] malformed CSV: {source}")]
  Csv {
    kind:   EntityKind,
    #[source]
    source: csv::Error,
  },

  #[error("invalid column mapping: {0}")]
  Mapping(#[from] serde_json::Error),

  #[error("[{kind}] store error: {source}")]
  Store {
    kind:   EntityKind,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
