//! Error type for `ourlab-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Ownership rule violated, e.g. a lab under a foreign department.
  #[error("catalogue error: {0}")]
  Core(#[from] ourlab_core::Error),

  #[error("sqlite error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("malformed lab aliases: {0}")]
  Json(#[from] serde_json::Error),

  #[error("malformed timestamp: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
