//! CSV seed loader for the OURLAB catalogue.
//!
//! Reads the university, department, lab and graduate-program extracts,
//! validates their columns, and reconciles every row into any
//! [`CatalogStore`](ourlab_core::store::CatalogStore) through the resolver
//! and upsert engine in `ourlab-core`.
//!
//! Stages always run in the order universities → departments → labs →
//! graduate. A missing required column aborts the run before anything is
//! written; a row whose parent cannot be resolved is skipped and reported as
//! a [`Warning`].

pub mod config;
pub mod error;
pub mod loader;
pub mod report;
pub mod rows;
pub mod source;

pub use error::{Error, Result};
pub use loader::{LoadOptions, Loader, WriteFailurePolicy};
pub use report::{KindCounts, Reporter, Silent, Summary, TracingReporter, Warning, WarningReason};
pub use source::{ColumnMapping, SourceTables, Sources, Table};

#[cfg(test)]
mod tests;
