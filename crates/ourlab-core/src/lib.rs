//! Core types and reconciliation logic for the OURLAB catalogue.
//!
//! This crate has no CSV or database dependencies. The
//! resolver and upsert engine are written against [`store::CatalogStore`];
//! backends (`ourlab-store-sqlite`, [`memory::MemoryStore`]) implement it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod memory;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod store;
pub mod upsert;

pub use error::{Error, Result};
