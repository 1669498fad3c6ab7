//! Faceted search for the resource catalogue.
//!
//! Facet providers compute per-value counts over a base resource query so
//! the search UI can offer filters. This crate ships the group facet, the
//! registry that providers are injected into, and the PostgreSQL plumbing
//! (visibility resolution, SQL building, query execution) behind them.

pub mod config;
pub mod db;
pub mod error;
pub mod facets;
pub mod models;
pub mod security;
pub mod store;

pub use config::Config;
pub use error::{FacetError, FacetResult};
