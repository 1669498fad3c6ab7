//! Facet error types.

use thiserror::Error;

/// Errors raised while computing facets.
#[derive(Debug, Error)]
pub enum FacetError {
    /// The request carried no user; visibility cannot be resolved without one.
    #[error("facet request has no user")]
    MissingUser,

    /// No provider is registered under this name.
    #[error("unknown facet '{0}'")]
    UnknownFacet(String),

    /// A key could not be interpreted for the facet it was passed to.
    #[error("facet '{facet}': invalid key '{key}'")]
    InvalidKey { facet: String, key: String },

    /// Page bounds are inconsistent.
    #[error("invalid page bounds: start={start}, end={end}")]
    InvalidPage { start: u64, end: u64 },

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias using FacetError.
pub type FacetResult<T> = Result<T, FacetError>;
