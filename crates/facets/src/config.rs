//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

use crate::facets::types::{DEFAULT_FACET_PAGE_SIZE, MAX_FACET_PAGE_SIZE};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Default number of facet items per page (default: 10, max: 100).
    pub facet_page_size: u64,

    /// Emit the rendered facet SQL at trace level (default: false).
    pub facet_trace_queries: bool,

    /// Statement timeout applied to facet queries, in seconds (default: 10).
    pub facet_statement_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let facet_page_size: u64 = env::var("FACET_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_FACET_PAGE_SIZE.to_string())
            .parse()
            .context("FACET_PAGE_SIZE must be a valid u64")?;

        let facet_trace_queries = env::var("FACET_TRACE_QUERIES")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let facet_statement_timeout_secs = env::var("FACET_STATEMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("FACET_STATEMENT_TIMEOUT_SECS must be a valid u64")?;

        Ok(Self {
            database_url,
            database_max_connections,
            facet_page_size: facet_page_size.clamp(1, MAX_FACET_PAGE_SIZE),
            facet_trace_queries,
            facet_statement_timeout_secs,
        })
    }
}

/// Interpret a boolean-ish environment value.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
