//! Database connection pool management.

use anyhow::{Context, Result, bail};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

/// Catalogue tables the facet queries read.
pub const CATALOGUE_TABLES: &[&str] = &[
    "base_resourcebase",
    "auth_group",
    "groups_groupprofile",
    "groups_groupmember",
    "people_profile",
];

/// Names from `$1` that do not resolve to a relation.
const MISSING_TABLES_SQL: &str =
    "SELECT t FROM unnest($1::text[]) AS t WHERE to_regclass(t) IS NULL ORDER BY t";

/// Create a PostgreSQL connection pool.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    Ok(pool)
}

/// Fail unless the database answers and has every catalogue table.
pub async fn check_catalogue(pool: &PgPool) -> Result<()> {
    let missing: Vec<String> = sqlx::query_scalar(MISSING_TABLES_SQL)
        .bind(CATALOGUE_TABLES)
        .fetch_all(pool)
        .await
        .context("database health check failed")?;

    if !missing.is_empty() {
        bail!("catalogue tables missing: {}", missing.join(", "));
    }

    Ok(())
}
