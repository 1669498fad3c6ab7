//! Facet query execution.
//!
//! `FacetStore` is the seam between providers and the database: providers
//! describe what to count with a `GroupFacetQuery`, the store runs it.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::FacetResult;
use crate::facets::query::GroupFacetQuery;
use crate::models::{Group, GroupCount};

/// Executes facet queries.
#[async_trait]
pub trait FacetStore: Send + Sync {
    /// Number of rows of the unsliced grouped query.
    async fn count_groups(&self, query: &GroupFacetQuery) -> FacetResult<u64>;

    /// Rows `[start, end)` of the grouped query.
    async fn fetch_group_counts(
        &self,
        query: &GroupFacetQuery,
        start: u64,
        end: u64,
    ) -> FacetResult<Vec<GroupCount>>;

    /// Groups whose id is in both `ids` and `visible_ids`, ordered by name.
    async fn find_groups(&self, ids: &[i64], visible_ids: &[i64]) -> FacetResult<Vec<Group>>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgFacetStore {
    pool: PgPool,
    statement_timeout: Duration,
}

#[derive(sqlx::FromRow)]
struct GroupCountRow {
    group_id: i64,
    group_name: String,
    count: i64,
}

impl PgFacetStore {
    /// Create a store with the default 10 second statement timeout.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            statement_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }
}

/// Statement that bounds every query of the current transaction.
fn timeout_statement(timeout: Duration) -> String {
    format!("SET LOCAL statement_timeout = '{}ms'", timeout.as_millis())
}

#[async_trait]
impl FacetStore for PgFacetStore {
    async fn count_groups(&self, query: &GroupFacetQuery) -> FacetResult<u64> {
        // SET LOCAL needs a transaction and resets on commit.
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        sqlx::query(&timeout_statement(self.statement_timeout))
            .execute(&mut *tx)
            .await
            .context("failed to set statement timeout")?;

        let count_sql = query.build_count();
        let total: i64 = sqlx::query_scalar(&count_sql)
            .fetch_one(&mut *tx)
            .await
            .context("failed to execute facet count query")?;

        tx.commit()
            .await
            .context("failed to commit facet count transaction")?;

        Ok(total.max(0) as u64)
    }

    async fn fetch_group_counts(
        &self,
        query: &GroupFacetQuery,
        start: u64,
        end: u64,
    ) -> FacetResult<Vec<GroupCount>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        sqlx::query(&timeout_statement(self.statement_timeout))
            .execute(&mut *tx)
            .await
            .context("failed to set statement timeout")?;

        let page_sql = query.build_page(start, end);
        let rows = sqlx::query_as::<_, GroupCountRow>(&page_sql)
            .fetch_all(&mut *tx)
            .await
            .context("failed to execute facet page query")?;

        tx.commit()
            .await
            .context("failed to commit facet page transaction")?;

        Ok(rows
            .into_iter()
            .map(|r| GroupCount {
                group_id: r.group_id,
                group_name: r.group_name,
                count: r.count.max(0) as u64,
            })
            .collect())
    }

    async fn find_groups(&self, ids: &[i64], visible_ids: &[i64]) -> FacetResult<Vec<Group>> {
        if ids.is_empty() || visible_ids.is_empty() {
            return Ok(Vec::new());
        }

        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT id::bigint AS id, name
            FROM auth_group
            WHERE id::bigint = ANY($1) AND id::bigint = ANY($2)
            ORDER BY name
            "#,
        )
        .bind(ids)
        .bind(visible_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }
}
