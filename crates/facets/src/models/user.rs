//! Requesting user, as far as facet visibility is concerned.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// The user a facet request is evaluated for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    /// Profile id; `None` for anonymous requests.
    pub id: Option<i64>,

    /// Superusers see every group.
    #[serde(default)]
    pub is_superuser: bool,

    /// Staff see every group.
    #[serde(default)]
    pub is_staff: bool,
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i64,
    is_superuser: bool,
    is_staff: bool,
}

impl UserContext {
    /// The anonymous user.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A regular authenticated user.
    pub fn authenticated(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// A superuser.
    pub fn superuser(id: i64) -> Self {
        Self {
            id: Some(id),
            is_superuser: true,
            is_staff: false,
        }
    }

    /// Check if this is the anonymous user.
    pub fn is_anonymous(&self) -> bool {
        self.id.is_none()
    }

    /// Superusers and staff bypass group visibility.
    pub fn is_privileged(&self) -> bool {
        self.is_superuser || self.is_staff
    }

    /// Load an active user profile by id.
    pub async fn load(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id::bigint AS id, is_superuser, is_staff FROM people_profile WHERE id = $1 AND is_active",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to load user profile")?;

        Ok(row.map(|r| Self {
            id: Some(r.id),
            is_superuser: r.is_superuser,
            is_staff: r.is_staff,
        }))
    }
}
