//! Group visibility resolution.
//!
//! - Superusers and staff see every group.
//! - Authenticated users see non-private groups plus the groups they
//!   belong to.
//! - Anonymous users see non-private groups only.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::error::FacetResult;
use crate::models::{GroupAccess, UserContext, VisibleGroup};

/// Resolves which groups a user is allowed to see.
#[async_trait]
pub trait GroupVisibility: Send + Sync {
    async fn visible_groups(&self, user: &UserContext) -> FacetResult<Vec<VisibleGroup>>;
}

/// Visibility backed by the group profile and membership tables.
#[derive(Clone)]
pub struct PgGroupVisibility {
    pool: PgPool,
}

impl PgGroupVisibility {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Every group with a profile.
const ALL_GROUPS_SQL: &str =
    "SELECT DISTINCT gp.group_id::bigint AS group_id FROM groups_groupprofile gp";

/// Non-private groups plus the groups `$1` is a member of. `$2` is the
/// private access value.
const MEMBER_GROUPS_SQL: &str = r#"
    SELECT DISTINCT gp.group_id::bigint AS group_id
    FROM groups_groupprofile gp
    LEFT JOIN groups_groupmember gm
        ON gm.group_id = gp.id AND gm.user_id = $1
    WHERE gp.access <> $2 OR gm.user_id IS NOT NULL
"#;

/// Non-private groups. `$1` is the private access value.
const PUBLIC_GROUPS_SQL: &str = "SELECT DISTINCT gp.group_id::bigint AS group_id \
     FROM groups_groupprofile gp WHERE gp.access <> $1";

/// Which visibility rule applies to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisibilityScope {
    All,
    Member(i64),
    Public,
}

impl VisibilityScope {
    fn for_user(user: &UserContext) -> Self {
        if user.is_privileged() {
            Self::All
        } else if let Some(user_id) = user.id {
            Self::Member(user_id)
        } else {
            Self::Public
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Self::All => ALL_GROUPS_SQL,
            Self::Member(_) => MEMBER_GROUPS_SQL,
            Self::Public => PUBLIC_GROUPS_SQL,
        }
    }
}

#[async_trait]
impl GroupVisibility for PgGroupVisibility {
    async fn visible_groups(&self, user: &UserContext) -> FacetResult<Vec<VisibleGroup>> {
        let scope = VisibilityScope::for_user(user);
        let query = sqlx::query_as::<_, VisibleGroup>(scope.sql());
        let query = match scope {
            VisibilityScope::All => query,
            VisibilityScope::Member(user_id) => query
                .bind(user_id)
                .bind(GroupAccess::Private.as_str()),
            VisibilityScope::Public => query.bind(GroupAccess::Private.as_str()),
        };
        let groups = query.fetch_all(&self.pool).await?;

        debug!(
            user_id = ?user.id,
            groups = groups.len(),
            "resolved visible groups"
        );

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn privileged_users_see_every_profiled_group() {
        let staff = UserContext {
            is_staff: true,
            ..UserContext::authenticated(2)
        };
        for user in [UserContext::superuser(1), staff] {
            assert_eq!(VisibilityScope::for_user(&user), VisibilityScope::All);
        }

        let sql = VisibilityScope::All.sql();
        assert_eq!(
            sql,
            "SELECT DISTINCT gp.group_id::bigint AS group_id FROM groups_groupprofile gp"
        );
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn members_see_public_and_joined_groups() {
        let scope = VisibilityScope::for_user(&UserContext::authenticated(7));
        assert_eq!(scope, VisibilityScope::Member(7));

        let sql = normalize(scope.sql());
        assert!(sql.starts_with(
            "SELECT DISTINCT gp.group_id::bigint AS group_id FROM groups_groupprofile gp"
        ));
        assert!(sql.contains(
            "LEFT JOIN groups_groupmember gm ON gm.group_id = gp.id AND gm.user_id = $1"
        ));
        assert!(sql.ends_with("WHERE gp.access <> $2 OR gm.user_id IS NOT NULL"));
    }

    #[test]
    fn anonymous_users_see_non_private_groups() {
        let scope = VisibilityScope::for_user(&UserContext::anonymous());
        assert_eq!(scope, VisibilityScope::Public);

        assert_eq!(
            normalize(scope.sql()),
            "SELECT DISTINCT gp.group_id::bigint AS group_id \
             FROM groups_groupprofile gp WHERE gp.access <> $1"
        );
        assert!(!scope.sql().contains("groups_groupmember"));
        assert_eq!(GroupAccess::Private.as_str(), "private");
    }
}
