//! Group models.
//!
//! Groups live in `auth_group`; their catalogue settings (access level,
//! membership) live in `groups_groupprofile` and `groups_groupmember`.

use serde::{Deserialize, Serialize};

/// A group (`auth_group` row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

/// Access level of a group profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupAccess {
    /// Anyone can see and join.
    Public,
    /// Anyone can see; joining needs an invitation.
    PublicInvite,
    /// Only members can see.
    Private,
}

impl GroupAccess {
    /// Value stored in `groups_groupprofile.access`.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupAccess::Public => "public",
            GroupAccess::PublicInvite => "public-invite",
            GroupAccess::Private => "private",
        }
    }

    /// Whether non-members may see the group.
    pub fn is_listed(&self) -> bool {
        !matches!(self, GroupAccess::Private)
    }
}

/// A group the requesting user is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct VisibleGroup {
    pub group_id: i64,
}

/// One row of the grouped facet query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub group_id: i64,
    pub group_name: String,
    pub count: u64,
}
