//! Catalogue resource (`base_resourcebase` row).

use serde::{Deserialize, Serialize};

/// A resource in the catalogue: dataset, map, document, etc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resource {
    pub id: i64,
    pub title: String,
    pub resource_type: String,
    pub owner_id: i64,
    pub is_published: bool,

    /// Owning group, if any.
    pub group_id: Option<i64>,
}
