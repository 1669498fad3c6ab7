//! Facet query builder using SeaQuery.
//!
//! Generates PostgreSQL for:
//! - the caller's base resource query (`ResourceQuery`)
//! - the grouped count-per-group page query
//! - the total count of facet values over the unsliced grouped query

use sea_query::{
    Alias, Asterisk, Expr, Func, Iden, Order, PostgresQueryBuilder, Query, SelectStatement,
    SimpleExpr,
};
use serde::{Deserialize, Serialize};

#[derive(Iden)]
enum ResourceBase {
    #[iden = "base_resourcebase"]
    Table,
    Id,
    Title,
    ResourceType,
    OwnerId,
    IsPublished,
    GroupId,
}

#[derive(Iden)]
enum AuthGroup {
    #[iden = "auth_group"]
    Table,
    Id,
    Name,
}

/// A condition on the base resource query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ResourceFilter {
    /// Resource type is one of these (`dataset`, `map`, ...).
    ResourceType(Vec<String>),
    /// Published flag equals this value.
    Published(bool),
    /// Title contains this text, case-insensitively.
    TitleContains(String),
    /// Owned by this user.
    Owner(i64),
    /// Resource id is one of these.
    Ids(Vec<i64>),
}

/// The base query over resources that facets are computed for.
///
/// Callers build it from the search request before handing it to a
/// provider; an empty query matches every resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuery {
    #[serde(default)]
    pub filters: Vec<ResourceFilter>,
}

impl ResourceQuery {
    /// Query matching every resource.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a filter.
    pub fn filter(mut self, filter: ResourceFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Restrict to the given resource types.
    pub fn resource_types<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter(ResourceFilter::ResourceType(
            types.into_iter().map(Into::into).collect(),
        ))
    }

    /// Restrict by published flag.
    pub fn published(self, published: bool) -> Self {
        self.filter(ResourceFilter::Published(published))
    }

    /// Add the WHERE conditions of this query to a statement over
    /// `base_resourcebase`.
    pub fn apply(&self, query: &mut SelectStatement) {
        for filter in &self.filters {
            query.and_where(resource_condition(filter));
        }
    }
}

/// Build the SQL condition for a single resource filter.
fn resource_condition(filter: &ResourceFilter) -> SimpleExpr {
    match filter {
        ResourceFilter::ResourceType(types) => {
            if types.is_empty() {
                return Expr::cust("FALSE");
            }
            Expr::col((ResourceBase::Table, ResourceBase::ResourceType)).is_in(types.clone())
        }
        ResourceFilter::Published(published) => {
            Expr::col((ResourceBase::Table, ResourceBase::IsPublished)).eq(*published)
        }
        ResourceFilter::TitleContains(text) => {
            ilike_contains(ResourceBase::Table, ResourceBase::Title, text)
        }
        ResourceFilter::Owner(owner_id) => {
            Expr::col((ResourceBase::Table, ResourceBase::OwnerId)).eq(*owner_id)
        }
        ResourceFilter::Ids(ids) => {
            if ids.is_empty() {
                return Expr::cust("FALSE");
            }
            Expr::col((ResourceBase::Table, ResourceBase::Id)).is_in(ids.iter().copied())
        }
    }
}

/// Case-insensitive substring match, with LIKE wildcards in `text` escaped.
fn ilike_contains(table: impl Iden, column: impl Iden, text: &str) -> SimpleExpr {
    Expr::cust_with_values(
        format!(
            "\"{}\".\"{}\" ILIKE $1",
            table.to_string(),
            column.to_string()
        ),
        [format!("%{}%", escape_like_wildcards(text))],
    )
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Count of resources per group over a base query, limited to the groups
/// the requesting user can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFacetQuery {
    pub base: ResourceQuery,

    /// Group ids visible to the requesting user. Empty means none.
    pub visible_group_ids: Vec<i64>,

    /// Only groups whose name contains this text (case-insensitive).
    pub name_contains: Option<String>,

    /// Only these group ids. Empty means no restriction.
    pub group_ids: Vec<i64>,
}

impl GroupFacetQuery {
    /// Create a query over `base` restricted to `visible_group_ids`.
    pub fn new(base: ResourceQuery, visible_group_ids: Vec<i64>) -> Self {
        Self {
            base,
            visible_group_ids,
            name_contains: None,
            group_ids: Vec::new(),
        }
    }

    /// Only count groups whose name contains `text`. Blank text is ignored.
    pub fn with_name_contains(mut self, text: Option<&str>) -> Self {
        self.name_contains = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self
    }

    /// Only count these groups.
    pub fn with_group_ids(mut self, group_ids: Vec<i64>) -> Self {
        self.group_ids = group_ids;
        self
    }

    /// Build the page query returning `group_id`, `group_name` and `count`
    /// for rows `[start, end)`.
    pub fn build_page(&self, start: u64, end: u64) -> String {
        let mut query = self.grouped();

        query
            .order_by(Alias::new("count"), Order::Desc)
            .order_by((AuthGroup::Table, AuthGroup::Id), Order::Asc);

        query.limit(end.saturating_sub(start));
        query.offset(start);

        query.to_string(PostgresQueryBuilder)
    }

    /// Build a COUNT query over the unsliced grouped query: the number of
    /// distinct visible groups with at least one matching resource.
    pub fn build_count(&self) -> String {
        Query::select()
            .expr(Expr::col(Asterisk).count())
            .from_subquery(self.grouped(), Alias::new("facets"))
            .to_string(PostgresQueryBuilder)
    }

    /// The grouped statement shared by the page and count queries.
    fn grouped(&self) -> SelectStatement {
        let mut query = Query::select();

        query
            .expr_as(
                Func::cast_as(
                    Expr::col((AuthGroup::Table, AuthGroup::Id)),
                    Alias::new("bigint"),
                ),
                Alias::new("group_id"),
            )
            .expr_as(
                Expr::col((AuthGroup::Table, AuthGroup::Name)),
                Alias::new("group_name"),
            )
            .expr_as(
                Expr::col((ResourceBase::Table, ResourceBase::Id)).count(),
                Alias::new("count"),
            )
            .from(ResourceBase::Table)
            .inner_join(
                AuthGroup::Table,
                Expr::col((ResourceBase::Table, ResourceBase::GroupId))
                    .equals((AuthGroup::Table, AuthGroup::Id)),
            );

        self.base.apply(&mut query);

        // No visible groups must restrict to nothing, never widen.
        if self.visible_group_ids.is_empty() {
            query.and_where(Expr::cust("FALSE"));
        } else {
            query.and_where(
                Expr::col((ResourceBase::Table, ResourceBase::GroupId))
                    .is_in(self.visible_group_ids.iter().copied()),
            );
        }

        if let Some(ref text) = self.name_contains {
            query.and_where(ilike_contains(AuthGroup::Table, AuthGroup::Name, text));
        }

        if !self.group_ids.is_empty() {
            query.and_where(
                Expr::col((AuthGroup::Table, AuthGroup::Id)).is_in(self.group_ids.iter().copied()),
            );
        }

        query
            .group_by_col((AuthGroup::Table, AuthGroup::Id))
            .group_by_col((AuthGroup::Table, AuthGroup::Name));

        query
    }
}
