//! Facet test utilities.
//!
//! Helpers for integration testing: resource and group fixtures, and an
//! in-memory catalogue that implements both `FacetStore` and
//! `GroupVisibility` with the same semantics as the PostgreSQL versions.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use geonode_facets::FacetResult;
use geonode_facets::facets::{GroupFacetQuery, ResourceFilter, ResourceQuery};
use geonode_facets::models::{Group, GroupAccess, GroupCount, Resource, UserContext, VisibleGroup};
use geonode_facets::security::GroupVisibility;
use geonode_facets::store::FacetStore;

/// Create a test resource with default values.
pub fn test_resource(id: i64, title: &str) -> TestResource {
    TestResource {
        id,
        title: title.to_string(),
        resource_type: "dataset".to_string(),
        owner_id: 1,
        is_published: true,
        group_id: None,
    }
}

/// A test resource builder for creating fixtures.
#[derive(Debug, Clone)]
pub struct TestResource {
    pub id: i64,
    pub title: String,
    pub resource_type: String,
    pub owner_id: i64,
    pub is_published: bool,
    pub group_id: Option<i64>,
}

impl TestResource {
    /// Set the owning group.
    pub fn in_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Set the resource type.
    pub fn of_type(mut self, resource_type: &str) -> Self {
        self.resource_type = resource_type.to_string();
        self
    }

    /// Set the owner.
    pub fn with_owner(mut self, owner_id: i64) -> Self {
        self.owner_id = owner_id;
        self
    }

    /// Set as unpublished.
    pub fn unpublished(mut self) -> Self {
        self.is_published = false;
        self
    }

    pub fn build(self) -> Resource {
        Resource {
            id: self.id,
            title: self.title,
            resource_type: self.resource_type,
            owner_id: self.owner_id,
            is_published: self.is_published,
            group_id: self.group_id,
        }
    }
}

/// A group with its profile settings.
#[derive(Debug, Clone)]
pub struct TestGroup {
    pub group: Group,
    pub access: GroupAccess,
    pub members: HashSet<i64>,
}

/// Create a public test group.
pub fn test_group(id: i64, name: &str) -> TestGroup {
    TestGroup {
        group: Group {
            id,
            name: name.to_string(),
        },
        access: GroupAccess::Public,
        members: HashSet::new(),
    }
}

impl TestGroup {
    /// Make the group private.
    pub fn private(mut self) -> Self {
        self.access = GroupAccess::Private;
        self
    }

    /// Make the group invitation-only.
    pub fn invite_only(mut self) -> Self {
        self.access = GroupAccess::PublicInvite;
        self
    }

    /// Add a member.
    pub fn with_member(mut self, user_id: i64) -> Self {
        self.members.insert(user_id);
        self
    }
}

/// In-memory catalogue of groups and resources.
#[derive(Debug, Default)]
pub struct MemoryCatalogue {
    groups: Vec<TestGroup>,
    resources: Vec<Resource>,
    count_queries: AtomicUsize,
    page_queries: AtomicUsize,
}

impl MemoryCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group.
    pub fn with_group(mut self, group: TestGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Add a resource.
    pub fn with_resource(mut self, resource: TestResource) -> Self {
        self.resources.push(resource.build());
        self
    }

    /// All resources.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Number of count queries executed.
    pub fn count_queries(&self) -> usize {
        self.count_queries.load(Ordering::SeqCst)
    }

    /// Number of page queries executed.
    pub fn page_queries(&self) -> usize {
        self.page_queries.load(Ordering::SeqCst)
    }

    fn group(&self, id: i64) -> Option<&Group> {
        self.groups.iter().map(|g| &g.group).find(|g| g.id == id)
    }

    /// Grouped rows for `query`, ordered by count descending then id.
    fn grouped(&self, query: &GroupFacetQuery) -> Vec<GroupCount> {
        let visible: HashSet<i64> = query.visible_group_ids.iter().copied().collect();
        let keys: HashSet<i64> = query.group_ids.iter().copied().collect();
        let name_contains = query.name_contains.as_ref().map(|t| t.to_lowercase());

        let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
        for resource in &self.resources {
            if !matches_query(&query.base, resource) {
                continue;
            }
            let Some(group_id) = resource.group_id else {
                continue;
            };
            let Some(group) = self.group(group_id) else {
                continue;
            };
            if !visible.contains(&group_id) {
                continue;
            }
            if !keys.is_empty() && !keys.contains(&group_id) {
                continue;
            }
            if let Some(ref text) = name_contains
                && !group.name.to_lowercase().contains(text.as_str())
            {
                continue;
            }
            *counts.entry(group_id).or_default() += 1;
        }

        let mut rows: Vec<GroupCount> = counts
            .into_iter()
            .filter_map(|(group_id, count)| {
                self.group(group_id).map(|g| GroupCount {
                    group_id,
                    group_name: g.name.clone(),
                    count,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.group_id.cmp(&b.group_id)));
        rows
    }
}

/// Evaluate a base resource query against one resource.
pub fn matches_query(query: &ResourceQuery, resource: &Resource) -> bool {
    query.filters.iter().all(|filter| match filter {
        ResourceFilter::ResourceType(types) => types.contains(&resource.resource_type),
        ResourceFilter::Published(published) => resource.is_published == *published,
        ResourceFilter::TitleContains(text) => resource
            .title
            .to_lowercase()
            .contains(&text.to_lowercase()),
        ResourceFilter::Owner(owner_id) => resource.owner_id == *owner_id,
        ResourceFilter::Ids(ids) => ids.contains(&resource.id),
    })
}

#[async_trait]
impl FacetStore for MemoryCatalogue {
    async fn count_groups(&self, query: &GroupFacetQuery) -> FacetResult<u64> {
        self.count_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.grouped(query).len() as u64)
    }

    async fn fetch_group_counts(
        &self,
        query: &GroupFacetQuery,
        start: u64,
        end: u64,
    ) -> FacetResult<Vec<GroupCount>> {
        self.page_queries.fetch_add(1, Ordering::SeqCst);
        let take = end.saturating_sub(start) as usize;
        Ok(self
            .grouped(query)
            .into_iter()
            .skip(start as usize)
            .take(take)
            .collect())
    }

    async fn find_groups(&self, ids: &[i64], visible_ids: &[i64]) -> FacetResult<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .groups
            .iter()
            .map(|g| &g.group)
            .filter(|g| ids.contains(&g.id) && visible_ids.contains(&g.id))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }
}

#[async_trait]
impl GroupVisibility for MemoryCatalogue {
    async fn visible_groups(&self, user: &UserContext) -> FacetResult<Vec<VisibleGroup>> {
        Ok(self
            .groups
            .iter()
            .filter(|g| {
                user.is_privileged()
                    || g.access.is_listed()
                    || user.id.is_some_and(|id| g.members.contains(&id))
            })
            .map(|g| VisibleGroup {
                group_id: g.group.id,
            })
            .collect())
    }
}
