//! Group facet: resources counted per owning group.
//!
//! Only groups visible to the requesting user are counted, so the facet
//! never leaks the existence of private groups.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, trace};

use crate::error::{FacetError, FacetResult};
use crate::facets::provider::FacetProvider;
use crate::facets::query::{GroupFacetQuery, ResourceQuery};
use crate::facets::registry::FacetRegistry;
use crate::facets::types::{
    FacetInfo, FacetItem, FacetKey, FacetPage, FacetRequest, FacetType, Topic,
};
use crate::models::UserContext;
use crate::security::GroupVisibility;
use crate::store::FacetStore;

/// Facet name.
pub const GROUP_FACET_NAME: &str = "group";

/// Filter expression the UI uses to narrow searches by group.
pub const GROUP_FACET_FILTER: &str = "filter{group.in}";

/// Counts resources per visible group.
pub struct GroupFacetProvider {
    store: Arc<dyn FacetStore>,
    visibility: Arc<dyn GroupVisibility>,
    trace_queries: bool,
}

impl GroupFacetProvider {
    pub fn new(store: Arc<dyn FacetStore>, visibility: Arc<dyn GroupVisibility>) -> Self {
        Self {
            store,
            visibility,
            trace_queries: false,
        }
    }

    /// Log the rendered SQL at trace level.
    pub fn with_trace_queries(mut self, trace_queries: bool) -> Self {
        self.trace_queries = trace_queries;
        self
    }

    /// Build a provider from its collaborators and add it to `registry`.
    pub fn register(
        registry: &mut FacetRegistry,
        store: Arc<dyn FacetStore>,
        visibility: Arc<dyn GroupVisibility>,
        trace_queries: bool,
    ) -> Arc<Self> {
        let provider = Arc::new(Self::new(store, visibility).with_trace_queries(trace_queries));
        registry.register_facet_provider(provider.clone());
        provider
    }

    /// Ids of the groups `user` can see.
    async fn visible_group_ids(&self, user: &UserContext) -> FacetResult<Vec<i64>> {
        let mut ids: Vec<i64> = self
            .visibility
            .visible_groups(user)
            .await?
            .into_iter()
            .map(|g| g.group_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// Interpret facet keys as group ids.
    fn group_ids(&self, keys: &[FacetKey]) -> FacetResult<Vec<i64>> {
        keys.iter()
            .map(|key| {
                key.as_i64().ok_or_else(|| FacetError::InvalidKey {
                    facet: GROUP_FACET_NAME.to_string(),
                    key: key.to_string(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl FacetProvider for GroupFacetProvider {
    fn name(&self) -> &str {
        GROUP_FACET_NAME
    }

    fn get_info(&self, _lang: &str) -> FacetInfo {
        FacetInfo {
            name: GROUP_FACET_NAME.to_string(),
            filter: GROUP_FACET_FILTER.to_string(),
            label: "Group".to_string(),
            facet_type: FacetType::Category,
        }
    }

    async fn get_facet_items(
        &self,
        queryset: &ResourceQuery,
        request: &FacetRequest,
    ) -> FacetResult<FacetPage> {
        debug!(facet = GROUP_FACET_NAME, "retrieving facet items");

        let user = request.user.as_ref().ok_or(FacetError::MissingUser)?;
        if request.start > request.end {
            return Err(FacetError::InvalidPage {
                start: request.start,
                end: request.end,
            });
        }

        let group_ids = self.group_ids(&request.keys)?;
        let visible = self.visible_group_ids(user).await?;

        let query = GroupFacetQuery::new(queryset.clone(), visible)
            .with_name_contains(request.topic_contains.as_deref())
            .with_group_ids(group_ids);

        if self.trace_queries {
            trace!(
                facet = GROUP_FACET_NAME,
                count_sql = %query.build_count(),
                page_sql = %query.build_page(request.start, request.end),
                "facet queries"
            );
        }

        let count = self.store.count_groups(&query).await?;
        info!(facet = GROUP_FACET_NAME, count, "found facets");

        let items = if request.page_len() == 0 || request.start >= count {
            Vec::new()
        } else {
            self.store
                .fetch_group_counts(&query, request.start, request.end)
                .await?
                .into_iter()
                .map(|row| FacetItem {
                    key: FacetKey::Int(row.group_id),
                    label: row.group_name,
                    count: row.count,
                })
                .collect()
        };

        Ok(FacetPage { count, items })
    }

    async fn get_topics(
        &self,
        keys: &[FacetKey],
        _lang: &str,
        user: Option<&UserContext>,
    ) -> FacetResult<Vec<Topic>> {
        let user = user.ok_or(FacetError::MissingUser)?;
        let ids = self.group_ids(keys)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let visible = self.visible_group_ids(user).await?;
        let groups = self.store.find_groups(&ids, &visible).await?;

        debug!(
            facet = GROUP_FACET_NAME,
            requested = ids.len(),
            resolved = groups.len(),
            "resolved topics"
        );

        Ok(groups
            .into_iter()
            .map(|g| Topic {
                key: FacetKey::Int(g.id),
                label: g.name,
            })
            .collect())
    }
}
