//! Facet service for answering facet requests.
//!
//! Sits between the search API and the registry:
//! - page/page_size to `[start, end)` conversion with a size cap
//! - facet listing with optional first-page topics
//! - per-facet lookups by name

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::provider::FacetProvider;
use super::query::ResourceQuery;
use super::registry::FacetRegistry;
use super::types::{
    DEFAULT_FACET_PAGE_SIZE, FacetInfo, FacetItem, FacetKey, FacetRequest, MAX_FACET_PAGE_SIZE,
    Topic,
};
use crate::error::{FacetError, FacetResult};
use crate::models::UserContext;

/// Paging and filtering for a single facet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetPageRequest {
    /// Zero-based page number.
    #[serde(default)]
    pub page: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u64,

    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default)]
    pub topic_contains: Option<String>,

    #[serde(default)]
    pub keys: Vec<FacetKey>,
}

fn default_page_size() -> u64 {
    DEFAULT_FACET_PAGE_SIZE
}

fn default_lang() -> String {
    "en".to_string()
}

impl Default for FacetPageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: default_page_size(),
            lang: default_lang(),
            topic_contains: None,
            keys: Vec::new(),
        }
    }
}

/// One page of facet items with its paging metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicsPage {
    pub page: u64,
    pub page_size: u64,
    pub start: u64,
    /// Number of facet values across all pages.
    pub total: u64,
    pub items: Vec<FacetItem>,
}

/// A facet descriptor, with topics when they were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetResponse {
    #[serde(flatten)]
    pub info: FacetInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<TopicsPage>,
}

/// Service answering facet requests from a registry.
#[derive(Debug, Clone)]
pub struct FacetService {
    registry: Arc<FacetRegistry>,
    default_page_size: u64,
}

impl FacetService {
    pub fn new(registry: Arc<FacetRegistry>) -> Self {
        Self {
            registry,
            default_page_size: DEFAULT_FACET_PAGE_SIZE,
        }
    }

    /// Page size used by `list_facets` when topics are included.
    pub fn with_default_page_size(mut self, page_size: u64) -> Self {
        self.default_page_size = page_size.clamp(1, MAX_FACET_PAGE_SIZE);
        self
    }

    pub fn registry(&self) -> &FacetRegistry {
        &self.registry
    }

    /// Describe every registered facet, optionally with its first page of
    /// topics.
    pub async fn list_facets(
        &self,
        queryset: &ResourceQuery,
        lang: &str,
        user: Option<&UserContext>,
        include_topics: bool,
    ) -> FacetResult<Vec<FacetResponse>> {
        let mut facets = Vec::with_capacity(self.registry.len());

        for provider in self.registry.providers() {
            let info = provider.get_info(lang);
            let topics = if include_topics {
                let request = FacetPageRequest {
                    page_size: self.default_page_size,
                    lang: lang.to_string(),
                    ..FacetPageRequest::default()
                };
                Some(self.topics_page(provider.as_ref(), queryset, &request, user).await?)
            } else {
                None
            };
            facets.push(FacetResponse { info, topics });
        }

        Ok(facets)
    }

    /// Describe one facet with the requested page of topics.
    pub async fn get_facet(
        &self,
        name: &str,
        queryset: &ResourceQuery,
        request: &FacetPageRequest,
        user: Option<&UserContext>,
    ) -> FacetResult<FacetResponse> {
        let provider = self
            .registry
            .get_provider(name)
            .ok_or_else(|| FacetError::UnknownFacet(name.to_string()))?;

        let info = provider.get_info(&request.lang);
        let topics = self.topics_page(provider.as_ref(), queryset, request, user).await?;

        Ok(FacetResponse {
            info,
            topics: Some(topics),
        })
    }

    /// Resolve keys of one facet to labels.
    pub async fn get_topics(
        &self,
        name: &str,
        keys: &[FacetKey],
        lang: &str,
        user: Option<&UserContext>,
    ) -> FacetResult<Vec<Topic>> {
        let provider = self
            .registry
            .get_provider(name)
            .ok_or_else(|| FacetError::UnknownFacet(name.to_string()))?;

        provider.get_topics(keys, lang, user).await
    }

    async fn topics_page(
        &self,
        provider: &dyn FacetProvider,
        queryset: &ResourceQuery,
        request: &FacetPageRequest,
        user: Option<&UserContext>,
    ) -> FacetResult<TopicsPage> {
        let page_size = capped_page_size(request.page_size)?;
        let start = request.page.saturating_mul(page_size);
        let end = start.saturating_add(page_size);

        let facet_request = FacetRequest {
            start,
            end,
            lang: request.lang.clone(),
            topic_contains: request.topic_contains.clone(),
            keys: request.keys.clone(),
            user: user.cloned(),
        };

        let page = provider.get_facet_items(queryset, &facet_request).await?;

        Ok(TopicsPage {
            page: request.page,
            page_size,
            start,
            total: page.count,
            items: page.items,
        })
    }
}

/// Validate a requested page size, capping it at `MAX_FACET_PAGE_SIZE`.
fn capped_page_size(requested: u64) -> FacetResult<u64> {
    if requested == 0 {
        return Err(FacetError::InvalidPage { start: 0, end: 0 });
    }
    if requested > MAX_FACET_PAGE_SIZE {
        tracing::warn!(
            requested,
            capped = MAX_FACET_PAGE_SIZE,
            "facet page_size exceeds maximum, capping"
        );
        return Ok(MAX_FACET_PAGE_SIZE);
    }
    Ok(requested)
}
