//! The facet provider contract.

use async_trait::async_trait;

use super::query::ResourceQuery;
use super::types::{FacetInfo, FacetKey, FacetPage, FacetRequest, Topic};
use crate::error::FacetResult;
use crate::models::UserContext;

/// A pluggable facet dimension.
///
/// The registry holds providers as `Arc<dyn FacetProvider>` and the search
/// layer treats every dimension uniformly through this trait.
#[async_trait]
pub trait FacetProvider: Send + Sync {
    /// Unique facet name.
    fn name(&self) -> &str;

    /// Static descriptor for the search UI.
    fn get_info(&self, lang: &str) -> FacetInfo;

    /// Count facet values over `queryset` and return the requested page.
    async fn get_facet_items(
        &self,
        queryset: &ResourceQuery,
        request: &FacetRequest,
    ) -> FacetResult<FacetPage>;

    /// Resolve facet keys to display labels.
    async fn get_topics(
        &self,
        keys: &[FacetKey],
        lang: &str,
        user: Option<&UserContext>,
    ) -> FacetResult<Vec<Topic>>;
}
