//! Facet types shared by every provider.
//!
//! - FacetInfo: static descriptor returned by `get_info`
//! - FacetItem / FacetPage: counted facet values and their total
//! - Topic: a key resolved back to its display label
//! - FacetRequest: pagination, filtering and user for `get_facet_items`

use serde::{Deserialize, Serialize};

use crate::models::UserContext;

/// Default number of facet items per page.
pub const DEFAULT_FACET_PAGE_SIZE: u64 = 10;

/// Upper bound on facet items per page.
pub const MAX_FACET_PAGE_SIZE: u64 = 100;

/// How the search UI renders a facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetType {
    Base,
    Category,
    Keyword,
    Place,
    User,
    #[serde(rename = "select")]
    Thesaurus,
    Group,
}

/// Static facet descriptor consumed by the search API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetInfo {
    /// Facet name, unique within a registry.
    pub name: String,

    /// Filter expression the UI appends to search requests.
    pub filter: String,

    /// Display label.
    pub label: String,

    #[serde(rename = "type")]
    pub facet_type: FacetType,
}

/// Facet value identifier. Group facets use integer keys; other facets
/// may key by identifier strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetKey {
    Int(i64),
    Text(String),
}

impl FacetKey {
    /// Integer value of this key, parsing string keys.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FacetKey::Int(v) => Some(*v),
            FacetKey::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for FacetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacetKey::Int(v) => write!(f, "{v}"),
            FacetKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FacetKey {
    fn from(value: i64) -> Self {
        FacetKey::Int(value)
    }
}

impl From<&str> for FacetKey {
    fn from(value: &str) -> Self {
        FacetKey::Text(value.to_string())
    }
}

/// A counted facet value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetItem {
    pub key: FacetKey,
    pub label: String,
    pub count: u64,
}

/// A facet key with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub key: FacetKey,
    pub label: String,
}

/// One page of facet items plus the total number of facet values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FacetPage {
    /// Number of distinct facet values across all pages.
    pub count: u64,
    pub items: Vec<FacetItem>,
}

/// Parameters for `FacetProvider::get_facet_items`.
#[derive(Debug, Clone)]
pub struct FacetRequest {
    /// First item index (inclusive).
    pub start: u64,

    /// Last item index (exclusive).
    pub end: u64,

    pub lang: String,

    /// Only count facet values whose label contains this text.
    pub topic_contains: Option<String>,

    /// Only count these facet values.
    pub keys: Vec<FacetKey>,

    /// Requesting user. Providers that filter by visibility require it.
    pub user: Option<UserContext>,
}

impl Default for FacetRequest {
    fn default() -> Self {
        Self {
            start: 0,
            end: DEFAULT_FACET_PAGE_SIZE,
            lang: "en".to_string(),
            topic_contains: None,
            keys: Vec::new(),
            user: None,
        }
    }
}

impl FacetRequest {
    /// Request the first page for a user.
    pub fn for_user(user: UserContext) -> Self {
        Self {
            user: Some(user),
            ..Self::default()
        }
    }

    /// Set the `[start, end)` window.
    pub fn with_range(mut self, start: u64, end: u64) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Maximum number of items this request can return.
    pub fn page_len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}
