//! Faceted search module.
//!
//! This module provides:
//! - FacetProvider: the contract every facet dimension implements
//! - FacetRegistry: providers indexed by facet name
//! - FacetService: page-based facet requests over a registry
//! - GroupFacetQuery / ResourceQuery: SeaQuery-based SQL generation
//! - Types: FacetInfo, FacetItem, FacetRequest, etc.

mod provider;
pub mod providers;
pub mod query;
mod registry;
mod service;
pub mod types;

pub use provider::FacetProvider;
pub use providers::GroupFacetProvider;
pub use query::{GroupFacetQuery, ResourceFilter, ResourceQuery};
pub use registry::FacetRegistry;
pub use service::{FacetPageRequest, FacetResponse, FacetService, TopicsPage};
pub use types::{
    DEFAULT_FACET_PAGE_SIZE, FacetInfo, FacetItem, FacetKey, FacetPage, FacetRequest, FacetType,
    MAX_FACET_PAGE_SIZE, Topic,
};
