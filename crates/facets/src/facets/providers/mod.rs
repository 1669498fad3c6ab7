//! Built-in facet providers.

pub mod group;

pub use group::GroupFacetProvider;
