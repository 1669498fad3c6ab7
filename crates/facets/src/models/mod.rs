//! Catalogue models read by the facet providers.

pub mod group;
pub mod resource;
pub mod user;

pub use group::{Group, GroupAccess, GroupCount, VisibleGroup};
pub use resource::Resource;
pub use user::UserContext;
