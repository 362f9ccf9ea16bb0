//! Infrastructure layer: clients for external collaborators.

pub mod config;
pub mod org_join;

pub use config::BackendConfig;
pub use org_join::HttpOrgJoiner;
