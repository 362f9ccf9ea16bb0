//! `edgegate-core` — request gating decisions.
//!
//! This crate is intentionally decoupled from any HTTP server: it turns a
//! [`GateRequest`] into a [`Directive`] and leaves applying it to the caller.

pub mod config;
pub mod cookie;
pub mod directive;
pub mod domain;
pub mod error;
pub mod gate;
pub mod language;
pub mod matcher;
pub mod org;
pub mod request;

pub use config::GateConfig;
pub use cookie::{CookieLifetime, CookieSpec, set_cookie_headers};
pub use directive::{Directive, ResponseHeader};
pub use domain::cookie_domain;
pub use error::{JoinOrgError, JoinOrgResult};
pub use gate::{Gate, credential};
pub use language::LanguageNegotiator;
pub use matcher::is_gated;
pub use org::{JoinOrgRequest, JoinOrgResponse, OrgJoiner};
pub use request::GateRequest;
