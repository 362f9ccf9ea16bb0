//! HTTP application wiring (Axum router + gate/proxy wiring).
//!
//! - `routes/`: endpoints the gate answers itself (health)
//! - `errors.rs`: consistent JSON error responses
//!
//! Everything else falls through to the upstream proxy, wrapped in the gate
//! middleware.

use std::sync::Arc;

use axum::Router;

use edgegate_core::Gate;
use edgegate_infra::HttpOrgJoiner;

use crate::config::ServerConfig;
use crate::middleware::{self, GateState};
use crate::proxy::{self, ProxyState};

pub mod errors;
pub mod routes;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub fn build_app(config: &ServerConfig) -> Result<Router, reqwest::Error> {
    let joiner = Arc::new(HttpOrgJoiner::new(&config.backend)?);
    let gate = Arc::new(Gate::new(config.gate.clone(), joiner));
    let proxy = ProxyState::new(config.upstream_url.clone())?;
    Ok(router(gate, proxy))
}

/// Router around an already-built gate and upstream proxy.
pub fn router(gate: Arc<Gate>, proxy: ProxyState) -> Router {
    let gate_state = GateState { gate };

    // Gated fallback first; routes added after the layer are not gated.
    Router::new()
        .fallback(proxy::forward)
        .layer(axum::middleware::from_fn_with_state(
            gate_state,
            middleware::gate_middleware,
        ))
        .merge(routes::router())
        .with_state(proxy)
}
