use axum::{Router, routing::get};

pub mod system;

/// Routes served by the gate itself, outside the gating layer.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/healthz", get(system::health))
}
