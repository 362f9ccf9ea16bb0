//! Pass-through forwarding to the upstream web application.

use axum::{
    body::{Body, to_bytes},
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::app::errors::json_error;

/// Largest request body forwarded upstream.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::Body(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_body", msg),
            ProxyError::Upstream(e) => {
                json_error(StatusCode::BAD_GATEWAY, "upstream_unavailable", e.to_string())
            }
        }
    }
}

#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    upstream: String,
}

impl ProxyState {
    pub fn new(upstream: impl Into<String>) -> Result<Self, reqwest::Error> {
        // Upstream redirects are relayed to the browser, not followed here.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            upstream: upstream.into().trim_end_matches('/').to_string(),
        })
    }

    async fn forward(&self, req: Request<Body>) -> Result<Response, ProxyError> {
        let (parts, body) = req.into_parts();
        let body = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| ProxyError::Body(e.to_string()))?;

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = format!("{}{}", self.upstream, path_and_query);

        let upstream = self
            .client
            .request(parts.method, url)
            .headers(strip_hop_by_hop(parts.headers))
            .body(body)
            .send()
            .await?;

        let status = upstream.status();
        let headers = strip_hop_by_hop(upstream.headers().clone());
        let bytes = upstream.bytes().await?;

        let mut res = Response::new(Body::from(bytes));
        *res.status_mut() = status;
        *res.headers_mut() = headers;
        Ok(res)
    }
}

/// Drops connection-scoped headers, plus `Host` and `Content-Length`
/// which are recomputed for the next hop.
fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in [
        header::CONNECTION,
        header::HOST,
        header::PROXY_AUTHENTICATE,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
        header::CONTENT_LENGTH,
    ] {
        headers.remove(name);
    }
    headers
}

/// Fallback handler: forwards whatever the gate let through.
pub async fn forward(State(state): State<ProxyState>, req: Request<Body>) -> Response {
    let path = req.uri().path().to_string();
    match state.forward(req).await {
        Ok(res) => res,
        Err(e) => {
            tracing::warn!(error = %e, path = %path, "forwarding to upstream failed");
            e.into_response()
        }
    }
}
