//! Lifting an HTTP request into the gate's transport-agnostic view.

use axum::http::{HeaderMap, Uri, header::COOKIE};
use biscotti::{Processor, ProcessorConfig, RequestCookies};

use edgegate_core::GateRequest;

/// Build a [`GateRequest`] from the request line and headers.
///
/// Only the cookies named in `cookie_names` are lifted. Malformed cookie
/// pairs are skipped with a warning instead of failing the request.
pub fn gate_request(uri: &Uri, headers: &HeaderMap, cookie_names: &[&str]) -> GateRequest {
    let mut req = GateRequest::new(uri.path(), uri.query().map(str::to_string));

    for (name, value) in headers {
        if name == COOKIE || req.header(name.as_str()).is_some() {
            continue;
        }
        if let Ok(value) = value.to_str() {
            req = req.with_header(name.as_str(), value);
        }
    }

    let processor: Processor = ProcessorConfig::default().into();
    let mut cookies = RequestCookies::new();
    for header in headers.get_all(COOKIE) {
        let Ok(header) = header.to_str() else {
            tracing::warn!("cookie header is not valid UTF-8, ignoring it");
            continue;
        };
        // One bad pair must not hide the well-formed ones after it.
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            if let Err(e) = cookies.extend_from_header(pair, &processor) {
                tracing::warn!(error = %e, "a request cookie is invalid, ignoring it");
            }
        }
    }

    for name in cookie_names {
        if let Some(cookie) = cookies.get(name) {
            req = req.with_cookie(*name, cookie.value());
        }
    }

    req
}
