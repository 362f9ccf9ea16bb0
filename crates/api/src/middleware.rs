use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use jiff::Zoned;

use edgegate_core::{CookieSpec, Directive, Gate, ResponseHeader, is_gated, set_cookie_headers};

use crate::context::gate_request;

#[derive(Clone)]
pub struct GateState {
    pub gate: Arc<Gate>,
}

/// Runs the gate in front of every matched request and applies its directive.
///
/// Paths excluded by the route matcher skip evaluation entirely.
pub async fn gate_middleware(
    State(state): State<GateState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if !is_gated(req.uri().path()) {
        return next.run(req).await;
    }

    let gate_req = gate_request(req.uri(), req.headers(), &state.gate.cookie_names());
    let directive = state.gate.evaluate(&gate_req).await;

    match directive {
        Directive::Continue { headers } => {
            let mut res = next.run(req).await;
            apply(&mut res, &headers, &[]);
            res
        }
        Directive::ContinueWithCookies { headers, cookies } => {
            let mut res = next.run(req).await;
            apply(&mut res, &headers, &cookies);
            res
        }
        Directive::Redirect {
            location,
            cookies,
            headers,
        } => {
            let mut res = Redirect::temporary(&location).into_response();
            apply(&mut res, &headers, &cookies);
            res
        }
    }
}

fn apply(res: &mut Response, headers: &[ResponseHeader], cookies: &[CookieSpec]) {
    let out = res.headers_mut();

    for header in headers {
        let name = HeaderName::from_bytes(header.name.as_bytes());
        let value = HeaderValue::from_str(&header.value);
        match (name, value) {
            (Ok(name), Ok(value)) => {
                out.insert(name, value);
            }
            _ => tracing::warn!(header = %header.name, "dropping invalid response header"),
        }
    }

    for value in set_cookie_headers(cookies, &Zoned::now()) {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                out.append(SET_COOKIE, value);
            }
            Err(_) => tracing::warn!("dropping invalid Set-Cookie value"),
        }
    }
}
