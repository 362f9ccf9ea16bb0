//! The gate's output: what the HTTP layer should do with a request.

use crate::cookie::CookieSpec;

/// A header the HTTP layer adds to the outgoing response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeader {
    pub name: String,
    pub value: String,
}

impl ResponseHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Outcome of evaluating one request.
///
/// Immutable value; applying it to a real response is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Let the request through, adding `headers` to the response.
    Continue { headers: Vec<ResponseHeader> },

    /// Let the request through, adding `headers` and setting `cookies`.
    ContinueWithCookies {
        headers: Vec<ResponseHeader>,
        cookies: Vec<CookieSpec>,
    },

    /// Redirect to a same-origin `location` (path plus optional query).
    Redirect {
        location: String,
        cookies: Vec<CookieSpec>,
        headers: Vec<ResponseHeader>,
    },
}

impl Directive {
    pub fn pass(headers: Vec<ResponseHeader>) -> Self {
        Self::Continue { headers }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect {
            location: location.into(),
            cookies: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Attach a cookie. A `Continue` becomes `ContinueWithCookies`.
    pub fn with_cookie(self, cookie: CookieSpec) -> Self {
        match self {
            Self::Continue { headers } => Self::ContinueWithCookies {
                headers,
                cookies: vec![cookie],
            },
            Self::ContinueWithCookies { headers, mut cookies } => {
                cookies.push(cookie);
                Self::ContinueWithCookies { headers, cookies }
            }
            Self::Redirect {
                location,
                mut cookies,
                headers,
            } => {
                cookies.push(cookie);
                Self::Redirect {
                    location,
                    cookies,
                    headers,
                }
            }
        }
    }

    pub fn with_headers(mut self, extra: Vec<ResponseHeader>) -> Self {
        match &mut self {
            Self::Continue { headers }
            | Self::ContinueWithCookies { headers, .. }
            | Self::Redirect { headers, .. } => headers.extend(extra),
        }
        self
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Redirect { location, .. } => Some(location),
            _ => None,
        }
    }

    pub fn is_pass_through(&self) -> bool {
        !matches!(self, Self::Redirect { .. })
    }

    pub fn cookies(&self) -> &[CookieSpec] {
        match self {
            Self::Continue { .. } => &[],
            Self::ContinueWithCookies { cookies, .. } | Self::Redirect { cookies, .. } => cookies,
        }
    }

    pub fn headers(&self) -> &[ResponseHeader] {
        match self {
            Self::Continue { headers }
            | Self::ContinueWithCookies { headers, .. }
            | Self::Redirect { headers, .. } => headers,
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&CookieSpec> {
        self.cookies().iter().find(|c| c.name == name)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers()
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Continue { .. } => "continue",
            Self::ContinueWithCookies { .. } => "continue_with_cookies",
            Self::Redirect { .. } => "redirect",
        }
    }
}
