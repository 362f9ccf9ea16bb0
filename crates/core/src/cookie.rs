//! Cookie descriptors emitted by the gate.
//!
//! A [`CookieSpec`] is plain data; rendering to a `Set-Cookie` header value is
//! delegated to `biscotti` so encoding rules live in one place.

use biscotti::{Processor, ProcessorConfig, ResponseCookie, ResponseCookies, SameSite};
use jiff::{SignedDuration, Zoned};

/// How long a cookie lives on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieLifetime {
    /// `Max-Age` attribute. A negative value expires the cookie immediately.
    MaxAge(SignedDuration),
    /// `Expires` attribute, computed relative to the render time.
    ExpiresIn(SignedDuration),
}

/// One `Set-Cookie` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSpec {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
    pub lifetime: CookieLifetime,
}

impl CookieSpec {
    pub fn new(name: impl Into<String>, value: impl Into<String>, lifetime: CookieLifetime) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            secure: false,
            http_only: false,
            same_site: None,
            lifetime,
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn domain(mut self, domain: Option<String>) -> Self {
        self.domain = domain;
        self
    }

    /// `Secure; HttpOnly; SameSite=None`, the attribute set used for
    /// cross-site session cookies.
    pub fn hardened(mut self) -> Self {
        self.secure = true;
        self.http_only = true;
        self.same_site = Some(SameSite::None);
        self
    }

    /// Whether this operation removes the cookie from the client.
    pub fn is_removal(&self) -> bool {
        matches!(self.lifetime, CookieLifetime::MaxAge(d) if d.is_negative() || d.is_zero())
    }

    /// Remaining lifetime as a duration, for either variant.
    pub fn ttl(&self) -> SignedDuration {
        match self.lifetime {
            CookieLifetime::MaxAge(d) | CookieLifetime::ExpiresIn(d) => d,
        }
    }

    fn to_response_cookie(&self, now: &Zoned) -> ResponseCookie<'static> {
        let mut cookie = ResponseCookie::new(self.name.clone(), self.value.clone());
        if let Some(path) = self.path.as_deref() {
            cookie = cookie.set_path(path.to_owned());
        }
        if let Some(domain) = self.domain.as_deref() {
            cookie = cookie.set_domain(domain.to_owned());
        }
        if self.secure {
            cookie = cookie.set_secure(true);
        }
        if self.http_only {
            cookie = cookie.set_http_only(true);
        }
        if let Some(same_site) = self.same_site {
            cookie = cookie.set_same_site(same_site);
        }
        match self.lifetime {
            CookieLifetime::MaxAge(max_age) => cookie.set_max_age(max_age),
            CookieLifetime::ExpiresIn(ttl) => cookie.set_expires(now.saturating_add(ttl)),
        }
    }
}

/// Render cookie operations into `Set-Cookie` header values.
pub fn set_cookie_headers(cookies: &[CookieSpec], now: &Zoned) -> Vec<String> {
    let processor: Processor = ProcessorConfig::default().into();
    let mut jar = ResponseCookies::new();
    for cookie in cookies {
        jar.insert(cookie.to_response_cookie(now));
    }
    jar.header_values(&processor).collect()
}
