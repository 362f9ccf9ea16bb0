//! Transport-agnostic view of an inbound request.

use std::collections::BTreeMap;

/// Everything the gate reads from an incoming request.
///
/// Header names are stored lower-cased so lookups are case-insensitive.
/// Cookie values are already decoded by whoever builds the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateRequest {
    path: String,
    query: Option<String>,
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
}

impl GateRequest {
    /// Build a request from a path and an optional raw query (without `?`).
    pub fn new(path: impl Into<String>, query: Option<String>) -> Self {
        let path = path.into();
        let path = if path.is_empty() { "/".to_string() } else { path };
        Self {
            path,
            query: query.filter(|q| !q.is_empty()),
            ..Default::default()
        }
    }

    /// Parse an origin-form target such as `/settings?x=1`.
    pub fn from_target(target: &str) -> Self {
        match target.split_once('?') {
            Some((path, query)) => Self::new(path, Some(query.to_string())),
            None => Self::new(target, None),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The query string as it appears in a URL (`?a=b`), or empty.
    pub fn search(&self) -> String {
        self.query
            .as_deref()
            .map(|q| format!("?{q}"))
            .unwrap_or_default()
    }

    /// Path followed by the search part; used for "URL contains" checks.
    pub fn path_and_query(&self) -> String {
        format!("{}{}", self.path, self.search())
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// First decoded value of a query parameter, if present.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Query string with every occurrence of `name` removed, re-serialized.
    pub fn search_without(&self, name: &str) -> String {
        let Some(query) = self.query.as_deref() else {
            return String::new();
        };
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        let mut kept = 0usize;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key != name {
                serializer.append_pair(&key, &value);
                kept += 1;
            }
        }
        if kept == 0 {
            String::new()
        } else {
            format!("?{}", serializer.finish())
        }
    }
}
