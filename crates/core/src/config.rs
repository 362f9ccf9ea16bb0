//! Gate configuration.
//!
//! Read once from the environment at startup and passed into the gate
//! explicitly; nothing is looked up at request time.

use crate::domain::cookie_domain;

/// Default name of the language-preference cookie (and response header).
pub const DEFAULT_LANGUAGE_COOKIE: &str = "i18next";

/// Process-wide, read-only gate settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Public base URL of the frontend.
    pub frontend_url: Option<String>,
    /// Disables `Secure`/`HttpOnly`/`SameSite` cookie attributes (plain-HTTP deployments).
    pub not_secured: bool,
    /// Land on `/launches` instead of `/analytics`.
    pub general_mode: bool,
    /// Label the settings login provider `GENERIC` instead of `GITHUB`.
    pub generic_oauth: bool,
    pub language_cookie: String,
    pub languages: Vec<String>,
    pub fallback_language: Option<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            frontend_url: None,
            not_secured: false,
            general_mode: false,
            generic_oauth: false,
            language_cookie: DEFAULT_LANGUAGE_COOKIE.to_string(),
            languages: vec!["en".to_string()],
            fallback_language: Some("en".to_string()),
        }
    }
}

impl GateConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// Flags are "on" when the variable is set to any non-empty value.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GateConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| lookup(key).is_some_and(|v| !v.trim().is_empty());

        let frontend_url = lookup("FRONTEND_URL").filter(|v| !v.trim().is_empty());
        if frontend_url.is_none() {
            tracing::warn!("FRONTEND_URL not set; cookies will be issued without a Domain attribute");
        }

        let languages: Vec<String> = lookup("LANGUAGES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .filter(|l: &Vec<String>| !l.is_empty())
            .unwrap_or_else(|| vec!["en".to_string()]);

        let fallback_language = match lookup("FALLBACK_LANGUAGE") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v.trim().to_string()),
            None => languages.first().cloned(),
        };

        Self {
            frontend_url,
            not_secured: flag("NOT_SECURED"),
            general_mode: flag("IS_GENERAL"),
            generic_oauth: flag("GENERIC_OAUTH"),
            language_cookie: lookup("LANGUAGE_COOKIE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE_COOKIE.to_string()),
            languages,
            fallback_language,
        }
    }

    /// `Domain` attribute derived from [`GateConfig::frontend_url`].
    pub fn cookie_domain(&self) -> Option<String> {
        self.frontend_url.as_deref().and_then(cookie_domain)
    }

    /// Default landing route for authenticated users.
    pub fn landing_path(&self) -> &'static str {
        if self.general_mode { "/launches" } else { "/analytics" }
    }
}
