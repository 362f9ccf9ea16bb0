//! Language negotiation against a fixed set of supported languages.

/// Picks a supported language from a preference string.
///
/// The preference string is either the raw value of the language cookie or an
/// `Accept-Language` header. Matching order: exact tag (case-insensitive),
/// then primary subtag (`en-US` matches `en`), then the configured fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageNegotiator {
    supported: Vec<String>,
    fallback: Option<String>,
}

impl LanguageNegotiator {
    pub fn new(supported: Vec<String>, fallback: Option<String>) -> Self {
        Self { supported, fallback }
    }

    pub fn negotiate(&self, preference: Option<&str>) -> Option<String> {
        preference
            .and_then(|raw| self.best_match(raw))
            .or_else(|| self.fallback.clone())
    }

    /// Walks the preferences in quality order; each tag tries an exact match,
    /// then its primary subtag, before the next tag is considered.
    fn best_match(&self, raw: &str) -> Option<String> {
        accept_language::parse(raw).iter().find_map(|tag| {
            let primary = primary_subtag(tag);
            self.supported
                .iter()
                .find(|s| s.eq_ignore_ascii_case(tag))
                .or_else(|| {
                    self.supported
                        .iter()
                        .find(|s| primary_subtag(s).eq_ignore_ascii_case(primary))
                })
                .cloned()
        })
    }
}

fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn negotiator(fallback: Option<&str>) -> LanguageNegotiator {
        LanguageNegotiator::new(
            vec!["en".into(), "fr".into(), "pt-BR".into()],
            fallback.map(str::to_string),
        )
    }

    #[test]
    fn exact_match_wins() {
        let n = negotiator(None);
        assert_eq!(n.negotiate(Some("fr")).as_deref(), Some("fr"));
        assert_eq!(n.negotiate(Some("PT-br")).as_deref(), Some("pt-BR"));
    }

    #[test]
    fn quality_order_is_respected() {
        let n = negotiator(None);
        assert_eq!(
            n.negotiate(Some("de;q=0.9, fr;q=0.5, en;q=0.7")).as_deref(),
            Some("en")
        );
    }

    #[test]
    fn preferred_region_beats_lower_quality_exact_match() {
        let n = LanguageNegotiator::new(vec!["en".into(), "fr".into()], None);
        assert_eq!(n.negotiate(Some("fr-CA, en;q=0.9")).as_deref(), Some("fr"));
    }

    #[test]
    fn region_falls_back_to_primary_subtag() {
        let n = negotiator(None);
        assert_eq!(n.negotiate(Some("en-GB")).as_deref(), Some("en"));
        assert_eq!(n.negotiate(Some("pt")).as_deref(), Some("pt-BR"));
    }

    #[test]
    fn no_match_without_fallback_is_none() {
        let n = negotiator(None);
        assert_eq!(n.negotiate(Some("de")), None);
        assert_eq!(n.negotiate(None), None);
    }

    #[test]
    fn no_match_uses_fallback() {
        let n = negotiator(Some("en"));
        assert_eq!(n.negotiate(Some("de")).as_deref(), Some("en"));
        assert_eq!(n.negotiate(None).as_deref(), Some("en"));
    }
}
