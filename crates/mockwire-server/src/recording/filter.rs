//! URL filters for snapshot requests.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

/// Recognizes the Perl-style "does not contain" idiom `((?!X).)*`.
static NEGATIVE_LOOKAHEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(?(?:\(\?!(.+?)\)\.)\)\*$").expect("negative lookahead pattern is valid")
});

/// Predicate over raw request URIs, compiled from a `urlPattern` filter.
#[derive(Debug, Clone)]
pub enum UrlFilter {
    /// URI contains a match of the regex
    Regex(Regex),
    /// URI contains no match of the inner regex
    NotContaining(Regex),
    /// Accepts every URI
    Any,
}

impl UrlFilter {
    /// Compile a filter pattern.
    ///
    /// A pattern the regex engine accepts is used as-is. Lookahead is not
    /// supported by the engine, so the `((?!X).)*` shape is rewritten to
    /// "does not match X". Anything else is logged and accepts all URIs.
    pub fn compile(pattern: &str) -> Self {
        if let Ok(re) = Regex::new(pattern) {
            return UrlFilter::Regex(re);
        }

        if let Some(inner) = NEGATIVE_LOOKAHEAD
            .captures(pattern)
            .and_then(|caps| caps.get(1))
            .and_then(|m| Regex::new(m.as_str()).ok())
        {
            info!(
                "Using negative lookahead filter: excluding URLs matching {:?}",
                inner.as_str()
            );
            return UrlFilter::NotContaining(inner);
        }

        warn!("Unsupported URL filter pattern, matching everything: {}", pattern);
        UrlFilter::Any
    }

    pub fn matches(&self, raw_uri: &str) -> bool {
        match self {
            UrlFilter::Regex(re) => re.is_match(raw_uri),
            UrlFilter::NotContaining(re) => !re.is_match(raw_uri),
            UrlFilter::Any => true,
        }
    }
}
