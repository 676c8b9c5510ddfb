/// Page location parsing: which resource is being edited
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static RESOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(movies)/(\d+)").expect("valid resource regex"));

// Movie pages carry a query string once the host has routed to a tab
static QUALIFYING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/movies/\d+\?").expect("valid qualifying regex"));

/// Resource addressed by the current location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub resource_kind: String,
    pub resource_id: String,
}

impl PageContext {
    /// Extract the resource kind and id from a location
    ///
    /// Examples:
    /// - http://localhost:9999/movies/42?tab=scenes → ("movies", "42")
    /// - http://localhost:9999/scenes/42 → None
    pub fn from_location(location: &str) -> Option<PageContext> {
        let caps = RESOURCE_RE.captures(location)?;
        Some(PageContext {
            resource_kind: caps[1].to_string(),
            resource_id: caps[2].to_string(),
        })
    }
}

/// Whether the location is a movie page the split action applies to
pub fn is_qualifying(location: &str) -> bool {
    QUALIFYING_RE.is_match(location)
}

/// Add a cache-busting parameter so the browser re-fetches an image
/// whose remote content changed under the same URL.
pub fn cache_busted(src: &str, stamp: u64) -> String {
    match Url::parse(src) {
        Ok(mut url) => {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != "t")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(kept)
                .append_pair("t", &stamp.to_string());
            url.to_string()
        }
        // Relative or otherwise unparseable source: append blindly
        Err(_) => {
            let sep = if src.contains('?') { '&' } else { '?' };
            format!("{}{}t={}", src, sep, stamp)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_context_from_movie_url() {
        let ctx = PageContext::from_location("http://localhost:9999/movies/42?tab=scenes").unwrap();
        assert_eq!(ctx.resource_kind, "movies");
        assert_eq!(ctx.resource_id, "42");
    }

    #[test]
    fn test_page_context_without_query() {
        let ctx = PageContext::from_location("https://stash.local/movies/7").unwrap();
        assert_eq!(ctx.resource_id, "7");
    }

    #[test]
    fn test_page_context_other_pages() {
        assert_eq!(PageContext::from_location("http://localhost:9999/scenes/42"), None);
        assert_eq!(PageContext::from_location("http://localhost:9999/movies"), None);
        assert_eq!(PageContext::from_location("http://localhost:9999/movies/new"), None);
        assert_eq!(PageContext::from_location(""), None);
    }

    #[test]
    fn test_is_qualifying() {
        assert!(is_qualifying("http://localhost:9999/movies/42?tab=scenes"));
        assert!(is_qualifying("http://localhost:9999/movies/42?"));
        assert!(!is_qualifying("http://localhost:9999/movies/42"));
        assert!(!is_qualifying("http://localhost:9999/movies?sortby=name"));
        assert!(!is_qualifying("http://localhost:9999/scenes/42?tab=details"));
    }

    #[test]
    fn test_cache_busted_absolute() {
        assert_eq!(
            cache_busted("http://localhost:9999/movie/42/frontimage", 1700),
            "http://localhost:9999/movie/42/frontimage?t=1700"
        );
        assert_eq!(
            cache_busted("http://localhost:9999/movie/42/frontimage?t=1&default=true", 1800),
            "http://localhost:9999/movie/42/frontimage?default=true&t=1800"
        );
    }

    #[test]
    fn test_cache_busted_relative() {
        assert_eq!(cache_busted("/movie/42/frontimage", 5), "/movie/42/frontimage?t=5");
        assert_eq!(cache_busted("/movie/42/frontimage?x=1", 5), "/movie/42/frontimage?x=1&t=5");
    }
}
