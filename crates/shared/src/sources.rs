//! Validation of post source URLs.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::LimitsConfig;

/// Pattern a post source must contain: an http(s) URL with a dotted host.
pub static SOURCE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)",
    )
    .expect("source URL pattern is valid")
});

/// Whether `source` contains a URL the board accepts as a source.
#[must_use]
pub fn is_valid_source_url(source: &str) -> bool {
    SOURCE_URL_REGEX.is_match(source.trim())
}

impl LimitsConfig {
    /// Whether a post's sources fit the count and length limits and every
    /// one of them is a source URL.
    #[must_use]
    pub fn sources_are_acceptable<S: AsRef<str>>(&self, sources: &[S]) -> bool {
        let total: usize = sources.iter().map(|s| s.as_ref().len()).sum();
        sources.len() <= self.max_sources
            && total <= self.max_total_sources_length()
            && sources.iter().all(|s| {
                let s = s.as_ref();
                s.len() <= self.max_source_length && is_valid_source_url(s)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://yiff.rocks")]
    #[case("http://www.example.com/posts/123?page=2#top")]
    #[case("https://user@art.example.co.uk/gallery/a_b-c")]
    #[case("see https://example.org/post")]
    fn test_accepts_source_url(#[case] source: &str) {
        assert!(is_valid_source_url(source));
    }

    #[rstest]
    #[case("")]
    #[case("example.com/post")]
    #[case("ftp://example.com/file")]
    #[case("https://localhost")]
    #[case("https:// example.com")]
    fn test_rejects_source_url(#[case] source: &str) {
        assert!(!is_valid_source_url(source));
    }

    #[test]
    fn test_sources_within_limits() {
        let limits = LimitsConfig::default();
        assert!(limits.sources_are_acceptable(&["https://a.example/1", "https://b.example/2"]));
        assert!(limits.sources_are_acceptable::<&str>(&[]));
    }

    #[test]
    fn test_sources_over_limits() {
        let limits = LimitsConfig::default();
        let too_many = vec!["https://a.example/1"; limits.max_sources + 1];
        assert!(!limits.sources_are_acceptable(too_many.as_slice()));

        let too_long = format!("https://a.example/{}", "x".repeat(limits.max_source_length));
        assert!(!limits.sources_are_acceptable(&[too_long]));

        assert!(!limits.sources_are_acceptable(&["not a url"]));
    }
}
