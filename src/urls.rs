//! URL utilities shared by the frontier, filter, and statistics layers.

use sha2::{Digest, Sha256};
use url::Url;

/// Canonicalize a raw URL string for deduplication.
///
/// Lower-cases scheme and host (via `Url` parsing), strips the fragment,
/// drops default ports, and removes a trailing slash from non-root paths.
/// Returns `None` for unparseable input; malformed URLs are skipped, never
/// treated as fatal.
pub fn normalize(raw: &str) -> Option<String> {
    let mut parsed = Url::parse(raw.trim()).ok()?;
    parsed.set_fragment(None);

    let path = parsed.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        parsed.set_path(&trimmed);
    }

    Some(parsed.to_string())
}

/// Stable hash key for a normalized URL.
///
/// SHA-256 hex so the ledger key survives restarts and toolchain upgrades;
/// two raw spellings of the same resource collapse to one key once
/// normalized.
pub fn url_hash(normalized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract the lower-cased host name from a URL, if it has one.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_fragment() {
        assert_eq!(
            normalize("http://www.ics.uci.edu/page#section"),
            Some("http://www.ics.uci.edu/page".to_string())
        );
    }

    #[test]
    fn test_normalize_lowercases_scheme_and_host() {
        assert_eq!(
            normalize("HTTP://WWW.ICS.UCI.EDU/About"),
            Some("http://www.ics.uci.edu/About".to_string())
        );
    }

    #[test]
    fn test_normalize_drops_default_port() {
        assert_eq!(
            normalize("http://www.ics.uci.edu:80/page"),
            Some("http://www.ics.uci.edu/page".to_string())
        );
        assert_eq!(
            normalize("https://www.ics.uci.edu:443/page"),
            Some("https://www.ics.uci.edu/page".to_string())
        );
    }

    #[test]
    fn test_normalize_trailing_slash() {
        assert_eq!(
            normalize("http://www.ics.uci.edu/research/"),
            Some("http://www.ics.uci.edu/research".to_string())
        );
        // Root path keeps its slash.
        assert_eq!(
            normalize("http://www.ics.uci.edu"),
            Some("http://www.ics.uci.edu/".to_string())
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "HTTP://WWW.ICS.UCI.EDU:80/A/B/#frag",
            "https://stat.uci.edu/courses/",
            "http://www.cs.uci.edu/page?q=1",
        ];
        for raw in samples {
            let once = normalize(raw).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice, "normalize not idempotent for {raw}");
        }
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        assert_eq!(normalize("not a url"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn test_url_hash_pure_function_of_normalized_form() {
        let a = normalize("http://www.ics.uci.edu/page#one").unwrap();
        let b = normalize("HTTP://www.ics.uci.edu:80/page#two").unwrap();
        assert_eq!(url_hash(&a), url_hash(&b));
        assert_ne!(url_hash(&a), url_hash("http://www.ics.uci.edu/other"));
    }

    #[test]
    fn test_host_of() {
        assert_eq!(
            host_of("http://Vision.ICS.uci.edu/papers"),
            Some("vision.ics.uci.edu".to_string())
        );
        assert_eq!(host_of("garbage"), None);
    }
}
