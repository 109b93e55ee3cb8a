use lazy_static::lazy_static;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

lazy_static! {
    static ref LINK_SELECTOR: Selector =
        Selector::parse("a[href]").expect("invalid link selector");
}

/// Schemes that never lead to a fetchable page.
const SKIPPED_SCHEMES: &[&str] = &["mailto:", "javascript:", "tel:", "ftp:", "data:", "file:"];

/// Extract the deduplicated set of absolute candidate URLs from a page.
///
/// Relative references are resolved against the page's effective
/// (post-redirect) URL and fragments are stripped. The HTML parser is
/// lenient, so truncated markup yields partial results rather than an
/// error; an unparseable base URL yields an empty set.
pub fn extract_links(effective_url: &str, html_body: &str) -> Vec<String> {
    let base = match Url::parse(effective_url) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!(url = %effective_url, error = %e, "unparseable base URL, skipping extraction");
            return Vec::new();
        }
    };

    let document = Html::parse_document(html_body);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&LINK_SELECTOR) {
        let href = match element.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };

        if href.is_empty() || href.starts_with('#') {
            continue;
        }
        let lowered = href.to_ascii_lowercase();
        if SKIPPED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
            continue;
        }

        let mut absolute = match base.join(href) {
            Ok(u) => u,
            Err(_) => continue, // malformed reference, not worth a log line each
        };
        absolute.set_fragment(None);

        let url = absolute.to_string();
        if seen.insert(url.clone()) {
            links.push(url);
        }
    }

    links
}
