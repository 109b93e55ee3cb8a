//! Crawl-eligibility predicate applied to every candidate URL.
//!
//! Stateless: domain allow-list, extension and trap blacklists, and
//! structural limits that keep the crawl out of infinite URL generators.

use crate::config::Limits;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

/// Domain suffixes the crawl is allowed to enter.
const ALLOWED_DOMAINS: &[&str] = &[
    ".ics.uci.edu",
    ".cs.uci.edu",
    ".informatics.uci.edu",
    ".stat.uci.edu",
];

/// Explicit exclusions inside otherwise-allowed domains.
const BLACKLISTED_PREFIXES: &[&str] = &[
    "https://isg.ics.uci.edu/events",
    "http://fano.ics.uci.edu/ca/rules/",
];

lazy_static! {
    /// Asset, archive, binary, and document extensions that are never pages.
    static ref FILE_EXT_BLACKLIST_RE: Regex = Regex::new(concat!(
        r"\.(css|js|bmp|gif|jpe?g|ico|png|tiff?|mid|mp2|mp3|mp4|",
        r"wav|avi|mov|mpeg|ram|m4v|mkv|ogg|ogv|pdf|ps|eps|tex|ppt|",
        r"pptx|doc|docx|xls|xlsx|names|data|dat|exe|bz2|tar|msi|bin|",
        r"7z|psd|dmg|iso|epub|dll|cnf|tgz|sha1|thmx|mso|arff|rtf|jar|",
        r"csv|rm|smil|wmv|swf|wma|zip|rar|gz)$"
    )).expect("invalid extension blacklist regex");

    /// Path and query shapes known to generate unbounded URL variants:
    /// calendars, feeds, date archives, pagination, sort orders, session
    /// and tracking parameters, wiki revision diffs.
    static ref TRAP_RES: Vec<Regex> = [
        r"/calendar", r"/events", r"/ical", r"/wp-json", r"/feed", r"/rss",
        r"/archives?/\d{4}", r"/\d{4}/\d{2}/",
        r"/print", r"/preview", r"/share", r"/login", r"/logout",
        r"/tag/", r"/author/", r"/category/",
        r"(\?|&)page=\d{2,}", r"(\?|&)offset=\d+", r"(\?|&)p=\d+",
        r"(\?|&)sort=", r"(\?|&)order=", r"(\?|&)dir=",
        r"(\?|&)utm_", r"(\?|&)replytocom=", r"(\?|&)session(id)?=",
        r"(\?|&)fbclid=", r"(\?|&)gclid=",
        r"(\?|&)format=(amp|print)",
        r"(\?|&)do=diff",
        r"(\?|&)rev\d*\[?\d*\]?",
        r"(\?|&)difftype=",
        r"doku\.php\?id=.*&rev=",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid trap regex"))
    .collect();
}

/// Decide whether a candidate URL should enter the frontier.
///
/// Operates on the normalized, defragmented URL. Malformed input is
/// rejected, never raised.
pub fn is_eligible(url: &str) -> bool {
    if url.len() > Limits::MAX_URL_LEN {
        return false;
    }

    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return false,
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let host = match parsed.host_str() {
        Some(h) => h.to_ascii_lowercase(),
        None => return false,
    };
    let allowed = ALLOWED_DOMAINS
        .iter()
        .any(|suf| host.ends_with(suf) || host == suf[1..]);
    if !allowed {
        return false;
    }

    if BLACKLISTED_PREFIXES.iter().any(|p| url.starts_with(p)) {
        return false;
    }

    let path = parsed.path().to_lowercase();
    if FILE_EXT_BLACKLIST_RE.is_match(&path) {
        return false;
    }

    // Trap regexes with a (\?|&) prefix target the query string, so match
    // against it with its leading '?' restored.
    let query = parsed.query().unwrap_or("").to_lowercase();
    let query_with_marker = format!("?{}", query);
    if TRAP_RES
        .iter()
        .any(|rx| rx.is_match(&path) || rx.is_match(&query_with_marker))
    {
        return false;
    }

    // Self-referential nested-path traps: too deep, or moderately deep
    // with a repeated segment.
    if path.matches('/').count() > Limits::MAX_PATH_DEPTH {
        return false;
    }
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() > Limits::REPEATED_SEGMENT_FLOOR {
        let mut distinct = segments.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() != segments.len() {
            return false;
        }
    }

    if query.len() > Limits::MAX_QUERY_LEN {
        return false;
    }

    true
}
