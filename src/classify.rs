//! Page acceptance: decides whether a fetched page's outbound links are
//! worth keeping, and feeds accepted pages into the crawl statistics.
//!
//! Rejection here never fails the crawl of the page itself; the worker
//! still marks the source URL complete either way.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::config::Limits;
use crate::fetch::FetchResponse;
use crate::fingerprint::{self, FingerprintStore};
use crate::stats::CrawlStats;
use crate::urls;

/// English stopwords excluded from tokens, word frequencies, and
/// fingerprints.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am",
    "an", "and", "any", "are", "aren't", "as", "at", "be", "because",
    "been", "before", "being", "below", "between", "both", "but", "by",
    "can't", "cannot", "could", "couldn't", "did", "didn't", "do", "does",
    "doesn't", "doing", "don't", "down", "during", "each", "few", "for",
    "from", "further", "had", "hadn't", "has", "hasn't", "have", "haven't",
    "having", "he", "he'd", "he'll", "he's", "her", "here", "here's", "hers",
    "herself", "him", "himself", "his", "how", "how's", "i", "i'd", "i'll",
    "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its",
    "itself", "let's", "me", "more", "most", "mustn't", "my", "myself", "no",
    "nor", "not", "of", "off", "on", "once", "only", "or", "other", "ought",
    "our", "ours", "ourselves", "out", "over", "own", "same", "shan't", "she",
    "she'd", "she'll", "she's", "should", "shouldn't", "so", "some", "such",
    "than", "that", "that's", "the", "their", "theirs", "them", "themselves",
    "then", "there", "there's", "these", "they", "they'd", "they'll", "they're",
    "they've", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "wasn't", "we", "we'd", "we'll", "we're", "we've", "were",
    "weren't", "what", "what's", "when", "when's", "where", "where's", "which",
    "while", "who", "who's", "whom", "why", "why's", "with", "won't", "would",
    "wouldn't", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"[a-zA-Z]+").expect("invalid token regex");
    static ref STOPWORD_SET: HashSet<&'static str> = STOPWORDS.iter().copied().collect();
}

/// Lowercase alphabetic tokens of length >= 2, stopwords removed.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| t.len() > 1 && !STOPWORD_SET.contains(t))
        .map(|t| t.to_string())
        .collect()
}

#[derive(Debug)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    BadStatus(u16),
    NotHtml,
    EmptyBody,
    BodyTooLarge(usize),
    LowTextRatio,
    TooFewTokens(usize),
    TooManyTokens(usize),
    Repetitive,
    NearDuplicate,
}

impl RejectReason {
    /// Stable label used for skip counters.
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::BadStatus(_) => "bad_status",
            RejectReason::NotHtml => "not_html",
            RejectReason::EmptyBody => "empty_body",
            RejectReason::BodyTooLarge(_) => "body_too_large",
            RejectReason::LowTextRatio => "low_text_ratio",
            RejectReason::TooFewTokens(_) => "too_few_tokens",
            RejectReason::TooManyTokens(_) => "too_many_tokens",
            RejectReason::Repetitive => "repetitive",
            RejectReason::NearDuplicate => "near_duplicate",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::BadStatus(code) => write!(f, "bad status {}", code),
            RejectReason::BodyTooLarge(bytes) => write!(f, "body too large ({} bytes)", bytes),
            RejectReason::TooFewTokens(n) => write!(f, "too few tokens ({})", n),
            RejectReason::TooManyTokens(n) => write!(f, "too many tokens ({})", n),
            other => f.write_str(other.label()),
        }
    }
}

pub struct PageClassifier {
    fingerprints: FingerprintStore,
    stats: Arc<CrawlStats>,
}

impl PageClassifier {
    pub fn new(fingerprints: FingerprintStore, stats: Arc<CrawlStats>) -> Self {
        Self {
            fingerprints,
            stats,
        }
    }

    /// Score a fetched page.
    ///
    /// `page_url` is the normalized URL the worker dequeued. On acceptance
    /// the statistics are updated; on rejection only the skip counter
    /// moves. Either way the caller marks the URL complete.
    pub fn classify(&self, page_url: &str, response: &FetchResponse) -> Verdict {
        let verdict = self.evaluate(page_url, response);
        if let Verdict::Rejected(reason) = &verdict {
            self.stats.record_skip(reason.label());
            tracing::debug!(url = %page_url, reason = %reason, "page rejected");
        }
        verdict
    }

    fn evaluate(&self, page_url: &str, response: &FetchResponse) -> Verdict {
        if !response.is_success() {
            return Verdict::Rejected(RejectReason::BadStatus(response.status));
        }
        if !response.is_html() {
            return Verdict::Rejected(RejectReason::NotHtml);
        }
        if response.body.is_empty() {
            return Verdict::Rejected(RejectReason::EmptyBody);
        }
        if response.body.len() > Limits::MAX_BODY_BYTES {
            return Verdict::Rejected(RejectReason::BodyTooLarge(response.body.len()));
        }

        let text = page_text(&response.body_text());

        // Templated chrome-only pages carry almost no text per raw byte.
        let text_ratio = text.len() as f64 / response.body.len() as f64;
        if text_ratio < Limits::MIN_TEXT_RATIO {
            return Verdict::Rejected(RejectReason::LowTextRatio);
        }

        let tokens = tokenize(&text);
        if tokens.len() < Limits::MIN_TOKENS {
            return Verdict::Rejected(RejectReason::TooFewTokens(tokens.len()));
        }
        if tokens.len() > Limits::MAX_TOKENS {
            return Verdict::Rejected(RejectReason::TooManyTokens(tokens.len()));
        }

        let distinct: HashSet<&String> = tokens.iter().collect();
        let unique_ratio = distinct.len() as f64 / tokens.len() as f64;
        if unique_ratio < Limits::MIN_UNIQUE_RATIO {
            return Verdict::Rejected(RejectReason::Repetitive);
        }

        // Near-duplicate check is scoped to the page's own host.
        let host = urls::host_of(&response.effective_url)
            .or_else(|| urls::host_of(page_url))
            .unwrap_or_default();
        let sig = fingerprint::signature(&tokens);
        if self.fingerprints.check_and_insert(&host, sig) {
            return Verdict::Rejected(RejectReason::NearDuplicate);
        }

        self.stats.record_page(page_url, &host, &tokens);
        Verdict::Accepted
    }
}

/// Plain text of an HTML document, whitespace-joined.
fn page_text(html_body: &str) -> String {
    let document = Html::parse_document(html_body);
    let mut parts = Vec::new();
    for piece in document.root_element().text() {
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;

    fn html_response(body: &str) -> FetchResponse {
        FetchResponse {
            status: 200,
            effective_url: "http://www.ics.uci.edu/page".to_string(),
            content_type: Some("text/html".to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    /// Distinct alphabetic words, none of them stopwords.
    fn filler_words(n: usize) -> String {
        (0..n)
            .map(|i| {
                let a = (b'a' + (i % 26) as u8) as char;
                let b = (b'a' + ((i / 26) % 26) as u8) as char;
                let c = (b'a' + ((i / 676) % 26) as u8) as char;
                format!("qz{}{}{}", a, b, c)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn classifier() -> PageClassifier {
        PageClassifier::new(FingerprintStore::new(10), Arc::new(CrawlStats::new()))
    }

    fn rejected_with(verdict: Verdict, label: &str) -> bool {
        matches!(verdict, Verdict::Rejected(r) if r.label() == label)
    }

    #[test]
    fn test_tokenize_lowercases_and_filters() {
        let tokens = tokenize("The Quick-Brown FOX, a 42nd time!");
        assert_eq!(tokens, vec!["quick", "brown", "fox", "nd", "time"]);
    }

    #[test]
    fn test_rejects_bad_status_and_non_html() {
        let c = classifier();

        let mut resp = html_response("<p>hello</p>");
        resp.status = 404;
        assert!(rejected_with(c.classify("http://x.ics.uci.edu/p", &resp), "bad_status"));

        let mut resp = html_response("<p>hello</p>");
        resp.content_type = Some("application/json".to_string());
        assert!(rejected_with(c.classify("http://x.ics.uci.edu/p", &resp), "not_html"));

        let mut resp = html_response("");
        resp.body.clear();
        assert!(rejected_with(c.classify("http://x.ics.uci.edu/p", &resp), "empty_body"));
    }

    #[test]
    fn test_rejects_oversized_body() {
        let c = classifier();
        let mut resp = html_response("x");
        resp.body = vec![b'x'; Limits::MAX_BODY_BYTES + 1];
        assert!(rejected_with(
            c.classify("http://x.ics.uci.edu/p", &resp),
            "body_too_large"
        ));
    }

    #[test]
    fn test_rejects_thin_content() {
        let c = classifier();
        let resp = html_response("<html><body><p>only a few words here</p></body></html>");
        assert!(rejected_with(
            c.classify("http://x.ics.uci.edu/p", &resp),
            "too_few_tokens"
        ));
    }

    #[test]
    fn test_rejects_chrome_only_pages() {
        let c = classifier();
        // Tiny visible text drowned in markup.
        let chrome = format!(
            "<html><head>{}</head><body><p>hi there world</p></body></html>",
            "<meta name=\"x\" content=\"y\"/>".repeat(200)
        );
        assert!(rejected_with(
            c.classify("http://x.ics.uci.edu/p", &html_response(&chrome)),
            "low_text_ratio"
        ));
    }

    #[test]
    fn test_rejects_repetitive_content() {
        let c = classifier();
        let body = format!(
            "<html><body><p>{}</p></body></html>",
            "winter quarter deadline ".repeat(80)
        );
        assert!(rejected_with(
            c.classify("http://x.ics.uci.edu/p", &html_response(&body)),
            "repetitive"
        ));
    }

    #[test]
    fn test_accepts_substantive_page_and_updates_stats() {
        let stats = Arc::new(CrawlStats::new());
        let c = PageClassifier::new(FingerprintStore::new(10), Arc::clone(&stats));

        let body = format!("<html><body><p>{}</p></body></html>", filler_words(150));
        let verdict = c.classify("http://vision.ics.uci.edu/p", &html_response(&body));
        assert!(matches!(verdict, Verdict::Accepted));

        let snap = stats.snapshot(10);
        assert_eq!(snap.unique_pages, 1);
        assert_eq!(snap.longest_page.unwrap().words, 150);
        assert_eq!(snap.subdomains.len(), 1);
    }

    #[test]
    fn test_duplicate_page_rejected_on_second_sight() {
        let c = classifier();
        let body = format!("<html><body><p>{}</p></body></html>", filler_words(150));

        assert!(matches!(
            c.classify("http://x.ics.uci.edu/one", &html_response(&body)),
            Verdict::Accepted
        ));
        assert!(rejected_with(
            c.classify("http://x.ics.uci.edu/two", &html_response(&body)),
            "near_duplicate"
        ));
    }

    #[test]
    fn test_same_fingerprint_other_host_accepted() {
        let c = classifier();
        let body = format!("<html><body><p>{}</p></body></html>", filler_words(150));

        let mut first = html_response(&body);
        first.effective_url = "http://a.ics.uci.edu/p".to_string();
        assert!(matches!(
            c.classify("http://a.ics.uci.edu/p", &first),
            Verdict::Accepted
        ));

        let mut second = html_response(&body);
        second.effective_url = "http://b.ics.uci.edu/p".to_string();
        assert!(matches!(
            c.classify("http://b.ics.uci.edu/p", &second),
            Verdict::Accepted
        ));
    }
}
