//! Renders the end-of-crawl report from the statistics snapshot.

use std::io::Write;
use std::path::Path;

use crate::stats::StatsSnapshot;
use crate::worker::CrawlSummary;

/// Print the final aggregate report to stdout.
pub fn print_report(snapshot: &StatsSnapshot, summary: &CrawlSummary) {
    println!();
    println!(
        "Crawl finished: {} pages processed, {} links admitted, {}s",
        summary.processed, summary.admitted, summary.duration_secs
    );
    println!("Unique pages: {}", snapshot.unique_pages);

    match &snapshot.longest_page {
        Some(longest) => println!("Longest page: {}  (words: {})", longest.url, longest.words),
        None => println!("Longest page: none"),
    }

    if !snapshot.top_words.is_empty() {
        println!();
        println!("Top {} words:", snapshot.top_words.len());
        for entry in &snapshot.top_words {
            println!("{}: {}", entry.word, entry.count);
        }
    }

    if !snapshot.subdomains.is_empty() {
        println!();
        println!("Subdomains:");
        for sub in &snapshot.subdomains {
            println!("{}, {}", sub.host, sub.pages);
        }
    }

    if !snapshot.skips.is_empty() {
        println!();
        println!("Skipped pages by reason:");
        for skip in &snapshot.skips {
            println!("{}: {}", skip.reason, skip.count);
        }
    }
}

/// Dump the report as JSON for downstream tooling.
pub fn write_json<P: AsRef<Path>>(
    path: P,
    snapshot: &StatsSnapshot,
    summary: &CrawlSummary,
) -> std::io::Result<()> {
    #[derive(serde::Serialize)]
    struct Report<'a> {
        summary: &'a CrawlSummary,
        stats: &'a StatsSnapshot,
    }

    let report = Report {
        summary,
        stats: snapshot,
    };

    let mut file = std::fs::File::create(path)?;
    let json = serde_json::to_string_pretty(&report)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}
