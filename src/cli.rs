use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::CrawlConfig;

/// CLI entry point for the crawler.
/// Exit codes: 0=success, 2=invalid arguments, 3=storage or I/O error
#[derive(Parser, Debug)]
#[command(name = "campus-crawler")]
#[command(about = "Polite, resumable crawler for a bounded set of academic domains")]
#[command(version)]
pub struct Cli {
    #[arg(
        short,
        long = "seed",
        required = true,
        help = "Seed URL to start from (repeatable)"
    )]
    pub seeds: Vec<String>,

    #[arg(
        short,
        long,
        default_value = "./data",
        help = "Directory for the frontier ledger and logs"
    )]
    pub data_dir: String,

    #[arg(
        short,
        long,
        default_value_t = 8,
        help = "Number of concurrent fetch workers"
    )]
    pub workers: usize,

    #[arg(
        long,
        default_value_t = 500,
        help = "Minimum delay between fetches to the same host, in milliseconds"
    )]
    pub delay_ms: u64,

    #[arg(
        short,
        long,
        default_value_t = 30,
        help = "Request timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(
        short,
        long,
        default_value = "CampusCrawler/1.0",
        help = "User agent string for requests"
    )]
    pub user_agent: String,

    #[arg(
        long,
        help = "Discard any saved frontier state and start from the seeds"
    )]
    pub restart: bool,

    #[arg(
        long,
        default_value_t = 50,
        help = "How many words to include in the frequency report"
    )]
    pub top_words: usize,

    #[arg(long, help = "Also write the final report as JSON to this path")]
    pub report_json: Option<String>,
}

impl Cli {
    /// Parse CLI arguments. On error, clap prints help and exits with
    /// code 2 (usage error).
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn into_config(self) -> CrawlConfig {
        CrawlConfig {
            seed_urls: self.seeds,
            data_dir: PathBuf::from(self.data_dir),
            workers: self.workers,
            politeness_delay: Duration::from_millis(self.delay_ms),
            timeout_secs: self.timeout,
            user_agent: self.user_agent,
            restart: self.restart,
            top_words: self.top_words,
            report_json: self.report_json.map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::try_parse_from([
            "campus-crawler",
            "--seed",
            "http://www.ics.uci.edu/",
        ]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert_eq!(cli.seeds, vec!["http://www.ics.uci.edu/".to_string()]);
        assert_eq!(cli.workers, 8); // default
        assert_eq!(cli.delay_ms, 500); // default
        assert!(!cli.restart);
    }

    #[test]
    fn test_repeatable_seeds_and_options() {
        let cli = Cli::try_parse_from([
            "campus-crawler",
            "--seed",
            "http://www.ics.uci.edu/",
            "--seed",
            "http://www.stat.uci.edu/",
            "--workers",
            "16",
            "--delay-ms",
            "250",
            "--restart",
        ])
        .unwrap();

        assert_eq!(cli.seeds.len(), 2);
        assert_eq!(cli.workers, 16);
        assert_eq!(cli.delay_ms, 250);
        assert!(cli.restart);
    }

    #[test]
    fn test_into_config() {
        let cli = Cli::try_parse_from([
            "campus-crawler",
            "--seed",
            "http://www.ics.uci.edu/",
            "--data-dir",
            "/tmp/crawl",
            "--timeout",
            "10",
        ])
        .unwrap();

        let config = cli.into_config();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/crawl"));
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.politeness_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_seed_is_required() {
        let cli = Cli::try_parse_from(["campus-crawler"]);
        assert!(cli.is_err());
        assert_eq!(
            cli.unwrap_err().kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_help_does_not_panic() {
        let cli = Cli::try_parse_from(["campus-crawler", "--help"]);
        assert!(cli.is_err());
        assert_eq!(cli.unwrap_err().kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
