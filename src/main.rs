//! Sitemap-Scout main entry point
//!
//! This is the command-line interface for the Sitemap-Scout news sitemap finder.

use anyhow::{bail, Context};
use clap::Parser;
use sitemap_scout::config::{load_config, validate, Config};
use sitemap_scout::crawler::{
    crawl_site, find_news_fast, CrawlVariant, FallbackSet, HttpFetcher, DEFAULT_MAX_ROBOTS_PAGES,
};
use sitemap_scout::output::{print_statistics, write_report, CrawlReport};
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Sitemap-Scout: finds a site's news sitemap
///
/// Starting from a home page, Sitemap-Scout walks the sitemaps declared in
/// robots.txt and found at well-known paths, visiting the most promising ones
/// first, and prints the urlsets it collects.
#[derive(Parser, Debug)]
#[command(name = "sitemap-scout")]
#[command(version)]
#[command(about = "Finds a site's news sitemap", long_about = None)]
struct Cli {
    /// Home page URLs to search (https:// is assumed when no scheme is given)
    #[arg(value_name = "HOME_PAGE", required = true)]
    home_pages: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Deepest sitemap index level to expand
    #[arg(long)]
    max_depth: Option<u32>,

    /// Stop after this many urlsets are collected (0 = no limit)
    #[arg(long)]
    max_results: Option<usize>,

    /// Stop parsing a urlset after this many entries without news tags (0 = no cap)
    #[arg(long)]
    max_non_news_urls: Option<usize>,

    /// Crawl flavor
    #[arg(long, value_enum)]
    variant: Option<CrawlVariant>,

    /// Well-known paths to try besides robots.txt
    #[arg(long, value_enum)]
    fallbacks: Option<FallbackSet>,

    /// Seconds to pause between crawl steps
    #[arg(long, value_name = "SECS")]
    sleep: Option<f64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Only check robots.txt sitemaps and well-known news paths, without walking indexes
    #[arg(long, conflicts_with_all = ["variant", "max_depth", "max_results"])]
    fast: bool,

    /// Print results as JSON, one document per home page
    #[arg(long)]
    json: bool,

    /// Print crawl statistics to stderr after each site
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let fetcher = HttpFetcher::new(&config.user_agent).context("Failed to build HTTP client")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for home_page in &cli.home_pages {
        let home_page = with_scheme(home_page);
        if cli.fast {
            handle_fast(&fetcher, &config, &home_page, cli.json, &mut out).await?;
        } else {
            handle_crawl(&fetcher, &config, &home_page, &cli, &mut out).await?;
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so that stdout only carries results.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_scout=info,warn"),
            1 => EnvFilter::new("sitemap_scout=debug,info"),
            2 => EnvFilter::new("sitemap_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and layers command-line flags on top
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    let crawler = &mut config.crawler;
    if let Some(max_depth) = cli.max_depth {
        crawler.max_depth = max_depth;
    }
    if let Some(max_results) = cli.max_results {
        crawler.max_results = Some(max_results);
    }
    if let Some(max_non_news_urls) = cli.max_non_news_urls {
        crawler.max_non_news_urls = max_non_news_urls;
    }
    if let Some(variant) = cli.variant {
        crawler.variant = variant;
    }
    if let Some(fallbacks) = cli.fallbacks {
        crawler.fallbacks = fallbacks;
    }
    if let Some(timeout) = cli.timeout {
        crawler.timeout_secs = timeout;
    }
    if let Some(sleep) = cli.sleep {
        if !sleep.is_finite() || sleep < 0.0 {
            bail!("--sleep must be a non-negative number of seconds, got {}", sleep);
        }
        crawler.sleep_ms = (sleep * 1000.0).round() as u64;
    }

    validate(&config).context("Invalid settings")?;
    Ok(config)
}

/// Adds `https://` to a home page given without a scheme
fn with_scheme(home_page: &str) -> String {
    if home_page.contains("://") {
        home_page.to_string()
    } else {
        format!("https://{}", home_page)
    }
}

/// Crawls one site and prints its report
async fn handle_crawl<W: Write>(
    fetcher: &HttpFetcher,
    config: &Config,
    home_page: &str,
    cli: &Cli,
    out: &mut W,
) -> anyhow::Result<()> {
    let crawl = crawl_site(fetcher, config, home_page).await?;
    let report = CrawlReport::from_session(&crawl.session, crawl.elapsed);

    write_report(out, &report, cli.json)?;
    out.flush()?;

    if cli.stats {
        print_statistics(&mut std::io::stderr(), &report)?;
    }
    Ok(())
}

/// Runs the fast discovery pass for one site and prints what it found
async fn handle_fast<W: Write>(
    fetcher: &HttpFetcher,
    config: &Config,
    home_page: &str,
    json: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let timeout = Duration::from_secs(config.crawler.timeout_secs);
    let found = find_news_fast(fetcher, home_page, DEFAULT_MAX_ROBOTS_PAGES, timeout).await;
    let elapsed = started.elapsed().as_secs_f64();

    if json {
        let document = serde_json::json!({
            "home_page": home_page,
            "elapsed_secs": elapsed,
            "results": found,
        });
        writeln!(out, "{}", document)?;
    } else {
        for url in &found {
            writeln!(out, "{}", url)?;
        }
        writeln!(out, "news sitemaps: {}, elapsed: {:.2}s", found.len(), elapsed)?;
    }
    out.flush()?;
    Ok(())
}
