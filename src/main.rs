//! Ripple-Rank main entry point
//!
//! This is the command-line interface for the Ripple-Rank crawler.

use clap::Parser;
use ripple_rank::config::{load_config_with_hash, Config};
use ripple_rank::crawler::{Coordinator, CrawlSettings, HttpFetcher, StartOutcome};
use ripple_rank::output::{
    generate_markdown_report, load_statistics, print_statistics, RankingReport, ResultExporter,
};
use ripple_rank::storage::{open_storage, GraphStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Ripple-Rank: a depth-bounded link crawler with incremental page ranking
///
/// Ripple-Rank crawls outward from seed URLs, records the link graph in a
/// SQLite database and keeps an approximate rank per page up to date while
/// the crawl runs.
#[derive(Parser, Debug)]
#[command(name = "ripple-rank")]
#[command(version)]
#[command(about = "A depth-bounded link crawler with incremental page ranking", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed URL to start from; replaces the configured seeds (repeatable)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Override the configured maximum depth
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Write the markdown ranking report from existing data and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if !cli.seeds.is_empty() {
        config.crawler.seeds = cli.seeds.clone();
    }
    if let Some(depth) = cli.max_depth {
        config.crawler.max_depth = depth;
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config, &config_hash)?;
    } else {
        handle_crawl(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_rank=info,warn"),
            1 => EnvFilter::new("ripple_rank=debug,info"),
            2 => EnvFilter::new("ripple_rank=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    let settings = CrawlSettings::from_config(config);

    println!("=== Ripple-Rank Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Workers: {}", settings.workers);
    println!("  Fetch timeout: {:?}", settings.fetch_timeout);
    match settings.session_timeout {
        Some(limit) => println!("  Session timeout: {:?}", limit),
        None => println!("  Session timeout: none"),
    }

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nPriority:");
    println!(
        "  Preferred domains (+{}): {}",
        config.priority.domain_weight,
        config.priority.preferred_domains.join(", ")
    );
    println!(
        "  Preferred path segments (+{}): {}",
        config.priority.path_weight,
        config.priority.preferred_path_segments.join(", ")
    );
    println!("  Shallowness base: {}", config.priority.shallowness_base);

    println!("\nRanking:");
    println!("  Damping factor: {}", config.ranking.damping_factor);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> ripple_rank::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: writes the report from stored data
fn handle_export_summary(config: &Config, config_hash: &str) -> ripple_rank::Result<()> {
    println!("=== Exporting Ranking Report ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let store: Arc<dyn GraphStore> =
        Arc::new(open_storage(Path::new(&config.output.database_path))?);

    let exporter = ResultExporter::new(store.clone());
    let mut report = RankingReport::new(load_statistics(store.as_ref())?, exporter.ranked_pages()?);
    report.config_hash = Some(config_hash.to_string());

    generate_markdown_report(&report, Path::new(&config.output.summary_path))?;
    println!("✓ Report exported to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String) -> ripple_rank::Result<()> {
    let store: Arc<dyn GraphStore> =
        Arc::new(open_storage(Path::new(&config.output.database_path))?);
    let fetcher = Arc::new(HttpFetcher::new(&config.user_agent)?);
    let coordinator = Coordinator::new(CrawlSettings::from_config(&config), fetcher, store.clone());

    if coordinator.start(&config.crawler.seeds, config.crawler.max_depth)
        == StartOutcome::AlreadyRunning
    {
        tracing::warn!("A crawl session is already running");
    }

    tokio::select! {
        _ = coordinator.wait_until_idle() => {}
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => {
                    tracing::info!("Interrupt received, finishing in-flight pages");
                    coordinator.stop();
                }
                Err(e) => tracing::error!("Failed to listen for interrupt: {}", e),
            }
            coordinator.wait_until_idle().await;
        }
    }

    let pages = coordinator.ranked_pages()?;
    for page in &pages {
        println!("{:.6}\t{}", page.rank, page.url);
    }

    let mut report = RankingReport::new(load_statistics(store.as_ref())?, pages);
    report.config_hash = Some(config_hash);
    report.seeds = config.crawler.seeds.clone();
    report.session = Some(coordinator.status());

    generate_markdown_report(&report, Path::new(&config.output.summary_path))?;
    tracing::info!("Ranking report written to {}", config.output.summary_path);

    Ok(())
}
