//! Price-Ripple main entry point
//!
//! This is the command-line interface for the Price-Ripple marketplace price
//! comparison aggregator.

use clap::{Parser, Subcommand};
use price_ripple::config::{load_or_default, Config, Secrets};
use price_ripple::listing::{Location, SearchQuery};
use price_ripple::output::{print_summary, summarize, write_markdown_report};
use price_ripple::server::{build_router, serve, AppState};
use price_ripple::Aggregator;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Price-Ripple: compare second-hand prices across marketplaces
///
/// Price-Ripple searches eBay, Mercari, Facebook Marketplace and Craigslist
/// concurrently, normalizes their listings and reports price statistics.
#[derive(Parser, Debug)]
#[command(name = "price-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A marketplace price comparison aggregator", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct QueryArgs {
    /// Search text
    query: String,

    /// Maximum listings per platform
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// City to search near
    #[arg(long)]
    city: Option<String>,

    /// State or region qualifying the city
    #[arg(long, requires = "city")]
    state: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search every configured platform and compare prices
    Compare {
        #[command(flatten)]
        args: QueryArgs,

        /// Also write a markdown report to this path
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Search a single platform and print its raw listings
    Search {
        /// Platform key: ebay, mercari, facebook or craigslist
        platform: String,

        #[command(flatten)]
        args: QueryArgs,
    },

    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides the configuration)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Secrets may come from a local .env file
    dotenvy::dotenv().ok();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load_or_default(cli.config.as_deref()) {
        Ok((cfg, Some(hash))) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Ok((cfg, None)) => {
            tracing::info!("No configuration file given, using defaults");
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let secrets = Secrets::from_env(&config);
    if secrets.proxy_api_key.is_none() {
        tracing::warn!(
            "{} is not set; proxied platforms will be fetched directly",
            config.proxy.api_key_env
        );
    }

    let aggregator = match Aggregator::from_config(&config, &secrets) {
        Ok(aggregator) => aggregator,
        Err(e) => {
            tracing::error!("Failed to set up platforms: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Compare { args, report } => handle_compare(&config, &aggregator, args, report).await,
        Command::Search { platform, args } => handle_search(&config, &aggregator, &platform, args).await,
        Command::Serve { bind } => handle_serve(&config, aggregator, bind).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("price_ripple=info,warn"),
            1 => EnvFilter::new("price_ripple=debug,info"),
            2 => EnvFilter::new("price_ripple=trace,debug"),
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

fn build_query(config: &Config, args: &QueryArgs) -> price_ripple::Result<SearchQuery> {
    let max_results = args
        .max_results
        .unwrap_or(config.search.default_max_results);
    let location = args
        .city
        .as_ref()
        .map(|city| Location::new(city.clone(), args.state.clone()));

    Ok(SearchQuery::new(&args.query, max_results, config.search.max_results_limit)?
        .with_location(location))
}

/// Handles the compare command: all platforms, merged and summarized
async fn handle_compare(
    config: &Config,
    aggregator: &Aggregator,
    args: QueryArgs,
    report: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = build_query(config, &args)?;
    let results = aggregator.aggregate(&query).await;
    let (listings, summary) = summarize(&results);

    tracing::info!(
        "Comparison finished: {} comparable listings, {} incomplete platforms",
        summary.total_results,
        summary.degraded_platforms.len()
    );

    if args.json {
        let payload = json!({
            "query": query.text,
            "results": listings,
            "summary": summary,
            "platforms": results,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_summary(&query.text, &results, &listings, &summary);
    }

    if let Some(path) = report {
        write_markdown_report(&query.text, &results, &listings, &summary, &path)?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

/// Handles the search command: one platform, raw listings
async fn handle_search(
    config: &Config,
    aggregator: &Aggregator,
    platform: &str,
    args: QueryArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = build_query(config, &args)?;
    let extraction = aggregator.search_one(platform, &query).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
        return Ok(());
    }

    println!("=== {}: {} ===\n", platform, extraction.status);
    for (i, record) in extraction.listings.iter().enumerate() {
        println!("  {:>3}. {:<12} {}", i + 1, record.price_text, record.title);
        println!("       {} | {} | {}", record.condition, record.shipping, record.url);
    }

    Ok(())
}

/// Handles the serve command: runs the HTTP API
async fn handle_serve(
    config: &Config,
    aggregator: Aggregator,
    bind: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let state = AppState::new(Arc::new(aggregator), &config.search);

    match serve(build_router(state), &bind).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("Server failed: {}", e);
            Err(e.into())
        }
    }
}
