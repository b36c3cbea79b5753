//! Wall-Harvester main entry point
//!
//! This is the command-line interface for the wall and comment harvester.

use clap::Parser;
use std::path::{Path, PathBuf};
use wall_harvester::config::{load_config_with_hash, validate, Config};
use wall_harvester::output::{print_statistics, write_report, HarvestStatistics};
use wall_harvester::{
    AcceptAll, ApiClient, ConfigError, Harvester, HeuristicPredictor, QuestionPredictor,
};
use tracing_subscriber::EnvFilter;

/// Wall-Harvester: collects question posts and their comment threads
///
/// Wall-Harvester walks the walls of public groups, keeps the posts that
/// read like questions, and exports them together with their comments,
/// author profiles and like counts as CSV files.
#[derive(Parser, Debug)]
#[command(name = "wall-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A rate-limit tolerant wall and comment harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without calling the API
    #[arg(long)]
    dry_run: bool,

    /// Posts collected per group (overrides the config)
    #[arg(long, value_name = "N", conflicts_with = "until_date")]
    max_posts: Option<usize>,

    /// Collect posts published on or after this day (DD-MM-YYYY)
    #[arg(long, value_name = "DATE")]
    until_date: Option<String>,

    /// Directory the CSV files are written to (overrides the config)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Skip the question filter and export every post
    #[arg(long)]
    all_posts: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // A missing .env file is not an error
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if apply_cli_overrides(&mut config, &cli) {
        if let Err(e) = validate(&config) {
            tracing::error!("Invalid command-line override: {}", e);
            return Err(e.into());
        }
    }

    if cli.dry_run {
        handle_dry_run(&config, cli.all_posts)?;
    } else {
        handle_harvest(config, cli.all_posts).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wall_harvester=info,warn"),
            1 => EnvFilter::new("wall_harvester=debug,info"),
            2 => EnvFilter::new("wall_harvester=trace,debug"),
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

/// Applies command-line overrides, returning true if anything changed
fn apply_cli_overrides(config: &mut Config, cli: &Cli) -> bool {
    let mut changed = false;

    if let Some(max_posts) = cli.max_posts {
        config.harvest.max_posts = max_posts;
        config.harvest.until_date = None;
        changed = true;
    }

    if let Some(until_date) = &cli.until_date {
        config.harvest.until_date = Some(until_date.clone());
        changed = true;
    }

    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
        changed = true;
    }

    changed
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config, all_posts: bool) -> wall_harvester::Result<()> {
    let settings = config.harvest.settings()?;

    println!("=== Wall-Harvester Dry Run ===\n");

    println!("API:");
    println!("  URL: {}", config.api.api_url);
    println!("  Version: {}", config.api.version);
    println!("  Token: {}", if config.api.token.is_empty() { "missing" } else { "set" });

    println!("\nHarvest:");
    println!("  Post limit: {:?}", settings.limit);
    println!("  Skip old pinned posts: {}", settings.skip_old_pinned);
    println!("  Comments per post: {}", config.harvest.max_comments);
    println!("  Page delay: {}ms", config.harvest.page_delay_ms);
    println!("  Like lookup: {:?}", settings.likes);
    println!("  UTC offset: {:+}h", config.harvest.utc_offset_hours);

    println!("\nRetry:");
    let policy = config.retry.policy();
    match policy.max_attempts {
        Some(attempts) => println!("  Max attempts: {}", attempts),
        None => println!("  Max attempts: unbounded"),
    }
    println!(
        "  Backoff: {:?} .. {:?} (x{}, jitter: {})",
        policy.base_delay, policy.max_delay, policy.multiplier, policy.jitter
    );
    match policy.timeout {
        Some(timeout) => println!("  Deadline per call: {:?}", timeout),
        None => println!("  Deadline per call: none"),
    }

    println!("\nQuestion filter:");
    if all_posts {
        println!("  Disabled (--all-posts)");
    } else {
        println!("  Threshold: {}", config.predictor.threshold);
    }

    println!("\nOutput:");
    let dir = Path::new(&config.output.directory);
    println!("  Posts: {}", dir.join(&config.output.posts_file).display());
    println!("  Comments: {}", dir.join(&config.output.comments_file).display());

    println!("\nGroups ({}):", config.harvest.groups.len());
    for group in &config.harvest.groups {
        println!("  - {}", group);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, all_posts: bool) -> wall_harvester::Result<()> {
    let settings = config.harvest.settings()?;
    let client = ApiClient::new(
        &config.api.api_url,
        config.api.token.clone(),
        config.api.version.clone(),
        config.retry.policy(),
    )?;

    let predictor: Box<dyn QuestionPredictor> = if all_posts {
        tracing::info!("Question filter disabled, keeping every post");
        Box::new(AcceptAll)
    } else {
        let predictor = HeuristicPredictor::new(config.predictor.threshold).ok_or_else(|| {
            ConfigError::Validation(format!(
                "threshold must be between 0.0 and 1.0, got {}",
                config.predictor.threshold
            ))
        })?;
        Box::new(predictor)
    };

    tracing::info!(
        "Harvesting {} groups ({:?})",
        config.harvest.groups.len(),
        settings.limit
    );

    let mut harvester = Harvester::new(client, settings);
    let report = harvester.run(&config.harvest.groups, predictor.as_ref()).await;

    if !report.is_consistent() {
        tracing::warn!("Some comments do not belong to an exported post");
    }

    let files = match write_report(
        &report,
        Path::new(&config.output.directory),
        &config.output.posts_file,
        &config.output.comments_file,
        all_posts,
    ) {
        Ok(files) => files,
        Err(e) => {
            tracing::error!("Failed to write output: {}", e);
            return Err(e.into());
        }
    };

    let stats = HarvestStatistics::from_report(&report, harvester.client().stats());
    print_statistics(&stats);

    println!("\n✓ Posts written to: {}", files.posts.display());
    println!("✓ Comments written to: {}", files.comments.display());

    Ok(())
}
