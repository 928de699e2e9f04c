//! Review-Pager main entry point
//!
//! This is the command-line interface for the Review-Pager review extractor.

use clap::Parser;
use review_pager::browser::HttpBrowserFactory;
use review_pager::config::{load_config_with_hash, BackendKind, Config, CrawlJob, JobOverrides, SortMode};
use review_pager::crawler::{plan, run_crawl, CrawlSignals};
use review_pager::output::{print_report, CrawlReport};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Config file picked up from the working directory when `-c` is omitted
const DEFAULT_CONFIG_FILE: &str = "review-pager.toml";

/// Review-Pager: a paginated review extractor
///
/// Review-Pager reads every review page of a product by clicking through
/// the site's paginator, spreading the pages over parallel browser
/// sessions, and writes all reviews to one CSV file.
#[derive(Parser, Debug)]
#[command(name = "review-pager")]
#[command(version)]
#[command(about = "A paginated review extractor", long_about = None)]
struct Cli {
    /// Review page to crawl
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Review ordering to crawl in
    #[arg(short, long, value_enum)]
    sort: Option<SortMode>,

    /// Number of parallel browser sessions
    #[arg(short = 'j', long, value_name = "N")]
    concurrency: Option<usize>,

    /// Crawl exactly this many pages instead of the discovered count
    #[arg(short, long = "max-page", value_name = "N")]
    max_page: Option<u32>,

    /// Output file (default: <output dir>/<product name>.csv)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Also write a markdown run report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Browser backend
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,

    /// Chromium executable for the chrome backend
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// Keep browser handles open after each attempt for inspection
    #[arg(short, long)]
    debug: bool,

    /// Validate config and show what would be crawled without opening a browser
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;

    let overrides = JobOverrides {
        sort: cli.sort,
        concurrency: cli.concurrency,
        max_pages: cli.max_page,
        output_path: cli.output.clone(),
        report_path: cli.report.clone(),
        backend: cli.backend,
        debug: cli.debug,
    };
    let job = match CrawlJob::from_config(&config, &cli.url, overrides) {
        Ok(job) => job,
        Err(e) => {
            tracing::error!("Invalid crawl job: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&job)?;
    } else {
        handle_crawl(job, cli.chrome_path).await?;
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
            0 => EnvFilter::new("review_pager=info,warn"),
            1 => EnvFilter::new("review_pager=debug,info"),
            2 => EnvFilter::new("review_pager=trace,debug"),
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

/// Loads the explicit config, the working-directory default, or built-in defaults
fn load_configuration(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => PathBuf::from(DEFAULT_CONFIG_FILE),
        None => {
            tracing::warn!(
                "No configuration given and no {} found; using defaults with no site profiles",
                DEFAULT_CONFIG_FILE
            );
            return Ok(Config::default());
        }
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(&path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the --dry-run mode: shows the resolved job and its first navigation plans
fn handle_dry_run(job: &CrawlJob) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Review-Pager Dry Run ===\n");

    println!("Job:");
    println!("  Resource: {}", job.resource);
    println!("  Site profile: {}", job.site.name);
    println!("  Sort: {:?}", job.sort_mode);
    println!("  Workers: {}", job.concurrency);
    println!("  Backend: {:?}", job.backend);
    println!("  Page size: {}", job.page_size);
    match job.max_pages {
        Some(pages) => println!("  Pages: {} (explicit)", pages),
        None => println!("  Pages: discovered, at most {}", job.page_cap),
    }
    println!("  Initial backoff: {}s", job.initial_backoff_secs);
    println!(
        "  Max attempts: {}",
        job.retry
            .max_attempts
            .map_or_else(|| "unbounded".to_string(), |n| n.to_string())
    );
    println!("  Debug handle retention: {}", job.debug);

    println!("\nOutput:");
    match &job.output_path {
        Some(path) => println!("  Dataset: {}", path.display()),
        None => println!(
            "  Dataset: {}",
            job.output_path_for("<product name>").display()
        ),
    }
    if let Some(path) = &job.report_path {
        println!("  Report: {}", path.display());
    }

    let preview = job
        .max_pages
        .unwrap_or(job.page_cap)
        .min(job.group_size * 2 + 5);
    println!("\nNavigation plans (first {} pages):", preview);
    for page in 1..=preview {
        let clicks: Vec<String> = plan(page, job.group_size)?
            .iter()
            .map(|action| action.to_string())
            .collect();
        println!("  page {:>3}: {}", page, clicks.join(", "));
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    job: CrawlJob,
    chrome_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let signals = CrawlSignals::new();
    spawn_interrupt_handler(signals.clone());

    let result = match job.backend {
        BackendKind::Http => run_crawl(job, HttpBrowserFactory::default(), signals).await,
        BackendKind::Chrome => run_chrome(job, chrome_path, signals).await?,
    };

    match result {
        Ok(report) => {
            print_report(&report);
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(feature = "chrome")]
async fn run_chrome(
    job: CrawlJob,
    executable: Option<PathBuf>,
    signals: CrawlSignals,
) -> Result<review_pager::Result<CrawlReport>, Box<dyn std::error::Error>> {
    use review_pager::browser::ChromeBrowserFactory;

    let factory = ChromeBrowserFactory {
        headful: job.debug,
        executable,
    };
    Ok(run_crawl(job, factory, signals).await)
}

#[cfg(not(feature = "chrome"))]
async fn run_chrome(
    _job: CrawlJob,
    _executable: Option<PathBuf>,
    _signals: CrawlSignals,
) -> Result<review_pager::Result<CrawlReport>, Box<dyn std::error::Error>> {
    tracing::error!("The chrome backend is not available in this build");
    Err("review-pager was built without the `chrome` feature".into())
}

/// First Ctrl-C abandons the pages in flight, the second stops the run
fn spawn_interrupt_handler(signals: CrawlSignals) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("Interrupt received: abandoning pages in flight (press Ctrl-C again to stop)");
        signals.interrupt();

        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("Second interrupt received: stopping the crawl");
        signals.cancel();
    });
}
