//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use planindex_artifacts::{ArtifactStore, QueryResult, write_artifacts};
use planindex_pipeline::{ProgressReporter, SilentProgress, build_index, read_url_list};
use planindex_shared::{AppConfig, PipelineConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// planindex — build and query plan lookup indexes.
#[derive(Parser)]
#[command(
    name = "planindex",
    version,
    about = "Build deduplicated plan lookup indexes from transparency-in-coverage index documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch every index document in a URL list and build both indexes.
    Build {
        /// Newline-delimited file of index document URLs.
        urls: PathBuf,

        /// Output directory for the index artifacts.
        #[arg(short, long)]
        out: Option<String>,

        /// Maximum concurrent fetches.
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Per-request timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,

        /// Failure policy: abort (fail fast) or skip.
        #[arg(long)]
        on_error: Option<String>,

        /// Disable the progress bar.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Look up an organization name or plan identifier in built artifacts.
    Query {
        /// Search term; numeric terms hit the identifier index.
        term: String,

        /// Directory containing the index artifacts.
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "planindex=info",
        1 => "planindex=debug",
        _ => "planindex=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            urls,
            out,
            concurrency,
            timeout,
            on_error,
            quiet,
        } => {
            cmd_build(
                &urls,
                out.as_deref(),
                concurrency,
                timeout,
                on_error.as_deref(),
                quiet,
            )
            .await
        }
        Command::Query { term, dir } => cmd_query(&term, dir.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

async fn cmd_build(
    urls_path: &Path,
    out: Option<&str>,
    concurrency: Option<usize>,
    timeout: Option<u64>,
    on_error: Option<&str>,
    quiet: bool,
) -> Result<()> {
    let config = load_config()?;

    // CLI flags override config file values.
    let mut pipeline_config = PipelineConfig::from(&config);
    if let Some(c) = concurrency {
        if c == 0 {
            return Err(eyre!("--concurrency must be at least 1"));
        }
        pipeline_config.concurrency = c;
    }
    if let Some(t) = timeout {
        pipeline_config.timeout_secs = t;
    }
    if let Some(policy) = on_error {
        pipeline_config.failure_policy = policy.parse()?;
    }

    let urls = read_url_list(urls_path)?;
    if urls.is_empty() {
        return Err(eyre!("no URLs found in {}", urls_path.display()));
    }

    let output_dir = PathBuf::from(out.unwrap_or(&config.defaults.output_dir));

    info!(
        sources = urls.len(),
        concurrency = pipeline_config.concurrency,
        output_dir = %output_dir.display(),
        "building plan indexes"
    );

    let start = std::time::Instant::now();

    let reporter: Box<dyn ProgressReporter> = if quiet {
        Box::new(SilentProgress)
    } else {
        Box::new(CliProgress::new(urls.len()))
    };
    let snapshot = build_index(&urls, &pipeline_config, reporter.as_ref()).await?;

    let result = write_artifacts(
        &output_dir,
        &snapshot,
        urls.len(),
        env!("CARGO_PKG_VERSION"),
    )?;

    println!();
    println!("  Index build complete!");
    println!("  Run:           {}", result.manifest.id);
    println!("  Sources:       {}", result.manifest.source_count);
    println!("  Organizations: {}", result.manifest.organization_count);
    println!("  Plans:         {}", result.manifest.plan_count);
    println!("  Artifacts:     {}", result.output_dir.display());
    println!("  Time:          {:.1}s", start.elapsed().as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:40}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=> "),
        );
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn unit_done(&self, url: &str, current: usize, _total: usize) {
        self.bar.set_position(current as u64);
        self.bar.set_message(url.to_string());
    }

    fn done(&self) {
        self.bar.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// query
// ---------------------------------------------------------------------------

async fn cmd_query(term: &str, dir: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let dir = PathBuf::from(dir.unwrap_or(&config.defaults.output_dir));

    planindex_artifacts::validate_artifacts(&dir)?;
    let store = ArtifactStore::open(&dir)?;

    match store.query(term) {
        QueryResult::NoResults => println!("no results for '{term}'"),
        hit => println!("{}", serde_json::to_string_pretty(&hit)?),
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
