mod output;
mod request;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trawler_core::{
    load_config, validate_config, AdapterRegistry, Config, JackettAdapter, NameCache, Reconciler,
    SanitizedConfig, SceneNameParser, SceneQualityClassifier, SearchMode, SourceAdapter,
    SqliteNameCache,
};

use request::{Library, SearchRequest};

#[derive(Parser)]
#[command(name = "trawler")]
#[command(about = "Reconcile indexer search results against wanted TV episodes")]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "TRAWLER_CONFIG", default_value = "trawler.toml")]
    config: PathBuf,

    /// Print Prometheus metrics to stderr when done
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one search pass for the episodes in a request file
    Search {
        /// JSON file with the show library and the wanted episodes
        request: PathBuf,

        /// Override the configured search mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Treat the pass as a manual search
        #[arg(long)]
        manual: bool,

        /// Only query this source
        #[arg(long)]
        source: Option<String>,
    },
    /// Ingest every source's RSS feed into the name cache
    Rss {
        /// JSON file with the show library
        library: PathBuf,
    },
    /// List cached proper and repack releases
    Propers {
        /// How far back to look, in hours
        #[arg(long, default_value = "24")]
        hours: i64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Eponly,
    Sponly,
}

impl From<ModeArg> for SearchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Eponly => SearchMode::Episode,
            ModeArg::Sponly => SearchMode::Season,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr, stdout carries the JSON output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load(&cli.config)?;

    let cache = Arc::new(
        SqliteNameCache::new(&config.database.path).context("Failed to open name cache")?,
    );
    info!("Name cache opened at {:?}", config.database.path);

    match cli.command {
        Command::Search {
            request,
            mode,
            manual,
            source,
        } => {
            let request: SearchRequest = request::read_json(&request)?;
            let record = request.show()?;
            let episodes = request.wanted_episodes(record);

            let mut search = config.search.clone();
            if let Some(mode) = mode.map(SearchMode::from).or(request.mode) {
                search.mode = mode;
            }
            search.manual_search |= manual;

            let registry = build_registry(&config)?;
            let adapters: Vec<Arc<dyn SourceAdapter>> = match source {
                Some(name) => vec![registry
                    .get(&name)
                    .with_context(|| format!("Unknown source {:?}", name))?],
                None => registry.all(),
            };

            let reconciler = reconciler(&config, &request.library, cache);
            info!(
                show = %record.show.name,
                episodes = episodes.len(),
                mode = search.mode.as_str(),
                sources = adapters.len(),
                "Starting search pass"
            );
            let results = match reconciler
                .find_search_results(&record.show, &episodes, &adapters, &search)
                .await
            {
                Ok(results) => results,
                Err(e) => {
                    warn!(error = %e, "Search pass completed without updating the cache");
                    e.into_results()
                }
            };

            println!("{}", output::results_json(&results)?);
        }
        Command::Rss { library } => {
            let library: Library = request::read_json(&library)?;
            let registry = build_registry(&config)?;
            let reconciler = reconciler(&config, &library, cache);

            let written = reconciler
                .ingest_rss(&registry.all())
                .await
                .context("RSS ingestion failed")?;
            println!("{}", serde_json::json!({ "rows_written": written }));
        }
        Command::Propers { hours } => {
            let since = propers_since(Utc::now(), hours)?;
            let rows = cache
                .list_propers(since)
                .context("Failed to list propers")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("Failed to serialize propers")?
            );
        }
    }

    if cli.metrics {
        eprintln!("{}", output::encode_metrics()?);
    }

    Ok(())
}

/// Load and validate configuration, falling back to defaults when the
/// file does not exist.
fn load(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        info!("Loading configuration from {:?}", path);
        load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
    } else {
        warn!("No configuration file at {:?}, using defaults", path);
        Config::default()
    };

    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    info!(config = %sanitized, "Configuration loaded");
    Ok(config)
}

/// Start of the propers window ending at `now`.
fn propers_since(now: DateTime<Utc>, hours: i64) -> Result<DateTime<Utc>> {
    let window = Duration::try_hours(hours).context("--hours is out of range")?;
    now.checked_sub_signed(window)
        .context("--hours reaches too far back")
}

fn build_registry(config: &Config) -> Result<AdapterRegistry> {
    let mut registry = AdapterRegistry::new();
    match &config.jackett {
        Some(jackett) => {
            info!("Initializing Jackett source at {}", jackett.url);
            let adapter = JackettAdapter::new(jackett.clone())
                .context("Failed to create Jackett source")?;
            registry.register(Arc::new(adapter));
        }
        None => warn!("No sources configured, passes will only use the name cache"),
    }
    Ok(registry)
}

fn reconciler(config: &Config, library: &Library, cache: Arc<SqliteNameCache>) -> Reconciler {
    let classifier = Arc::new(SceneQualityClassifier::new(config.quality.allow_hevc));
    let parser = Arc::new(SceneNameParser::new(
        library.show_infos(),
        classifier.clone(),
    ));
    Reconciler::new(parser, classifier, cache, Arc::new(library.directory()))
}
