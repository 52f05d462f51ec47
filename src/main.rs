use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cube_stats::calculate::archetypes::archetype_stats;
use cube_stats::calculate::cards::{card_stats, CardStatsRequest};
use cube_stats::calculate::colors::{color_stats, ColorStatsRequest};
use cube_stats::calculate::players::player_stats;
use cube_stats::calculate::report::{build_report, Report, ReportOptions};
use cube_stats::calculate::synergy::{synergy_stats, SynergyStatsRequest};
use cube_stats::calculate::Bucketing;
use cube_stats::config::AppConfig;
use cube_stats::parse_duration;
use cube_stats::storage::{
    load_catalog, CachePolicy, CorpusDeck, DeckStore, DecksRequest, FileDeckSource, JsonFile,
};

#[derive(Parser)]
#[command(name = "cube-stats")]
#[command(about = "Cube draft history analytics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./cube-stats.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Cube name (overrides the config file)
    #[arg(long)]
    cube: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Which decks to include.
#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Player name, case-insensitive
    #[arg(long, default_value = "")]
    player: String,

    /// Earliest deck date, YYYY-MM-DD
    #[arg(long, default_value = "")]
    start: String,

    /// Latest deck date, YYYY-MM-DD
    #[arg(long, default_value = "")]
    end: String,

    /// Minimum number of decks in the draft
    #[arg(long, default_value_t = 0)]
    size: usize,

    /// Filter query, e.g. 'arch:aggro color:R'
    #[arg(long = "match", default_value = "")]
    query: String,
}

impl From<FilterArgs> for DecksRequest {
    fn from(args: FilterArgs) -> Self {
        DecksRequest {
            player: args.player,
            start: args.start,
            end: args.end,
            min_draft_size: args.size,
            query: args.query,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct BucketArgs {
    /// Drafts per bucket; 0 disables bucketing
    #[arg(long)]
    bucket_size: Option<usize>,

    /// Use overlapping windows
    #[arg(long)]
    sliding: bool,
}

impl BucketArgs {
    fn resolve(&self, config: &AppConfig) -> Bucketing {
        Bucketing {
            bucket_size: self.bucket_size.unwrap_or(config.stats.bucket_size),
            sliding: self.sliding || config.stats.sliding,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List matching decks as JSON
    Decks {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Compute one statistic category
    Stats {
        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        buckets: BucketArgs,

        #[command(subcommand)]
        kind: StatsKind,
    },

    /// Compute every statistic category at once
    Report {
        #[command(flatten)]
        filter: FilterArgs,

        /// Write the report here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Keep the deck cache warm and rewrite a report on an interval
    Watch {
        #[command(flatten)]
        filter: FilterArgs,

        /// Report file to rewrite
        #[arg(long, default_value = "./report.json")]
        out: PathBuf,

        /// Rewrite interval (e.g., "30s", "5m"); defaults to the cache refresh interval
        #[arg(long)]
        interval: Option<String>,
    },
}

#[derive(Subcommand)]
enum StatsKind {
    /// Card performance, ELO and expected win rate
    Cards {
        /// Only cards sharing a color with this string, e.g. "RG"
        #[arg(long, default_value = "")]
        color: String,

        #[arg(long)]
        min_drafts: Option<u32>,

        #[arg(long)]
        min_games: Option<u32>,
    },

    /// Color identity performance
    Colors {
        /// Count decks only toward their exact color identity
        #[arg(long)]
        strict_colors: bool,
    },

    /// Deck label performance
    Archetypes,

    /// Player performance
    Players,

    /// Pairwise card co-occurrence
    Synergy {
        #[arg(long)]
        min_decks: Option<u32>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_store(config: &AppConfig, policy: CachePolicy) -> DeckStore {
    let source = FileDeckSource::new(config.storage());
    DeckStore::new(Box::new(source), policy).with_strict_queries(config.query.strict)
}

/// Build a report from one corpus snapshot.
fn current_report(
    store: &DeckStore,
    config: &AppConfig,
    request: &DecksRequest,
    options: &ReportOptions,
) -> Result<Report> {
    let (corpus, decks) = store.list_snapshot(request)?;
    let catalog = load_catalog(&config.storage())?;
    Ok(build_report(corpus.version(), &decks, &catalog, options))
}

/// Rebuild the report from the current snapshot and write it out.
fn write_report(
    store: &DeckStore,
    config: &AppConfig,
    request: &DecksRequest,
    options: &ReportOptions,
    out: &Path,
) -> Result<()> {
    let report = current_report(store, config, request, options)?;
    JsonFile::new(out.to_path_buf()).write(&report)?;
    tracing::info!(
        "Wrote report for {} decks (corpus v{}) to {}",
        report.total_decks,
        report.corpus_version,
        out.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(cube) = cli.cube {
        config.cube = cube;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    config.validate()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    // Logs go to stderr so JSON results on stdout stay parseable.
    let (plain, json) = if cli.json_logs {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr);
        (None, Some(layer))
    } else {
        let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        (Some(layer), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();

    tracing::info!("Starting cube-stats v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Decks { filter } => {
            let store = open_store(&config, CachePolicy::Snapshot);
            let decks = store.list(&filter.into())?;
            tracing::info!("{} decks matched", decks.len());
            let decks: Vec<&CorpusDeck> = decks.iter().map(|d| d.as_ref()).collect();
            print_json(&decks)?;
        }

        Commands::Stats {
            filter,
            buckets,
            kind,
        } => {
            let store = open_store(&config, CachePolicy::Snapshot);
            let decks = store.list(&filter.into())?;
            let bucketing = buckets.resolve(&config);
            tracing::info!("Computing statistics over {} decks", decks.len());

            match kind {
                StatsKind::Cards {
                    color,
                    min_drafts,
                    min_games,
                } => {
                    let catalog = load_catalog(&config.storage())?;
                    let request = CardStatsRequest {
                        bucketing,
                        color,
                        min_drafts: min_drafts.unwrap_or(config.stats.min_drafts),
                        min_games: min_games.unwrap_or(config.stats.min_games),
                    };
                    print_json(&card_stats(&decks, &catalog, &request))?;
                }
                StatsKind::Colors { strict_colors } => {
                    let request = ColorStatsRequest {
                        bucketing,
                        strict_colors,
                    };
                    print_json(&color_stats(&decks, &request))?;
                }
                StatsKind::Archetypes => {
                    print_json(&archetype_stats(&decks, bucketing))?;
                }
                StatsKind::Players => {
                    print_json(&player_stats(&decks, bucketing))?;
                }
                StatsKind::Synergy { min_decks } => {
                    let catalog = load_catalog(&config.storage())?;
                    let request = SynergyStatsRequest {
                        min_decks: min_decks.unwrap_or(config.stats.min_decks),
                    };
                    print_json(&synergy_stats(&decks, &catalog, &request))?;
                }
            }
        }

        Commands::Report { filter, out } => {
            let store = open_store(&config, CachePolicy::Snapshot);
            let request: DecksRequest = filter.into();
            let options = config.stats.report_options();

            match out {
                Some(path) => write_report(&store, &config, &request, &options, &path)?,
                None => print_json(&current_report(&store, &config, &request, &options)?)?,
            }
        }

        Commands::Watch {
            filter,
            out,
            interval,
        } => {
            let every = match interval {
                Some(s) => parse_duration(&s)
                    .filter(|d| !d.is_zero())
                    .with_context(|| format!("Invalid --interval: {}", s))?,
                None => config.cache.interval().unwrap_or(Duration::from_secs(10)),
            };

            let store = Arc::new(open_store(&config, config.cache_policy()));
            let invalidator = store.spawn_invalidation();
            let config = Arc::new(config);
            let request = Arc::new(DecksRequest::from(filter));
            let options = Arc::new(config.stats.report_options());

            tracing::info!("Rewriting {} every {:?}", out.display(), every);
            let mut ticker = tokio::time::interval(every);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let store = Arc::clone(&store);
                        let config = Arc::clone(&config);
                        let request = Arc::clone(&request);
                        let options = Arc::clone(&options);
                        let out = out.clone();
                        // Loading reads every deck file from disk.
                        let result = tokio::task::spawn_blocking(move || {
                            write_report(&store, &config, &request, &options, &out)
                        })
                        .await?;
                        if let Err(e) = result {
                            tracing::warn!("Report refresh failed: {:#}", e);
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutting down");
                        break;
                    }
                }
            }

            if let Some(handle) = invalidator {
                handle.abort();
            }
        }
    }

    Ok(())
}
