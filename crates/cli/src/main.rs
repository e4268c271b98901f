use anyhow::{bail, Context, Result};
use catalog::parser::parse_profiles;
use catalog::{Catalog, UserProfile};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::seq::IndexedRandom;
use rand::Rng;
use ranking::{RankingConfig, Signal, SignalRepository, StartDateOrder};
use rayon::prelude::*;
use recommender::{NoopSink, Recommendation, RecommendationService, RecommendationSource, TracingSink};
use serde_json::json;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// EventRecs - Event Recommendation Engine
#[derive(Parser)]
#[command(name = "event-recs")]
#[command(about = "Event recommendations from profile signals and popularity", long_about = None)]
struct Cli {
    /// Path to the catalog snapshot (JSON array or {"events": [...]})
    #[arg(short, long, default_value = "data/catalog.json")]
    catalog: PathBuf,

    /// Optional ranking configuration overrides (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend events for one user profile
    Recommend {
        /// Profiles file (one profile or an array)
        #[arg(long)]
        profile: PathBuf,

        /// Pick this user from the profiles file (default: first profile)
        #[arg(long)]
        user_id: Option<String>,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Show score breakdown for each recommendation
        #[arg(long)]
        explain: bool,

        /// Emit candidate telemetry through tracing (use RUST_LOG=debug)
        #[arg(long)]
        debug: bool,
    },

    /// Most popular upcoming events, no profile
    Trending {
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Recommend for every profile in a file, one JSON line per user
    Batch {
        #[arg(long)]
        profiles: PathBuf,

        #[arg(long, default_value = "10")]
        limit: usize,

        /// Write results here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show catalog statistics and signal vocabulary
    Inspect,

    /// Run benchmark with random profiles
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Recommendations per request
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RankingConfig::from_json_file(path)
            .with_context(|| format!("Failed to load ranking config {}", path.display()))?,
        None => RankingConfig::default(),
    };

    println!("Loading catalog from {}...", cli.catalog.display());
    let start = Instant::now();
    let catalog = Arc::new(
        Catalog::load_from_file(&cli.catalog).context("Failed to load catalog snapshot")?,
    );
    println!(
        "{} Loaded {} events in {:?}",
        "✓".green(),
        catalog.len(),
        start.elapsed()
    );

    match cli.command {
        Commands::Recommend {
            profile,
            user_id,
            limit,
            explain,
            debug,
        } => handle_recommend(&catalog, &config, &profile, user_id.as_deref(), limit, explain, debug)?,
        Commands::Trending { limit } => handle_trending(&catalog, &config, limit)?,
        Commands::Batch {
            profiles,
            limit,
            output,
        } => handle_batch(&catalog, &config, &profiles, limit, output.as_deref())?,
        Commands::Inspect => handle_inspect(&catalog, &config),
        Commands::Benchmark { requests, limit } => {
            handle_benchmark(catalog, config, requests, limit).await?
        }
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    catalog: &Catalog,
    config: &RankingConfig,
    profiles_path: &Path,
    user_id: Option<&str>,
    limit: usize,
    explain: bool,
    debug: bool,
) -> Result<()> {
    let profiles = parse_profiles(profiles_path).context("Failed to load profiles")?;
    let profile = match user_id {
        Some(id) => profiles
            .iter()
            .find(|p| p.user_id.as_deref() == Some(id))
            .with_context(|| format!("User {} not found in {}", id, profiles_path.display()))?,
        None => profiles
            .first()
            .with_context(|| format!("No profiles in {}", profiles_path.display()))?,
    };

    let service =
        RecommendationService::new(Arc::new(TracingSink), Some(profile), catalog.events(), debug)
            .with_config(config.clone());
    let recommendations = service.recommend(limit)?;

    print_recommendations(
        &format!("Recommendations for {}", profile.label()),
        &recommendations,
        explain,
    );
    Ok(())
}

/// Handle the 'trending' command
fn handle_trending(catalog: &Catalog, config: &RankingConfig, limit: usize) -> Result<()> {
    let service = RecommendationService::new(Arc::new(NoopSink), None, catalog.events(), false)
        .with_config(config.clone());
    let recommendations = service.recommend(limit)?;

    print_recommendations("Trending events", &recommendations, false);
    Ok(())
}

/// Handle the 'batch' command
fn handle_batch(
    catalog: &Catalog,
    config: &RankingConfig,
    profiles_path: &Path,
    limit: usize,
    output: Option<&Path>,
) -> Result<()> {
    let profiles = parse_profiles(profiles_path).context("Failed to load profiles")?;
    let start = Instant::now();

    let lines: Vec<String> = profiles
        .par_iter()
        .map(|profile| -> Result<String> {
            let ids = RecommendationService::new(
                Arc::new(NoopSink),
                Some(profile),
                catalog.events(),
                false,
            )
            .with_config(config.clone())
            .get_recommendations(limit)?;
            Ok(json!({ "userId": profile.user_id, "eventIds": ids }).to_string())
        })
        .collect::<Result<_>>()?;

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    for line in &lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;

    info!(
        "Recommended for {} profiles in {:?}",
        lines.len(),
        start.elapsed()
    );
    Ok(())
}

/// Handle the 'inspect' command
fn handle_inspect(catalog: &Catalog, config: &RankingConfig) {
    let counts = catalog.counts();
    println!("{}", "Catalog:".bold().blue());
    println!("{}Total events: {}", "• ".green(), counts.total);
    println!("{}Visible: {}", "• ".green(), counts.visible);
    println!("{}Hidden: {}", "• ".green(), counts.hidden);
    println!("{}Test: {}", "• ".green(), counts.test);

    let repository = SignalRepository::new(catalog.events(), &StartDateOrder::default(), config);
    println!("{}", "Signal vocabulary (visible events):".bold().blue());
    for signal in Signal::ALL {
        println!(
            "{}{}: {} distinct values (weight {})",
            "• ".cyan(),
            signal,
            repository.index().vocabulary_size(signal),
            config.weights.weight(signal)
        );
    }

    let mut by_popularity: Vec<_> = catalog.visible_events().collect();
    by_popularity.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    println!("{}", "Most popular:".bold().blue());
    for event in by_popularity.iter().take(5) {
        println!("  - {} ({})", event.display_name(), event.popularity);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    catalog: Arc<Catalog>,
    config: RankingConfig,
    requests: usize,
    limit: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("requests must be at least 1");
    }

    let profiles = random_profiles(&catalog, requests);
    let config = Arc::new(config);

    let wall_clock = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for profile in profiles {
        let catalog = catalog.clone();
        let config = config.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            RecommendationService::new(Arc::new(NoopSink), Some(&profile), catalog.events(), false)
                .with_config((*config).clone())
                .get_recommendations(limit)?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let latency_sum: Duration = timings.iter().sum();
    let avg_latency = latency_sum / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Profiles drawn from the catalog's own vocabulary so most requests hit
/// real signal matches.
fn random_profiles(catalog: &Catalog, count: usize) -> Vec<UserProfile> {
    let interests: Vec<String> = catalog
        .visible_events()
        .flat_map(|e| e.interests().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let countries: Vec<String> = catalog
        .visible_events()
        .flat_map(|e| e.company_countries().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let event_ids: Vec<String> = catalog.visible_events().map(|e| e.id.clone()).collect();

    let mut rng = rand::rng();
    (0..count)
        .map(|i| {
            let interest_count = rng.random_range(0..=3);
            UserProfile {
                user_id: Some(format!("bench-{}", i)),
                interests_ids: Some(
                    interests
                        .choose_multiple(&mut rng, interest_count)
                        .cloned()
                        .collect(),
                ),
                countries_of_interest: countries.choose(&mut rng).map(|c| vec![c.clone()]),
                interacted_event_ids: if rng.random_bool(0.3) {
                    event_ids.choose(&mut rng).map(|id| vec![id.clone()])
                } else {
                    None
                },
                ..Default::default()
            }
        })
        .collect()
}

/// Helper function to format and print recommendations
fn print_recommendations(header: &str, recommendations: &[Recommendation], explain: bool) {
    println!("{}", format!("{}:", header).bold().blue());
    if recommendations.is_empty() {
        println!("  (no events)");
        return;
    }

    for (rank, rec) in recommendations.iter().enumerate() {
        let source = match rec.source {
            RecommendationSource::Signals => "signals".green(),
            RecommendationSource::Popularity => "popular".yellow(),
        };
        println!(
            "{}. {} [{}] - Score: {:.2} ({})",
            (rank + 1).to_string().green(),
            rec.title.as_deref().unwrap_or(&rec.event_id),
            rec.event_id,
            rec.score,
            source
        );
        if explain {
            println!("   Explanation: {}", rec.explanation);
        }
    }
}
