use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use axum::http::HeaderValue;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_tracker::api::{self, state::AppState, total_pages};
use bazaar_tracker::calculate;
use bazaar_tracker::config::AppConfig;
use bazaar_tracker::models::{NewRun, OwnerId, PlacementCategory, RunId, StatsTable};
use bazaar_tracker::storage::{ChangeFeed, JsonlRunStore, RunQuery, RunStore, StorageConfig};

#[derive(Parser)]
#[command(name = "bazaar-tracker")]
#[command(about = "Track runs and season placement statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Record a run
    AddRun {
        #[arg(long)]
        owner: OwnerId,

        #[arg(long)]
        hero: String,

        #[arg(long)]
        wins: i32,

        /// Day the run ended on
        #[arg(long)]
        finished: i32,

        #[arg(long)]
        ranked: bool,

        #[arg(long)]
        season: Option<i32>,

        #[arg(long)]
        patch: Option<String>,

        #[arg(long, default_value = "")]
        media: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Show a page of run history, newest first
    List {
        #[arg(long)]
        owner: OwnerId,

        #[arg(long)]
        season: Option<i32>,

        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Delete one of your runs
    Delete {
        #[arg(long)]
        owner: OwnerId,

        /// Run ID
        id: String,
    },

    /// Print placement and hero statistics for a season
    Report {
        #[arg(long)]
        owner: OwnerId,

        #[arg(long)]
        season: Option<i32>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting bazaar-tracker v{}", env!("CARGO_PKG_VERSION"));

    let changes = ChangeFeed::new();
    let store = Arc::new(JsonlRunStore::new(
        StorageConfig::new(config.data_dir.clone()),
        changes.clone(),
    ));
    let tracker = &config.tracker;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let mut rx = changes.subscribe();
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(change) => tracing::info!(
                            owner = change.owner_id,
                            season = change.season,
                            run = %change.run_id,
                            kind = ?change.kind,
                            "Run data changed"
                        ),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!("Change listener skipped {} notifications", skipped)
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
            let cors = if config.server.cors_origin == "*" {
                cors.allow_origin(Any)
            } else {
                cors.allow_origin(config.server.cors_origin.parse::<HeaderValue>()?)
            };

            let state = AppState {
                store,
                tracker: Arc::new(config.tracker.clone()),
            };
            let app = api::build_router(state).layer(cors);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::AddRun {
            owner,
            hero,
            wins,
            finished,
            ranked,
            season,
            patch,
            media,
            notes,
        } => {
            let input = NewRun {
                hero,
                wins,
                finished,
                ranked,
                season,
                patch,
                media,
                notes,
                upload: String::new(),
            };
            let run = input.into_run(
                owner,
                tracker.default_season,
                &tracker.current_patch,
                Utc::now(),
            )?;
            let run = store.insert(run)?;
            println!(
                "Recorded run {}: {} {} ({})",
                run.id,
                run.hero,
                run.result_label(),
                run.category_with(tracker.tiering)
            );
        }
        Commands::List {
            owner,
            season,
            page,
        } => {
            let season = season.unwrap_or(tracker.default_season);
            let query = RunQuery::new(owner, season);
            let total = store.count(&query)? as u32;
            let pagination =
                api::Pagination::new(Some(page), None, tracker.page_size).clamp_to(total);
            let runs = store.list(
                &query,
                pagination.offset() as usize,
                pagination.page_size as usize,
            )?;

            if runs.is_empty() {
                println!("No runs recorded for season {}", season);
                return Ok(());
            }

            println!(
                "{:<18} {:<12} {:<11} {:<13} {}",
                "ID", "Hero", "Mode", "Win/Day", "Played"
            );
            for run in &runs {
                println!(
                    "{:<18} {:<12} {:<11} {:<13} {}",
                    run.id,
                    run.hero,
                    if run.ranked { "Ranked" } else { "Non-Ranked" },
                    run.result_label(),
                    run.played.format("%Y-%m-%d %I:%M %p")
                );
            }
            println!(
                "\nPage {} of {}",
                pagination.page,
                total_pages(total, pagination.page_size)
            );
        }
        Commands::Delete { owner, id } => {
            let run_id = RunId::from(id);
            if !store.delete(owner, &run_id)? {
                bail!("Run {} not found for user {}", run_id, owner);
            }
            println!("Deleted run {}", run_id);
        }
        Commands::Report {
            owner,
            season,
            json,
        } => {
            let season = season.unwrap_or(tracker.default_season);
            let runs = store.all(&RunQuery::new(owner, season))?;
            let report =
                calculate::season_report(season, &runs, &tracker.roster, tracker.tiering);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("=== Season {} ({} runs) ===", season, report.total_runs);
            println!("\nPlacements:");
            for (category, pct) in report
                .placements
                .categories
                .iter()
                .zip(&report.placements.percentages)
            {
                println!("  {:<14} {:>6.2}%", category.label(), pct);
            }

            println!("\nRuns per hero:");
            for (hero, pct) in report.hero_share.heroes.iter().zip(&report.hero_share.percentages) {
                let count = report.runs_per_hero.get(hero).unwrap_or(0);
                println!("  {:<12} {:>4} {:>6.2}%", hero, count, pct);
            }

            match (&report.ranked, &report.unranked) {
                (Some(ranked), Some(unranked)) => {
                    print_table("Ranked", ranked);
                    print_table("Non-Ranked", unranked);
                }
                _ => println!("\nNo runs recorded for this season."),
            }
        }
    }

    Ok(())
}

fn print_table(title: &str, table: &StatsTable) {
    println!("\n{}:", title);
    print!("  {:<12}", "Hero");
    for category in PlacementCategory::ALL {
        print!(" {:>13}", category.label());
    }
    println!();
    for row in &table.rows {
        print!("  {:<12}", row.hero);
        for count in row.counts.as_array() {
            print!(" {:>13}", count);
        }
        println!();
    }
}
