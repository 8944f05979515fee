//! GRIDIRON — Betting-Market Fantasy Football Lineup Engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! reads the materialized snapshots (odds, tiers, rosters, backup
//! projections), runs one projection→simulation→lineup pass, and writes
//! the recommendations JSON.

use anyhow::{Context, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use gridiron::config;
use gridiron::lineup::LineupOptimizer;
use gridiron::projection::{ProjectionBuilder, ProjectionSet, SyntheticShape};
use gridiron::simulation::Simulator;
use gridiron::snapshots::{self, CanonicalResolver};
use gridiron::tiers::TierBook;
use gridiron::types::LineupAssignment;

const BANNER: &str = r#"
  ____ ____  ___ ____ ___ ____   ___  _   _
 / ___|  _ \|_ _|  _ \_ _|  _ \ / _ \| \ | |
| |  _| |_) || || | | | || |_) | | | |  \| |
| |_| |  _ < | || |_| | ||  _ <| |_| | |\  |
 \____|_| \_\___|____/___|_| \_\\___/|_| \_|

  Gridiron Recommendations from Implied Distributions & Ranks
  v0.1.0 — Lineup Engine
"#;

/// Everything one pass produces, as written to the output file.
#[derive(Debug, Serialize)]
struct Recommendations {
    generated_at: chrono::DateTime<Utc>,
    projections: ProjectionSet,
    lineups: BTreeMap<String, LineupAssignment>,
}

fn main() -> Result<()> {
    // Load configuration from TOML (defaults when the file is absent)
    let cfg = config::AppConfig::load_or_default("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        engine = %cfg.engine.name,
        vig = cfg.projection.vig,
        market_derived_vig = cfg.projection.market_derived_vig,
        draws = cfg.simulation.draws,
        "GRIDIRON starting up"
    );

    // -- Load snapshots ----------------------------------------------------

    let odds = snapshots::load_odds(&cfg.snapshots.odds)?;
    let tiers = snapshots::load_tiers(&cfg.snapshots.tiers)?;
    let rosters = snapshots::load_rosters(&cfg.snapshots.rosters)?;
    let backup = snapshots::load_backup(&cfg.snapshots.backup)?;

    // -- Projections ---------------------------------------------------------

    let mut builder = ProjectionBuilder::new(
        cfg.projection.vig_method(),
        SyntheticShape::from(&cfg.projection),
    );
    if cfg.simulation.enabled {
        builder = builder.with_simulator(Simulator::new(cfg.simulation.draws));
    }

    // Production draws come from entropy; tests inject seeded generators.
    let mut rng = StdRng::from_entropy();
    let resolver = CanonicalResolver;
    let projections = builder.compute_projections(&odds, &resolver, &mut rng);
    info!(players = projections.len(), "Projections computed");

    // -- Lineups -------------------------------------------------------------

    let book = TierBook::from_snapshot(&tiers);
    info!(ranked_players = book.len(), "Tier book built");

    let optimizer = LineupOptimizer::new(&book, &projections, &backup, &resolver);
    let lineups = optimizer.compute_lineups(&rosters);

    // -- Output ----------------------------------------------------------------

    let recommendations = Recommendations {
        generated_at: Utc::now(),
        projections,
        lineups,
    };

    let json = serde_json::to_string_pretty(&recommendations)
        .context("Failed to serialise recommendations")?;
    std::fs::write(&cfg.engine.output_path, &json)
        .with_context(|| format!("Failed to write {}", cfg.engine.output_path))?;

    info!(
        output = %cfg.engine.output_path,
        leagues = recommendations.lineups.len(),
        "GRIDIRON finished cleanly."
    );

    for lineup in recommendations.lineups.values() {
        for row in &lineup.rows {
            info!(league = %lineup.league, "{row}");
        }
    }

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gridiron=info"));

    let json_logging = std::env::var("GRIDIRON_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
