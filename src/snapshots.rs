//! Snapshot boundary layer.
//!
//! The engine never fetches anything itself — odds, tiers, rosters, and
//! backup projections arrive as fully-materialized snapshots produced by
//! the external scraping/storage collaborators. This module defines their
//! shapes, the name-resolution seam, and JSON file loading for the binary.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

use crate::types::{PlayerId, Position, StatKind};

// ---------------------------------------------------------------------------
// Name resolution seam
// ---------------------------------------------------------------------------

/// Maps scraped display names onto canonical player identities.
///
/// The real normalization heuristics (suffix trimming, nickname tables,
/// team disambiguation) belong to an external collaborator; the engine only
/// needs this lookup. `None` means the name is unknown and the quote should
/// be skipped.
pub trait NameResolver {
    fn resolve(&self, display_name: &str) -> Option<PlayerId>;
}

/// Resolver that folds every name to its canonical key, never rejecting.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalResolver;

impl NameResolver for CanonicalResolver {
    fn resolve(&self, display_name: &str) -> Option<PlayerId> {
        Some(PlayerId::from_display_name(display_name))
    }
}

/// Resolver restricted to a known player universe. Names that fold to a
/// key outside the universe resolve to `None` — matching how odds for
/// players we do not track are dropped at the boundary.
#[derive(Debug, Clone, Default)]
pub struct KnownPlayersResolver {
    known: HashSet<PlayerId>,
}

impl KnownPlayersResolver {
    pub fn new(display_names: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            known: display_names
                .into_iter()
                .map(|n| PlayerId::from_display_name(n.as_ref()))
                .collect(),
        }
    }
}

impl NameResolver for KnownPlayersResolver {
    fn resolve(&self, display_name: &str) -> Option<PlayerId> {
        let id = PlayerId::from_display_name(display_name);
        self.known.contains(&id).then_some(id)
    }
}

// ---------------------------------------------------------------------------
// Odds snapshot
// ---------------------------------------------------------------------------

/// One stat family's feed: either a ladder of cumulative lines or a single
/// line with two-sided odds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "market", rename_all = "snake_case")]
pub enum StatFeed {
    /// "N or more" ladders: line → American odds, per player.
    Ladder {
        players: BTreeMap<String, BTreeMap<u32, i32>>,
    },
    /// Single line with over/under odds, per player.
    OverUnder {
        players: BTreeMap<String, OverUnderEntry>,
    },
}

impl StatFeed {
    pub fn player_count(&self) -> usize {
        match self {
            StatFeed::Ladder { players } => players.len(),
            StatFeed::OverUnder { players } => players.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OverUnderEntry {
    pub line: f64,
    pub over: i32,
    pub under: i32,
}

/// A full odds snapshot as delivered by the odds-scraping collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OddsSnapshot {
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
    pub props: BTreeMap<StatKind, StatFeed>,
}

// ---------------------------------------------------------------------------
// Tier snapshot
// ---------------------------------------------------------------------------

/// Scraped tier listings: position-group page name → tier number →
/// player display names. Tier numbers arrive as strings because the
/// upstream JSON uses object keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierSnapshot {
    pub pages: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

// ---------------------------------------------------------------------------
// Roster snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterPlayer {
    pub name: String,
    pub position: Position,
}

/// One league's roster: the user's players, the undrafted pool, the
/// starting-slot layout in declaration order, and scoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueRoster {
    pub league: String,
    /// Raw slot labels, in declaration order.
    pub positions: Vec<String>,
    /// League scoring settings: stat key → point multiplier.
    pub scoring: BTreeMap<String, f64>,
    pub players: Vec<RosterPlayer>,
    /// Players owned by nobody in the league (the free-agent pool).
    #[serde(default)]
    pub free_agents: Vec<RosterPlayer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub leagues: Vec<LeagueRoster>,
}

// ---------------------------------------------------------------------------
// Backup projections snapshot
// ---------------------------------------------------------------------------

/// Best-effort per-player estimates used when odds-derived projections are
/// missing a stat, plus matchup metadata carried along by the same feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupEntry {
    /// Stat display name → projected value. May contain non-scoring
    /// metadata keys; scoring skips those.
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub opponent_rating: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupSnapshot {
    pub players: BTreeMap<PlayerId, BackupEntry>,
}

impl BackupSnapshot {
    pub fn entry(&self, id: &PlayerId) -> Option<&BackupEntry> {
        self.players.get(id)
    }
}

// ---------------------------------------------------------------------------
// File loading
// ---------------------------------------------------------------------------

fn load_json<T: DeserializeOwned>(path: &str, what: &str) -> Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} snapshot from {path}"))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {what} snapshot {path}"))
}

pub fn load_odds(path: &str) -> Result<OddsSnapshot> {
    let snapshot: OddsSnapshot = load_json(path, "odds")?;
    info!(
        path,
        stat_families = snapshot.props.len(),
        fetched_at = ?snapshot.fetched_at,
        "Odds snapshot loaded"
    );
    Ok(snapshot)
}

pub fn load_tiers(path: &str) -> Result<TierSnapshot> {
    let snapshot: TierSnapshot = load_json(path, "tier")?;
    info!(path, pages = snapshot.pages.len(), "Tier snapshot loaded");
    Ok(snapshot)
}

pub fn load_rosters(path: &str) -> Result<RosterSnapshot> {
    let snapshot: RosterSnapshot = load_json(path, "roster")?;
    info!(
        path,
        leagues = snapshot.leagues.len(),
        "Roster snapshot loaded"
    );
    Ok(snapshot)
}

/// Backup projections are best-effort: a missing file is an empty snapshot,
/// not a failure.
pub fn load_backup(path: &str) -> Result<BackupSnapshot> {
    if !Path::new(path).exists() {
        info!(path, "No backup projection snapshot found, continuing without");
        return Ok(BackupSnapshot::default());
    }
    let snapshot: BackupSnapshot = load_json(path, "backup projection")?;
    info!(
        path,
        players = snapshot.players.len(),
        "Backup projections loaded"
    );
    Ok(snapshot)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
