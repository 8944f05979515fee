//! Fantasy score calculation.
//!
//! Shared by the lineup optimizer and anything that wants a single point
//! number for a player: sum of projected stat values times the league's
//! multipliers, with the backup source filling any stat the odds-derived
//! primary is missing.

use std::collections::BTreeMap;
use tracing::debug;

use crate::projection::ProjectionSet;
use crate::snapshots::BackupSnapshot;
use crate::types::{GridironError, PlayerId, Position, ProjectedScore, StatKind};

/// Non-scoring metadata keys that backup feeds carry alongside stats.
const METADATA_KEYS: &[&str] = &["Opponent Rating", "Team Name"];

// ---------------------------------------------------------------------------
// Multipliers
// ---------------------------------------------------------------------------

/// League scoring multipliers resolved from raw settings.
///
/// Construction fails fast when a required key is absent — guessing a
/// default multiplier would silently mis-rank every player in the league.
#[derive(Debug, Clone, PartialEq)]
pub struct StatMultipliers {
    passing_yards: f64,
    passing_touchdowns: f64,
    interceptions: f64,
    rushing_yards: f64,
    receiving_yards: f64,
    anytime_touchdown: f64,
    receptions: f64,
    te_receptions: f64,
}

impl StatMultipliers {
    /// Required setting keys, in the league platform's vocabulary.
    pub const REQUIRED_KEYS: &'static [&'static str] = &[
        "pass_yd", "pass_td", "pass_int", "rush_yd", "rush_td", "rec_yd", "rec",
    ];

    pub fn from_settings(settings: &BTreeMap<String, f64>) -> Result<Self, GridironError> {
        let required = |key: &str| {
            settings.get(key).copied().ok_or_else(|| {
                GridironError::Configuration(format!(
                    "scoring settings missing required multiplier: {key}"
                ))
            })
        };

        let receptions = required("rec")?;
        Ok(Self {
            passing_yards: required("pass_yd")?,
            passing_touchdowns: required("pass_td")?,
            interceptions: required("pass_int")?,
            rushing_yards: required("rush_yd")?,
            receiving_yards: required("rec_yd")?,
            // Anytime-touchdown props cover rushing and receiving scores;
            // leagues price those identically in practice.
            anytime_touchdown: required("rush_td")?,
            receptions,
            te_receptions: receptions + settings.get("bonus_rec_te").copied().unwrap_or(0.0),
        })
    }

    /// The multiplier for one stat at one position. Tight ends use their
    /// own reception value when the league pays a TE premium.
    pub fn for_stat(&self, kind: StatKind, position: Position) -> f64 {
        match kind {
            StatKind::PassingYards => self.passing_yards,
            StatKind::PassingTouchdowns => self.passing_touchdowns,
            StatKind::Interceptions => self.interceptions,
            StatKind::RushingYards => self.rushing_yards,
            StatKind::ReceivingYards => self.receiving_yards,
            StatKind::AnytimeTouchdown => self.anytime_touchdown,
            StatKind::Receptions => {
                if position == Position::TE {
                    self.te_receptions
                } else {
                    self.receptions
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Score calculation
// ---------------------------------------------------------------------------

/// Project a player's fantasy score under a league's multipliers.
///
/// Primary (odds-derived) stats are summed first; backup stats fill only
/// the gaps. Metadata keys and stat names we do not score are skipped. A
/// player with nothing in either source gets an explicit `NoData` — a
/// different answer than a projected zero.
pub fn fantasy_score(
    id: &PlayerId,
    position: Position,
    projections: &ProjectionSet,
    backup: &BackupSnapshot,
    multipliers: &StatMultipliers,
) -> ProjectedScore {
    if !position.has_vegas_props() {
        return ProjectedScore::NotApplicable;
    }

    let mut points = 0.0;
    let mut primary_used = false;
    let mut backup_used = false;

    let primary = projections.get(id);
    if let Some(projection) = primary {
        for (&kind, stat) in &projection.stats {
            points += stat.expected * multipliers.for_stat(kind, position);
            primary_used = true;
        }
    }

    if let Some(entry) = backup.entry(id) {
        for (key, &value) in &entry.stats {
            if METADATA_KEYS.contains(&key.as_str()) {
                continue;
            }
            let Ok(kind) = key.parse::<StatKind>() else {
                debug!(player = %id, stat = %key, "Unscored backup stat, skipping");
                continue;
            };
            if primary.is_some_and(|p| p.has_stat(kind)) {
                continue;
            }
            points += value * multipliers.for_stat(kind, position);
            backup_used = true;
        }
    }

    match (primary_used, backup_used) {
        (false, false) => ProjectedScore::NoData,
        (false, true) => ProjectedScore::Backup { points },
        _ => ProjectedScore::Projected { points },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
