//! Shared types for the GRIDIRON engine.
//!
//! These types form the data model used across all modules. They are
//! designed to be stable so that projection, simulation, tier, and lineup
//! modules can depend on them without circular references.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tolerance used when asserting that a distribution's mass is 1.0.
pub const MASS_TOLERANCE: f64 = 1e-6;

/// Multiplier applied to the lower bound of an open-ended bucket
/// ("125+ yards") to obtain a representative point value. This is a
/// documented approximation, not a true tail expectation.
pub const OPEN_TAIL_FACTOR: f64 = 1.1;

// ---------------------------------------------------------------------------
// Player identity
// ---------------------------------------------------------------------------

/// Canonical player identity.
///
/// The key is the lowercased alphanumeric squeeze of a display name
/// ("Ja'Marr Chase" → "jamarrchase"). The heuristics that map scraped
/// display names onto canonical identities (suffix fixes, nickname tables)
/// live in an external collaborator; this type only carries the resolved key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wrap an already-canonical key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Fold a display name into its canonical key.
    pub fn from_display_name(name: &str) -> Self {
        Self(
            name.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Stat families & positions
// ---------------------------------------------------------------------------

/// A sportsbook prop stat family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatKind {
    #[serde(rename = "Passing Yards")]
    PassingYards,
    #[serde(rename = "Passing Touchdowns")]
    PassingTouchdowns,
    #[serde(rename = "Interceptions")]
    Interceptions,
    #[serde(rename = "Rushing Yards")]
    RushingYards,
    #[serde(rename = "Receiving Yards")]
    ReceivingYards,
    #[serde(rename = "Receptions")]
    Receptions,
    #[serde(rename = "Anytime Touchdown")]
    AnytimeTouchdown,
}

impl StatKind {
    /// All known stat families (useful for iteration).
    pub const ALL: &'static [StatKind] = &[
        StatKind::PassingYards,
        StatKind::PassingTouchdowns,
        StatKind::Interceptions,
        StatKind::RushingYards,
        StatKind::ReceivingYards,
        StatKind::Receptions,
        StatKind::AnytimeTouchdown,
    ];

    /// The sportsbook display name for this stat family.
    pub fn display_name(&self) -> &'static str {
        match self {
            StatKind::PassingYards => "Passing Yards",
            StatKind::PassingTouchdowns => "Passing Touchdowns",
            StatKind::Interceptions => "Interceptions",
            StatKind::RushingYards => "Rushing Yards",
            StatKind::ReceivingYards => "Receiving Yards",
            StatKind::Receptions => "Receptions",
            StatKind::AnytimeTouchdown => "Anytime Touchdown",
        }
    }

    /// Whether a ladder of lines for this stat counts touchdowns (as
    /// opposed to yardage thresholds).
    pub fn is_touchdown(&self) -> bool {
        matches!(
            self,
            StatKind::AnytimeTouchdown | StatKind::PassingTouchdowns
        )
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for StatKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Passing Yards" => Ok(StatKind::PassingYards),
            "Passing Touchdowns" | "Passing TDs" => Ok(StatKind::PassingTouchdowns),
            "Interceptions" => Ok(StatKind::Interceptions),
            "Rushing Yards" => Ok(StatKind::RushingYards),
            "Receiving Yards" => Ok(StatKind::ReceivingYards),
            "Receptions" => Ok(StatKind::Receptions),
            "Anytime Touchdown" | "Anytime Scorer" => Ok(StatKind::AnytimeTouchdown),
            _ => Err(anyhow::anyhow!("Unknown stat family: {s}")),
        }
    }
}

/// A fantasy position group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DEF,
}

impl Position {
    pub const ALL: &'static [Position] = &[
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::K,
        Position::DEF,
    ];

    /// The tier-page name this position is ranked under.
    /// Defenses are ranked on the "DST" page.
    pub fn tier_page(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DEF => "DST",
        }
    }

    /// Whether players at this position have sportsbook prop markets.
    /// Defenses and kickers do not.
    pub fn has_vegas_props(&self) -> bool {
        !matches!(self, Position::K | Position::DEF)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::QB => write!(f, "QB"),
            Position::RB => write!(f, "RB"),
            Position::WR => write!(f, "WR"),
            Position::TE => write!(f, "TE"),
            Position::K => write!(f, "K"),
            Position::DEF => write!(f, "DEF"),
        }
    }
}

impl std::str::FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "QB" => Ok(Position::QB),
            "RB" => Ok(Position::RB),
            "WR" => Ok(Position::WR),
            "TE" => Ok(Position::TE),
            "K" => Ok(Position::K),
            "DEF" | "DST" => Ok(Position::DEF),
            _ => Err(anyhow::anyhow!("Unknown position: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Roster slots
// ---------------------------------------------------------------------------

/// A starting-lineup slot label, in the league platform's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotLabel {
    #[serde(rename = "QB")]
    Qb,
    #[serde(rename = "RB")]
    Rb,
    #[serde(rename = "WR")]
    Wr,
    #[serde(rename = "TE")]
    Te,
    #[serde(rename = "K")]
    K,
    #[serde(rename = "DEF")]
    Def,
    #[serde(rename = "FLEX")]
    Flex,
    #[serde(rename = "SUPER_FLEX")]
    SuperFlex,
    #[serde(rename = "REC_FLEX")]
    RecFlex,
    #[serde(rename = "BN")]
    Bench,
}

impl SlotLabel {
    /// Parse a raw slot label from a roster snapshot.
    ///
    /// Unknown labels (IDP slots, taxi squads) are a configuration problem
    /// for the league that declares them, not for the whole batch.
    pub fn parse(raw: &str) -> Result<Self, GridironError> {
        match raw {
            "QB" => Ok(SlotLabel::Qb),
            "RB" => Ok(SlotLabel::Rb),
            "WR" => Ok(SlotLabel::Wr),
            "TE" => Ok(SlotLabel::Te),
            "K" => Ok(SlotLabel::K),
            "DEF" | "DST" => Ok(SlotLabel::Def),
            "FLEX" => Ok(SlotLabel::Flex),
            "SUPER_FLEX" => Ok(SlotLabel::SuperFlex),
            "REC_FLEX" => Ok(SlotLabel::RecFlex),
            "BN" => Ok(SlotLabel::Bench),
            other => Err(GridironError::Configuration(format!(
                "unsupported roster slot: {other}"
            ))),
        }
    }
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotLabel::Qb => write!(f, "QB"),
            SlotLabel::Rb => write!(f, "RB"),
            SlotLabel::Wr => write!(f, "WR"),
            SlotLabel::Te => write!(f, "TE"),
            SlotLabel::K => write!(f, "K"),
            SlotLabel::Def => write!(f, "DEF"),
            SlotLabel::Flex => write!(f, "FLEX"),
            SlotLabel::SuperFlex => write!(f, "SUPER_FLEX"),
            SlotLabel::RecFlex => write!(f, "REC_FLEX"),
            SlotLabel::Bench => write!(f, "BN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Odds & distributions
// ---------------------------------------------------------------------------

/// A two-sided over/under market quote in American-odds convention:
/// positive = underdog payout per 100 staked, negative = stake required
/// per 100 profit on a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub kind: StatKind,
    pub line: f64,
    pub over: i32,
    pub under: i32,
}

/// One bucket of a probability distribution: an exact integer outcome, a
/// half-open numeric range `[lower, upper)`, or the open-ended tail
/// `[lower, +∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Exact(u32),
    Range { lower: f64, upper: f64 },
    OrMore(f64),
}

impl Outcome {
    /// Representative point value for this bucket, used by expectation sums
    /// and the simulation sampler. Finite ranges use the arithmetic midpoint
    /// (or the bound itself when degenerate); the open-ended tail uses
    /// `lower × 1.1` — a coarse approximation, not a tail expectation.
    pub fn representative(&self) -> f64 {
        match *self {
            Outcome::Exact(v) => f64::from(v),
            Outcome::Range { lower, upper } => {
                if (upper - lower).abs() < f64::EPSILON {
                    lower
                } else {
                    (lower + upper) / 2.0
                }
            }
            Outcome::OrMore(lower) => lower * OPEN_TAIL_FACTOR,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Outcome::Exact(v) => write!(f, "{v}"),
            Outcome::Range { lower, upper } => write!(f, "[{lower}, {upper})"),
            Outcome::OrMore(lower) => write!(f, "{lower}+"),
        }
    }
}

/// A discrete probability distribution over outcomes.
///
/// Invariant: once the producing estimator has finished normalizing,
/// bucket weights sum to 1.0 within [`MASS_TOLERANCE`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    buckets: Vec<(Outcome, f64)>,
}

impl Distribution {
    pub fn new(buckets: Vec<(Outcome, f64)>) -> Self {
        Self { buckets }
    }

    pub fn buckets(&self) -> &[(Outcome, f64)] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Total probability mass across all buckets.
    pub fn total_mass(&self) -> f64 {
        self.buckets.iter().map(|(_, p)| p).sum()
    }

    /// Whether the mass invariant holds.
    pub fn is_normalized(&self) -> bool {
        (self.total_mass() - 1.0).abs() <= MASS_TOLERANCE
    }

    /// The probability assigned to an exact integer outcome, if present.
    pub fn exact(&self, value: u32) -> Option<f64> {
        self.buckets.iter().find_map(|(o, p)| match o {
            Outcome::Exact(v) if *v == value => Some(*p),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// An odds-derived estimate for one stat: the expected value plus the
/// reconstructed probability distribution it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatProjection {
    pub expected: f64,
    pub distribution: Distribution,
}

/// All odds-derived estimates for one player, plus the Monte Carlo
/// boom/bust profile when the prop sheet was complete enough to simulate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerProjection {
    pub stats: BTreeMap<StatKind, StatProjection>,
    pub simulation: Option<SimulationOutcome>,
}

impl PlayerProjection {
    /// Expected value for a stat, if projected.
    pub fn expected(&self, kind: StatKind) -> Option<f64> {
        self.stats.get(&kind).map(|s| s.expected)
    }

    pub fn has_stat(&self, kind: StatKind) -> bool {
        self.stats.contains_key(&kind)
    }
}

// ---------------------------------------------------------------------------
// Simulation profiles
// ---------------------------------------------------------------------------

/// A fantasy scoring format variant simulated for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoringVariant {
    /// Quarterback, 4-point passing touchdowns.
    QbStandard,
    /// Quarterback, 6-point passing touchdowns.
    QbSixPoint,
    /// Non-quarterback, no reception points.
    Standard,
    /// Non-quarterback, half-point per reception.
    HalfPpr,
    /// Non-quarterback, full point per reception.
    Ppr,
}

impl fmt::Display for ScoringVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringVariant::QbStandard => write!(f, "QB_STD"),
            ScoringVariant::QbSixPoint => write!(f, "QB_6PT"),
            ScoringVariant::Standard => write!(f, "STD"),
            ScoringVariant::HalfPpr => write!(f, "HalfPPR"),
            ScoringVariant::Ppr => write!(f, "PPR"),
        }
    }
}

/// Boom/bust statistics for one scoring variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantProfile {
    /// Fraction of draws at or beyond the variant's boom threshold.
    pub boom: f64,
    /// Fraction of draws at or below the variant's bust threshold.
    pub bust: f64,
    pub mean: f64,
    /// `percentiles[i]` is the (i+1)-th percentile of simulated points.
    /// Always 100 entries.
    pub percentiles: Vec<f64>,
}

impl VariantProfile {
    /// The p-th percentile (1..=100) of simulated points.
    pub fn percentile(&self, p: usize) -> Option<f64> {
        if (1..=100).contains(&p) {
            self.percentiles.get(p - 1).copied()
        } else {
            None
        }
    }
}

/// Per-variant simulation results for one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationProfile {
    pub variants: BTreeMap<ScoringVariant, VariantProfile>,
}

impl SimulationProfile {
    pub fn variant(&self, v: ScoringVariant) -> Option<&VariantProfile> {
        self.variants.get(&v)
    }
}

/// The result of attempting to simulate one player. A failure is an
/// explicit per-player marker — one player's bad prop data never aborts
/// the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SimulationOutcome {
    Profile(SimulationProfile),
    Failed { reason: String },
}

impl SimulationOutcome {
    pub fn profile(&self) -> Option<&SimulationProfile> {
        match self {
            SimulationOutcome::Profile(p) => Some(p),
            SimulationOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SimulationOutcome::Failed { .. })
    }
}

// ---------------------------------------------------------------------------
// Tier ranks
// ---------------------------------------------------------------------------

/// A player's tier rank at one tier page. "Unranked" is the absent-from-page
/// state, not tier 0; it orders after every real tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TierRank {
    Ranked(u32),
    Unranked,
}

impl TierRank {
    /// Sentinel used to order unranked players after all real tiers.
    pub const SENTINEL: u32 = 999;

    /// Numeric sort key: the tier for ranked players, the sentinel otherwise.
    pub fn order_key(&self) -> u32 {
        match self {
            TierRank::Ranked(r) => *r,
            TierRank::Unranked => Self::SENTINEL,
        }
    }

    pub fn from_option(rank: Option<u32>) -> Self {
        match rank {
            Some(r) => TierRank::Ranked(r),
            None => TierRank::Unranked,
        }
    }
}

impl fmt::Display for TierRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierRank::Ranked(r) => write!(f, "{r}"),
            TierRank::Unranked => write!(f, "Unranked"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lineup output
// ---------------------------------------------------------------------------

/// A projected fantasy score with its data-provenance signal. A genuine
/// projected zero is `Projected { points: 0.0 }`; `NoData` means neither
/// the primary nor the backup source had anything for the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectedScore {
    /// At least one stat came from the odds-derived primary source.
    Projected { points: f64 },
    /// Every stat came from the backup source — no lines were available,
    /// so the number may be stale.
    Backup { points: f64 },
    /// Nothing in either source.
    NoData,
    /// Position has no sportsbook scores (DEF/K).
    NotApplicable,
}

impl ProjectedScore {
    pub fn points(&self) -> Option<f64> {
        match self {
            ProjectedScore::Projected { points } | ProjectedScore::Backup { points } => {
                Some(*points)
            }
            ProjectedScore::NoData | ProjectedScore::NotApplicable => None,
        }
    }

    /// Sort key for score tie-breaking: higher is better, no-data ranks last.
    pub fn order_key(&self) -> f64 {
        self.points().unwrap_or(0.0)
    }
}

impl fmt::Display for ProjectedScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectedScore::Projected { points } => write!(f, "{points:.2}"),
            ProjectedScore::Backup { points } => {
                write!(f, "{points:.2} (stale projection, no lines available)")
            }
            ProjectedScore::NoData => write!(f, "N/A"),
            ProjectedScore::NotApplicable => write!(f, "No vegas scores for DEF/K"),
        }
    }
}

/// One filled lineup slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineupRow {
    pub slot: SlotLabel,
    /// Display name of the chosen player; `None` when the pool was empty.
    pub player: Option<String>,
    pub player_id: Option<PlayerId>,
    /// Tier rank at the slot's tier page.
    pub position_rank: TierRank,
    /// Tier rank at the Flex page.
    pub flex_rank: TierRank,
    pub score: ProjectedScore,
    pub team: Option<String>,
    pub opponent_rating: Option<u32>,
}

impl fmt::Display for LineupRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (tier {}, flex {}, proj {})",
            self.slot,
            self.player.as_deref().unwrap_or("None Owned"),
            self.position_rank,
            self.flex_rank,
            self.score,
        )
    }
}

/// Best available free agent at one slot type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeAgentPick {
    pub slot: SlotLabel,
    pub player: String,
    pub player_id: PlayerId,
    pub score: ProjectedScore,
}

/// The lineup recommendation for one league — the sole externally visible
/// output of a computation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineupAssignment {
    pub league: String,
    /// Declared slots in roster order, then leftover bench rows.
    pub rows: Vec<LineupRow>,
    pub free_agents: Vec<FreeAgentPick>,
}

impl LineupAssignment {
    /// Names of all players assigned to a non-bench slot.
    pub fn starters(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter(|r| r.slot != SlotLabel::Bench)
            .filter_map(|r| r.player.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for GRIDIRON.
#[derive(Debug, thiserror::Error)]
pub enum GridironError {
    /// A stat, player, or odds side is absent. Recovered locally by
    /// falling back to backup projections or an "Unranked" sentinel.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Zero or unparsable odds. The affected estimator returns no
    /// projection for that stat only.
    #[error("Malformed odds: {0}")]
    MalformedOdds(String),

    /// Sampling or scoring failed for one player; captured as a per-player
    /// marker rather than aborting the batch.
    #[error("Simulation failed: {0}")]
    Simulation(String),

    /// Scoring settings are missing a required multiplier, or the roster
    /// declares slots we cannot fill. Fatal for the single lineup
    /// computation it affects.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
