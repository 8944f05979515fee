//! Projection engine — odds devigging, distribution reconstruction, and
//! Monte Carlo profile attachment.
//!
//! Each stat family in an odds snapshot is routed to the estimator that
//! matches its market shape: touchdown ladders, yardage ladders, or single
//! over/under lines. Failures are per-stat or per-player; one bad quote
//! never aborts the pass.

pub mod over_under;
pub mod touchdowns;
pub mod yardage;

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::odds::VigMethod;
use crate::simulation::Simulator;
use crate::snapshots::{NameResolver, OddsSnapshot, StatFeed};
use crate::types::{
    Distribution, OddsQuote, PlayerId, PlayerProjection, SimulationOutcome, StatKind,
    StatProjection,
};

pub use over_under::{project_over_under, SyntheticShape};
pub use touchdowns::estimate_touchdowns;
pub use yardage::estimate_yardage;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// All per-player projections produced by one computation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionSet {
    pub players: BTreeMap<PlayerId, PlayerProjection>,
}

impl ProjectionSet {
    pub fn get(&self, id: &PlayerId) -> Option<&PlayerProjection> {
        self.players.get(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Converts an odds snapshot into per-player stat projections, optionally
/// attaching Monte Carlo boom/bust profiles.
pub struct ProjectionBuilder {
    vig: VigMethod,
    shape: SyntheticShape,
    simulator: Option<Simulator>,
}

impl ProjectionBuilder {
    pub fn new(vig: VigMethod, shape: SyntheticShape) -> Self {
        Self {
            vig,
            shape,
            simulator: None,
        }
    }

    /// Attach a simulator; players with a complete prop sheet get a
    /// boom/bust profile, the rest get an explicit failure marker.
    pub fn with_simulator(mut self, simulator: Simulator) -> Self {
        self.simulator = Some(simulator);
        self
    }

    /// Run one projection pass over a snapshot.
    ///
    /// Names that the resolver rejects are dropped with a warning, exactly
    /// like quotes for players outside the tracked universe. Estimator
    /// failures drop only the affected stat.
    pub fn compute_projections<R: Rng + ?Sized>(
        &self,
        snapshot: &OddsSnapshot,
        resolver: &dyn NameResolver,
        rng: &mut R,
    ) -> ProjectionSet {
        let mut players: BTreeMap<PlayerId, PlayerProjection> = BTreeMap::new();

        for (&kind, feed) in &snapshot.props {
            match feed {
                StatFeed::Ladder { players: quotes } => {
                    for (name, ladder) in quotes {
                        let Some(id) = self.resolve(resolver, name) else {
                            continue;
                        };
                        let result = if kind.is_touchdown() {
                            estimate_touchdowns(ladder, &self.vig)
                        } else {
                            estimate_yardage(ladder, &self.vig)
                        };
                        Self::record(&mut players, id, name, kind, result);
                    }
                }
                StatFeed::OverUnder { players: quotes } => {
                    for (name, entry) in quotes {
                        let Some(id) = self.resolve(resolver, name) else {
                            continue;
                        };
                        let quote = OddsQuote {
                            kind,
                            line: entry.line,
                            over: entry.over,
                            under: entry.under,
                        };
                        let result = project_over_under(&quote, &self.shape);
                        Self::record(&mut players, id, name, kind, result);
                    }
                }
            }
        }

        if let Some(simulator) = &self.simulator {
            for (id, projection) in players.iter_mut() {
                projection.simulation = Some(Self::simulate_player(simulator, id, projection, rng));
            }
        }

        info!(
            players = players.len(),
            stat_families = snapshot.props.len(),
            simulated = self.simulator.is_some(),
            "Projection pass complete"
        );

        ProjectionSet { players }
    }

    fn resolve(&self, resolver: &dyn NameResolver, name: &str) -> Option<PlayerId> {
        let resolved = resolver.resolve(name);
        if resolved.is_none() {
            warn!(player = %name, "Name did not resolve to a tracked player, skipping quote");
        }
        resolved
    }

    fn record(
        players: &mut BTreeMap<PlayerId, PlayerProjection>,
        id: PlayerId,
        name: &str,
        kind: StatKind,
        result: Result<StatProjection, crate::types::GridironError>,
    ) {
        match result {
            Ok(projection) => {
                players.entry(id).or_default().stats.insert(kind, projection);
            }
            Err(e) => {
                debug!(player = %name, stat = %kind, error = %e, "No projection for stat");
            }
        }
    }

    fn simulate_player<R: Rng + ?Sized>(
        simulator: &Simulator,
        id: &PlayerId,
        projection: &PlayerProjection,
        rng: &mut R,
    ) -> SimulationOutcome {
        if let Some(gap) = prop_sheet_gap(&projection.stats) {
            debug!(player = %id, gap = %gap, "Prop sheet too thin to simulate");
            return SimulationOutcome::Failed { reason: gap };
        }

        let distributions: BTreeMap<StatKind, Distribution> = projection
            .stats
            .iter()
            .map(|(&kind, stat)| (kind, stat.distribution.clone()))
            .collect();

        match simulator.simulate(&distributions, rng) {
            Ok(profile) => SimulationOutcome::Profile(profile),
            Err(e) => {
                warn!(player = %id, error = %e, "Simulation failed for player");
                SimulationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Prop sheet completeness
// ---------------------------------------------------------------------------

/// Why a player's prop sheet is too thin to simulate, if it is.
///
/// Quarterbacks need the full passing trio; rushers need the
/// rushing/receiving quartet; everyone else needs the receiving trio.
/// A quarterback missing rushing props still simulates — the gap only
/// understates scrambling upside.
fn prop_sheet_gap(stats: &BTreeMap<StatKind, StatProjection>) -> Option<String> {
    let has = |k: StatKind| stats.contains_key(&k);

    if has(StatKind::PassingYards) || has(StatKind::PassingTouchdowns) {
        if !(has(StatKind::PassingYards)
            && has(StatKind::PassingTouchdowns)
            && has(StatKind::Interceptions))
        {
            return Some("not enough passing props".into());
        }
        if !has(StatKind::AnytimeTouchdown) || !has(StatKind::RushingYards) {
            debug!("Missing rushing props for a quarterback");
        }
        None
    } else if has(StatKind::RushingYards) {
        if has(StatKind::Receptions)
            && has(StatKind::ReceivingYards)
            && has(StatKind::AnytimeTouchdown)
        {
            None
        } else {
            Some("not enough rushing/receiving props".into())
        }
    } else if has(StatKind::ReceivingYards)
        && has(StatKind::Receptions)
        && has(StatKind::AnytimeTouchdown)
    {
        None
    } else {
        Some("not enough receiving props".into())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
