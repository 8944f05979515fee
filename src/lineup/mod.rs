//! Lineup slot-filling optimizer.
//!
//! Walks a league's declared slots in order, resolving each to its
//! candidate pools and picking the best remaining player by a tie-break
//! cascade: tier rank at the slot's page, then Flex tier rank, then
//! projected fantasy score. Winners are consumed from every pool they
//! belong to before the next slot is considered.
//!
//! The algorithm is greedy and order-dependent — a different slot order
//! can produce a different lineup. That is an accepted property: slot
//! declaration order is part of the determinism contract.

pub mod scoring;
pub mod slots;

pub use scoring::{fantasy_score, StatMultipliers};

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, error, info};

use crate::projection::ProjectionSet;
use crate::snapshots::{BackupSnapshot, LeagueRoster, NameResolver, RosterPlayer, RosterSnapshot};
use crate::tiers::{LeagueTiers, TierBook, TierPrefixes};
use crate::types::{
    FreeAgentPick, GridironError, LineupAssignment, LineupRow, Position, ProjectedScore,
    SlotLabel, TierRank,
};

// ---------------------------------------------------------------------------
// Candidate pools
// ---------------------------------------------------------------------------

/// The remaining candidate pools during one fill, keyed by position with
/// roster declaration order preserved inside each pool. Owned by the
/// filling loop; nothing else aliases it while slots are being consumed.
#[derive(Debug, Default)]
struct PositionPools {
    pools: BTreeMap<Position, Vec<String>>,
}

impl PositionPools {
    fn new(players: &[RosterPlayer]) -> Self {
        let mut pools: BTreeMap<Position, Vec<String>> = BTreeMap::new();
        for player in players {
            pools
                .entry(player.position)
                .or_default()
                .push(player.name.clone());
        }
        Self { pools }
    }

    /// Candidates across the given pools, in pool order then roster order.
    fn candidates(&self, positions: &[Position]) -> Vec<String> {
        positions
            .iter()
            .flat_map(|pos| self.pools.get(pos).into_iter().flatten().cloned())
            .collect()
    }

    /// The fallback pool for bench slots: the first position that still
    /// has players.
    fn first_nonempty(&self) -> Option<Position> {
        self.pools
            .iter()
            .find(|(_, names)| !names.is_empty())
            .map(|(&pos, _)| pos)
    }

    /// Remove a consumed player from every pool they belong to.
    fn remove_everywhere(&mut self, name: &str) {
        for pool in self.pools.values_mut() {
            pool.retain(|n| n != name);
        }
        self.pools.retain(|_, names| !names.is_empty());
    }

    fn into_remaining(self) -> Vec<(Position, String)> {
        self.pools
            .into_iter()
            .flat_map(|(pos, names)| names.into_iter().map(move |name| (pos, name)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Ranking cascade
// ---------------------------------------------------------------------------

/// Candidate sort keys: slot-page tier, Flex tier, projected score.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RankKeys {
    tier: u32,
    flex: u32,
    score: f64,
}

impl RankKeys {
    /// Strictly better: lower tier, then lower flex tier, then higher
    /// score. Full ties keep the incumbent, so candidate order decides.
    fn beats(&self, other: &RankKeys) -> bool {
        if self.tier != other.tier {
            return self.tier < other.tier;
        }
        if self.flex != other.flex {
            return self.flex < other.flex;
        }
        self.score > other.score
    }
}

// ---------------------------------------------------------------------------
// Optimizer
// ---------------------------------------------------------------------------

/// Fills starting lineups for every league in a roster snapshot.
pub struct LineupOptimizer<'a> {
    book: &'a TierBook,
    projections: &'a ProjectionSet,
    backup: &'a BackupSnapshot,
    resolver: &'a dyn NameResolver,
}

impl<'a> LineupOptimizer<'a> {
    pub fn new(
        book: &'a TierBook,
        projections: &'a ProjectionSet,
        backup: &'a BackupSnapshot,
        resolver: &'a dyn NameResolver,
    ) -> Self {
        Self {
            book,
            projections,
            backup,
            resolver,
        }
    }

    /// Compute lineups for all leagues. A league whose configuration is
    /// broken (missing multiplier, unsupported slot) is skipped with an
    /// error log; the rest of the batch still completes.
    pub fn compute_lineups(
        &self,
        rosters: &RosterSnapshot,
    ) -> BTreeMap<String, LineupAssignment> {
        let mut lineups = BTreeMap::new();
        for league in &rosters.leagues {
            match self.compute_league(league) {
                Ok(assignment) => {
                    info!(
                        league = %assignment.league,
                        rows = assignment.rows.len(),
                        free_agents = assignment.free_agents.len(),
                        "Lineup computed"
                    );
                    lineups.insert(league.league.clone(), assignment);
                }
                Err(e) => {
                    error!(league = %league.league, error = %e, "Skipping league");
                }
            }
        }
        lineups
    }

    /// Compute one league's lineup. Configuration problems are fatal for
    /// this league only.
    pub fn compute_league(
        &self,
        league: &LeagueRoster,
    ) -> Result<LineupAssignment, GridironError> {
        let multipliers = StatMultipliers::from_settings(&league.scoring)?;
        let slots: Vec<SlotLabel> = league
            .positions
            .iter()
            .map(|raw| SlotLabel::parse(raw))
            .collect::<Result<_, _>>()?;

        let prefixes = TierPrefixes::from_scoring(&league.scoring);
        let tiers = LeagueTiers::resolve(
            self.book,
            &prefixes,
            &slots,
            league
                .players
                .iter()
                .chain(&league.free_agents)
                .map(|p| p.name.as_str()),
        );
        let positions: HashMap<String, Position> = league
            .players
            .iter()
            .chain(&league.free_agents)
            .map(|p| (p.name.clone(), p.position))
            .collect();

        let mut pools = PositionPools::new(&league.players);
        let mut rows = Vec::with_capacity(slots.len());

        for &slot in &slots {
            let (eligible, page) = match slot {
                SlotLabel::Bench => match pools.first_nonempty() {
                    Some(pos) => (vec![pos], pos.tier_page()),
                    None => {
                        debug!(league = %league.league, "No players left for a bench slot");
                        rows.push(empty_row(slot));
                        continue;
                    }
                },
                other => {
                    let page = slots::tier_page(other).unwrap_or("Flex");
                    (slots::eligible_positions(other).to_vec(), page)
                }
            };

            let candidates = pools.candidates(&eligible);
            match self.pick_best(&candidates, page, &tiers, &positions, &multipliers) {
                Some(winner) => {
                    pools.remove_everywhere(&winner);
                    rows.push(self.make_row(slot, &winner, page, &tiers, &positions, &multipliers));
                }
                None => rows.push(empty_row(slot)),
            }
        }

        // Whatever survives every declared slot rides the bench (IR stashes,
        // taxi players, overflow).
        for (position, name) in pools.into_remaining() {
            rows.push(self.make_row(
                SlotLabel::Bench,
                &name,
                position.tier_page(),
                &tiers,
                &positions,
                &multipliers,
            ));
        }

        let free_agents = self.best_free_agents(league, &tiers, &multipliers);

        Ok(LineupAssignment {
            league: league.league.clone(),
            rows,
            free_agents,
        })
    }

    /// Best candidate by the tie-break cascade; `None` for an empty pool.
    fn pick_best(
        &self,
        candidates: &[String],
        page: &str,
        tiers: &LeagueTiers,
        positions: &HashMap<String, Position>,
        multipliers: &StatMultipliers,
    ) -> Option<String> {
        let mut best: Option<(RankKeys, &String)> = None;
        for name in candidates {
            let keys = RankKeys {
                tier: tiers.rank(name, page).order_key(),
                flex: tiers.flex_rank(name).order_key(),
                score: self
                    .score_for(name, positions, multipliers)
                    .order_key(),
            };
            let takes_lead = match &best {
                None => true,
                Some((incumbent, _)) => keys.beats(incumbent),
            };
            if takes_lead {
                best = Some((keys, name));
            }
        }
        best.map(|(_, name)| name.clone())
    }

    fn score_for(
        &self,
        name: &str,
        positions: &HashMap<String, Position>,
        multipliers: &StatMultipliers,
    ) -> ProjectedScore {
        let Some(&position) = positions.get(name) else {
            return ProjectedScore::NoData;
        };
        let Some(id) = self.resolver.resolve(name) else {
            return ProjectedScore::NoData;
        };
        fantasy_score(&id, position, self.projections, self.backup, multipliers)
    }

    fn make_row(
        &self,
        slot: SlotLabel,
        name: &str,
        page: &str,
        tiers: &LeagueTiers,
        positions: &HashMap<String, Position>,
        multipliers: &StatMultipliers,
    ) -> LineupRow {
        let player_id = self.resolver.resolve(name);
        let entry = player_id.as_ref().and_then(|id| self.backup.entry(id));
        LineupRow {
            slot,
            player: Some(name.to_string()),
            player_id: player_id.clone(),
            position_rank: tiers.rank(name, page),
            flex_rank: tiers.flex_rank(name),
            score: self.score_for(name, positions, multipliers),
            team: entry.and_then(|e| e.team.clone()),
            opponent_rating: entry.and_then(|e| e.opponent_rating),
        }
    }

    /// Best available free agent per position, plus the best non-QB on the
    /// Flex page. Identical ranking cascade, no pool consumption — every
    /// free agent stays available to every slot type.
    fn best_free_agents(
        &self,
        league: &LeagueRoster,
        tiers: &LeagueTiers,
        multipliers: &StatMultipliers,
    ) -> Vec<FreeAgentPick> {
        let positions: HashMap<String, Position> = league
            .free_agents
            .iter()
            .map(|p| (p.name.clone(), p.position))
            .collect();

        let mut best: BTreeMap<SlotLabel, (RankKeys, FreeAgentPick)> = BTreeMap::new();

        for fa in &league.free_agents {
            let slot = match fa.position {
                Position::QB => SlotLabel::Qb,
                Position::RB => SlotLabel::Rb,
                Position::WR => SlotLabel::Wr,
                Position::TE => SlotLabel::Te,
                // Streaming kickers/defenses is out of tier territory.
                Position::K | Position::DEF => continue,
            };
            let Some(id) = self.resolver.resolve(&fa.name) else {
                debug!(player = %fa.name, "Free agent name did not resolve, skipping");
                continue;
            };
            let score = fantasy_score(&id, fa.position, self.projections, self.backup, multipliers);
            let flex = tiers.flex_rank(&fa.name).order_key();
            let keys = RankKeys {
                tier: tiers.rank(&fa.name, fa.position.tier_page()).order_key(),
                flex,
                score: score.order_key(),
            };

            consider(&mut best, slot, keys, || FreeAgentPick {
                slot,
                player: fa.name.clone(),
                player_id: id.clone(),
                score,
            });

            if fa.position != Position::QB {
                let flex_keys = RankKeys {
                    tier: flex,
                    flex,
                    score: score.order_key(),
                };
                consider(&mut best, SlotLabel::Flex, flex_keys, || FreeAgentPick {
                    slot: SlotLabel::Flex,
                    player: fa.name.clone(),
                    player_id: id.clone(),
                    score,
                });
            }
        }

        best.into_values().map(|(_, pick)| pick).collect()
    }
}

fn consider(
    best: &mut BTreeMap<SlotLabel, (RankKeys, FreeAgentPick)>,
    slot: SlotLabel,
    keys: RankKeys,
    pick: impl FnOnce() -> FreeAgentPick,
) {
    let takes_lead = match best.get(&slot) {
        None => true,
        Some((incumbent, _)) => keys.beats(incumbent),
    };
    if takes_lead {
        best.insert(slot, (keys, pick()));
    }
}

fn empty_row(slot: SlotLabel) -> LineupRow {
    LineupRow {
        slot,
        player: None,
        player_id: None,
        position_rank: TierRank::Unranked,
        flex_rank: TierRank::Unranked,
        score: ProjectedScore::NoData,
        team: None,
        opponent_rating: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshots::{CanonicalResolver, TierSnapshot};
    use crate::types::{Distribution, Outcome, PlayerId, PlayerProjection, StatKind,
        StatProjection};

    fn scoring_settings() -> BTreeMap<String, f64> {
        [
            ("pass_yd", 0.04),
            ("pass_td", 4.0),
            ("pass_int", -2.0),
            ("rush_yd", 0.1),
            ("rush_td", 6.0),
            ("rec_yd", 0.1),
            ("rec", 0.0),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
    }

    fn player(name: &str, position: Position) -> RosterPlayer {
        RosterPlayer {
            name: name.to_string(),
            position,
        }
    }

    /// Standard-scoring tier book: bare page names, tiers as given.
    fn book(pages: &[(&str, &[(&str, u32)])]) -> TierBook {
        let mut snapshot = TierSnapshot::default();
        for (page, entries) in pages {
            let mut tiers: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for (name, tier) in *entries {
                tiers
                    .entry(tier.to_string())
                    .or_default()
                    .push(name.to_string());
            }
            snapshot.pages.insert(page.to_string(), tiers);
        }
        TierBook::from_snapshot(&snapshot)
    }

    /// Projections where each player has a rushing-yards expectation that
    /// scores points × 10 yards under standard settings.
    fn projections(points: &[(&str, f64)]) -> ProjectionSet {
        let mut set = ProjectionSet::default();
        for (name, pts) in points {
            let mut projection = PlayerProjection::default();
            projection.stats.insert(
                StatKind::RushingYards,
                StatProjection {
                    expected: pts * 10.0,
                    distribution: Distribution::new(vec![(Outcome::Exact(0), 1.0)]),
                },
            );
            set.players
                .insert(PlayerId::from_display_name(name), projection);
        }
        set
    }

    fn league(positions: &[&str], players: Vec<RosterPlayer>) -> LeagueRoster {
        LeagueRoster {
            league: "Test League".to_string(),
            positions: positions.iter().map(|s| s.to_string()).collect(),
            scoring: scoring_settings(),
            players,
            free_agents: Vec::new(),
        }
    }

    fn names(rows: &[LineupRow]) -> Vec<(SlotLabel, Option<&str>)> {
        rows.iter()
            .map(|r| (r.slot, r.player.as_deref()))
            .collect()
    }

    #[test]
    fn test_tier_rank_drives_selection() {
        let book = book(&[("RB", &[("Slow Starter", 4), ("Stud Back", 1)])]);
        let projections = ProjectionSet::default();
        let backup = BackupSnapshot::default();
        let optimizer = LineupOptimizer::new(&book, &projections, &backup, &CanonicalResolver);

        let league = league(
            &["RB", "BN"],
            vec![
                player("Slow Starter", Position::RB),
                player("Stud Back", Position::RB),
            ],
        );
        let lineup = optimizer.compute_league(&league).unwrap();
        assert_eq!(
            names(&lineup.rows),
            vec![
                (SlotLabel::Rb, Some("Stud Back")),
                (SlotLabel::Bench, Some("Slow Starter")),
            ]
        );
    }

    #[test]
    fn test_flex_rank_breaks_tier_ties_over_score() {
        // Equal position tiers (2,2); flex ranks (1,3); scores (10,20).
        // The flex rank must decide, regardless of projected score.
        let book = book(&[
            ("RB", &[("Flex One", 2), ("High Scorer", 2)]),
            ("Flex", &[("Flex One", 1), ("High Scorer", 3)]),
        ]);
        let projections = projections(&[("Flex One", 10.0), ("High Scorer", 20.0)]);
        let backup = BackupSnapshot::default();
        let optimizer = LineupOptimizer::new(&book, &projections, &backup, &CanonicalResolver);

        let league = league(
            &["RB"],
            vec![
                player("High Scorer", Position::RB),
                player("Flex One", Position::RB),
            ],
        );
        let lineup = optimizer.compute_league(&league).unwrap();
        assert_eq!(lineup.rows[0].player.as_deref(), Some("Flex One"));
    }

    #[test]
    fn test_score_is_final_tie_break_and_only_criterion_without_tiers() {
        // Nobody is ranked anywhere; the higher projection must win.
        let book = book(&[]);
        let projections = projections(&[("Lesser", 7.5), ("Greater", 14.0)]);
        let backup = BackupSnapshot::default();
        let optimizer = LineupOptimizer::new(&book, &projections, &backup, &CanonicalResolver);

        let league = league(
            &["WR"],
            vec![
                player("Lesser", Position::WR),
                player("Greater", Position::WR),
            ],
        );
        let lineup = optimizer.compute_league(&league).unwrap();
        assert_eq!(lineup.rows[0].player.as_deref(), Some("Greater"));
    }

    #[test]
    fn test_winner_consumed_before_next_slot() {
        let book = book(&[("RB", &[("Stud Back", 1), ("Second Back", 2)])]);
        let projections = ProjectionSet::default();
        let backup = BackupSnapshot::default();
        let optimizer = LineupOptimizer::new(&book, &projections, &backup, &CanonicalResolver);

        let league = league(
            &["RB", "RB", "FLEX"],
            vec![
                player("Stud Back", Position::RB),
                player("Second Back", Position::RB),
                player("Third Back", Position::RB),
            ],
        );
        let lineup = optimizer.compute_league(&league).unwrap();
        let mut seen: Vec<&str> = lineup.rows.iter().filter_map(|r| r.player.as_deref()).collect();
        let total = seen.len();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), total, "no player may fill two slots");
        assert_eq!(lineup.rows[0].player.as_deref(), Some("Stud Back"));
        assert_eq!(lineup.rows[1].player.as_deref(), Some("Second Back"));
        assert_eq!(lineup.rows[2].player.as_deref(), Some("Third Back"));
    }

    #[test]
    fn test_superflex_draws_from_quarterbacks() {
        let book = book(&[("QB", &[("Starter QB", 1), ("Backup QB", 4)])]);
        let projections = ProjectionSet::default();
        let backup = BackupSnapshot::default();
        let optimizer = LineupOptimizer::new(&book, &projections, &backup, &CanonicalResolver);

        let league = league(
            &["QB", "SUPER_FLEX"],
            vec![
                player("Starter QB", Position::QB),
                player("Backup QB", Position::QB),
            ],
        );
        let lineup = optimizer.compute_league(&league).unwrap();
        assert_eq!(
            names(&lineup.rows),
            vec![
                (SlotLabel::Qb, Some("Starter QB")),
                (SlotLabel::SuperFlex, Some("Backup QB")),
            ]
        );
    }

    #[test]
    fn test_empty_pool_leaves_slot_open() {
        let book = book(&[]);
        let projections = ProjectionSet::default();
        let backup = BackupSnapshot::default();
        let optimizer = LineupOptimizer::new(&book, &projections, &backup, &CanonicalResolver);

        let league = league(&["QB", "RB"], vec![player("Only Back", Position::RB)]);
        let lineup = optimizer.compute_league(&league).unwrap();
        assert_eq!(lineup.rows[0].player, None);
        assert_eq!(lineup.rows[0].score, ProjectedScore::NoData);
        assert_eq!(lineup.rows[1].player.as_deref(), Some("Only Back"));
    }

    #[test]
    fn test_leftovers_ride_the_bench() {
        let book = book(&[("RB", &[("Stud Back", 1)])]);
        let projections = ProjectionSet::default();
        let backup = BackupSnapshot::default();
        let optimizer = LineupOptimizer::new(&book, &projections, &backup, &CanonicalResolver);

        // One declared slot, three players: two must land on the bench.
        let league = league(
            &["RB"],
            vec![
                player("Stud Back", Position::RB),
                player("IR Stash", Position::RB),
                player("Handcuff", Position::RB),
            ],
        );
        let lineup = optimizer.compute_league(&league).unwrap();
        assert_eq!(lineup.rows.len(), 3);
        assert!(lineup.rows[1..]
            .iter()
            .all(|r| r.slot == SlotLabel::Bench));
    }

    #[test]
    fn test_missing_multiplier_fails_league_only() {
        let book = book(&[]);
        let projections = ProjectionSet::default();
        let backup = BackupSnapshot::default();
        let optimizer = LineupOptimizer::new(&book, &projections, &backup, &CanonicalResolver);

        let mut broken = league(&["RB"], vec![player("Stud Back", Position::RB)]);
        broken.scoring.remove("rush_td");
        assert!(matches!(
            optimizer.compute_league(&broken),
            Err(GridironError::Configuration(_))
        ));

        // The batch-level entry point drops the broken league, keeps the rest.
        let good = league(&["RB"], vec![player("Stud Back", Position::RB)]);
        let mut renamed = good.clone();
        renamed.league = "Good League".to_string();
        let rosters = RosterSnapshot {
            leagues: vec![broken, renamed],
        };
        let lineups = optimizer.compute_lineups(&rosters);
        assert_eq!(lineups.len(), 1);
        assert!(lineups.contains_key("Good League"));
    }

    #[test]
    fn test_unsupported_slot_fails_league() {
        let book = book(&[]);
        let projections = ProjectionSet::default();
        let backup = BackupSnapshot::default();
        let optimizer = LineupOptimizer::new(&book, &projections, &backup, &CanonicalResolver);

        let mut idp = league(&["RB", "IDP_FLEX"], vec![player("Stud Back", Position::RB)]);
        idp.league = "IDP League".to_string();
        assert!(matches!(
            optimizer.compute_league(&idp),
            Err(GridironError::Configuration(_))
        ));
    }

    #[test]
    fn test_repeated_fills_are_identical() {
        let book = book(&[
            ("RB", &[("Stud Back", 1), ("Second Back", 2)]),
            ("WR", &[("Alpha Wideout", 1)]),
        ]);
        let projections = projections(&[("Slot Receiver", 9.0), ("Second Back", 11.0)]);
        let backup = BackupSnapshot::default();
        let optimizer = LineupOptimizer::new(&book, &projections, &backup, &CanonicalResolver);

        let league = league(
            &["RB", "WR", "FLEX", "BN"],
            vec![
                player("Stud Back", Position::RB),
                player("Second Back", Position::RB),
                player("Alpha Wideout", Position::WR),
                player("Slot Receiver", Position::WR),
            ],
        );
        let first = optimizer.compute_league(&league).unwrap();
        let second = optimizer.compute_league(&league).unwrap();
        assert_eq!(names(&first.rows), names(&second.rows));
    }

    #[test]
    fn test_free_agent_best_per_position_without_consumption() {
        let book = book(&[
            ("RB", &[("FA Back", 3), ("Worse FA Back", 7)]),
            ("Flex", &[("FA Back", 2), ("FA Wideout", 5)]),
            ("WR", &[("FA Wideout", 4)]),
        ]);
        let projections = projections(&[("FA Back", 12.0), ("Worse FA Back", 4.0)]);
        let backup = BackupSnapshot::default();
        let optimizer = LineupOptimizer::new(&book, &projections, &backup, &CanonicalResolver);

        let mut league = league(&["RB"], vec![player("Rostered Back", Position::RB)]);
        league.free_agents = vec![
            player("FA Back", Position::RB),
            player("Worse FA Back", Position::RB),
            player("FA Wideout", Position::WR),
        ];

        let lineup = optimizer.compute_league(&league).unwrap();
        let by_slot: BTreeMap<SlotLabel, &str> = lineup
            .free_agents
            .iter()
            .map(|p| (p.slot, p.player.as_str()))
            .collect();

        assert_eq!(by_slot[&SlotLabel::Rb], "FA Back");
        assert_eq!(by_slot[&SlotLabel::Wr], "FA Wideout");
        // The same back also tops the Flex page — no consumption between lists.
        assert_eq!(by_slot[&SlotLabel::Flex], "FA Back");
        // Free agents never enter the lineup rows.
        assert_eq!(lineup.rows[0].player.as_deref(), Some("Rostered Back"));
    }

    #[test]
    fn test_def_slot_gets_not_applicable_score() {
        let book = book(&[("DST", &[("San Francisco 49ers", 1)])]);
        let projections = ProjectionSet::default();
        let backup = BackupSnapshot::default();
        let optimizer = LineupOptimizer::new(&book, &projections, &backup, &CanonicalResolver);

        let league = league(
            &["DEF"],
            vec![player("San Francisco 49ers", Position::DEF)],
        );
        let lineup = optimizer.compute_league(&league).unwrap();
        assert_eq!(lineup.rows[0].score, ProjectedScore::NotApplicable);
        assert_eq!(lineup.rows[0].position_rank, TierRank::Ranked(1));
    }
}
