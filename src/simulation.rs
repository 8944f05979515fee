//! Monte Carlo boom/bust simulator.
//!
//! Draws stat lines from each player's reconstructed distributions and
//! scores them under fixed fantasy formats to estimate boom/bust
//! probabilities, the mean, and the full percentile curve.
//!
//! Sampling is a coarse point-approximation: a bucket is chosen with
//! probability proportional to its weight and its representative value
//! (midpoint, or `lower × 1.1` for the open tail) stands in for the whole
//! bucket. League-specific scoring lives in `lineup::scoring`; the formats
//! here are the fixed industry variants the boom/bust thresholds are
//! calibrated against.

use rand::distributions::{Distribution as _, WeightedIndex};
use rand::Rng;
use std::collections::BTreeMap;

use crate::types::{
    Distribution, GridironError, ScoringVariant, SimulationProfile, StatKind, VariantProfile,
};

/// Default number of Monte Carlo draws per player.
pub const DEFAULT_DRAWS: usize = 10_000;

// Fixed scoring weights shared by all variants.
const PASSING_YARD_POINTS: f64 = 0.04; // 1 pt / 25 yd
const RUSHING_YARD_POINTS: f64 = 0.1;
const RECEIVING_YARD_POINTS: f64 = 0.1;
const INTERCEPTION_POINTS: f64 = -2.0;
const TOUCHDOWN_POINTS: f64 = 6.0;

/// Monte Carlo simulator with a configurable draw count.
///
/// The random source is injected so callers control determinism; tests use
/// a seeded `ChaCha8Rng`, production uses entropy.
#[derive(Debug, Clone)]
pub struct Simulator {
    draws: usize,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(DEFAULT_DRAWS)
    }
}

impl Simulator {
    pub fn new(draws: usize) -> Self {
        Self { draws }
    }

    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Simulate one player's fantasy outcomes.
    ///
    /// A player is quarterback-like when passing-yardage or passing-TD
    /// props are present; quarterbacks get the two passing-TD variants,
    /// everyone else the three reception-value variants. Stats without a
    /// distribution contribute an all-zero sample vector.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        stats: &BTreeMap<StatKind, Distribution>,
        rng: &mut R,
    ) -> Result<SimulationProfile, GridironError> {
        if self.draws == 0 {
            return Err(GridironError::Simulation("zero draws configured".into()));
        }

        let mut samples: BTreeMap<StatKind, Vec<f64>> = BTreeMap::new();
        for &kind in StatKind::ALL {
            let drawn = match stats.get(&kind) {
                Some(dist) => self.sample_distribution(dist, rng)?,
                None => vec![0.0; self.draws],
            };
            samples.insert(kind, drawn);
        }

        let is_qb = stats.contains_key(&StatKind::PassingYards)
            || stats.contains_key(&StatKind::PassingTouchdowns);

        let mut variants = BTreeMap::new();
        if is_qb {
            for (variant, pass_td_points) in [
                (ScoringVariant::QbStandard, 4.0),
                (ScoringVariant::QbSixPoint, 6.0),
            ] {
                let points = qb_points(&samples, pass_td_points);
                variants.insert(variant, profile_for(variant, &points));
            }
        } else {
            for (variant, reception_points) in [
                (ScoringVariant::Standard, 0.0),
                (ScoringVariant::HalfPpr, 0.5),
                (ScoringVariant::Ppr, 1.0),
            ] {
                let points = skill_points(&samples, reception_points);
                variants.insert(variant, profile_for(variant, &points));
            }
        }

        Ok(SimulationProfile { variants })
    }

    fn sample_distribution<R: Rng + ?Sized>(
        &self,
        dist: &Distribution,
        rng: &mut R,
    ) -> Result<Vec<f64>, GridironError> {
        if dist.is_empty() {
            return Err(GridironError::Simulation(
                "cannot sample an empty distribution".into(),
            ));
        }
        let weights: Vec<f64> = dist.buckets().iter().map(|(_, w)| *w).collect();
        let chooser = WeightedIndex::new(&weights)
            .map_err(|e| GridironError::Simulation(format!("bad bucket weights: {e}")))?;
        let values: Vec<f64> = dist
            .buckets()
            .iter()
            .map(|(o, _)| o.representative())
            .collect();

        Ok((0..self.draws)
            .map(|_| values[chooser.sample(rng)])
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Scoring formulas
// ---------------------------------------------------------------------------

fn qb_points(samples: &BTreeMap<StatKind, Vec<f64>>, pass_td_points: f64) -> Vec<f64> {
    let n = samples[&StatKind::PassingYards].len();
    (0..n)
        .map(|i| {
            samples[&StatKind::PassingYards][i] * PASSING_YARD_POINTS
                + samples[&StatKind::PassingTouchdowns][i] * pass_td_points
                + samples[&StatKind::Interceptions][i] * INTERCEPTION_POINTS
                + samples[&StatKind::RushingYards][i] * RUSHING_YARD_POINTS
                + samples[&StatKind::ReceivingYards][i] * RECEIVING_YARD_POINTS
                + samples[&StatKind::AnytimeTouchdown][i] * TOUCHDOWN_POINTS
        })
        .collect()
}

fn skill_points(samples: &BTreeMap<StatKind, Vec<f64>>, reception_points: f64) -> Vec<f64> {
    let n = samples[&StatKind::ReceivingYards].len();
    (0..n)
        .map(|i| {
            samples[&StatKind::ReceivingYards][i] * RECEIVING_YARD_POINTS
                + samples[&StatKind::RushingYards][i] * RUSHING_YARD_POINTS
                + samples[&StatKind::AnytimeTouchdown][i] * TOUCHDOWN_POINTS
                + samples[&StatKind::Receptions][i] * reception_points
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Profile statistics
// ---------------------------------------------------------------------------

fn profile_for(variant: ScoringVariant, points: &[f64]) -> VariantProfile {
    let n = points.len() as f64;
    // Boom/bust cutoffs are calibrated per variant; the QB cutoffs are
    // inclusive, the skill-position ones strict.
    let (boom, bust) = match variant {
        ScoringVariant::QbStandard => (frac(points, |p| p >= 30.0), frac(points, |p| p <= 12.0)),
        ScoringVariant::QbSixPoint => (frac(points, |p| p >= 35.0), frac(points, |p| p <= 15.0)),
        ScoringVariant::Standard => (frac(points, |p| p > 18.0), frac(points, |p| p < 5.0)),
        ScoringVariant::HalfPpr => (frac(points, |p| p > 22.0), frac(points, |p| p < 6.0)),
        ScoringVariant::Ppr => (frac(points, |p| p > 26.0), frac(points, |p| p < 6.0)),
    };

    VariantProfile {
        boom,
        bust,
        mean: points.iter().sum::<f64>() / n,
        percentiles: percentile_curve(points),
    }
}

fn frac(points: &[f64], pred: impl Fn(f64) -> bool) -> f64 {
    points.iter().filter(|&&p| pred(p)).count() as f64 / points.len() as f64
}

/// Percentiles 1..=100 with linear interpolation between order statistics.
fn percentile_curve(points: &[f64]) -> Vec<f64> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    (1..=100)
        .map(|p| {
            let rank = (p as f64 / 100.0) * ((n - 1) as f64);
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            if lo == hi {
                sorted[lo]
            } else {
                sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn point_mass(value: u32) -> Distribution {
        Distribution::new(vec![(Outcome::Exact(value), 1.0)])
    }

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_qb_detection_by_passing_props() {
        let sim = Simulator::new(100);
        let mut stats = BTreeMap::new();
        stats.insert(StatKind::PassingYards, point_mass(250));
        let profile = sim.simulate(&stats, &mut rng(1)).unwrap();
        assert!(profile.variant(ScoringVariant::QbStandard).is_some());
        assert!(profile.variant(ScoringVariant::QbSixPoint).is_some());
        assert!(profile.variant(ScoringVariant::Ppr).is_none());
    }

    #[test]
    fn test_skill_player_gets_reception_variants() {
        let sim = Simulator::new(100);
        let mut stats = BTreeMap::new();
        stats.insert(StatKind::ReceivingYards, point_mass(80));
        let profile = sim.simulate(&stats, &mut rng(1)).unwrap();
        assert!(profile.variant(ScoringVariant::Standard).is_some());
        assert!(profile.variant(ScoringVariant::HalfPpr).is_some());
        assert!(profile.variant(ScoringVariant::Ppr).is_some());
        assert!(profile.variant(ScoringVariant::QbStandard).is_none());
    }

    #[test]
    fn test_point_mass_scoring_is_exact() {
        // 80 receiving yards + 1 TD + 5 receptions, no randomness at all.
        let sim = Simulator::new(500);
        let mut stats = BTreeMap::new();
        stats.insert(StatKind::ReceivingYards, point_mass(80));
        stats.insert(StatKind::AnytimeTouchdown, point_mass(1));
        stats.insert(StatKind::Receptions, point_mass(5));
        let profile = sim.simulate(&stats, &mut rng(7)).unwrap();

        let std = profile.variant(ScoringVariant::Standard).unwrap();
        assert!((std.mean - 14.0).abs() < 1e-10); // 8 + 6
        let half = profile.variant(ScoringVariant::HalfPpr).unwrap();
        assert!((half.mean - 16.5).abs() < 1e-10);
        let ppr = profile.variant(ScoringVariant::Ppr).unwrap();
        assert!((ppr.mean - 19.0).abs() < 1e-10);
    }

    #[test]
    fn test_missing_stats_sample_as_zero() {
        let sim = Simulator::new(200);
        let mut stats = BTreeMap::new();
        stats.insert(StatKind::Receptions, point_mass(5));
        let profile = sim.simulate(&stats, &mut rng(3)).unwrap();
        // Standard scoring gives receptions no value and everything else
        // is zero-filled.
        let std = profile.variant(ScoringVariant::Standard).unwrap();
        assert_eq!(std.mean, 0.0);
        let ppr = profile.variant(ScoringVariant::Ppr).unwrap();
        assert!((ppr.mean - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_qb_six_point_outscores_standard() {
        let sim = Simulator::new(1000);
        let mut stats = BTreeMap::new();
        stats.insert(StatKind::PassingYards, point_mass(280));
        stats.insert(StatKind::PassingTouchdowns, point_mass(2));
        stats.insert(StatKind::Interceptions, point_mass(1));
        let profile = sim.simulate(&stats, &mut rng(11)).unwrap();
        let std = profile.variant(ScoringVariant::QbStandard).unwrap();
        let six = profile.variant(ScoringVariant::QbSixPoint).unwrap();
        // 280×0.04 + 2×4 − 2 = 17.2 vs 280×0.04 + 2×6 − 2 = 21.2
        assert!((std.mean - 17.2).abs() < 1e-10);
        assert!((six.mean - 21.2).abs() < 1e-10);
    }

    #[test]
    fn test_fixed_seed_is_idempotent() {
        let sim = Simulator::new(2000);
        let mut stats = BTreeMap::new();
        stats.insert(
            StatKind::ReceivingYards,
            Distribution::new(vec![
                (
                    Outcome::Range {
                        lower: 0.0,
                        upper: 50.0,
                    },
                    0.3,
                ),
                (
                    Outcome::Range {
                        lower: 50.0,
                        upper: 100.0,
                    },
                    0.5,
                ),
                (Outcome::OrMore(100.0), 0.2),
            ]),
        );
        stats.insert(
            StatKind::AnytimeTouchdown,
            Distribution::new(vec![(Outcome::Exact(0), 0.6), (Outcome::Exact(1), 0.4)]),
        );

        let a = sim.simulate(&stats, &mut rng(42)).unwrap();
        let b = sim.simulate(&stats, &mut rng(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let sim = Simulator::new(2000);
        let mut stats = BTreeMap::new();
        stats.insert(
            StatKind::ReceivingYards,
            Distribution::new(vec![
                (
                    Outcome::Range {
                        lower: 0.0,
                        upper: 60.0,
                    },
                    0.5,
                ),
                (Outcome::OrMore(60.0), 0.5),
            ]),
        );
        let a = sim.simulate(&stats, &mut rng(1)).unwrap();
        let b = sim.simulate(&stats, &mut rng(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_boom_bust_from_mixture() {
        // 40% of draws land at 30 standard points (boom), 60% at 3 (bust).
        let sim = Simulator::new(10_000);
        let mut stats = BTreeMap::new();
        stats.insert(
            StatKind::RushingYards,
            Distribution::new(vec![
                (Outcome::Exact(300), 0.4),
                (Outcome::Exact(30), 0.6),
            ]),
        );
        let profile = sim.simulate(&stats, &mut rng(99)).unwrap();
        let std = profile.variant(ScoringVariant::Standard).unwrap();
        assert!((std.boom - 0.4).abs() < 0.02);
        assert!((std.bust - 0.6).abs() < 0.02);
    }

    #[test]
    fn test_percentiles_monotonic_and_complete() {
        let sim = Simulator::new(5000);
        let mut stats = BTreeMap::new();
        stats.insert(
            StatKind::ReceivingYards,
            Distribution::new(vec![
                (
                    Outcome::Range {
                        lower: 0.0,
                        upper: 50.0,
                    },
                    0.4,
                ),
                (
                    Outcome::Range {
                        lower: 50.0,
                        upper: 120.0,
                    },
                    0.4,
                ),
                (Outcome::OrMore(120.0), 0.2),
            ]),
        );
        let profile = sim.simulate(&stats, &mut rng(5)).unwrap();
        let curve = &profile.variant(ScoringVariant::Standard).unwrap().percentiles;
        assert_eq!(curve.len(), 100);
        for w in curve.windows(2) {
            assert!(w[1] >= w[0], "percentile curve must be non-decreasing");
        }
    }

    #[test]
    fn test_empty_distribution_is_simulation_error() {
        let sim = Simulator::new(100);
        let mut stats = BTreeMap::new();
        stats.insert(StatKind::Receptions, Distribution::new(Vec::new()));
        assert!(matches!(
            sim.simulate(&stats, &mut rng(1)),
            Err(GridironError::Simulation(_))
        ));
    }

    #[test]
    fn test_zero_mass_distribution_is_simulation_error() {
        let sim = Simulator::new(100);
        let mut stats = BTreeMap::new();
        stats.insert(
            StatKind::Receptions,
            Distribution::new(vec![(Outcome::Exact(1), 0.0)]),
        );
        assert!(matches!(
            sim.simulate(&stats, &mut rng(1)),
            Err(GridironError::Simulation(_))
        ));
    }

    #[test]
    fn test_zero_draws_rejected() {
        let sim = Simulator::new(0);
        let stats = BTreeMap::new();
        assert!(matches!(
            sim.simulate(&stats, &mut rng(1)),
            Err(GridironError::Simulation(_))
        ));
    }

    #[test]
    fn test_open_tail_sampled_at_factor() {
        // A single open-ended bucket always samples lower × 1.1.
        let sim = Simulator::new(50);
        let mut stats = BTreeMap::new();
        stats.insert(
            StatKind::RushingYards,
            Distribution::new(vec![(Outcome::OrMore(100.0), 1.0)]),
        );
        let profile = sim.simulate(&stats, &mut rng(4)).unwrap();
        let std = profile.variant(ScoringVariant::Standard).unwrap();
        assert!((std.mean - 11.0).abs() < 1e-10); // 110 yards × 0.1
    }
}
