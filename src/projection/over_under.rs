//! Over/under projection with a synthetic outcome distribution.
//!
//! A single line with two-sided odds pins down only one cumulative point of
//! the underlying distribution. The projected value comes straight from the
//! normalized over/under split; the full distribution is approximated with
//! a Gaussian kernel centered at the line, its halves renormalized to match
//! the quoted over/under probabilities. The kernel shape is a heuristic
//! with tunable parameters, not a derived truth.

use serde::{Deserialize, Serialize};

use crate::config::ProjectionConfig;
use crate::odds::side_probability;
use crate::types::{Distribution, GridironError, OddsQuote, Outcome, StatKind, StatProjection};

/// Buckets below this weight are dropped from the synthetic distribution.
const MIN_BUCKET_MASS: f64 = 1e-6;

/// Shape parameters for the synthetic Gaussian kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticShape {
    /// Lower bound on the kernel's standard deviation.
    pub sigma_floor: f64,
    /// Standard deviation as a fraction of the line.
    pub sigma_scale: f64,
}

impl Default for SyntheticShape {
    fn default() -> Self {
        Self {
            sigma_floor: 1.0,
            sigma_scale: 0.3,
        }
    }
}

impl From<&ProjectionConfig> for SyntheticShape {
    fn from(cfg: &ProjectionConfig) -> Self {
        Self {
            sigma_floor: cfg.sigma_floor,
            sigma_scale: cfg.sigma_scale,
        }
    }
}

/// Highest integer outcome modeled for a stat. Interceptions rarely exceed
/// three; receptions get modest upside above the line; everything else gets
/// triple the line.
fn max_outcome(kind: StatKind, line: f64) -> u32 {
    let ceil = line.ceil().max(0.0) as u32;
    match kind {
        StatKind::Interceptions => 3,
        StatKind::Receptions => (ceil + 6).max(12),
        _ => ceil.saturating_mul(3),
    }
}

/// Project a stat from a single over/under quote.
///
/// The two sides are normalized against each other (no vig removal here —
/// normalization already cancels the overround) and the projection is the
/// probability-weighted blend of the integers bracketing the line. The
/// returned distribution covers integer outcomes `0..=max` with the
/// over-half carrying the normalized over probability and the under-half
/// the rest.
pub fn project_over_under(
    quote: &OddsQuote,
    shape: &SyntheticShape,
) -> Result<StatProjection, GridironError> {
    let prob_over = side_probability(quote.over);
    let prob_under = side_probability(quote.under);

    let total = prob_over + prob_under;
    if total <= 0.0 {
        return Err(GridironError::MalformedOdds(format!(
            "no usable odds on either side of the {} line {}",
            quote.kind, quote.line
        )));
    }

    let over_norm = prob_over / total;
    let under_norm = prob_under / total;

    let expected = over_norm * quote.line.ceil() + under_norm * quote.line.floor();

    // Gaussian kernel over integer outcomes, split at ceil(line).
    let max_val = max_outcome(quote.kind, quote.line);
    let sigma = shape.sigma_floor.max(quote.line * shape.sigma_scale);
    let split = quote.line.ceil();

    let mut over_weights: Vec<(u32, f64)> = Vec::new();
    let mut under_weights: Vec<(u32, f64)> = Vec::new();
    for v in 0..=max_val {
        let z = (f64::from(v) - quote.line) / sigma;
        let w = (-0.5 * z * z).exp();
        if f64::from(v) >= split {
            over_weights.push((v, w));
        } else {
            under_weights.push((v, w));
        }
    }

    // Each half independently rescaled to carry its side's probability.
    rescale(&mut over_weights, over_norm);
    rescale(&mut under_weights, under_norm);

    let mut buckets: Vec<(Outcome, f64)> = under_weights
        .into_iter()
        .chain(over_weights)
        .map(|(v, w)| (Outcome::Exact(v), w))
        .collect();

    // Final normalization, then drop negligible buckets and renormalize so
    // the mass invariant survives the truncation.
    normalize(&mut buckets);
    buckets.retain(|(_, w)| *w > MIN_BUCKET_MASS);
    if buckets.is_empty() {
        return Err(GridironError::MalformedOdds(format!(
            "synthetic distribution for {} collapsed to zero mass",
            quote.kind
        )));
    }
    normalize(&mut buckets);

    Ok(StatProjection {
        expected,
        distribution: Distribution::new(buckets),
    })
}

fn rescale(weights: &mut [(u32, f64)], target: f64) {
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if sum > 0.0 {
        for (_, w) in weights.iter_mut() {
            *w *= target / sum;
        }
    }
}

fn normalize(buckets: &mut [(Outcome, f64)]) {
    let sum: f64 = buckets.iter().map(|(_, w)| w).sum();
    if sum > 0.0 {
        for (_, w) in buckets.iter_mut() {
            *w /= sum;
        }
    }
}
