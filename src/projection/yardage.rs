//! Yardage interpolation estimator.
//!
//! Alternate-line yardage markets quote cumulative "N+ yards" thresholds.
//! Differencing adjacent devigged probabilities yields the mass of each
//! half-open interval between thresholds; the expected value is the
//! mass-weighted sum of interval midpoints, with the open-ended top
//! interval represented by `lower × 1.1` rather than a true tail
//! expectation.

use std::collections::BTreeMap;

use crate::odds::{implied_probability, VigMethod};
use crate::types::{Distribution, GridironError, Outcome, StatProjection};

/// Estimate expected yardage from a ladder of "N+ yards" thresholds.
///
/// `thresholds` maps each yardage line to its American odds. Zero odds mark
/// a line the book did not offer and are skipped. Cumulative probabilities
/// are expected to decrease as thresholds rise; the estimator does not
/// repair an inverted ladder.
pub fn estimate_yardage(
    thresholds: &BTreeMap<u32, i32>,
    vig: &VigMethod,
) -> Result<StatProjection, GridironError> {
    // Devigged cumulative P(at least N yards), ascending by threshold.
    let mut cumulative: Vec<(f64, f64)> = Vec::with_capacity(thresholds.len());
    for (&yards, &odds) in thresholds {
        if odds == 0 {
            continue;
        }
        let p = vig.devig(implied_probability(odds)?);
        cumulative.push((f64::from(yards), p));
    }

    if cumulative.is_empty() {
        return Err(GridironError::MalformedOdds(
            "yardage ladder has no usable thresholds".into(),
        ));
    }

    let mut buckets: Vec<(Outcome, f64)> = Vec::with_capacity(cumulative.len() + 1);

    // Everything below the lowest quoted threshold.
    let (first_yards, first_prob) = cumulative[0];
    buckets.push((
        Outcome::Range {
            lower: 0.0,
            upper: first_yards,
        },
        1.0 - first_prob,
    ));

    // Interior intervals between adjacent thresholds.
    for pair in cumulative.windows(2) {
        let (lower, p_lower) = pair[0];
        let (upper, p_upper) = pair[1];
        buckets.push((Outcome::Range { lower, upper }, p_lower - p_upper));
    }

    // Open-ended top interval keeps the last cumulative probability whole.
    let (last_yards, last_prob) = cumulative[cumulative.len() - 1];
    buckets.push((Outcome::OrMore(last_yards), last_prob));

    let expected = buckets
        .iter()
        .map(|(outcome, p)| outcome.representative() * p)
        .sum();

    Ok(StatProjection {
        expected,
        distribution: Distribution::new(buckets),
    })
}
