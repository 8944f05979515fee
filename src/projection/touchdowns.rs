//! Touchdown-count estimator.
//!
//! Sportsbooks quote touchdown scoring as a ladder of "N or more" lines
//! (anytime scorer, 2+, 3+ …). Differencing adjacent cumulative
//! probabilities recovers the exact-count distribution, from which the
//! expected touchdown count follows directly.

use std::collections::BTreeMap;

use crate::odds::{implied_probability, VigMethod};
use crate::types::{Distribution, GridironError, Outcome, StatProjection};

/// Estimate expected touchdowns from a ladder of "k or more" lines.
///
/// `ladder` maps the line (1 = anytime, 2 = two-or-more, …) to its American
/// odds. Zero odds mark a line the book did not offer and are skipped; a
/// line absent from the ladder contributes zero probability, so
/// `P(exactly k)` for the highest offered line is that line's own
/// probability.
pub fn estimate_touchdowns(
    ladder: &BTreeMap<u32, i32>,
    vig: &VigMethod,
) -> Result<StatProjection, GridironError> {
    // Devigged cumulative P(k or more), ascending by line.
    let mut cumulative: Vec<(u32, f64)> = Vec::with_capacity(ladder.len());
    for (&line, &odds) in ladder {
        if odds == 0 {
            continue;
        }
        let p = vig.devig(implied_probability(odds)?);
        cumulative.push((line, p));
    }

    if cumulative.is_empty() {
        return Err(GridironError::MalformedOdds(
            "touchdown ladder has no usable lines".into(),
        ));
    }

    // P(exactly k) = P(k+) − P(next quoted line), and the topmost line
    // keeps its whole probability — nothing above it subtracts.
    let mut buckets: Vec<(Outcome, f64)> = Vec::with_capacity(cumulative.len() + 1);
    buckets.push((Outcome::Exact(0), 1.0 - cumulative[0].1));

    for (i, &(line, prob)) in cumulative.iter().enumerate() {
        let exact = match cumulative.get(i + 1) {
            Some(&(_, next_prob)) => prob - next_prob,
            None => prob,
        };
        buckets.push((Outcome::Exact(line), exact));
    }

    let expected = buckets
        .iter()
        .map(|(outcome, p)| outcome.representative() * p)
        .sum();

    Ok(StatProjection {
        expected,
        distribution: Distribution::new(buckets),
    })
}
