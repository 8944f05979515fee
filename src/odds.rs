//! American-odds probability math and vig removal.
//!
//! Sportsbook prices embed a bookmaker margin (the vig, or overround);
//! every estimator in this crate starts by converting a quoted price to an
//! implied probability and stripping that margin to get a "fair" number.

use serde::{Deserialize, Serialize};

use crate::types::GridironError;

/// Empirical per-market overround used when the counterparty side of a
/// quote is not available to derive the vig from. Measured against NFL
/// player-prop ladders; overridable through `[projection]` config.
pub const DEFAULT_OVERROUND: f64 = 0.071;

/// Convert American odds to an implied probability in (0, 1).
///
/// Positive odds are the profit per 100 staked on an underdog; negative
/// odds are the stake required per 100 profit on a favorite. Zero is not a
/// price — sportsbooks use it as an "absent" marker, so it is malformed here.
pub fn implied_probability(odds: i32) -> Result<f64, GridironError> {
    if odds == 0 {
        return Err(GridironError::MalformedOdds(
            "American odds of zero carry no price".into(),
        ));
    }
    let odds = f64::from(odds);
    if odds > 0.0 {
        Ok(100.0 / (odds + 100.0))
    } else {
        Ok(-odds / (-odds + 100.0))
    }
}

/// Implied probability for one side of a quote where a zero means the side
/// simply was not offered. Used by the over/under estimator, which treats
/// a missing side as zero probability and fails only when both are absent.
pub fn side_probability(odds: i32) -> f64 {
    implied_probability(odds).unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Vig removal
// ---------------------------------------------------------------------------

/// How the bookmaker margin is removed from implied probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VigMethod {
    /// Divide by a fixed overround constant: `p / (1 + vig)`. A deliberate
    /// simplification for one-sided markets (ladders quote only the "over").
    Fixed(f64),
    /// Derive the vig from the two-sided market itself:
    /// `vig = p_over + p_under − 1`, so each devigged side is
    /// `p / (p_over + p_under)`. Falls back to the fixed default when only
    /// one side is known.
    TwoSided,
}

impl Default for VigMethod {
    fn default() -> Self {
        VigMethod::Fixed(DEFAULT_OVERROUND)
    }
}

impl VigMethod {
    /// Remove the vig from a single-sided implied probability.
    pub fn devig(&self, prob: f64) -> f64 {
        match self {
            VigMethod::Fixed(vig) => prob / (1.0 + vig),
            VigMethod::TwoSided => prob / (1.0 + DEFAULT_OVERROUND),
        }
    }

    /// Remove the vig from both sides of a two-way market.
    pub fn devig_pair(&self, over: f64, under: f64) -> (f64, f64) {
        match self {
            VigMethod::Fixed(vig) => (over / (1.0 + vig), under / (1.0 + vig)),
            VigMethod::TwoSided => {
                let book = over + under;
                if book > 0.0 {
                    (over / book, under / book)
                } else {
                    (0.0, 0.0)
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
