//! Odds-derived value indicators
//!
//! Compares the service's outcome probabilities with the decimal odds the user
//! entered for a match.
//!
//! Expected return per unit staked:
//!     EV = p * odds
//!
//! Implied market probability (bookmaker margin removed):
//!     q_i = (1 / odds_i) / Σ_j (1 / odds_j)
//!
//! An outcome with EV above 1.0 pays more than it costs on average.

use serde::{Deserialize, Serialize};

use crate::models::{Match, MatchOdds, Outcome, OutcomeProbabilities, SystemSelection};

/// EV above which an outcome counts as a value outcome
pub const VALUE_THRESHOLD: f64 = 1.0;

/// Value assessment for one outcome of a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeValue {
    pub outcome: Outcome,
    pub probability: f64,
    pub odds: f64,
    pub expected_return: f64,
    /// Market probability, present only when all three prices are known
    pub implied_probability: Option<f64>,
    pub selected: bool,
    pub is_value: bool,
}

/// Expected return per unit staked
///
/// # Examples
/// ```
/// use tipsmaster::core::value::expected_return;
/// let ev = expected_return(0.25, 5.0);
/// assert!((ev - 1.25).abs() < 1e-9);
/// ```
pub fn expected_return(probability: f64, odds: f64) -> f64 {
    probability * odds
}

/// Bookmaker margin (overround) of a complete price set, e.g. 0.05 for 105%
pub fn bookmaker_margin(odds: &MatchOdds) -> Option<f64> {
    let total = inverse_sum(odds)?;
    Some(total - 1.0)
}

/// Market probabilities with the margin normalised away
pub fn implied_probabilities(odds: &MatchOdds) -> Option<OutcomeProbabilities> {
    let total = inverse_sum(odds)?;
    Some(OutcomeProbabilities {
        home: 1.0 / odds.home? / total,
        draw: 1.0 / odds.draw? / total,
        away: 1.0 / odds.away? / total,
    })
}

fn inverse_sum(odds: &MatchOdds) -> Option<f64> {
    let sum = 1.0 / odds.home? + 1.0 / odds.draw? + 1.0 / odds.away?;
    if sum.is_finite() && sum > 0.0 {
        Some(sum)
    } else {
        None
    }
}

/// Value of every priced outcome of a system line, in 1/X/2 order
pub fn assess_selection(selection: &SystemSelection, m: &Match) -> Vec<OutcomeValue> {
    let implied = implied_probabilities(&m.odds);

    Outcome::ALL
        .iter()
        .filter_map(|&outcome| {
            let odds = m.odds.get(outcome)?;
            let probability = selection.probabilities.get(outcome);
            let ev = expected_return(probability, odds);

            Some(OutcomeValue {
                outcome,
                probability,
                odds,
                expected_return: ev,
                implied_probability: implied.map(|p| p.get(outcome)),
                selected: selection.covers(outcome),
                is_value: ev > VALUE_THRESHOLD,
            })
        })
        .collect()
}
