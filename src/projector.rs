//! Result projector
//!
//! Pure transformation of a [`PredictionResult`] into display-ready pieces:
//! a per-match probability chart, the recommended system table, coverage
//! counts and the formatted expected value / win probability.
//!
//! Stored values stay unrounded; rounding only happens in the `format_*`
//! helpers and the pre-formatted table cells.

use serde::Serialize;

use crate::core::value::{assess_selection, bookmaker_margin, OutcomeValue};
use crate::models::{Match, MatchPrediction, Outcome, PredictionResult, SystemSelection};

/// Currency the service reports expected value in
pub const CURRENCY: &str = "SEK";

/// Chart bars for one match, in percent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchBars {
    /// "Match 1", "Match 2", ...
    pub label: String,
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl MatchBars {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProbabilityChart {
    pub bars: Vec<MatchBars>,
}

impl ProbabilityChart {
    pub fn labels(&self) -> Vec<&str> {
        self.bars.iter().map(|b| b.label.as_str()).collect()
    }

    /// One dataset per outcome, aligned with `labels()`
    pub fn series(&self, outcome: Outcome) -> Vec<f64> {
        self.bars.iter().map(|b| b.get(outcome)).collect()
    }

    pub fn series_label(outcome: Outcome) -> String {
        format!("{} ({})", outcome.description(), outcome.label())
    }
}

/// Row of the recommended system table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemRow {
    pub match_index: usize,
    pub home_team: String,
    pub away_team: String,
    /// Chosen labels joined in service order, e.g. "1, X"
    pub selection: String,
    /// 1 / X / 2 probabilities formatted with one decimal, e.g. "50.0%"
    pub home_probability: String,
    pub draw_probability: String,
    pub away_probability: String,
    /// Empty when the submitted match carried no odds
    pub values: Vec<OutcomeValue>,
    /// Bookmaker overround, only when all three prices were entered
    pub margin: Option<f64>,
}

/// How much of the coupon the system covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoverageSummary {
    /// Matches with one outcome picked
    pub singles: usize,
    /// Matches with two outcomes picked
    pub half_covers: usize,
    /// Matches with all three outcomes picked
    pub full_covers: usize,
    /// Single-line combinations the full system expands to
    pub rows: u64,
}

/// Everything the presentation layer needs to render a result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub chart: ProbabilityChart,
    pub system: Vec<SystemRow>,
    pub coverage: CoverageSummary,
    /// e.g. "123.46 SEK"
    pub expected_value: String,
    /// e.g. "45.67%"
    pub win_probability: String,
}

/// Project a result without odds information
pub fn project(result: &PredictionResult) -> ResultView {
    project_with_slate(result, &[])
}

/// Project a result, attaching value indicators from the submitted slate.
///
/// `slate` must be the slate as submitted; rows whose `match_index` has no
/// counterpart simply carry no values.
pub fn project_with_slate(result: &PredictionResult, slate: &[Match]) -> ResultView {
    ResultView {
        chart: probability_chart(&result.predictions),
        system: system_table(&result.system, slate),
        coverage: coverage(&result.system),
        expected_value: format_currency(result.expected_value),
        win_probability: format_percent(result.win_probability, 2),
    }
}

pub fn probability_chart(predictions: &[MatchPrediction]) -> ProbabilityChart {
    let bars = predictions
        .iter()
        .enumerate()
        .map(|(i, p)| MatchBars {
            label: format!("Match {}", i + 1),
            home: p.probabilities.home * 100.0,
            draw: p.probabilities.draw * 100.0,
            away: p.probabilities.away * 100.0,
        })
        .collect();

    ProbabilityChart { bars }
}

pub fn system_table(system: &[SystemSelection], slate: &[Match]) -> Vec<SystemRow> {
    system
        .iter()
        .map(|s| {
            let submitted = s.match_index.checked_sub(1).and_then(|i| slate.get(i));
            let values = submitted
                .map(|m| assess_selection(s, m))
                .unwrap_or_default();
            let margin = submitted.and_then(|m| bookmaker_margin(&m.odds));

            SystemRow {
                match_index: s.match_index,
                home_team: s.home_team.clone(),
                away_team: s.away_team.clone(),
                selection: s.selection_label(),
                home_probability: format_percent(s.probabilities.home, 1),
                draw_probability: format_percent(s.probabilities.draw, 1),
                away_probability: format_percent(s.probabilities.away, 1),
                values,
                margin,
            }
        })
        .collect()
}

pub fn coverage(system: &[SystemSelection]) -> CoverageSummary {
    let mut summary = CoverageSummary {
        rows: if system.is_empty() { 0 } else { 1 },
        ..Default::default()
    };

    for s in system {
        match s.selection.len() {
            1 => summary.singles += 1,
            2 => summary.half_covers += 1,
            n if n >= 3 => summary.full_covers += 1,
            _ => {}
        }
        summary.rows = summary.rows.saturating_mul(s.selection.len() as u64);
    }

    summary
}

/// Two decimals followed by the currency, e.g. "123.46 SEK"
pub fn format_currency(amount: f64) -> String {
    format!("{:.2} {}", amount, CURRENCY)
}

/// A [0, 1] probability as a percentage, e.g. `format_percent(0.4567, 2)` is "45.67%"
pub fn format_percent(probability: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, probability * 100.0)
}

/// Chart value (already in percent) rounded for display
pub fn format_chart_value(percent: f64) -> String {
    format!("{:.1}", percent)
}
