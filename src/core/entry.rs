//! Match entry
//!
//! Turns the raw text of a match form into a validated [`Match`] with a fresh id.
//!
//! Text rules:
//! - team names are required and stored trimmed
//! - an empty odds field (or `-`) means the price is absent
//! - a present price must parse as a decimal of at least 1.01

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{validate_odds, validate_team_name, AppError};
use crate::models::{Match, MatchFields, MatchId, MatchOdds};

static NEXT_MATCH_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a match id; ids are never handed out twice in one process
pub fn next_match_id() -> MatchId {
    MatchId::new(NEXT_MATCH_ID.fetch_add(1, Ordering::Relaxed))
}

/// Match form state, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchForm {
    pub home_team: String,
    pub away_team: String,
    pub odds_home: String,
    pub odds_draw: String,
    pub odds_away: String,
}

impl MatchForm {
    pub fn new(home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            ..Default::default()
        }
    }

    pub fn with_odds(mut self, home: &str, draw: &str, away: &str) -> Self {
        self.odds_home = home.to_string();
        self.odds_draw = draw.to_string();
        self.odds_away = away.to_string();
        self
    }

    /// Prefill the form from an existing match, for editing
    pub fn from_match(m: &Match) -> Self {
        let text = |odds: Option<f64>| odds.map(|o| o.to_string()).unwrap_or_default();
        Self {
            home_team: m.home_team.clone(),
            away_team: m.away_team.clone(),
            odds_home: text(m.odds.home),
            odds_draw: text(m.odds.draw),
            odds_away: text(m.odds.away),
        }
    }

    /// Parse a one-line match: `Home vs Away` with optional `@ h,d,a` odds.
    ///
    /// `-` or an empty slot leaves that price out:
    /// `"Arsenal vs Chelsea @ 1.50,-,6.00"`
    pub fn parse_line(line: &str) -> Result<Self, AppError> {
        let (teams, odds) = match line.split_once('@') {
            Some((teams, odds)) => (teams, Some(odds)),
            None => (line, None),
        };

        // ASCII lowercasing keeps byte offsets valid for slicing the input
        let lowered = teams.to_ascii_lowercase();
        let sep = lowered.find(" vs ").ok_or_else(|| {
            AppError::Validation(format!("Expected 'Home vs Away', got '{}'", line.trim()))
        })?;

        let mut form = Self::new(teams[..sep].trim(), teams[sep + 4..].trim());

        if let Some(odds) = odds {
            let prices: Vec<&str> = odds.split(',').map(str::trim).collect();
            if prices.len() != 3 {
                return Err(AppError::Validation(format!(
                    "Expected three odds (1,X,2), got {}",
                    prices.len()
                )));
            }
            let slot = |s: &str| if s == "-" { String::new() } else { s.to_string() };
            form.odds_home = slot(prices[0]);
            form.odds_draw = slot(prices[1]);
            form.odds_away = slot(prices[2]);
        }

        Ok(form)
    }

    pub fn validate(&self) -> Result<MatchFields, AppError> {
        validate_team_name("Home team", &self.home_team)?;
        validate_team_name("Away team", &self.away_team)?;

        Ok(MatchFields {
            home_team: self.home_team.trim().to_string(),
            away_team: self.away_team.trim().to_string(),
            odds: MatchOdds {
                home: parse_odds("Home", &self.odds_home)?,
                draw: parse_odds("Draw", &self.odds_draw)?,
                away: parse_odds("Away", &self.odds_away)?,
            },
        })
    }

    /// Validate and create a new match with a fresh id
    pub fn submit(&self) -> Result<Match, AppError> {
        let fields = self.validate()?;
        Ok(Match::from_fields(next_match_id(), fields))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_odds(field: &str, raw: &str) -> Result<Option<f64>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        return Ok(None);
    }

    let odds: f64 = raw.parse().map_err(|_| {
        AppError::Validation(format!("{} odds must be a decimal number, got '{}'", field, raw))
    })?;
    validate_odds(field, odds)?;

    Ok(Some(odds))
}
