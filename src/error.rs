use thiserror::Error;

use crate::models::MatchId;

/// Lowest decimal price accepted for an outcome
pub const MIN_DECIMAL_ODDS: f64 = 1.01;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid match entry or settings
    #[error("Validation error: {0}")]
    Validation(String),

    /// Prediction requested with no matches on the slate
    #[error("Add at least one match first.")]
    EmptySlate,

    /// Transport failure or service-reported error
    #[error("Failed to fetch predictions: {0}")]
    PredictionService(String),

    /// Startup health probe failed; advisory only
    #[error("Could not connect to the prediction API. Check that the backend server is running. ({0})")]
    Connectivity(String),

    #[error("Match {0} is already on the slate")]
    DuplicateMatchId(MatchId),

    #[error("A prediction request is already in flight")]
    RequestInFlight,

    #[error("No prediction request is in flight")]
    NoRequestInFlight,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Validation functions
pub fn validate_team_name(field: &str, name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

pub fn validate_odds(field: &str, odds: f64) -> Result<(), AppError> {
    if !odds.is_finite() || odds < MIN_DECIMAL_ODDS {
        return Err(AppError::Validation(format!(
            "{} odds must be at least {}, got {}",
            field, MIN_DECIMAL_ODDS, odds
        )));
    }
    Ok(())
}

pub fn validate_budget(budget: u32) -> Result<(), AppError> {
    if budget == 0 {
        return Err(AppError::Validation(
            "Budget must be a positive whole number".to_string(),
        ));
    }
    Ok(())
}
