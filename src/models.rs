use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{validate_budget, AppError};

/// Locally generated match identifier, never reused within a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId(u64);

impl MatchId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Match outcome as labelled on a pool coupon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "1")]
    Home,
    #[serde(rename = "X")]
    Draw,
    #[serde(rename = "2")]
    Away,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    /// Coupon label: "1", "X" or "2"
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Home => "1",
            Outcome::Draw => "X",
            Outcome::Away => "2",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Outcome::Home => "Home win",
            Outcome::Draw => "Draw",
            Outcome::Away => "Away win",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decimal odds for the three outcomes, each optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOdds {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
}

impl MatchOdds {
    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.home.is_none() && self.draw.is_none() && self.away.is_none()
    }
}

/// Validated match fields, without an identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFields {
    pub home_team: String,
    pub away_team: String,
    pub odds: MatchOdds,
}

/// A match on the slate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub home_team: String,
    pub away_team: String,
    pub odds: MatchOdds,
}

impl Match {
    pub fn from_fields(id: MatchId, fields: MatchFields) -> Self {
        Self {
            id,
            home_team: fields.home_team,
            away_team: fields.away_team,
            odds: fields.odds,
        }
    }

    /// Wire representation sent to the prediction service (no local id)
    pub fn to_payload(&self) -> MatchPayload {
        MatchPayload {
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            avg_home: self.odds.home,
            avg_draw: self.odds.draw,
            avg_away: self.odds.away,
        }
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.home_team, self.away_team)
    }
}

/// Risk appetite passed to the system optimizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(AppError::Validation(format!(
                "Risk level must be low, medium or high, got '{}'",
                other
            ))),
        }
    }
}

/// Budget and risk settings for a prediction request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Budget in currency units
    pub budget: u32,
    pub risk_level: RiskLevel,
}

impl PredictionConfig {
    pub fn new(budget: u32, risk_level: RiskLevel) -> Result<Self, AppError> {
        validate_budget(budget)?;
        Ok(Self { budget, risk_level })
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            budget: 100,
            risk_level: RiskLevel::Medium,
        }
    }
}

/// Match entry in a prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPayload {
    pub home_team: String,
    pub away_team: String,
    #[serde(rename = "AvgH", default, skip_serializing_if = "Option::is_none")]
    pub avg_home: Option<f64>,
    #[serde(rename = "AvgD", default, skip_serializing_if = "Option::is_none")]
    pub avg_draw: Option<f64>,
    #[serde(rename = "AvgA", default, skip_serializing_if = "Option::is_none")]
    pub avg_away: Option<f64>,
}

/// Prediction request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub matches: Vec<MatchPayload>,
    pub budget: u32,
    pub risk_level: RiskLevel,
}

impl PredictRequest {
    /// Build a request from the slate in order; fails on an empty slate
    pub fn new(slate: &[Match], config: &PredictionConfig) -> Result<Self, AppError> {
        if slate.is_empty() {
            return Err(AppError::EmptySlate);
        }

        Ok(Self {
            matches: slate.iter().map(Match::to_payload).collect(),
            budget: config.budget,
            risk_level: config.risk_level,
        })
    }
}

/// Outcome probabilities keyed "1", "X", "2" on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    #[serde(rename = "1")]
    pub home: f64,
    #[serde(rename = "X")]
    pub draw: f64,
    #[serde(rename = "2")]
    pub away: f64,
}

impl OutcomeProbabilities {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

/// Per-match prediction, aligned with the submitted slate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPrediction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_team: Option<String>,
    pub probabilities: OutcomeProbabilities,
}

/// One line of the recommended system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSelection {
    /// 1-based position of the match in the submitted slate
    pub match_index: usize,
    pub home_team: String,
    pub away_team: String,
    pub selection: Vec<Outcome>,
    pub probabilities: OutcomeProbabilities,
}

impl SystemSelection {
    /// Chosen labels in the order the service gave them, e.g. "1, X"
    pub fn selection_label(&self) -> String {
        self.selection
            .iter()
            .map(Outcome::label)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn covers(&self, outcome: Outcome) -> bool {
        self.selection.contains(&outcome)
    }
}

/// Prediction service response, replaced wholesale on every successful request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predictions: Vec<MatchPrediction>,
    pub system: Vec<SystemSelection>,
    /// Expected value in currency units
    pub expected_value: f64,
    pub win_probability: f64,
}

/// Error payload reported by the prediction service
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_match(id: u64, odds: MatchOdds) -> Match {
        Match {
            id: MatchId::new(id),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            odds,
        }
    }

    #[test]
    fn test_payload_omits_absent_odds() {
        let m = sample_match(1, MatchOdds::default());
        let value = serde_json::to_value(m.to_payload()).unwrap();

        assert_eq!(value, json!({"home_team": "Arsenal", "away_team": "Chelsea"}));
    }

    #[test]
    fn test_payload_uses_avg_keys() {
        let m = sample_match(
            1,
            MatchOdds {
                home: Some(1.5),
                draw: None,
                away: Some(6.0),
            },
        );
        let value = serde_json::to_value(m.to_payload()).unwrap();

        assert_eq!(value["AvgH"], json!(1.5));
        assert_eq!(value["AvgA"], json!(6.0));
        assert!(value.get("AvgD").is_none());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_predict_request_rejects_empty_slate() {
        let err = PredictRequest::new(&[], &PredictionConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::EmptySlate));
    }

    #[test]
    fn test_predict_request_body() {
        let slate = vec![sample_match(7, MatchOdds::default())];
        let config = PredictionConfig::new(250, RiskLevel::High).unwrap();
        let request = PredictRequest::new(&slate, &config).unwrap();

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["budget"], json!(250));
        assert_eq!(value["risk_level"], json!("high"));
        assert_eq!(value["matches"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_prediction_config_defaults() {
        let config = PredictionConfig::default();
        assert_eq!(config.budget, 100);
        assert_eq!(config.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_prediction_config_rejects_zero_budget() {
        assert!(PredictionConfig::new(0, RiskLevel::Low).is_err());
    }

    #[test]
    fn test_risk_level_from_str() {
        assert_eq!("low".parse::<RiskLevel>().unwrap(), RiskLevel::Low);
        assert_eq!(" HIGH ".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert!("extreme".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_deserialize_prediction_result() {
        let body = json!({
            "predictions": [
                {"home_team": "Arsenal", "away_team": "Chelsea",
                 "probabilities": {"1": 0.5, "X": 0.3, "2": 0.2}}
            ],
            "system": [
                {"match_index": 1, "home_team": "Arsenal", "away_team": "Chelsea",
                 "selection": ["1", "X"],
                 "probabilities": {"1": 0.5, "X": 0.3, "2": 0.2}}
            ],
            "expected_value": -12.5,
            "win_probability": 0.8
        });

        let result: PredictionResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.predictions.len(), 1);
        assert_eq!(result.system[0].selection, vec![Outcome::Home, Outcome::Draw]);
        assert_eq!(result.system[0].selection_label(), "1, X");
        assert!(result.system[0].covers(Outcome::Draw));
        assert!(!result.system[0].covers(Outcome::Away));
        assert_eq!(result.predictions[0].probabilities.get(Outcome::Away), 0.2);
    }

    #[test]
    fn test_prediction_without_team_echo() {
        let body = json!({"probabilities": {"1": 0.2, "X": 0.2, "2": 0.6}});
        let prediction: MatchPrediction = serde_json::from_value(body).unwrap();
        assert!(prediction.home_team.is_none());
    }

    #[test]
    fn test_match_odds_lookup() {
        let odds = MatchOdds {
            home: Some(2.1),
            draw: Some(3.4),
            away: None,
        };
        assert!(!odds.is_empty());
        assert!(MatchOdds::default().is_empty());
        assert_eq!(odds.get(Outcome::Draw), Some(3.4));
    }

    #[test]
    fn test_match_display() {
        let m = sample_match(3, MatchOdds::default());
        assert_eq!(m.to_string(), "Arsenal vs Chelsea");
        assert_eq!(m.id.to_string(), "#3");
    }
}
