//! HTTP client for the prediction service

use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::{ErrorResponse, Match, PredictRequest, PredictionConfig, PredictionResult};

/// Prediction service client.
///
/// Every call goes to the service; nothing is cached or retried.
pub struct PredictionClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl PredictionClient {
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Request a system for the slate.
    ///
    /// An empty slate fails with [`AppError::EmptySlate`] before any network call.
    pub async fn request_prediction(
        &self,
        slate: &[Match],
        config: &PredictionConfig,
    ) -> Result<PredictionResult, AppError> {
        let request = PredictRequest::new(slate, config)?;
        self.send(&request).await
    }

    /// POST a prepared request to the predict endpoint
    pub async fn send(&self, request: &PredictRequest) -> Result<PredictionResult, AppError> {
        let url = self.config.predict_url();
        info!(
            "Requesting prediction: {} matches, budget {}, risk {}",
            request.matches.len(),
            request.budget,
            request.risk_level
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Prediction request to {} failed: {}", url, e);
                AppError::PredictionService(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                debug!("Could not read error body from {}: {}", url, e);
                String::new()
            });
            let message = service_error_message(status, &body);
            warn!("Prediction service returned {}: {}", status, message);
            return Err(AppError::PredictionService(message));
        }

        let result: PredictionResult = response.json().await.map_err(|e| {
            AppError::PredictionService(format!("Invalid response from prediction service: {}", e))
        })?;

        info!(
            "Prediction received: {} system lines, expected value {:.2}, win probability {:.4}",
            result.system.len(),
            result.expected_value,
            result.win_probability
        );

        Ok(result)
    }

    /// Probe the health endpoint; only failure matters, the body is ignored
    pub async fn check_health(&self) -> Result<(), AppError> {
        let url = self.config.health_url();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Connectivity(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Connectivity(format!(
                "health check returned status {}",
                response.status()
            )));
        }

        debug!("Prediction service at {} is reachable", url);
        Ok(())
    }
}

/// Prefer the service's own `error` text; fall back to the status line
fn service_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error)
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::MatchForm;
    use crate::models::{Outcome, RiskLevel};
    use crate::testing::{spawn_stub, Reply, UNREACHABLE_API_URL};

    fn client_for(base_url: &str) -> PredictionClient {
        PredictionClient::new(
            ClientConfig::default()
                .with_base_url(base_url)
                .with_timeout_secs(5),
        )
        .unwrap()
    }

    fn arsenal_chelsea() -> Vec<Match> {
        vec![MatchForm::new("Arsenal", "Chelsea").submit().unwrap()]
    }

    #[test]
    fn test_service_error_message_prefers_error_field() {
        let msg = service_error_message(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "Ogiltig risknivå: extreme"}"#,
        );
        assert_eq!(msg, "Ogiltig risknivå: extreme");
    }

    #[test]
    fn test_service_error_message_fallback() {
        assert_eq!(
            service_error_message(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
            "Request failed with status code 502"
        );
        assert_eq!(
            service_error_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error": ""}"#),
            "Request failed with status code 500"
        );
    }

    #[test]
    fn test_new_rejects_zero_timeout() {
        let err = PredictionClient::new(ClientConfig::default().with_timeout_secs(0))
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[actix_web::test]
    async fn test_empty_slate_makes_no_call() {
        let stub = spawn_stub(Reply::Success);
        let client = client_for(&stub.base_url);

        let err = client
            .request_prediction(&[], &PredictionConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EmptySlate));
        assert_eq!(stub.hits(), 0);
    }

    #[actix_web::test]
    async fn test_request_prediction_success() {
        let stub = spawn_stub(Reply::Success);
        let client = client_for(&stub.base_url);
        let config = PredictionConfig::new(100, RiskLevel::Medium).unwrap();

        let result = client
            .request_prediction(&arsenal_chelsea(), &config)
            .await
            .unwrap();

        assert_eq!(result.predictions.len(), 1);
        assert_eq!(result.system.len(), 1);
        assert_eq!(result.system[0].match_index, 1);
        assert_eq!(result.system[0].home_team, "Arsenal");
        assert_eq!(result.system[0].away_team, "Chelsea");
        assert_eq!(result.system[0].selection, vec![Outcome::Home]);
        assert_eq!(stub.hits(), 1);
    }

    #[actix_web::test]
    async fn test_request_body_shape() {
        let stub = spawn_stub(Reply::Success);
        let client = client_for(&stub.base_url);
        let slate = vec![
            MatchForm::new("Arsenal", "Chelsea").submit().unwrap(),
            MatchForm::new("Hammarby", "Djurgården")
                .with_odds("2.10", "", "3.40")
                .submit()
                .unwrap(),
        ];
        let config = PredictionConfig::new(64, RiskLevel::Low).unwrap();

        client.request_prediction(&slate, &config).await.unwrap();

        let body = stub.last_body().unwrap();
        assert_eq!(body["budget"], 64);
        assert_eq!(body["risk_level"], "low");

        let first = &body["matches"][0];
        assert_eq!(first["home_team"], "Arsenal");
        assert!(first.get("AvgH").is_none());
        assert!(first.get("id").is_none());

        let second = &body["matches"][1];
        assert_eq!(second["AvgH"], 2.1);
        assert!(second.get("AvgD").is_none());
        assert_eq!(second["AvgA"], 3.4);
    }

    #[actix_web::test]
    async fn test_service_reported_error() {
        let stub = spawn_stub(Reply::ServiceError);
        let client = client_for(&stub.base_url);

        let err = client
            .request_prediction(&arsenal_chelsea(), &PredictionConfig::default())
            .await
            .unwrap_err();

        match &err {
            AppError::PredictionService(msg) => assert_eq!(msg, "Model could not be loaded"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Failed to fetch predictions: Model could not be loaded"
        );
    }

    #[actix_web::test]
    async fn test_non_json_error_uses_status() {
        let stub = spawn_stub(Reply::BadGateway);
        let client = client_for(&stub.base_url);

        let err = client
            .request_prediction(&arsenal_chelsea(), &PredictionConfig::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Request failed with status code 502"));
    }

    #[actix_web::test]
    async fn test_malformed_success_body() {
        let stub = spawn_stub(Reply::Malformed);
        let client = client_for(&stub.base_url);

        let err = client
            .request_prediction(&arsenal_chelsea(), &PredictionConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PredictionService(_)));
        assert!(err.to_string().contains("Invalid response"));
    }

    #[actix_web::test]
    async fn test_transport_failure() {
        let client = client_for(UNREACHABLE_API_URL);

        let err = client
            .request_prediction(&arsenal_chelsea(), &PredictionConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PredictionService(_)));
    }

    #[actix_web::test]
    async fn test_repeated_requests_are_not_cached() {
        let stub = spawn_stub(Reply::Success);
        let client = client_for(&stub.base_url);
        let slate = arsenal_chelsea();
        let config = PredictionConfig::default();

        let first = client.request_prediction(&slate, &config).await.unwrap();
        let second = client.request_prediction(&slate, &config).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(stub.hits(), 2);
    }

    #[actix_web::test]
    async fn test_check_health() {
        let stub = spawn_stub(Reply::Success);
        assert!(client_for(&stub.base_url).check_health().await.is_ok());

        let err = client_for(UNREACHABLE_API_URL)
            .check_health()
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Connectivity(_)));
    }
}
