//! Prediction service client configuration

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const API_URL_ENV: &str = "TIPSMASTER_API_URL";
pub const TIMEOUT_ENV: &str = "TIPSMASTER_TIMEOUT_SECS";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL; endpoints are appended to it
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("tipsmaster/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `TIPSMASTER_API_URL` and `TIPSMASTER_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                AppError::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    TIMEOUT_ENV, raw
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// A zero timeout would fail every request before it is sent
    pub fn validate(&self) -> Result<(), AppError> {
        if self.timeout_secs == 0 {
            return Err(AppError::Config(
                "Timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn predict_url(&self) -> String {
        self.endpoint("predict")
    }

    pub fn health_url(&self) -> String {
        self.endpoint("health")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000/api");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("tipsmaster/"));
    }

    #[test]
    fn test_endpoints() {
        let config = ClientConfig::default();
        assert_eq!(config.predict_url(), "http://localhost:5000/api/predict");
        assert_eq!(config.health_url(), "http://localhost:5000/api/health");
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let config = ClientConfig::default().with_base_url("http://tips.local/api/");
        assert_eq!(config.predict_url(), "http://tips.local/api/predict");
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (API_URL_ENV, "http://10.0.0.5:8000/api"),
            (TIMEOUT_ENV, "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://10.0.0.5:8000/api");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_env_blank_url_keeps_default() {
        let config = ClientConfig::from_lookup(lookup_from(&[(API_URL_ENV, "  ")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_env_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup_from(&[(TIMEOUT_ENV, "soon")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_env_zero_timeout() {
        let err = ClientConfig::from_lookup(lookup_from(&[(TIMEOUT_ENV, "0")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("at least 1 second"));
    }

    #[test]
    fn test_validate_timeout() {
        assert!(ClientConfig::default().validate().is_ok());
        assert!(ClientConfig::default().with_timeout_secs(1).validate().is_ok());
        assert!(ClientConfig::default().with_timeout_secs(0).validate().is_err());
    }
}
