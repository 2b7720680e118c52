//! Tipsmaster - pool-betting system client
//!
//! This library provides:
//! - Match entry and an ordered match slate with stable local ids
//! - A client for the external prediction service (risk/budget constrained systems)
//! - Projection of prediction results into chart series, a system table and
//!   formatted expected value / win probability
//! - Value indicators comparing predicted probabilities with entered odds
//!
//! # Example
//!
//! ```no_run
//! use tipsmaster::{ClientConfig, MatchForm, PredictionClient, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PredictionClient::new(ClientConfig::from_env()?)?;
//!     let mut session = Session::default();
//!
//!     session.add_match(&mut MatchForm::new("Arsenal", "Chelsea"))?;
//!     session.predict(&client).await?;
//!
//!     if let Some(view) = session.view() {
//!         println!("Expected value: {}", view.expected_value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod projector;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use client::PredictionClient;
pub use config::ClientConfig;
pub use crate::core::{MatchForm, Session, SessionState, Slate};
pub use error::AppError;
pub use models::{
    Match, MatchId, MatchOdds, Outcome, OutcomeProbabilities, PredictRequest, PredictionConfig,
    PredictionResult, RiskLevel, SystemSelection,
};
pub use projector::{project, project_with_slate, ResultView};
