//! Session state
//!
//! One owned value holding the slate, prediction settings, the displayed
//! result and the error/warning banners. It lives until the front end drops
//! it; nothing is persisted.
//!
//! ```text
//! Idle ──add──▶ Editing ──begin──▶ Requesting ──complete──▶ Displaying
//!                  ▲                    │                       │
//!                  │                    └──fail──▶ Failed        │
//!                  └──────── edit (from any state) ◀────────────┘
//! ```
//!
//! The request is split into `begin_request` / `complete_request` /
//! `fail_request` so the slate stays editable while a call is in flight.
//! Only one request may be in flight at a time.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::client::PredictionClient;
use crate::core::entry::MatchForm;
use crate::core::slate::Slate;
use crate::error::{validate_budget, AppError};
use crate::models::{Match, MatchId, PredictRequest, PredictionConfig, PredictionResult, RiskLevel};
use crate::projector::{project_with_slate, ResultView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No match has been added yet
    Idle,
    Editing,
    Requesting,
    Displaying,
    Failed,
}

/// A received result together with the slate it was computed for
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedResult {
    pub result: PredictionResult,
    pub submitted: Vec<Match>,
    pub received_at: DateTime<Utc>,
}

impl DisplayedResult {
    pub fn view(&self) -> ResultView {
        project_with_slate(&self.result, &self.submitted)
    }
}

#[derive(Debug)]
pub struct Session {
    slate: Slate,
    config: PredictionConfig,
    state: SessionState,
    displayed: Option<DisplayedResult>,
    /// Slate snapshot of the request in flight
    pending: Option<Vec<Match>>,
    error: Option<String>,
    warning: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PredictionConfig::default())
    }
}

impl Session {
    pub fn new(config: PredictionConfig) -> Self {
        Self {
            slate: Slate::new(),
            config,
            state: SessionState::Idle,
            displayed: None,
            pending: None,
            error: None,
            warning: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn slate(&self) -> &Slate {
        &self.slate
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    pub fn displayed(&self) -> Option<&DisplayedResult> {
        self.displayed.as_ref()
    }

    /// Error banner from the last failed action
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Connectivity warning from the startup probe
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn is_requesting(&self) -> bool {
        self.state == SessionState::Requesting
    }

    /// Submit the form onto the slate; the form is cleared only on success
    pub fn add_match(&mut self, form: &mut MatchForm) -> Result<MatchId, AppError> {
        let m = form.submit()?;
        let id = m.id;
        self.slate.add(m)?;
        form.reset();
        self.mark_editing();
        Ok(id)
    }

    /// Returns false when the id is not on the slate
    pub fn update_match(&mut self, id: MatchId, form: &MatchForm) -> Result<bool, AppError> {
        let fields = form.validate()?;
        let updated = self.slate.update(id, fields);
        if updated {
            self.mark_editing();
        }
        Ok(updated)
    }

    pub fn remove_match(&mut self, id: MatchId) -> Option<Match> {
        let removed = self.slate.remove(id);
        if removed.is_some() {
            self.mark_editing();
        }
        removed
    }

    pub fn set_budget(&mut self, budget: u32) -> Result<(), AppError> {
        validate_budget(budget)?;
        self.config.budget = budget;
        Ok(())
    }

    pub fn set_risk_level(&mut self, risk_level: RiskLevel) {
        self.config.risk_level = risk_level;
    }

    /// Snapshot the slate and enter `Requesting`
    pub fn begin_request(&mut self) -> Result<PredictRequest, AppError> {
        if self.is_requesting() {
            return Err(AppError::RequestInFlight);
        }

        let request = match PredictRequest::new(self.slate.list(), &self.config) {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        self.pending = Some(self.slate.list().to_vec());
        self.error = None;
        self.state = SessionState::Requesting;
        Ok(request)
    }

    /// Replace the displayed result wholesale
    pub fn complete_request(&mut self, result: PredictionResult) -> Result<(), AppError> {
        let submitted = self.pending.take().ok_or(AppError::NoRequestInFlight)?;

        self.displayed = Some(DisplayedResult {
            result,
            submitted,
            received_at: Utc::now(),
        });
        self.state = SessionState::Displaying;
        Ok(())
    }

    /// Record the failure; any previously displayed result is kept
    pub fn fail_request(&mut self, err: &AppError) -> Result<(), AppError> {
        self.pending.take().ok_or(AppError::NoRequestInFlight)?;

        self.error = Some(err.to_string());
        self.state = SessionState::Failed;
        Ok(())
    }

    /// Run a full request against the service
    pub async fn predict(&mut self, client: &PredictionClient) -> Result<(), AppError> {
        let request = self.begin_request()?;

        match client.send(&request).await {
            Ok(result) => self.complete_request(result),
            Err(e) => {
                self.fail_request(&e)?;
                Err(e)
            }
        }
    }

    /// Startup connectivity probe. Advisory only: records a warning, never blocks.
    pub async fn probe_connectivity(&mut self, client: &PredictionClient) -> bool {
        match client.check_health().await {
            Ok(()) => {
                self.warning = None;
                true
            }
            Err(e) => {
                warn!("Connectivity probe failed: {}", e);
                self.warning = Some(e.to_string());
                false
            }
        }
    }

    pub fn view(&self) -> Option<ResultView> {
        self.displayed.as_ref().map(DisplayedResult::view)
    }

    fn mark_editing(&mut self) {
        if self.state != SessionState::Requesting {
            debug!("Session {:?} -> Editing", self.state);
            self.state = SessionState::Editing;
        }
    }
}
