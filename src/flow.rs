//! Session flow: consent → form → loading → results.
//!
//! The session is a tagged union, so a state carries exactly the data
//! it can render. Every transition is checked against the current state;
//! a rejected action leaves the session untouched.

use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    AnalysisReport, AnalysisResult, ConsentAcknowledgement, PatientInput, Screen,
};

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("All three acknowledgements are required")]
    ConsentIncomplete,
    #[error("Required fields missing: {}", missing.join(", "))]
    IncompleteInput { missing: Vec<&'static str> },
    #[error("Cannot {action} while on the {state} screen")]
    InvalidTransition {
        action: &'static str,
        state: Screen,
    },
    #[error("Analysis ticket does not match the analysis in flight")]
    StaleTicket,
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Identifies one accepted submission. Only the in-flight ticket
/// can complete or fail the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AnalysisTicket(Uuid);

impl AnalysisTicket {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for AnalysisTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Consent,
    Form {
        draft: PatientInput,
        error: Option<String>,
    },
    Loading {
        ticket: AnalysisTicket,
        submitted: PatientInput,
        started_at: Instant,
    },
    Results {
        report: AnalysisReport,
    },
}

impl SessionState {
    pub fn screen(&self) -> Screen {
        match self {
            Self::Consent => Screen::Consent,
            Self::Form { .. } => Screen::Form,
            Self::Loading { .. } => Screen::Loading,
            Self::Results { .. } => Screen::Results,
        }
    }

    /// Time spent waiting on the current analysis, if one is running.
    pub fn loading_elapsed(&self) -> Option<Duration> {
        match self {
            Self::Loading { started_at, .. } => Some(started_at.elapsed()),
            _ => None,
        }
    }
}

/// JSON view of the session for `/api/state`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub screen: Screen,
    pub error: Option<String>,
    pub draft: Option<PatientInput>,
    pub report: Option<AnalysisReport>,
}

impl From<&SessionState> for SessionView {
    fn from(state: &SessionState) -> Self {
        let (error, draft, report) = match state {
            SessionState::Consent => (None, None, None),
            SessionState::Form { draft, error } => (error.clone(), Some(draft.clone()), None),
            SessionState::Loading { submitted, .. } => (None, Some(submitted.clone()), None),
            SessionState::Results { report } => (None, None, Some(report.clone())),
        };
        Self {
            screen: state.screen(),
            error,
            draft,
            report,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════

/// One user's walk through the symptom checker.
///
/// Lives in `CoreState` behind a `Mutex`.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen()
    }

    pub fn view(&self) -> SessionView {
        SessionView::from(&self.state)
    }

    /// Accept the disclaimers and open an empty form.
    pub fn consent(&mut self, ack: ConsentAcknowledgement) -> Result<(), FlowError> {
        self.expect_screen("consent", Screen::Consent)?;
        if !ack.is_complete() {
            return Err(FlowError::ConsentIncomplete);
        }
        self.state = SessionState::Form {
            draft: PatientInput::default(),
            error: None,
        };
        tracing::debug!("Consent accepted");
        Ok(())
    }

    /// Submit the form. Clears any previous error and starts loading.
    ///
    /// Only valid from the form, so a second submission while one is
    /// in flight is rejected.
    pub fn begin_analysis(&mut self, input: PatientInput) -> Result<AnalysisTicket, FlowError> {
        self.expect_screen("submit an analysis", Screen::Form)?;

        let missing = input.missing_fields();
        if !missing.is_empty() {
            return Err(FlowError::IncompleteInput { missing });
        }

        let ticket = AnalysisTicket::new();
        self.state = SessionState::Loading {
            ticket,
            submitted: input,
            started_at: Instant::now(),
        };
        tracing::debug!(%ticket, "Analysis started");
        Ok(ticket)
    }

    /// Apply a successful analysis.
    pub fn complete(
        &mut self,
        ticket: AnalysisTicket,
        result: AnalysisResult,
    ) -> Result<(), FlowError> {
        self.take_in_flight("complete an analysis", ticket)?;
        self.state = SessionState::Results {
            report: AnalysisReport::new(result),
        };
        tracing::debug!(%ticket, "Analysis applied");
        Ok(())
    }

    /// Apply a failed analysis: back to the form with the submitted
    /// input restored and `reason` shown.
    pub fn fail(&mut self, ticket: AnalysisTicket, reason: &str) -> Result<(), FlowError> {
        let submitted = self.take_in_flight("fail an analysis", ticket)?;
        self.state = SessionState::Form {
            draft: submitted,
            error: Some(reason.to_string()),
        };
        tracing::debug!(%ticket, "Analysis failure applied");
        Ok(())
    }

    /// Drop the current report and open an empty form.
    pub fn new_analysis(&mut self) -> Result<(), FlowError> {
        self.expect_screen("start a new analysis", Screen::Results)?;
        self.state = SessionState::Form {
            draft: PatientInput::default(),
            error: None,
        };
        Ok(())
    }

    fn expect_screen(&self, action: &'static str, expected: Screen) -> Result<(), FlowError> {
        let state = self.screen();
        if state == expected {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition { action, state })
        }
    }

    /// Leave `Loading` if `ticket` is the one in flight, returning the
    /// submitted input. The state is left as is on rejection.
    fn take_in_flight(
        &mut self,
        action: &'static str,
        ticket: AnalysisTicket,
    ) -> Result<PatientInput, FlowError> {
        match std::mem::take(&mut self.state) {
            SessionState::Loading {
                ticket: current,
                submitted,
                ..
            } if current == ticket => Ok(submitted),
            other => {
                let err = match &other {
                    SessionState::Loading { .. } => FlowError::StaleTicket,
                    _ => FlowError::InvalidTransition {
                        action,
                        state: other.screen(),
                    },
                };
                self.state = other;
                Err(err)
            }
        }
    }
}
