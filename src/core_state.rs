//! Application state shared by every HTTP handler.
//!
//! `CoreState` owns the single session and the analysis gateway. It is
//! wrapped in `Arc` at startup and handed to the router.

use std::sync::{Mutex, MutexGuard};

use crate::analysis::AnalysisGateway;
use crate::flow::{AnalysisTicket, FlowError, Session, SessionState, SessionView};
use crate::models::{ConsentAcknowledgement, PatientInput};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    /// Held only for the duration of a transition, never across an await.
    session: Mutex<Session>,
    gateway: AnalysisGateway,
}

impl CoreState {
    pub fn new(gateway: AnalysisGateway) -> Self {
        Self {
            session: Mutex::new(Session::new()),
            gateway,
        }
    }

    pub fn gateway(&self) -> &AnalysisGateway {
        &self.gateway
    }

    fn lock_session(&self) -> Result<MutexGuard<'_, Session>, CoreError> {
        self.session.lock().map_err(|_| CoreError::LockPoisoned)
    }

    // ── Transitions ─────────────────────────────────────────

    pub fn consent(&self, ack: ConsentAcknowledgement) -> Result<(), CoreError> {
        self.lock_session()?.consent(ack)?;
        Ok(())
    }

    /// Begin an analysis. The caller drives it with [`Self::run_analysis`].
    pub fn submit(&self, input: PatientInput) -> Result<AnalysisTicket, CoreError> {
        let ticket = self.lock_session()?.begin_analysis(input)?;
        Ok(ticket)
    }

    /// Call the gateway for `ticket` and apply exactly one outcome.
    ///
    /// Failures are collapsed to the generic user message; the detail
    /// has already been logged by the gateway.
    pub async fn run_analysis(
        &self,
        ticket: AnalysisTicket,
        input: PatientInput,
    ) -> Result<(), CoreError> {
        tracing::info!(
            %ticket,
            provider = self.gateway.provider_name(),
            model = self.gateway.model(),
            description_len = input.description.len(),
            has_history = !input.history.trim().is_empty(),
            "Running analysis"
        );

        let outcome = self.gateway.analyze(&input).await;

        let mut session = self.lock_session()?;
        let applied = match outcome {
            Ok(result) => session.complete(ticket, result),
            Err(e) => session.fail(ticket, e.user_message()),
        };
        if let Err(e) = applied {
            tracing::warn!(%ticket, error = %e, "Analysis outcome discarded");
            return Err(e.into());
        }
        Ok(())
    }

    pub fn new_analysis(&self) -> Result<(), CoreError> {
        self.lock_session()?.new_analysis()?;
        Ok(())
    }

    // ── Read path ───────────────────────────────────────────

    /// Clone of the current state for rendering.
    pub fn snapshot(&self) -> Result<SessionState, CoreError> {
        Ok(self.lock_session()?.state().clone())
    }

    pub fn view(&self) -> Result<SessionView, CoreError> {
        Ok(self.lock_session()?.view())
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error(transparent)]
    Flow(#[from] FlowError),
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::analysis::{AnalysisError, MockProvider, ANALYSIS_FAILED_MESSAGE};
    use crate::models::analysis::fixtures::FLU_COLD_RESPONSE;
    use crate::models::Screen;

    fn input() -> PatientInput {
        PatientInput {
            age: "35".into(),
            gender: "Other".into(),
            severity: "Mild".into(),
            description: "sore throat".into(),
            duration: "1-3 days".into(),
            history: String::new(),
        }
    }

    async fn analyze_now(state: &CoreState, input: PatientInput) -> Result<(), CoreError> {
        let ticket = state.submit(input.clone())?;
        state.run_analysis(ticket, input).await
    }

    fn state_with(provider: MockProvider) -> CoreState {
        let gateway = AnalysisGateway::new(Arc::new(provider), "gemini-2.5-flash");
        let state = CoreState::new(gateway);
        state.consent(ConsentAcknowledgement::all()).unwrap();
        state
    }

    #[tokio::test]
    async fn successful_analysis_shows_sorted_results() {
        let state = state_with(MockProvider::new(FLU_COLD_RESPONSE));
        analyze_now(&state, input()).await.unwrap();

        match state.snapshot().unwrap() {
            SessionState::Results { report } => {
                let names: Vec<_> = report.result.conditions.iter().map(|c| c.name.clone()).collect();
                assert_eq!(names, vec!["Cold", "Flu"]);
                assert_eq!(report.result.conditions[0].probability, 60.0);
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failing_provider_returns_to_form_with_error() {
        let state = state_with(MockProvider::failing(AnalysisError::Transport(
            "connection refused".into(),
        )));
        analyze_now(&state, input()).await.unwrap();

        let view = state.view().unwrap();
        assert_eq!(view.screen, Screen::Form);
        assert_eq!(view.error.as_deref(), Some(ANALYSIS_FAILED_MESSAGE));
        assert_eq!(view.draft, Some(input()));
        assert!(view.report.is_none());
    }

    #[tokio::test]
    async fn submission_while_loading_is_rejected() {
        let state = Arc::new(state_with(
            MockProvider::new(FLU_COLD_RESPONSE).with_delay(Duration::from_millis(50)),
        ));
        let ticket = state.submit(input()).unwrap();

        let err = state.submit(input()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Flow(FlowError::InvalidTransition { .. })
        ));

        state.run_analysis(ticket, input()).await.unwrap();
        assert_eq!(state.view().unwrap().screen, Screen::Results);
    }

    #[tokio::test]
    async fn session_is_readable_while_analysis_in_flight() {
        let state = Arc::new(state_with(
            MockProvider::new(FLU_COLD_RESPONSE).with_delay(Duration::from_millis(100)),
        ));
        let ticket = state.submit(input()).unwrap();

        let runner = {
            let state = state.clone();
            tokio::spawn(async move { state.run_analysis(ticket, input()).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(state.view().unwrap().screen, Screen::Loading);

        runner.await.unwrap().unwrap();
        assert_eq!(state.view().unwrap().screen, Screen::Results);
    }

    #[tokio::test]
    async fn outcome_for_finished_ticket_is_discarded() {
        let state = state_with(MockProvider::new(FLU_COLD_RESPONSE));
        let ticket = state.submit(input()).unwrap();
        state.run_analysis(ticket, input()).await.unwrap();

        let err = state.run_analysis(ticket, input()).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Flow(FlowError::InvalidTransition { .. })
        ));
        assert_eq!(state.view().unwrap().screen, Screen::Results);
    }

    #[tokio::test]
    async fn new_analysis_returns_to_empty_form() {
        let state = state_with(MockProvider::new(FLU_COLD_RESPONSE));
        analyze_now(&state, input()).await.unwrap();
        state.new_analysis().unwrap();

        let view = state.view().unwrap();
        assert_eq!(view.screen, Screen::Form);
        assert_eq!(view.draft, Some(PatientInput::default()));
        assert!(view.error.is_none());
    }

    #[test]
    fn new_state_starts_on_consent() {
        let gateway = AnalysisGateway::new(Arc::new(MockProvider::new("{}")), "m");
        let state = CoreState::new(gateway);
        assert_eq!(state.view().unwrap().screen, Screen::Consent);
        assert_eq!(state.gateway().model(), "m");
    }
}
