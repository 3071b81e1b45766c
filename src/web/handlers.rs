//! Route handlers. Mutating routes answer `303 See Other` to `/`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use super::error::WebError;
use super::render::render_state;
use crate::core_state::CoreState;
use crate::flow::SessionView;
use crate::models::{ConsentAcknowledgement, PatientInput, ResultsTab};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub tab: Option<String>,
}

impl PageQuery {
    /// Unknown or missing tab names fall back to the default tab.
    fn results_tab(&self) -> ResultsTab {
        self.tab
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or_default()
    }
}

/// Checkbox fields are only sent when ticked.
#[derive(Debug, Default, Deserialize)]
pub struct ConsentForm {
    pub medical_disclaimer: Option<String>,
    pub data_privacy: Option<String>,
    pub age_verification: Option<String>,
}

impl From<ConsentForm> for ConsentAcknowledgement {
    fn from(form: ConsentForm) -> Self {
        Self {
            medical_disclaimer: form.medical_disclaimer.is_some(),
            data_privacy: form.data_privacy.is_some(),
            age_verification: form.age_verification.is_some(),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub app: &'static str,
    pub version: &'static str,
    pub model: String,
}

/// `GET /`: the current screen.
pub async fn index(
    State(core): State<Arc<CoreState>>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let state = core.snapshot()?;
    Ok(Html(render_state(&state, query.results_tab())))
}

/// `POST /consent`
pub async fn consent(
    State(core): State<Arc<CoreState>>,
    Form(form): Form<ConsentForm>,
) -> Result<Redirect, WebError> {
    core.consent(form.into())?;
    Ok(Redirect::to("/"))
}

/// `POST /analyze`: accept the form and run the analysis in the background.
pub async fn analyze(
    State(core): State<Arc<CoreState>>,
    Form(input): Form<PatientInput>,
) -> Result<Redirect, WebError> {
    let ticket = core.submit(input.clone())?;

    let worker = core.clone();
    tokio::spawn(async move {
        if let Err(e) = worker.run_analysis(ticket, input).await {
            tracing::debug!(%ticket, error = %e, "Background analysis finished with error");
        }
    });

    Ok(Redirect::to("/"))
}

/// `POST /new-analysis`
pub async fn new_analysis(State(core): State<Arc<CoreState>>) -> Result<Redirect, WebError> {
    core.new_analysis()?;
    Ok(Redirect::to("/"))
}

/// `GET /api/state`: JSON view of the session.
pub async fn session_state(
    State(core): State<Arc<CoreState>>,
) -> Result<Json<SessionView>, WebError> {
    Ok(Json(core.view()?))
}

/// `GET /health`
pub async fn health(State(core): State<Arc<CoreState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        app: crate::config::APP_NAME,
        version: crate::config::APP_VERSION,
        model: core.gateway().model().to_string(),
    })
}
