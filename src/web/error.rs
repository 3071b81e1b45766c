//! HTTP error responses with a structured JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::CoreError;
use crate::flow::FlowError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// Web-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Consent incomplete")]
    ConsentIncomplete,
    #[error("Incomplete input: {0:?}")]
    IncompleteInput(Vec<&'static str>),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Stale analysis ticket")]
    StaleTicket,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            WebError::ConsentIncomplete => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CONSENT_INCOMPLETE",
                FlowError::ConsentIncomplete.to_string(),
            ),
            WebError::IncompleteInput(missing) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INCOMPLETE_INPUT",
                format!("Required fields missing: {}", missing.join(", ")),
            ),
            WebError::InvalidTransition(detail) => (
                StatusCode::CONFLICT,
                "INVALID_TRANSITION",
                detail.clone(),
            ),
            WebError::StaleTicket => (
                StatusCode::CONFLICT,
                "STALE_TICKET",
                FlowError::StaleTicket.to_string(),
            ),
            WebError::Internal(detail) => {
                tracing::error!(detail, "Web internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<FlowError> for WebError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::ConsentIncomplete => WebError::ConsentIncomplete,
            FlowError::IncompleteInput { missing } => WebError::IncompleteInput(missing),
            e @ FlowError::InvalidTransition { .. } => WebError::InvalidTransition(e.to_string()),
            FlowError::StaleTicket => WebError::StaleTicket,
        }
    }
}

impl From<CoreError> for WebError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LockPoisoned => WebError::Internal("lock poisoned".into()),
            CoreError::Flow(e) => e.into(),
        }
    }
}
