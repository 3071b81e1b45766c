//! Analysis gateway: patient input → prompt → AI provider → parsed report.
//!
//! The provider is an opaque function from a prompt plus an output schema
//! to JSON text. Everything else (prompt wording, schema, parsing, ordering
//! of conditions) lives here.

pub mod gateway;
pub mod gemini;
pub mod parser;
pub mod prompt;
pub mod schema;
pub mod types;

pub use gateway::*;
pub use gemini::*;
pub use parser::*;
pub use prompt::*;
pub use schema::*;
pub use types::*;

use thiserror::Error;

/// The one message users see for any analysis failure.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "An error occurred during analysis. The AI provider may be busy, please try again later.";

/// Diagnostic detail for a failed analysis.
///
/// Variants exist for the logs; callers facing the user collapse them
/// into [`ANALYSIS_FAILED_MESSAGE`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("AI provider rejected the credentials (status {status})")]
    Auth { status: u16 },

    #[error("AI provider rate limit exceeded")]
    RateLimited,

    #[error("AI provider returned error (status {status}): {body}")]
    Provider { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("AI provider returned no content")]
    EmptyResponse,

    #[error("Response does not match the analysis schema: {0}")]
    SchemaViolation(String),
}

impl AnalysisError {
    /// Whether a fresh provider call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_)
            | Self::RateLimited
            | Self::ResponseParsing(_)
            | Self::EmptyResponse
            | Self::SchemaViolation(_) => true,
            Self::Provider { status, .. } => *status >= 500,
            Self::Auth { .. } => false,
        }
    }

    pub fn user_message(&self) -> &'static str {
        ANALYSIS_FAILED_MESSAGE
    }
}
