use async_trait::async_trait;
use serde::Serialize;

use super::AnalysisError;

/// One call to the AI provider: instruction text plus the schema the
/// provider must constrain its JSON output to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderRequest {
    pub model: String,
    pub prompt: String,
    pub response_schema: serde_json::Value,
}

/// Abstraction over the generative-AI backend (for testability).
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Returns the raw text of the provider's answer.
    async fn generate(&self, request: &ProviderRequest) -> Result<String, AnalysisError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
