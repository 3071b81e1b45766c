use std::sync::Arc;

use super::gemini::GeminiClient;
use super::parser::parse_analysis_response;
use super::prompt::build_analysis_prompt;
use super::schema::analysis_response_schema;
use super::types::{AiProvider, ProviderRequest};
use super::AnalysisError;
use crate::config::GatewayConfig;
use crate::models::{AnalysisResult, PatientInput};

/// Turns patient input into a sorted [`AnalysisResult`]:
/// prompt → provider (schema-constrained) → parse → sort.
pub struct AnalysisGateway {
    provider: Arc<dyn AiProvider>,
    model: String,
    max_retries: usize,
}

impl AnalysisGateway {
    /// Gateway that makes exactly one provider call per analysis.
    pub fn new(provider: Arc<dyn AiProvider>, model: &str) -> Self {
        Self {
            provider,
            model: model.to_string(),
            max_retries: 0,
        }
    }

    /// Allow up to `max_retries` extra calls on retryable failures.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Gateway backed by Gemini, configured from the environment.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, AnalysisError> {
        let client = GeminiClient::new(config)?;
        Ok(Self::new(Arc::new(client), &config.model).with_max_retries(config.max_retries))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run one analysis. Conditions in the result are sorted by
    /// probability, highest first.
    pub async fn analyze(&self, input: &PatientInput) -> Result<AnalysisResult, AnalysisError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            prompt: build_analysis_prompt(input),
            response_schema: analysis_response_schema(),
        };

        let mut attempt = 0;
        let mut result = loop {
            match self.call_once(&request).await {
                Ok(result) => break result,
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        provider = self.provider.name(),
                        attempt,
                        error = %e,
                        "Analysis call failed, retrying"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        provider = self.provider.name(),
                        model = %self.model,
                        attempts = attempt + 1,
                        error = %e,
                        "Analysis failed"
                    );
                    return Err(e);
                }
            }
        };

        result.sort_conditions();
        tracing::info!(
            conditions = result.conditions.len(),
            urgency = %result.urgency_level,
            "Analysis complete"
        );
        Ok(result)
    }

    async fn call_once(&self, request: &ProviderRequest) -> Result<AnalysisResult, AnalysisError> {
        let text = self.provider.generate(request).await?;
        parse_analysis_response(&text)
    }
}
