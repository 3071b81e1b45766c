use crate::models::AnalysisResult;

use super::AnalysisError;

/// Tolerance around 100 before a probability sum is worth a log line.
const PROBABILITY_SUM_TOLERANCE: f64 = 15.0;

/// Parse the provider's JSON text into an [`AnalysisResult`].
///
/// Conditions come back in the provider's order; sorting is the caller's job.
pub fn parse_analysis_response(response: &str) -> Result<AnalysisResult, AnalysisError> {
    let json_str = extract_json(response);
    if json_str.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;

    let result: AnalysisResult = serde_json::from_value(value)
        .map_err(|e| AnalysisError::SchemaViolation(e.to_string()))?;

    check_probability_sum(&result);
    Ok(result)
}

/// Strip a surrounding Markdown fence if the provider added one anyway.
///
/// Only a fence that opens the reply counts; backticks inside JSON string
/// values are left alone.
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(after_fence) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let content = after_fence
        .strip_prefix("json")
        .or_else(|| after_fence.strip_prefix("JSON"))
        .unwrap_or(after_fence)
        .trim_end();

    content.strip_suffix("```").unwrap_or(content).trim()
}

fn check_probability_sum(result: &AnalysisResult) {
    if result.conditions.is_empty() {
        return;
    }
    let sum: f64 = result.conditions.iter().map(|c| c.probability).sum();
    if (sum - 100.0).abs() > PROBABILITY_SUM_TOLERANCE {
        tracing::debug!(
            sum,
            conditions = result.conditions.len(),
            "Condition probabilities far from 100"
        );
    }
}
