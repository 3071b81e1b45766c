use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::{CarePlanKind, UrgencyLevel};

/// Structured analysis returned by the AI provider.
///
/// Field names are the wire keys of the declared output schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Confidence in the analysis, 0–100.
    pub ai_confidence: f64,
    #[serde(deserialize_with = "integral_count")]
    pub conditions_analyzed: u32,
    pub urgency_level: UrgencyLevel,
    /// Number of items in the care plan.
    #[serde(deserialize_with = "integral_count")]
    pub recommendations: u32,
    /// Sorted by probability, highest first, once post-processed.
    pub conditions: Vec<Condition>,
    pub risk_assessment: Vec<RiskFactor>,
    pub symptom_analysis: SymptomAnalysis,
    pub care_plan: Vec<CarePlanItem>,
    pub timeline: Vec<TimelineItem>,
}

/// Counts arrive as JSON numbers; `2.0` is as good as `2`.
fn integral_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.fract() != 0.0 || raw < 0.0 || raw > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative whole number, got {raw}"
        )));
    }
    Ok(raw as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    /// 0–100. Expected, not enforced, to sum near 100 across conditions.
    pub probability: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    /// Score 0–100.
    pub value: f64,
}

/// Free-text labels chosen by the AI; not closed enums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomAnalysis {
    pub severity: String,
    pub duration_pattern: String,
    pub progression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarePlanItem {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: CarePlanKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub time: String,
    pub title: String,
    pub description: String,
}

impl AnalysisResult {
    /// Reorder conditions by probability, highest first.
    ///
    /// `sort_by` is stable, so equal probabilities keep the provider's order.
    pub fn sort_conditions(&mut self) {
        self.conditions
            .sort_by(|a, b| b.probability.total_cmp(&a.probability));
    }
}

/// A finished analysis as held by the session for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub result: AnalysisResult,
    pub generated_at: NaiveDateTime,
}

impl AnalysisReport {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            result,
            generated_at: chrono::Local::now().naive_local(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A complete provider reply listing Flu (40) before Cold (60).
    pub const FLU_COLD_RESPONSE: &str = r#"{
        "ai_confidence": 82,
        "conditions_analyzed": 2,
        "urgency_level": "Medium",
        "recommendations": 2,
        "conditions": [
            {"name": "Flu", "probability": 40, "description": "Influenza infection"},
            {"name": "Cold", "probability": 60, "description": "Common cold"}
        ],
        "risk_assessment": [
            {"factor": "Age Factor", "value": 25},
            {"factor": "Symptom Severity", "value": 55}
        ],
        "symptom_analysis": {
            "severity": "Moderate",
            "duration_pattern": "Acute",
            "progression": "Stable"
        },
        "care_plan": [
            {"title": "Rest", "description": "Sleep and hydrate", "type": "recommendation"},
            {"title": "High fever", "description": "Seek care above 39.5C", "type": "caution"}
        ],
        "timeline": [
            {"time": "24-48 Hours", "title": "Monitor", "description": "Track temperature"}
        ]
    }"#;

    pub fn condition(name: &str, probability: f64) -> Condition {
        Condition {
            name: name.into(),
            probability,
            description: format!("{name} description"),
        }
    }

    pub fn result_with(conditions: Vec<Condition>) -> AnalysisResult {
        AnalysisResult {
            ai_confidence: 82.0,
            conditions_analyzed: conditions.len() as u32,
            urgency_level: UrgencyLevel::Medium,
            recommendations: 1,
            conditions,
            risk_assessment: vec![RiskFactor {
                factor: "Age Factor".into(),
                value: 30.0,
            }],
            symptom_analysis: SymptomAnalysis {
                severity: "Moderate".into(),
                duration_pattern: "Acute".into(),
                progression: "Stable".into(),
            },
            care_plan: vec![CarePlanItem {
                title: "Rest".into(),
                description: "Get plenty of sleep".into(),
                kind: CarePlanKind::Recommendation,
            }],
            timeline: vec![TimelineItem {
                time: "24-48 Hours".into(),
                title: "Monitor".into(),
                description: "Track your temperature".into(),
            }],
        }
    }
}
