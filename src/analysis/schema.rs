//! Output schema handed to the provider alongside the prompt.
//!
//! Uses the OpenAPI subset understood by Gemini's `responseSchema`
//! (upper-case type names, `enum` on strings, `required` lists).

use serde_json::{json, Value};

use crate::models::{CarePlanKind, UrgencyLevel};

/// Top-level keys, all required.
pub const REQUIRED_KEYS: &[&str] = &[
    "ai_confidence",
    "conditions_analyzed",
    "urgency_level",
    "recommendations",
    "conditions",
    "risk_assessment",
    "symptom_analysis",
    "care_plan",
    "timeline",
];

fn wire_names<T>(variants: &[T], as_str: fn(&T) -> &'static str) -> Vec<&'static str> {
    variants.iter().map(as_str).collect()
}

/// Build the schema for [`crate::models::AnalysisResult`].
pub fn analysis_response_schema() -> Value {
    let urgency = wire_names(UrgencyLevel::ALL, UrgencyLevel::as_str);
    let care_kinds = wire_names(CarePlanKind::ALL, CarePlanKind::as_str);

    json!({
        "type": "OBJECT",
        "properties": {
            "ai_confidence": {
                "type": "NUMBER",
                "description": "AI's confidence in the analysis from 0 to 100."
            },
            "conditions_analyzed": {
                "type": "INTEGER",
                "description": "Total number of potential conditions analyzed."
            },
            "urgency_level": {
                "type": "STRING",
                "enum": urgency,
                "description": "Urgency level for seeking medical attention."
            },
            "recommendations": {
                "type": "INTEGER",
                "description": "Number of recommendations in the care plan."
            },
            "conditions": {
                "type": "ARRAY",
                "description": "A list of potential medical conditions, sorted by probability.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Name of the condition." },
                        "probability": {
                            "type": "NUMBER",
                            "description": "Probability of the condition from 0 to 100."
                        },
                        "description": {
                            "type": "STRING",
                            "description": "A brief description of the condition."
                        }
                    },
                    "required": ["name", "probability", "description"]
                }
            },
            "risk_assessment": {
                "type": "ARRAY",
                "description": "Assessment of risk factors based on user input.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "factor": {
                            "type": "STRING",
                            "description": "The risk factor (e.g., Age Factor, Symptom Severity)."
                        },
                        "value": {
                            "type": "NUMBER",
                            "description": "A numerical score from 0-100 for the risk factor."
                        }
                    },
                    "required": ["factor", "value"]
                }
            },
            "symptom_analysis": {
                "type": "OBJECT",
                "properties": {
                    "severity": {
                        "type": "STRING",
                        "description": "Categorized severity (e.g., Moderate)."
                    },
                    "duration_pattern": {
                        "type": "STRING",
                        "description": "Pattern of symptom duration (e.g., Acute)."
                    },
                    "progression": {
                        "type": "STRING",
                        "description": "Symptom progression (e.g., Stable)."
                    }
                },
                "required": ["severity", "duration_pattern", "progression"]
            },
            "care_plan": {
                "type": "ARRAY",
                "description": "A personalized care plan with actionable steps.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING", "description": "Title of the care plan item." },
                        "description": {
                            "type": "STRING",
                            "description": "Detailed description of the recommendation."
                        },
                        "type": {
                            "type": "STRING",
                            "enum": care_kinds,
                            "description": "Type of care plan item."
                        }
                    },
                    "required": ["title", "description", "type"]
                }
            },
            "timeline": {
                "type": "ARRAY",
                "description": "A suggested follow-up timeline.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "time": {
                            "type": "STRING",
                            "description": "Timeframe for the timeline event (e.g., 24-48 Hours)."
                        },
                        "title": { "type": "STRING", "description": "Title of the timeline event." },
                        "description": {
                            "type": "STRING",
                            "description": "Description of what to do in this timeframe."
                        }
                    },
                    "required": ["time", "title", "description"]
                }
            }
        },
        "required": REQUIRED_KEYS
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_top_level_keys_are_required_and_declared() {
        let schema = analysis_response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, REQUIRED_KEYS);
        for key in REQUIRED_KEYS {
            assert!(schema["properties"].get(*key).is_some(), "{key} missing");
        }
    }

    #[test]
    fn enumerations_are_declared() {
        let schema = analysis_response_schema();
        assert_eq!(
            schema["properties"]["urgency_level"]["enum"],
            json!(["Low", "Medium", "High", "Critical"])
        );
        assert_eq!(
            schema["properties"]["care_plan"]["items"]["properties"]["type"]["enum"],
            json!(["recommendation", "caution"])
        );
    }

    #[test]
    fn numeric_types_match_model() {
        let props = &analysis_response_schema()["properties"];
        assert_eq!(props["ai_confidence"]["type"], "NUMBER");
        assert_eq!(props["conditions_analyzed"]["type"], "INTEGER");
        assert_eq!(props["recommendations"]["type"], "INTEGER");
        assert_eq!(
            props["risk_assessment"]["items"]["required"],
            json!(["factor", "value"])
        );
    }
}
