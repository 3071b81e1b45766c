use crate::models::PatientInput;

/// Tasks and output rules appended after the patient block.
pub const ANALYSIS_TASKS: &str = "\
Analysis tasks:
1. Provide a list of 3-4 possible conditions with their probability. The sum of probabilities should be close to 100.
2. Assess the urgency level for seeking medical care.
3. Generate a risk assessment based on the provided factors.
4. Create a personalized care plan with clear, actionable recommendations.
5. Suggest a follow-up timeline.
6. The overall AI confidence should reflect the quality and specificity of the input data.

IMPORTANT: Provide only the JSON object in your response. Do not include any explanatory text before or after the JSON.";

/// Build the analysis instruction for one patient.
///
/// Every field is embedded verbatim; a blank history becomes "None provided".
pub fn build_analysis_prompt(input: &PatientInput) -> String {
    format!(
        "You are an advanced medical AI assistant. Analyze the following patient symptoms \
         and provide a professional-grade analysis. Your response must be in JSON format \
         and conform to the provided schema.

Patient Information:
- Age: {age}
- Gender: {gender}
- Symptom Severity: {severity}
- Symptom Duration: {duration}
- Symptoms Description: {description}
- Relevant Medical History: {history}

{ANALYSIS_TASKS}",
        age = input.age,
        gender = input.gender,
        severity = input.severity,
        duration = input.duration,
        description = input.description,
        history = input.history_or_placeholder(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> PatientInput {
        PatientInput {
            age: "35".into(),
            gender: "Male".into(),
            severity: "Moderate".into(),
            description: "headache and fever for 2 days".into(),
            duration: "1-3 days".into(),
            history: String::new(),
        }
    }

    #[test]
    fn prompt_embeds_every_field() {
        let prompt = build_analysis_prompt(&sample_input());
        assert!(prompt.contains("- Age: 35"));
        assert!(prompt.contains("- Gender: Male"));
        assert!(prompt.contains("- Symptom Severity: Moderate"));
        assert!(prompt.contains("- Symptom Duration: 1-3 days"));
        assert!(prompt.contains("- Symptoms Description: headache and fever for 2 days"));
    }

    #[test]
    fn blank_history_becomes_placeholder() {
        let prompt = build_analysis_prompt(&sample_input());
        assert!(prompt.contains("- Relevant Medical History: None provided"));
    }

    #[test]
    fn history_is_embedded_verbatim() {
        let mut input = sample_input();
        input.history = "Type 2 diabetes, metformin 500mg".into();
        let prompt = build_analysis_prompt(&input);
        assert!(prompt.contains("- Relevant Medical History: Type 2 diabetes, metformin 500mg"));
        assert!(!prompt.contains("None provided"));
    }

    #[test]
    fn prompt_demands_json_only() {
        let prompt = build_analysis_prompt(&sample_input());
        assert!(prompt.contains("Provide only the JSON object"));
        assert!(prompt.contains("3-4 possible conditions"));
    }
}
