//! Self-reported patient input and the consent gate in front of it.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════
// Constants: options offered by the intake form
// ═══════════════════════════════════════════

pub const GENDER_OPTIONS: &[&str] = &["Male", "Female", "Other"];

pub const SEVERITY_OPTIONS: &[&str] = &["Mild", "Moderate", "Severe", "Very Severe"];

pub const DURATION_OPTIONS: &[&str] = &[
    "Less than a day",
    "1-3 days",
    "3-7 days",
    "1-2 weeks",
    "More than 2 weeks",
];

/// Substituted into the prompt when no medical history was given.
pub const NO_HISTORY_PLACEHOLDER: &str = "None provided";

// ═══════════════════════════════════════════
// PatientInput
// ═══════════════════════════════════════════

/// The six-field symptom record submitted from the intake form.
///
/// Every field except `history` is required. Values are kept verbatim;
/// the options above are what the form offers, not a closed set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInput {
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub history: String,
}

impl PatientInput {
    /// Names of the required fields that are still blank, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("age", &self.age),
            ("gender", &self.gender),
            ("severity", &self.severity),
            ("description", &self.description),
            ("duration", &self.duration),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Whether the form may be submitted. `history` never gates.
    pub fn is_submittable(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// History as it goes into the prompt.
    pub fn history_or_placeholder(&self) -> &str {
        if self.history.trim().is_empty() {
            NO_HISTORY_PLACEHOLDER
        } else {
            &self.history
        }
    }
}

// ═══════════════════════════════════════════
// Consent
// ═══════════════════════════════════════════

/// The three acknowledgements required before the intake form opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentAcknowledgement {
    pub medical_disclaimer: bool,
    pub data_privacy: bool,
    pub age_verification: bool,
}

impl ConsentAcknowledgement {
    /// All three boxes ticked.
    pub fn all() -> Self {
        Self {
            medical_disclaimer: true,
            data_privacy: true,
            age_verification: true,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.medical_disclaimer && self.data_privacy && self.age_verification
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_input() -> PatientInput {
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
    fn complete_input_is_submittable() {
        let input = complete_input();
        assert!(input.missing_fields().is_empty());
        assert!(input.is_submittable());
    }

    #[test]
    fn each_required_field_gates_submission() {
        let clear: [fn(&mut PatientInput); 5] = [
            |i| i.age.clear(),
            |i| i.gender.clear(),
            |i| i.severity.clear(),
            |i| i.description.clear(),
            |i| i.duration.clear(),
        ];
        let names = ["age", "gender", "severity", "description", "duration"];

        for (clear_field, name) in clear.iter().zip(names) {
            let mut input = complete_input();
            clear_field(&mut input);
            assert!(!input.is_submittable(), "{name} should gate submission");
            assert_eq!(input.missing_fields(), vec![name]);
        }
    }

    #[test]
    fn empty_history_does_not_gate() {
        let mut input = complete_input();
        input.history = "   ".into();
        assert!(input.is_submittable());
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let mut input = complete_input();
        input.description = " \n\t".into();
        assert_eq!(input.missing_fields(), vec!["description"]);
    }

    #[test]
    fn missing_fields_keep_form_order() {
        let input = PatientInput::default();
        assert_eq!(
            input.missing_fields(),
            vec!["age", "gender", "severity", "description", "duration"]
        );
    }

    #[test]
    fn history_placeholder_when_blank() {
        let mut input = complete_input();
        assert_eq!(input.history_or_placeholder(), "None provided");
        input.history = "asthma".into();
        assert_eq!(input.history_or_placeholder(), "asthma");
    }

    #[test]
    fn consent_requires_all_three() {
        assert!(ConsentAcknowledgement::all().is_complete());
        assert!(!ConsentAcknowledgement::default().is_complete());
        let partial = ConsentAcknowledgement {
            medical_disclaimer: true,
            data_privacy: true,
            age_verification: false,
        };
        assert!(!partial.is_complete());
    }

    #[test]
    fn form_options_match_intake_form() {
        assert_eq!(GENDER_OPTIONS.len(), 3);
        assert!(SEVERITY_OPTIONS.contains(&"Very Severe"));
        assert!(DURATION_OPTIONS.contains(&"1-3 days"));
    }
}
