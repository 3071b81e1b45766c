use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The wire string doubles as the serde name of each variant.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(UrgencyLevel {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

str_enum!(CarePlanKind {
    Recommendation => "recommendation",
    Caution => "caution",
});

// Screens of the session flow.
str_enum!(Screen {
    Consent => "consent",
    Form => "form",
    Loading => "loading",
    Results => "results",
});

// Tabs of the results view, in display order.
str_enum!(ResultsTab {
    Conditions => "conditions",
    Analysis => "analysis",
    CarePlan => "care-plan",
    Timeline => "timeline",
});

impl ResultsTab {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Conditions => "Conditions",
            Self::Analysis => "Analysis",
            Self::CarePlan => "Care Plan",
            Self::Timeline => "Timeline",
        }
    }
}

impl Default for ResultsTab {
    fn default() -> Self {
        Self::Conditions
    }
}
