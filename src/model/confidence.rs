use serde::{Deserialize, Serialize};

/// Trust classification of a link.
///
/// `High` and `Medium` are assigned automatically by the matching rules;
/// `Confirmed` is only ever set by an explicit review action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Confirmed,
    Unknown,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
            Confidence::Confirmed => "confirmed",
            Confidence::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            "low" => Confidence::Low,
            "confirmed" => Confidence::Confirmed,
            _ => Confidence::Unknown,
        }
    }
}

/// Which matching rule (or manual action) produced a link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSource {
    ExactName,
    Hint,
    Fuzzy,
    Manual,
}

impl LinkSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkSource::ExactName => "exact_name",
            LinkSource::Hint => "hint",
            LinkSource::Fuzzy => "fuzzy",
            LinkSource::Manual => "manual",
        }
    }
}
