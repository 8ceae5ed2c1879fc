//! Request types

use serde::{Deserialize, Serialize};

/// Question request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question to answer
    #[serde(default)]
    pub question: String,

    /// Optional country hint for the rule-based advisor
    #[serde(default)]
    pub country: Option<String>,
}

impl AskRequest {
    /// Create a new request
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            country: None,
        }
    }

    /// Attach a country hint
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Trimmed question text
    pub fn question(&self) -> &str {
        self.question.trim()
    }

    /// Trimmed country hint; blank hints count as absent
    pub fn country(&self) -> Option<&str> {
        self.country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
