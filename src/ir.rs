use serde::{Deserialize, Serialize};

/// One distinct label and how many times it was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub text: String,
    pub occurrences: u32,
}

/// A label ready for layout. `weight` is always > 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedWord {
    pub text: String,
    pub weight: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl WeightedWord {
    pub fn new(text: impl Into<String>, weight: f32) -> Self {
        Self {
            text: text.into(),
            weight,
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub(crate) fn has_valid_weight(&self) -> bool {
        self.weight.is_finite() && self.weight > 0.0
    }
}
