//! Request and response payloads exchanged with the recognition service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::EntitySpan;

/// The longest text (in characters) the recognition service accepts.
pub const MAX_TEXT_CHARS: usize = 500;

/// Tuning knobs forwarded to the recognition service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecognitionOptions {
    pub fuzzy_matching: bool,
    pub confidence_threshold: f64,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            fuzzy_matching: false,
            confidence_threshold: 0.8,
        }
    }
}

impl RecognitionOptions {
    pub fn with_fuzzy_matching(mut self, enabled: bool) -> Self {
        self.fuzzy_matching = enabled;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

/// A single recognition request. Requests are never mutated after they are
/// issued; build a new one for every input revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionRequest {
    pub text: String,
    pub options: RecognitionOptions,
}

impl RecognitionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: RecognitionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RecognitionOptions) -> Self {
        self.options = options;
        self
    }

    /// Length of the request text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// True when the text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// The service's answer to a [RecognitionRequest].
///
/// `entities` is in whatever order the service produced them; consumers must
/// not assume it is sorted by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResponse {
    pub tagged_text: String,
    pub entities: Vec<EntitySpan>,
    #[serde(default)]
    pub processing_time_ms: f64,
    /// Alternatives the service proposes for low-confidence matches.
    #[serde(default)]
    pub suggestions: Vec<Value>,
    /// Set when the service reports a soft failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecognitionResponse {
    /// A response with no entities for the given text.
    pub fn empty(text: impl Into<String>) -> Self {
        Self {
            tagged_text: text.into(),
            entities: Vec::new(),
            processing_time_ms: 0.0,
            suggestions: Vec::new(),
            error: None,
        }
    }

    pub fn with_entities(mut self, entities: Vec<EntitySpan>) -> Self {
        self.entities = entities;
        self
    }

    pub fn with_tagged_text(mut self, tagged_text: impl Into<String>) -> Self {
        self.tagged_text = tagged_text.into();
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
