//! Recognized entity spans.
//!
//! An [EntitySpan] is a `[start, end)` interval over the input text that the
//! recognition service classified as a domain entity. Offsets are counted in
//! characters (Unicode scalar values), matching what the service emits; see
//! [crate::offset] for the conversion to byte offsets.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The closed set of entity kinds the recognition service knows about.
///
/// Names that do not correspond to a known kind (for example an unexpected
/// tag in tagged markup) resolve to [EntityKind::Unknown] rather than
/// failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Manufacturer,
    Brand,
    Product,
    Category,
    Metric,
    #[serde(alias = "time-period")]
    TimePeriod,
    #[serde(other)]
    Unknown,
}

impl EntityKind {
    /// All known kinds, in the service's precedence order.
    pub const KNOWN: [EntityKind; 6] = [
        EntityKind::Manufacturer,
        EntityKind::Brand,
        EntityKind::Product,
        EntityKind::Category,
        EntityKind::Metric,
        EntityKind::TimePeriod,
    ];

    /// Resolve a wire name (`time_period`) or a markup tag name
    /// (`time-period`) to a kind. Matching ignores ASCII case.
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "manufacturer" => EntityKind::Manufacturer,
            "brand" => EntityKind::Brand,
            "product" => EntityKind::Product,
            "category" => EntityKind::Category,
            "metric" => EntityKind::Metric,
            "time_period" => EntityKind::TimePeriod,
            _ => EntityKind::Unknown,
        }
    }

    /// The name used in JSON payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Manufacturer => "manufacturer",
            EntityKind::Brand => "brand",
            EntityKind::Product => "product",
            EntityKind::Category => "category",
            EntityKind::Metric => "metric",
            EntityKind::TimePeriod => "time_period",
            EntityKind::Unknown => "unknown",
        }
    }

    /// The name used for inline markup tags.
    pub fn tag_name(&self) -> &'static str {
        match self {
            EntityKind::TimePeriod => "time-period",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EntityKind {
    fn from(name: &str) -> Self {
        EntityKind::from_name(name)
    }
}

/// Descriptive data attached to a recognized entity.
///
/// Fields the service sends that are not modeled explicitly are preserved in
/// `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityMetadata {
    /// Metadata carrying only a display name.
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Default::default()
        }
    }
}

/// A recognized entity: a classified `[start, end)` character interval over
/// the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// The surface text covered by the span.
    pub text: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub start: usize,
    pub end: usize,
    /// Match confidence in `[0, 1]`.
    pub confidence: f64,
    /// Stable identifier from the entity dictionary, when the service has one.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: EntityMetadata,
}

impl EntitySpan {
    /// Create a span with full confidence and a display name equal to its
    /// surface text.
    pub fn new(kind: EntityKind, text: impl Into<String>, start: usize, end: usize) -> Self {
        let text = text.into();
        Self {
            metadata: EntityMetadata::named(text.clone()),
            text,
            kind,
            start,
            end,
            confidence: 1.0,
            id: None,
        }
    }

    /// Synthesize a span for marked-up text that has no counterpart in the
    /// entity set returned by the service.
    pub fn fallback(kind: EntityKind, surface: &str, start: usize, end: usize) -> Self {
        Self::new(kind, surface, start, end)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_metadata(mut self, metadata: EntityMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Length of the span in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the span covers no characters (and is therefore invalid).
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// The name a renderer should show for this entity.
    pub fn display_name(&self) -> &str {
        if self.metadata.display_name.is_empty() {
            &self.text
        } else {
            &self.metadata.display_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn it_parses_wire_and_tag_names() {
        assert_eq!(EntityKind::from_name("time_period"), EntityKind::TimePeriod);
        assert_eq!(EntityKind::from_name("time-period"), EntityKind::TimePeriod);
        assert_eq!(EntityKind::from_name("Manufacturer"), EntityKind::Manufacturer);
        assert_eq!(EntityKind::from_name("flavour"), EntityKind::Unknown);
    }

    #[test]
    fn it_round_trips_tag_names() {
        for kind in EntityKind::KNOWN {
            assert_eq!(EntityKind::from_name(kind.tag_name()), kind);
        }
    }

    #[test]
    fn it_deserializes_service_entities() {
        let span: EntitySpan = serde_json::from_str(
            r#"{
                "text": "Cadbury",
                "type": "manufacturer",
                "start": 8,
                "end": 15,
                "confidence": 1.0,
                "id": "MFR_001",
                "metadata": {
                    "display_name": "Cadbury",
                    "full_name": "Cadbury UK Limited",
                    "parent": "Mondelez International",
                    "region": "UK"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(span.kind, EntityKind::Manufacturer);
        assert_eq!(span.id.as_deref(), Some("MFR_001"));
        assert_eq!(span.metadata.full_name.as_deref(), Some("Cadbury UK Limited"));
        assert_eq!(span.metadata.extra.get("region"), Some(&Value::from("UK")));
        assert_eq!(span.len(), 7);
    }

    #[test]
    fn it_maps_unexpected_kinds_to_unknown() {
        let span: EntitySpan = serde_json::from_str(
            r#"{"text": "x", "type": "flavour", "start": 0, "end": 1, "confidence": 0.5,
                "metadata": {"display_name": "x"}}"#,
        )
        .unwrap();

        assert_eq!(span.kind, EntityKind::Unknown);
        assert_eq!(span.id, None);
    }

    #[test]
    fn it_falls_back_to_surface_text_for_display() {
        let mut span = EntitySpan::new(EntityKind::Metric, "revenue", 0, 7);
        assert_eq!(span.display_name(), "revenue");

        span.metadata.display_name.clear();
        assert_eq!(span.display_name(), "revenue");
    }
}
