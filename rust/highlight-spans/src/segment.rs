//! Raw-span segmentation.
//!
//! Turns a source text plus an unordered set of entity spans into an ordered,
//! non-overlapping sequence of [Segment]s that partitions the text exactly:
//! concatenating the segments reproduces the source with no gaps, overlaps
//! or duplicated characters.
//!
//! Algorithm:
//! 1. Discard spans that are out of bounds, empty, or whose text disagrees
//!    with the source at their offsets.
//! 2. Sort by `start` ascending, then by `end` descending, so the longest
//!    span wins among spans sharing a start. The sort is stable, so for
//!    identical intervals the first one supplied wins.
//! 3. Walk left to right, emitting a text segment for every non-empty gap and
//!    an entity segment per span. A span starting before the cursor overlaps
//!    something already emitted and is dropped.
//! 4. Emit the remainder after the last span as a trailing text segment.

use serde::Serialize;
use tracing::debug;

use crate::entity::EntitySpan;
use crate::offset::CharOffsets;

/// One unit of the rendering sequence.
///
/// Segments are immutable once produced. When the input changes the whole
/// sequence is replaced rather than patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Plain text between entities.
    Text { content: String },
    /// A recognized entity.
    Entity { span: EntitySpan },
}

impl Segment {
    pub fn text(content: impl Into<String>) -> Self {
        Segment::Text {
            content: content.into(),
        }
    }

    pub fn entity(span: EntitySpan) -> Self {
        Segment::Entity { span }
    }

    /// The characters this segment covers in the rendered text.
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Text { content } => content,
            Segment::Entity { span } => &span.text,
        }
    }

    pub fn as_entity(&self) -> Option<&EntitySpan> {
        match self {
            Segment::Entity { span } => Some(span),
            Segment::Text { .. } => None,
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, Segment::Entity { .. })
    }
}

/// Concatenate the text of a segment sequence.
pub fn plain_text(segments: &[Segment]) -> String {
    segments.iter().map(Segment::as_str).collect()
}

/// Iterate over the entity spans in a segment sequence, in rendering order.
pub fn entities(segments: &[Segment]) -> impl Iterator<Item = &EntitySpan> {
    segments.iter().filter_map(Segment::as_entity)
}

/// True when `span` lies within `source` and its text matches the source at
/// its offsets.
pub fn span_matches_source(source: &str, offsets: &CharOffsets, span: &EntitySpan) -> bool {
    !span.is_empty() && offsets.slice(source, span.start, span.end) == Some(span.text.as_str())
}

/// Segment `source` using spans with absolute character offsets.
pub fn segment_spans<'a, I>(source: &str, spans: I) -> Vec<Segment>
where
    I: IntoIterator<Item = &'a EntitySpan>,
{
    let offsets = CharOffsets::new(source);

    let mut ordered: Vec<&EntitySpan> = spans
        .into_iter()
        .filter(|span| {
            let valid = span_matches_source(source, &offsets, span);
            if !valid {
                debug!(
                    start = span.start,
                    end = span.end,
                    text = %span.text,
                    "Discarding span inconsistent with source text"
                );
            }
            valid
        })
        .collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut segments = Vec::with_capacity(ordered.len() * 2 + 1);
    let mut cursor = 0;

    for span in ordered {
        if span.start < cursor {
            debug!(
                start = span.start,
                end = span.end,
                cursor,
                kind = %span.kind,
                "Dropping span overlapping an earlier entity"
            );
            continue;
        }

        if span.start > cursor {
            if let Some(gap) = offsets.slice(source, cursor, span.start) {
                segments.push(Segment::text(gap));
            }
        }

        segments.push(Segment::entity(span.clone()));
        cursor = cursor.max(span.end);
    }

    if cursor < offsets.char_len() {
        if let Some(rest) = offsets.slice(source, cursor, offsets.char_len()) {
            segments.push(Segment::text(rest));
        }
    }

    segments
}
