//! Choosing between raw-span and tagged-markup segmentation.
//!
//! Both input modes resolve to the same `Vec<Segment>`, so renderers never
//! branch on where the spans came from.

use tracing::debug;

use crate::entity::EntitySpan;
use crate::markup::{has_markup, segment_markup};
use crate::offset::CharOffsets;
use crate::recognition::RecognitionResponse;
use crate::segment::{Segment, segment_spans, span_matches_source};

/// The input to segmentation.
#[derive(Debug, Clone, Copy)]
pub enum SpanSource<'a> {
    /// Source text plus spans with absolute character offsets.
    RawSpans {
        text: &'a str,
        spans: &'a [EntitySpan],
    },
    /// Text with inline `<kind>surface</kind>` markers, plus the entity set
    /// used to enrich marked spans.
    TaggedMarkup {
        markup: &'a str,
        spans: &'a [EntitySpan],
    },
}

impl<'a> SpanSource<'a> {
    /// Pick the segmentation mode for a service response to `text`.
    ///
    /// Offsets are preferred whenever every entity is consistent with the
    /// source text. Otherwise, if the response carries usable markup, the
    /// markup is used. Failing both, the consistent subset of the offsets is
    /// used.
    pub fn for_response(text: &'a str, response: &'a RecognitionResponse) -> Self {
        let offsets = CharOffsets::new(text);
        let consistent = response
            .entities
            .iter()
            .all(|span| span_matches_source(text, &offsets, span));

        let raw = SpanSource::RawSpans {
            text,
            spans: &response.entities,
        };

        if consistent && !response.entities.is_empty() {
            return raw;
        }

        if response.tagged_text != text && has_markup(&response.tagged_text) {
            debug!(
                entities = response.entities.len(),
                consistent, "Segmenting from tagged markup"
            );
            return SpanSource::TaggedMarkup {
                markup: &response.tagged_text,
                spans: &response.entities,
            };
        }

        raw
    }

    /// Resolve to the canonical segment sequence.
    pub fn resolve(&self) -> Vec<Segment> {
        match self {
            SpanSource::RawSpans { text, spans } => segment_spans(text, spans.iter()),
            SpanSource::TaggedMarkup { markup, spans } => segment_markup(markup, spans),
        }
    }
}

/// Segment `text` using a service response, picking the mode automatically.
pub fn resolve(text: &str, response: &RecognitionResponse) -> Vec<Segment> {
    SpanSource::for_response(text, response).resolve()
}
