//! User interaction state over rendered entities: the current selection and
//! the set of entities the user dismissed.
//!
//! Entities are identified by [SpanKey]. When the service supplies a stable
//! `id` that id is the key; otherwise the `(start, end)` interval is. Position
//! keys are an approximation: after the text is edited, a new entity can land
//! on the coordinates of a previously dismissed one and inherit its removal.
//! Id keys have the opposite trade-off: an entity mentioned twice ("Cadbury vs
//! Cadbury") carries the same id at both positions, so dismissing one
//! occurrence hides every occurrence of it.

use std::collections::HashSet;

use crate::entity::EntitySpan;
use crate::segment::Segment;

/// Identity of an entity span for interaction purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpanKey {
    /// Stable identifier supplied by the recognition service.
    Id(String),
    /// Character interval, used when no identifier is available.
    Position { start: usize, end: usize },
}

impl SpanKey {
    pub fn of(span: &EntitySpan) -> Self {
        match &span.id {
            Some(id) => SpanKey::Id(id.clone()),
            None => SpanKey::Position {
                start: span.start,
                end: span.end,
            },
        }
    }
}

impl From<&EntitySpan> for SpanKey {
    fn from(span: &EntitySpan) -> Self {
        SpanKey::of(span)
    }
}

/// Selection and removal state for the entities of the current input.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    selected: Option<EntitySpan>,
    removed: HashSet<SpanKey>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `span` the current selection, replacing any previous one.
    pub fn select(&mut self, span: EntitySpan) {
        self.selected = Some(span);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&EntitySpan> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, span: &EntitySpan) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|selected| SpanKey::of(selected) == SpanKey::of(span))
    }

    /// Dismiss `span`. The span stays in the recognized set; only rendering
    /// consults the removed set.
    pub fn remove(&mut self, span: &EntitySpan) {
        self.removed.insert(SpanKey::of(span));
    }

    pub fn is_removed(&self, span: &EntitySpan) -> bool {
        self.removed.contains(&SpanKey::of(span))
    }

    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// Forget every dismissal. Called when the input is cleared or a message
    /// is sent.
    pub fn reset(&mut self) {
        self.removed.clear();
    }

    /// The segment sequence as it should be rendered: dismissed entities are
    /// shown as plain text, and adjacent text runs are merged.
    pub fn visible(&self, segments: &[Segment]) -> Vec<Segment> {
        let mut visible: Vec<Segment> = Vec::with_capacity(segments.len());

        for segment in segments {
            let rendered = match segment {
                Segment::Entity { span } if self.is_removed(span) => Segment::text(span.text.clone()),
                other => other.clone(),
            };

            if let Segment::Text { content: next } = &rendered {
                if let Some(Segment::Text { content }) = visible.last_mut() {
                    content.push_str(next);
                    continue;
                }
            }
            visible.push(rendered);
        }

        visible
    }
}
