//! Tagged-markup segmentation.
//!
//! The recognition service also reports its classification inline, e.g.
//! `Show me <manufacturer>Cadbury</manufacturer> <metric>revenue</metric>`.
//! This module parses that form into the same [Segment] sequence produced by
//! raw-span segmentation.
//!
//! Parsing rules:
//! - A marker is `<name>` or `</name>` where `name` starts with an ASCII
//!   letter and continues with ASCII alphanumerics, `-` or `_`.
//! - An opening marker pairs with the first closing marker of the same name.
//!   Markers do not nest: if the enclosed text contains another opening
//!   marker, or is empty, the outer marker is treated as literal text.
//! - Anything that does not form a matched pair is literal text.
//!
//! Each matched pair is looked up in the supplied entity set by kind and
//! surface text (first exact match wins). Unmatched pairs get a synthesized
//! fallback span. Offsets of the resulting spans are character offsets into
//! the markup-free text, so that the segment sequence stays self-consistent.

use crate::entity::{EntityKind, EntitySpan};
use crate::segment::Segment;

/// A matched `<name>surface</name>` element at the head of some input.
struct Element<'a> {
    name: &'a str,
    surface: &'a str,
    /// Bytes consumed from the input, markers included.
    consumed: usize,
}

/// Parse an opening marker at the head of `input`, returning the tag name.
fn opening_marker(input: &str) -> Option<&str> {
    let rest = input.strip_prefix('<')?;
    let end = rest.find('>')?;
    let name = &rest[..end];

    let mut chars = name.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return None;
    }

    Some(name)
}

/// True when `text` contains something that parses as an opening marker.
fn contains_opening_marker(text: &str) -> bool {
    text.match_indices('<')
        .any(|(index, _)| opening_marker(&text[index..]).is_some())
}

fn matched_element(input: &str) -> Option<Element<'_>> {
    let name = opening_marker(input)?;
    let open_len = name.len() + 2;
    let body = &input[open_len..];

    let close = format!("</{name}>");
    let close_at = body.find(&close)?;
    let surface = &body[..close_at];

    if surface.is_empty() || contains_opening_marker(surface) {
        return None;
    }

    Some(Element {
        name,
        surface,
        consumed: open_len + close_at + close.len(),
    })
}

/// Find the entity in `entities` corresponding to a marked span.
fn lookup<'a>(entities: &'a [EntitySpan], kind: EntityKind, surface: &str) -> Option<&'a EntitySpan> {
    entities
        .iter()
        .find(|entity| entity.kind == kind && entity.text == surface)
}

fn flush_literal(literal: &mut String, segments: &mut Vec<Segment>, position: &mut usize) {
    if !literal.is_empty() {
        *position += literal.chars().count();
        segments.push(Segment::text(std::mem::take(literal)));
    }
}

/// Segment tagged markup, resolving marked spans against `entities`.
pub fn segment_markup(markup: &str, entities: &[EntitySpan]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    // Characters of markup-free text emitted so far.
    let mut position = 0;
    let mut rest = markup;

    while let Some(index) = rest.find('<') {
        let (before, tail) = rest.split_at(index);
        literal.push_str(before);

        match matched_element(tail) {
            Some(element) => {
                flush_literal(&mut literal, &mut segments, &mut position);

                let kind = EntityKind::from_name(element.name);
                let start = position;
                let end = start + element.surface.chars().count();

                let span = match lookup(entities, kind, element.surface) {
                    Some(found) => EntitySpan {
                        start,
                        end,
                        ..found.clone()
                    },
                    None => EntitySpan::fallback(kind, element.surface, start, end),
                };

                segments.push(Segment::entity(span));
                position = end;
                rest = &tail[element.consumed..];
            }
            None => {
                literal.push('<');
                rest = &tail[1..];
            }
        }
    }

    literal.push_str(rest);
    flush_literal(&mut literal, &mut segments, &mut position);

    segments
}

/// True when `markup` contains at least one matched marker pair.
pub fn has_markup(markup: &str) -> bool {
    markup
        .match_indices('<')
        .any(|(index, _)| matched_element(&markup[index..]).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::plain_text;
    use pretty_assertions::assert_eq;

    #[test]
    fn it_synthesizes_fallback_entities() {
        let segments = segment_markup(
            "<manufacturer>Apple</manufacturer> <product>iPhone</product>",
            &[],
        );

        assert_eq!(
            segments,
            vec![
                Segment::entity(EntitySpan::fallback(EntityKind::Manufacturer, "Apple", 0, 5)),
                Segment::text(" "),
                Segment::entity(EntitySpan::fallback(EntityKind::Product, "iPhone", 6, 12)),
            ]
        );

        for span in crate::segment::entities(&segments) {
            assert_eq!(span.confidence, 1.0);
            assert_eq!(span.id, None);
            assert_eq!(span.metadata.display_name, span.text);
        }
    }

    #[test]
    fn it_prefers_entities_from_the_response() {
        let known = EntitySpan::new(EntityKind::Manufacturer, "Cadbury", 99, 106)
            .with_id("MFR_001")
            .with_confidence(0.93);
        let other_kind = EntitySpan::new(EntityKind::Brand, "revenue", 0, 7).with_id("BRD_X");

        let segments = segment_markup(
            "Show me <manufacturer>Cadbury</manufacturer> <metric>revenue</metric>",
            &[other_kind, known],
        );

        let spans: Vec<_> = crate::segment::entities(&segments).collect();
        assert_eq!(spans.len(), 2);

        assert_eq!(spans[0].id.as_deref(), Some("MFR_001"));
        assert_eq!(spans[0].confidence, 0.93);
        assert_eq!((spans[0].start, spans[0].end), (8, 15));

        // Kind must match too, so the brand entity is not used for the metric.
        assert_eq!(spans[1].kind, EntityKind::Metric);
        assert_eq!(spans[1].id, None);
        assert_eq!((spans[1].start, spans[1].end), (16, 23));

        assert_eq!(plain_text(&segments), "Show me Cadbury revenue");
    }

    #[test]
    fn it_resolves_hyphenated_and_unknown_tags() {
        let segments = segment_markup("<time-period>Q1 2025</time-period> <flavour>mint</flavour>", &[]);
        let kinds: Vec<_> = crate::segment::entities(&segments).map(|span| span.kind).collect();

        assert_eq!(kinds, vec![EntityKind::TimePeriod, EntityKind::Unknown]);
    }

    #[test]
    fn it_treats_orphaned_markers_as_literal_text() {
        let segments = segment_markup("a <brand>Galaxy and </metric> x < y", &[]);
        assert_eq!(segments, vec![Segment::text("a <brand>Galaxy and </metric> x < y")]);
    }

    #[test]
    fn it_does_not_pair_mismatched_names() {
        let segments = segment_markup("<brand>Galaxy</product>", &[]);
        assert_eq!(segments, vec![Segment::text("<brand>Galaxy</product>")]);
    }

    #[test]
    fn it_recovers_after_an_unclosed_marker() {
        let segments = segment_markup("<product>Twirl <brand>Flake</brand> bar", &[]);

        assert_eq!(
            segments,
            vec![
                Segment::text("<product>Twirl "),
                Segment::entity(EntitySpan::fallback(EntityKind::Brand, "Flake", 15, 20)),
                Segment::text(" bar"),
            ]
        );
    }

    #[test]
    fn it_treats_empty_elements_as_literal() {
        let segments = segment_markup("<metric></metric>", &[]);
        assert_eq!(segments, vec![Segment::text("<metric></metric>")]);
    }

    #[test]
    fn it_counts_offsets_in_characters() {
        let segments = segment_markup("Café <brand>Aero</brand>", &[]);
        let span = crate::segment::entities(&segments).next().unwrap();

        assert_eq!((span.start, span.end), (5, 9));
    }

    #[test]
    fn it_detects_markup() {
        assert!(has_markup("x <metric>sales</metric>"));
        assert!(!has_markup("x < y > z"));
        assert!(!has_markup("plain"));
    }
}
