//! Property tests for the segmentation guarantees: segments partition the
//! source text exactly, entities come out ordered and disjoint, and disjoint
//! span sets are emitted in full.

use highlight_spans::{
    EntityKind, EntitySpan, InteractionState, RecognitionResponse, Segment, entities, plain_text,
    resolve, segment_markup, segment_spans,
};
use proptest::prelude::*;

fn span_over(text: &str, start: usize, end: usize) -> EntitySpan {
    let surface: String = text.chars().skip(start).take(end - start).collect();
    EntitySpan::new(EntityKind::Product, surface, start, end)
}

/// Arbitrary text with arbitrary (possibly overlapping) spans over it.
fn text_with_spans() -> impl Strategy<Value = (String, Vec<EntitySpan>)> {
    "[a-zé€ ]{0,40}"
        .prop_flat_map(|text| {
            let len = text.chars().count();
            (Just(text), prop::collection::vec((0..=len, 0..=len), 0..8))
        })
        .prop_map(|(text, bounds)| {
            let spans = bounds
                .into_iter()
                .filter(|(start, end)| start < end)
                .map(|(start, end)| span_over(&text, start, end))
                .collect();
            (text, spans)
        })
}

/// Arbitrary text with pairwise disjoint spans over it, in shuffled order.
fn text_with_disjoint_spans() -> impl Strategy<Value = (String, Vec<EntitySpan>)> {
    "[a-zé€ ]{0,40}"
        .prop_flat_map(|text| {
            let len = text.chars().count();
            (Just(text), prop::collection::vec(0..=len, 0..10))
        })
        .prop_map(|(text, mut cuts)| {
            cuts.sort_unstable();
            cuts.dedup();
            let mut spans: Vec<EntitySpan> = cuts
                .chunks_exact(2)
                .map(|pair| span_over(&text, pair[0], pair[1]))
                .collect();
            spans.reverse();
            (text, spans)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn segments_partition_the_source((text, spans) in text_with_spans()) {
        let segments = segment_spans(&text, spans.iter());
        prop_assert_eq!(plain_text(&segments), text);
    }

    #[test]
    fn segments_are_never_empty((text, spans) in text_with_spans()) {
        let segments = segment_spans(&text, spans.iter());
        prop_assert!(segments.iter().all(|segment| !segment.as_str().is_empty()));
    }

    #[test]
    fn entities_are_ordered_and_disjoint((text, spans) in text_with_spans()) {
        let segments = segment_spans(&text, spans.iter());
        let emitted: Vec<&EntitySpan> = entities(&segments).collect();

        for pair in emitted.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn disjoint_spans_are_all_emitted((text, spans) in text_with_disjoint_spans()) {
        let segments = segment_spans(&text, spans.iter());
        prop_assert_eq!(entities(&segments).count(), spans.len());
        prop_assert_eq!(plain_text(&segments), text);
    }

    #[test]
    fn removal_preserves_the_text((text, spans) in text_with_spans()) {
        let segments = segment_spans(&text, spans.iter());
        let mut state = InteractionState::new();
        for span in entities(&segments).step_by(2) {
            state.remove(span);
        }

        prop_assert_eq!(plain_text(&state.visible(&segments)), text);
    }

    #[test]
    fn markup_never_panics(markup in "[a-z<>/ ]{0,60}") {
        let segments = segment_markup(&markup, &[]);
        prop_assert!(plain_text(&segments).len() <= markup.len());
    }
}

#[test]
fn it_drops_a_contained_overlap_in_favour_of_the_earlier_span() {
    let text = "Cadbury Dairy Milk";
    let manufacturer = span_over(text, 0, 7);
    let product = span_over(text, 8, 18);
    let brand = span_over(text, 8, 13);

    let segments = segment_spans(text, [&brand, &product, &manufacturer]);

    assert_eq!(
        segments,
        vec![
            Segment::entity(manufacturer),
            Segment::text(" "),
            Segment::entity(product),
        ]
    );
}

#[test]
fn it_segments_a_full_service_response() {
    let body = r#"{
        "tagged_text": "Show me <manufacturer>Cadbury</manufacturer> <metric>revenue</metric> for <time-period>Q1 2025</time-period>",
        "entities": [
            {"text": "Q1 2025", "type": "time_period", "start": 28, "end": 35, "confidence": 1.0,
             "id": null, "metadata": {"display_name": "Q1 2025", "start_date": "2025-01-01", "end_date": "2025-03-31"}},
            {"text": "Cadbury", "type": "manufacturer", "start": 8, "end": 15, "confidence": 1.0,
             "id": "MFR_001", "metadata": {"display_name": "Cadbury", "full_name": "Cadbury UK Limited"}},
            {"text": "revenue", "type": "metric", "start": 16, "end": 23, "confidence": 1.0,
             "id": "MTR_REV", "metadata": {"display_name": "revenue", "unit": "GBP", "aggregation": "sum"}}
        ],
        "processing_time_ms": 45.2,
        "suggestions": []
    }"#;
    let response: RecognitionResponse = serde_json::from_str(body).unwrap();
    let text = "Show me Cadbury revenue for Q1 2025";

    let segments = resolve(text, &response);
    let kinds: Vec<EntityKind> = entities(&segments).map(|span| span.kind).collect();

    assert_eq!(
        kinds,
        vec![EntityKind::Manufacturer, EntityKind::Metric, EntityKind::TimePeriod]
    );
    assert_eq!(segments.len(), 6);
    assert_eq!(plain_text(&segments), text);
}
