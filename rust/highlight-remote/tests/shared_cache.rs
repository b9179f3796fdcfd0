//! Several inputs sharing one response cache.

use std::time::Duration;

use highlight_remote::backend::MemoryBackend;
use highlight_remote::{CacheConfig, HighlightConfig, Highlighter, RecognitionClient, ResponseCache};
use highlight_spans::{EntityKind, EntitySpan, RecognitionOptions, RecognitionResponse, Segment};
use pretty_assertions::assert_eq;
use testresult::TestResult;

fn cadbury() -> RecognitionResponse {
    RecognitionResponse::empty("Cadbury revenue").with_entities(vec![
        EntitySpan::new(EntityKind::Brand, "Cadbury", 0, 7),
        EntitySpan::new(EntityKind::Metric, "revenue", 8, 15),
    ])
}

#[test_log::test(tokio::test(start_paused = true))]
async fn it_serves_one_input_from_another_inputs_result() -> TestResult {
    let backend = MemoryBackend::new();
    backend.respond(cadbury());

    let config = HighlightConfig::default();
    let cache = ResponseCache::new(CacheConfig::default());
    let client = |backend: &MemoryBackend| {
        RecognitionClient::new(backend.clone(), cache.clone()).with_config(&config)
    };

    let mut search = Highlighter::with_client(config.clone(), client(&backend));
    let mut chat = Highlighter::with_client(config.clone(), client(&backend));

    search.input("Cadbury revenue");
    search.next_update().await;
    assert!(!search.next_update().await.from_cache);

    chat.input("Cadbury revenue");
    chat.next_update().await;
    let view = chat.next_update().await;

    assert!(view.from_cache);
    assert_eq!(view.segments, search.view().segments);
    assert_eq!(backend.attempts(), 1);
    assert_eq!(cache.stats().hits, 1);
    Ok(())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn it_keys_cached_results_by_options() -> TestResult {
    let backend = MemoryBackend::new();
    backend.respond(cadbury());
    backend.respond(RecognitionResponse::empty("Cadbury revenue"));

    let cache = ResponseCache::new(CacheConfig::default());
    let lenient = RecognitionClient::new(backend.clone(), cache.clone());
    let strict = RecognitionClient::new(backend.clone(), cache.clone())
        .with_options(RecognitionOptions::default().with_confidence_threshold(0.99));

    let first = lenient.recognize(lenient.request("Cadbury revenue")).await?;
    let second = strict.recognize(strict.request("Cadbury revenue")).await?;

    assert_eq!(first.entities.len(), 2);
    assert!(second.entities.is_empty());
    assert_eq!(backend.attempts(), 2);
    assert_eq!(cache.len(), 2);
    Ok(())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn it_recognizes_again_once_entries_expire() -> TestResult {
    let backend = MemoryBackend::new();
    backend.respond(cadbury());
    backend.respond(cadbury());

    let mut highlighter = Highlighter::new(HighlightConfig::default(), backend.clone());

    highlighter.input("Cadbury revenue");
    highlighter.next_update().await;
    highlighter.next_update().await;

    tokio::time::advance(Duration::from_secs(16 * 60)).await;

    highlighter.input("Cadbury revenue");
    highlighter.next_update().await;
    let view = highlighter.next_update().await;

    assert!(!view.from_cache);
    assert_eq!(view.segments[1], Segment::text(" "));
    assert_eq!(backend.attempts(), 2);
    Ok(())
}
