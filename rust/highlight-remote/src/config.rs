use std::time::Duration;

use highlight_spans::{MAX_TEXT_CHARS, RecognitionOptions};

use crate::cache::CacheConfig;
use crate::retry::RetryPolicy;

/// Configuration for a highlighting pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightConfig {
    /// When false no request is ever issued and every result is empty
    /// (default: true)
    pub enabled: bool,

    /// Quiet period after the last keystroke before recognition runs
    /// (default: 500ms)
    pub debounce: Duration,

    /// Longest text, in characters, that is sent for recognition
    /// (default: 500)
    pub max_text_chars: usize,

    /// Options forwarded with every request
    pub options: RecognitionOptions,

    pub retry: RetryPolicy,

    pub cache: CacheConfig,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce: Duration::from_millis(500),
            max_text_chars: MAX_TEXT_CHARS,
            options: RecognitionOptions::default(),
            retry: RetryPolicy::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl HighlightConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_max_text_chars(mut self, max_text_chars: usize) -> Self {
        self.max_text_chars = max_text_chars;
        self
    }

    pub fn with_options(mut self, options: RecognitionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_has_service_defaults() {
        let config = HighlightConfig::default();

        assert!(config.enabled);
        assert_eq!(config.debounce, Duration::from_millis(500));
        assert_eq!(config.max_text_chars, 500);
        assert!(!config.options.fuzzy_matching);
        assert_eq!(config.options.confidence_threshold, 0.8);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.cache.ttl, Duration::from_secs(900));
        assert_eq!(config.cache.capacity, 100);
        assert_eq!(config.cache.evict_count, 50);
    }
}
