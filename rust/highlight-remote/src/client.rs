//! The recognition client: validation, caching, retries and supersession.

use std::sync::Arc;

use highlight_spans::{RecognitionOptions, RecognitionRequest, RecognitionResponse};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::backend::RecognitionBackend;
use crate::cache::ResponseCache;
use crate::config::HighlightConfig;
use crate::error::RecognitionError;
use crate::fingerprint::Fingerprint;
use crate::retry::RetryPolicy;

/// A completed recognition together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub request: RecognitionRequest,
    pub response: RecognitionResponse,
    pub from_cache: bool,
}

#[derive(Default)]
struct InFlight {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Issues recognition requests with at most one outstanding at a time.
///
/// Every call to [RecognitionClient::recognize] first cancels whatever the
/// client issued before it. A superseded call resolves to
/// [RecognitionError::Cancelled] even if its backend attempt succeeded, and
/// its response is never written to the cache.
///
/// Clones share the backend, the cache and the in-flight slot, so they count
/// as the same client. Build a second client around the same
/// [ResponseCache] to get an independent request stream that still shares
/// cached responses.
#[derive(Clone)]
pub struct RecognitionClient {
    backend: Arc<dyn RecognitionBackend>,
    cache: ResponseCache,
    retry: RetryPolicy,
    options: RecognitionOptions,
    enabled: bool,
    max_text_chars: usize,
    in_flight: Arc<Mutex<InFlight>>,
}

impl RecognitionClient {
    pub fn new<B>(backend: B, cache: ResponseCache) -> Self
    where
        B: RecognitionBackend + 'static,
    {
        let defaults = HighlightConfig::default();
        Self {
            backend: Arc::new(backend),
            cache,
            retry: defaults.retry,
            options: defaults.options,
            enabled: defaults.enabled,
            max_text_chars: defaults.max_text_chars,
            in_flight: Arc::new(Mutex::new(InFlight::default())),
        }
    }

    /// Adopt the request-related parts of `config`.
    pub fn with_config(mut self, config: &HighlightConfig) -> Self {
        self.retry = config.retry.clone();
        self.options = config.options;
        self.enabled = config.enabled;
        self.max_text_chars = config.max_text_chars;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_options(mut self, options: RecognitionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A request for `text` carrying this client's options.
    pub fn request(&self, text: impl Into<String>) -> RecognitionRequest {
        RecognitionRequest::new(text).with_options(self.options)
    }

    /// True while a request issued by this client has not resolved.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.lock().token.is_some()
    }

    /// Cancel the outstanding request, if any. Its caller receives
    /// [RecognitionError::Cancelled].
    pub fn cancel(&self) {
        let mut in_flight = self.in_flight.lock();
        if let Some(token) = in_flight.token.take() {
            debug!(generation = in_flight.generation, "Cancelling recognition request");
            token.cancel();
        }
    }

    /// Recognize entities in `request`, returning only the response.
    pub async fn recognize(
        &self,
        request: RecognitionRequest,
    ) -> Result<RecognitionResponse, RecognitionError> {
        self.recognize_detailed(request)
            .await
            .map(|recognition| recognition.response)
    }

    /// Recognize entities in `request`.
    ///
    /// Validation happens before anything else; the cache is consulted before
    /// any network call. When the client is disabled the result is always an
    /// empty response and nothing is issued.
    pub async fn recognize_detailed(
        &self,
        request: RecognitionRequest,
    ) -> Result<Recognition, RecognitionError> {
        if !self.enabled {
            let response = RecognitionResponse::empty(request.text.clone());
            return Ok(Recognition {
                request,
                response,
                from_cache: false,
            });
        }

        let (generation, token) = self.supersede();

        if let Err(error) = self.validate(&request) {
            self.finish(generation);
            return Err(error);
        }

        let fingerprint = Fingerprint::of(&request);
        if let Some(response) = self.cache.get(&fingerprint) {
            debug!(%fingerprint, "Serving recognition from cache");
            self.finish(generation);
            return Ok(Recognition {
                request,
                response,
                from_cache: true,
            });
        }

        let backend = &self.backend;
        let outgoing = &request;
        let result = self
            .retry
            .run(&token, |attempt| async move {
                trace!(%fingerprint, attempt, "Issuing recognition attempt");
                let response = backend.recognize(outgoing).await?;
                reject_soft_failure(response)
            })
            .await;

        if token.is_cancelled() {
            debug!(%fingerprint, "Discarding superseded recognition result");
            return Err(RecognitionError::Cancelled);
        }
        self.finish(generation);

        let response = result?;
        debug!(
            %fingerprint,
            entities = response.entities.len(),
            processing_time_ms = response.processing_time_ms,
            "Recognition completed"
        );
        self.cache.put(fingerprint, response.clone());

        Ok(Recognition {
            request,
            response,
            from_cache: false,
        })
    }

    fn validate(&self, request: &RecognitionRequest) -> Result<(), RecognitionError> {
        if request.is_blank() {
            return Err(RecognitionError::validation("Text must not be empty"));
        }

        let length = request.char_len();
        if length > self.max_text_chars {
            return Err(RecognitionError::validation(format!(
                "Text is {length} characters long; at most {} are accepted",
                self.max_text_chars
            )));
        }

        Ok(())
    }

    /// Cancel the previous request and register a fresh token for the next.
    fn supersede(&self) -> (u64, CancellationToken) {
        let mut in_flight = self.in_flight.lock();

        if let Some(previous) = in_flight.token.take() {
            debug!(
                generation = in_flight.generation,
                "Superseding in-flight recognition request"
            );
            previous.cancel();
        }

        in_flight.generation += 1;
        let token = CancellationToken::new();
        in_flight.token = Some(token.clone());
        (in_flight.generation, token)
    }

    fn finish(&self, generation: u64) {
        let mut in_flight = self.in_flight.lock();
        if in_flight.generation == generation {
            in_flight.token = None;
        }
    }
}

/// A response that reports an `error` is a failed attempt, retried like any
/// other server failure.
fn reject_soft_failure(response: RecognitionResponse) -> Result<RecognitionResponse, RecognitionError> {
    match response.error {
        Some(message) => Err(RecognitionError::server(message)),
        None => Ok(response),
    }
}
