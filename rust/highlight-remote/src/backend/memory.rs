//! In-memory recognition backend for testing

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use highlight_spans::{RecognitionRequest, RecognitionResponse};
use parking_lot::Mutex;

use super::RecognitionBackend;
use crate::error::RecognitionError;

/// One scripted outcome of a recognition attempt.
#[derive(Debug, Clone)]
pub enum Outcome {
    Respond(RecognitionResponse),
    Fail(RecognitionError),
}

#[derive(Debug, Default)]
struct MemoryState {
    script: VecDeque<Outcome>,
    requests: Vec<RecognitionRequest>,
    latency: Duration,
}

/// Scripted in-memory backend.
///
/// Outcomes are consumed in the order they were queued; once the script is
/// exhausted every request gets an empty response echoing its text. Clones
/// share the same script and request log, so a test can keep a handle while
/// the client owns another.
///
/// # Examples
///
/// ```
/// use highlight_remote::backend::{MemoryBackend, RecognitionBackend};
/// use highlight_remote::RecognitionError;
/// use highlight_spans::RecognitionRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MemoryBackend::new();
/// backend.fail(RecognitionError::from_status(503, "unavailable"));
///
/// let request = RecognitionRequest::new("Show me Cadbury revenue");
/// assert!(backend.recognize(&request).await.is_err());
/// assert!(backend.recognize(&request).await?.entities.is_empty());
/// assert_eq!(backend.attempts(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every attempt by `latency` before it resolves.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.state.lock().latency = latency;
        self
    }

    /// Queue a successful response.
    pub fn respond(&self, response: RecognitionResponse) {
        self.state.lock().script.push_back(Outcome::Respond(response));
    }

    /// Queue a failure.
    pub fn fail(&self, error: RecognitionError) {
        self.state.lock().script.push_back(Outcome::Fail(error));
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecognitionRequest> {
        self.state.lock().requests.clone()
    }

    /// Number of attempts received so far.
    pub fn attempts(&self) -> usize {
        self.state.lock().requests.len()
    }
}

#[async_trait]
impl RecognitionBackend for MemoryBackend {
    async fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResponse, RecognitionError> {
        let (outcome, latency) = {
            let mut state = self.state.lock();
            state.requests.push(request.clone());
            (state.script.pop_front(), state.latency)
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match outcome {
            Some(Outcome::Respond(response)) => Ok(response),
            Some(Outcome::Fail(error)) => Err(error),
            None => Ok(RecognitionResponse::empty(request.text.clone())),
        }
    }
}
