//! The highlighting session behind one chat input.

use highlight_spans::{EntitySpan, InteractionState, Segment, resolve};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::backend::RecognitionBackend;
use crate::cache::ResponseCache;
use crate::client::{Recognition, RecognitionClient};
use crate::config::HighlightConfig;
use crate::debounce::Debouncer;
use crate::error::RecognitionError;

/// What the rendering layer shows for the current input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightView {
    /// The text that `segments` partition.
    pub text: String,
    pub segments: Vec<Segment>,
    /// True while a recognition for the latest input is outstanding.
    pub loading: bool,
    /// The last user-visible failure, cleared by the next success.
    pub error: Option<String>,
    pub processing_time_ms: Option<f64>,
    pub from_cache: bool,
}

impl HighlightView {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            segments: if text.is_empty() {
                Vec::new()
            } else {
                vec![Segment::text(text)]
            },
            ..Default::default()
        }
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntitySpan> {
        highlight_spans::entities(&self.segments)
    }
}

struct Pending {
    text: String,
    handle: JoinHandle<Result<Recognition, RecognitionError>>,
}

enum Event {
    Fired(String),
    Completed(String, Result<Result<Recognition, RecognitionError>, JoinError>),
}

/// Wires keystrokes through debouncing, recognition and segmentation into a
/// [HighlightView].
///
/// Input is pushed with [Highlighter::input]; [Highlighter::next_update]
/// drives the debounce timer and request completions, resolving whenever the
/// view changed. Results of superseded requests never reach the view.
pub struct Highlighter {
    config: HighlightConfig,
    client: RecognitionClient,
    debouncer: Debouncer,
    interaction: InteractionState,
    view: HighlightView,
    pending: Option<Pending>,
}

impl Highlighter {
    /// A highlighter with its own response cache.
    pub fn new<B>(config: HighlightConfig, backend: B) -> Self
    where
        B: RecognitionBackend + 'static,
    {
        let cache = ResponseCache::new(config.cache.clone());
        let client = RecognitionClient::new(backend, cache).with_config(&config);
        Self::with_client(config, client)
    }

    /// A highlighter around an existing client, e.g. one sharing a cache
    /// with other inputs.
    pub fn with_client(config: HighlightConfig, client: RecognitionClient) -> Self {
        Self {
            debouncer: Debouncer::new(config.debounce),
            config,
            client,
            interaction: InteractionState::new(),
            view: HighlightView::default(),
            pending: None,
        }
    }

    pub fn view(&self) -> &HighlightView {
        &self.view
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn client(&self) -> &RecognitionClient {
        &self.client
    }

    /// Push the current contents of the input.
    ///
    /// Blank input clears the view and all interaction state immediately.
    pub fn input(&mut self, text: impl Into<String>) {
        let text = text.into();

        if text.trim().is_empty() {
            self.clear();
            self.view = HighlightView::plain(&text);
            return;
        }

        if !self.config.enabled {
            self.view = HighlightView::plain(&text);
            return;
        }

        if self.pending.as_ref().is_some_and(|pending| pending.text != text) {
            self.supersede_pending();
        }

        self.debouncer.schedule(text);
    }

    /// The message was sent: drop everything tied to the current input.
    pub fn message_sent(&mut self) {
        debug!("Message sent; resetting highlight state");
        self.clear();
        self.view = HighlightView::default();
    }

    pub fn select(&mut self, span: EntitySpan) {
        self.interaction.select(span);
    }

    pub fn clear_selection(&mut self) {
        self.interaction.clear_selection();
    }

    /// Hide `span` from rendering. A removed span loses its selection.
    pub fn remove(&mut self, span: &EntitySpan) {
        if self.interaction.is_selected(span) {
            self.interaction.clear_selection();
        }
        self.interaction.remove(span);
    }

    /// The segments to render, with removed entities shown as plain text.
    pub fn visible_segments(&self) -> Vec<Segment> {
        self.interaction.visible(&self.view.segments)
    }

    /// True when a debounce timer or a request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.debouncer.is_armed() || self.pending.is_some()
    }

    /// Wait until the view changes and return it.
    ///
    /// A debounce trigger starts a request and marks the view as loading; a
    /// completed request updates the segments or the error. Superseded
    /// completions are skipped silently. Never resolves while idle.
    pub async fn next_update(&mut self) -> &HighlightView {
        loop {
            let event = tokio::select! {
                text = self.debouncer.fired() => Event::Fired(text),
                (text, result) = completion(&mut self.pending) => Event::Completed(text, result),
            };

            match event {
                Event::Fired(text) => {
                    self.start(text);
                    return &self.view;
                }
                Event::Completed(text, result) => {
                    self.pending = None;
                    if self.complete(text, result) {
                        return &self.view;
                    }
                }
            }
        }
    }

    fn start(&mut self, text: String) {
        let client = self.client.clone();
        let request = client.request(text.clone());
        let handle = tokio::spawn(async move { client.recognize_detailed(request).await });

        if let Some(previous) = self.pending.replace(Pending { text, handle }) {
            debug!(text = %previous.text, "Dropping superseded recognition");
        }
        self.view.loading = true;
    }

    /// Apply a finished request; false when there was nothing to apply.
    fn complete(
        &mut self,
        text: String,
        result: Result<Result<Recognition, RecognitionError>, JoinError>,
    ) -> bool {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) if error.is_cancelled() => return false,
            Err(error) => {
                warn!(%error, "Recognition task failed");
                Err(RecognitionError::transport(error.to_string()))
            }
        };

        match outcome {
            Ok(recognition) => {
                let segments = resolve(&text, &recognition.response);
                self.view = HighlightView {
                    text,
                    segments,
                    loading: false,
                    error: None,
                    processing_time_ms: Some(recognition.response.processing_time_ms),
                    from_cache: recognition.from_cache,
                };
                true
            }
            Err(RecognitionError::Cancelled) => false,
            Err(error) => {
                debug!(%error, "Showing recognition failure");
                if self.view.text != text {
                    self.view = HighlightView::plain(&text);
                }
                self.view.loading = false;
                self.view.error = Some(error.to_string());
                true
            }
        }
    }

    /// Abandon the outstanding request. The previous segmentation stays on
    /// screen until the next result replaces it.
    fn supersede_pending(&mut self) {
        if let Some(previous) = self.pending.take() {
            debug!(text = %previous.text, "Input changed; cancelling recognition");
            self.client.cancel();
            self.view.loading = false;
        }
    }

    fn clear(&mut self) {
        self.debouncer.cancel();
        self.client.cancel();
        self.pending = None;
        self.interaction.reset();
        self.interaction.clear_selection();
    }
}

async fn completion(
    pending: &mut Option<Pending>,
) -> (String, Result<Result<Recognition, RecognitionError>, JoinError>) {
    match pending {
        Some(pending) => {
            let result = (&mut pending.handle).await;
            (pending.text.clone(), result)
        }
        None => std::future::pending().await,
    }
}
