//! Recognition backends.
//!
//! A [RecognitionBackend] performs exactly one attempt at recognizing the
//! entities in a request. Retrying, caching and cancellation are layered on
//! top by [crate::RecognitionClient].

use std::sync::Arc;

use async_trait::async_trait;
use highlight_spans::{RecognitionRequest, RecognitionResponse};

use crate::error::RecognitionError;

mod memory;
pub use memory::*;

mod rest;
pub use rest::*;

/// A single-attempt transport to the recognition service.
#[async_trait]
pub trait RecognitionBackend: Send + Sync {
    /// Recognize entities in `request`. Non-success statuses must be reported
    /// as classified [RecognitionError]s.
    async fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResponse, RecognitionError>;
}

#[async_trait]
impl<B> RecognitionBackend for Arc<B>
where
    B: RecognitionBackend + ?Sized,
{
    async fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResponse, RecognitionError> {
        self.as_ref().recognize(request).await
    }
}
