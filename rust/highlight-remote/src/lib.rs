//! # highlight-remote
//!
//! The asynchronous half of live entity highlighting. Keystrokes are
//! debounced, turned into recognition requests, served from a shared cache
//! or sent to the recognition service with exponential backoff, and the
//! newest result is segmented into a [HighlightView].
//!
//! ```
//! use std::time::Duration;
//! use highlight_remote::{HighlightConfig, Highlighter, backend::MemoryBackend};
//! use highlight_spans::{EntityKind, EntitySpan, RecognitionResponse};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let backend = MemoryBackend::new();
//! backend.respond(RecognitionResponse::empty("Show me Cadbury revenue").with_entities(vec![
//!     EntitySpan::new(EntityKind::Brand, "Cadbury", 8, 15),
//! ]));
//!
//! let config = HighlightConfig::default().with_debounce(Duration::from_millis(5));
//! let mut highlighter = Highlighter::new(config, backend);
//!
//! highlighter.input("Show me Cadbury revenue");
//! assert!(highlighter.next_update().await.loading);
//!
//! let view = highlighter.next_update().await;
//! assert_eq!(view.entities().count(), 1);
//! # }
//! ```

pub mod backend;
mod cache;
mod client;
mod config;
mod debounce;
mod error;
mod fingerprint;
mod retry;
mod session;

pub use cache::{CacheConfig, CacheStats, ResponseCache};
pub use client::{Recognition, RecognitionClient};
pub use config::HighlightConfig;
pub use debounce::Debouncer;
pub use error::RecognitionError;
pub use fingerprint::Fingerprint;
pub use retry::RetryPolicy;
pub use session::{HighlightView, Highlighter};
