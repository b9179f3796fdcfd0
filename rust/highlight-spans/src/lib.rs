//! # highlight-spans
//!
//! The synchronous core of live entity highlighting: the data model shared
//! with the recognition service, the segmenter that turns recognized spans
//! into a renderable sequence, and the interaction state layered on top.
//!
//! ## Example
//!
//! ```
//! use highlight_spans::{EntityKind, EntitySpan, Segment, segment_spans};
//!
//! let text = "Apple iPhone is great";
//! let spans = [
//!     EntitySpan::new(EntityKind::Product, "iPhone", 6, 12),
//!     EntitySpan::new(EntityKind::Manufacturer, "Apple", 0, 5),
//! ];
//!
//! let segments = segment_spans(text, spans.iter());
//!
//! assert_eq!(segments.len(), 4);
//! assert_eq!(segments[1], Segment::text(" "));
//! assert_eq!(highlight_spans::plain_text(&segments), text);
//! ```

pub mod entity;
pub mod interaction;
pub mod markup;
pub mod offset;
pub mod recognition;
pub mod resolve;
pub mod segment;

pub use entity::{EntityKind, EntityMetadata, EntitySpan};
pub use interaction::{InteractionState, SpanKey};
pub use markup::{has_markup, segment_markup};
pub use offset::CharOffsets;
pub use recognition::{MAX_TEXT_CHARS, RecognitionOptions, RecognitionRequest, RecognitionResponse};
pub use resolve::{SpanSource, resolve};
pub use segment::{Segment, entities, plain_text, segment_spans};
