use std::fmt::{Debug, Display};

use highlight_spans::{RecognitionOptions, RecognitionRequest};

/// A deterministic cache key for a recognition request.
///
/// Derived from the request text and every option field, so requests that
/// differ only in their confidence threshold never share a cache entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn new(text: &str, options: &RecognitionOptions) -> Self {
        let mut hasher = blake3::Hasher::new();

        hasher.update(&(text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
        hasher.update(&[options.fuzzy_matching as u8]);
        hasher.update(&options.confidence_threshold.to_bits().to_le_bytes());

        Self(*hasher.finalize().as_bytes())
    }

    pub fn of(request: &RecognitionRequest) -> Self {
        Self::new(&request.text, &request.options)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<&RecognitionRequest> for Fingerprint {
    fn from(request: &RecognitionRequest) -> Self {
        Self::of(request)
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", blake3::Hash::from_bytes(self.0).to_hex())
    }
}

impl Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Fingerprint").field(&self.to_string()).finish()
    }
}
