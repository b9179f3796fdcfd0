//! Character offset handling.
//!
//! The recognition service reports offsets in characters, while Rust strings
//! are indexed by byte. [CharOffsets] precomputes the byte position of every
//! character boundary so spans can be sliced without splitting a multi-byte
//! character.

/// Byte positions of each character boundary in a piece of text.
#[derive(Debug, Clone)]
pub struct CharOffsets {
    // boundaries[i] is the byte offset of char i; the last entry is text.len().
    boundaries: Vec<usize>,
}

impl CharOffsets {
    pub fn new(text: &str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(index, _)| index).collect();
        boundaries.push(text.len());
        Self { boundaries }
    }

    /// Number of characters in the text.
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Byte offset of the character boundary at `char_index`, if it exists.
    pub fn byte(&self, char_index: usize) -> Option<usize> {
        self.boundaries.get(char_index).copied()
    }

    /// Slice `text` by character offsets. Returns `None` when the range is
    /// out of bounds or reversed.
    pub fn slice<'a>(&self, text: &'a str, start: usize, end: usize) -> Option<&'a str> {
        if start > end {
            return None;
        }
        let from = self.byte(start)?;
        let to = self.byte(end)?;
        text.get(from..to)
    }
}
