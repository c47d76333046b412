//! Distinct-color extraction.
//!
//! Scans a pixel buffer once in row-major order and returns each color the
//! first time it is seen. Membership is tracked in a [`PresenceTable`]: a
//! direct-address bit array with one slot per possible 24-bit RGB color.
//! There is no hashing, no collision handling and no resizing, so every
//! test-and-set is O(1) in the worst case.
//!
//! The table costs a fixed 2 MiB regardless of image size. That is only
//! reasonable because the key domain is 8 bits x 3 channels. Deeper
//! channels (e.g. 16 bits per channel, a 2^48 domain) cannot use this
//! structure and would need a hashed or ordered set instead, with the
//! corresponding change in worst-case complexity.

use crate::types::{Color, DistinctColors, PipelineError, PixelBuffer};

/// Number of representable 8-bit-per-channel RGB colors (2^24).
pub const COLOR_DOMAIN: usize = 1 << 24;

const WORD_BITS: usize = u64::BITS as usize;

/// Direct-address presence table over the 24-bit RGB domain.
///
/// Each [`extract_distinct_colors`] call builds its own table, so state
/// can never leak from one image into the next.
pub struct PresenceTable {
    words: Vec<u64>,
}

impl PresenceTable {
    /// Allocate a table with every slot clear.
    #[must_use]
    pub fn new() -> Self {
        Self {
            words: vec![0; COLOR_DOMAIN / WORD_BITS],
        }
    }

    /// Returns `true` if `color` has been inserted.
    #[must_use]
    pub fn contains(&self, color: Color) -> bool {
        let (word, mask) = slot(color);
        self.words[word] & mask != 0
    }

    /// Mark `color` as present.
    ///
    /// Returns `true` if the slot was clear before this call.
    pub fn insert(&mut self, color: Color) -> bool {
        let (word, mask) = slot(color);
        let was_clear = self.words[word] & mask == 0;
        self.words[word] |= mask;
        was_clear
    }

    /// Clear every slot.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }
}

impl Default for PresenceTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Word index and bit mask for a color's slot.
const fn slot(color: Color) -> (usize, u64) {
    let key = color.key() as usize;
    (key / WORD_BITS, 1 << (key % WORD_BITS))
}

/// Extract the distinct colors of `buffer` in first-occurrence order.
///
/// Pixels are visited top to bottom, left to right. An empty buffer
/// yields an empty set.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidBuffer`] if the buffer is not
/// rectangular. The check runs before any pixel is read.
pub fn extract_distinct_colors<B: PixelBuffer + ?Sized>(
    buffer: &B,
) -> Result<DistinctColors, PipelineError> {
    buffer.check_shape()?;

    let (height, width) = (buffer.height(), buffer.width());
    let mut seen = PresenceTable::new();
    let mut colors = Vec::new();

    for row in 0..height {
        for col in 0..width {
            let color = buffer.pixel(row, col);
            if seen.insert(color) {
                colors.push(color);
            }
        }
    }

    Ok(DistinctColors::from_unique(colors))
}
