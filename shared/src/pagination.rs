use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

use crate::{DEFAULT_WINDOW_SIZE, MAX_WINDOW_SIZE};

/// Sliding window over the filtered catalog, as shown by the carousel.
///
/// Invariants: `offset <= max_offset()` and `1 <= window_size <= MAX_WINDOW_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationWindow {
    offset: usize,
    window_size: usize,
    len: usize,
}

impl Default for PaginationWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl PaginationWindow {
    pub fn new(window_size: usize) -> Self {
        Self {
            offset: 0,
            window_size: window_size.clamp(1, MAX_WINDOW_SIZE),
            len: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Length of the sequence the window is positioned over.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn max_offset(&self) -> usize {
        self.len.saturating_sub(self.window_size)
    }

    pub fn can_advance(&self) -> bool {
        self.offset < self.max_offset()
    }

    pub fn can_retreat(&self) -> bool {
        self.offset > 0
    }

    /// Move one card forward. No-op at the end.
    pub fn advance(&mut self) -> bool {
        if self.can_advance() {
            self.offset += 1;
            true
        } else {
            false
        }
    }

    /// Move one card back. No-op at the start.
    pub fn retreat(&mut self) -> bool {
        if self.can_retreat() {
            self.offset -= 1;
            true
        } else {
            false
        }
    }

    /// The viewport now fits `window_size` cards.
    pub fn on_resize(&mut self, window_size: usize) {
        self.window_size = window_size.clamp(1, MAX_WINDOW_SIZE);
        self.clamp();
    }

    /// The filtered sequence was recomputed; always returns to the first card.
    pub fn on_filter_changed(&mut self, len: usize) {
        self.len = len;
        self.offset = 0;
        self.clamp();
        debug!(len, window = self.window_size, "pagination reset");
    }

    pub fn visible_range(&self) -> Range<usize> {
        let start = self.offset.min(self.len);
        let end = (self.offset + self.window_size).min(self.len);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.visible_range();
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        &items[start..end]
    }

    /// Horizontal track translation for the current offset.
    pub fn track_offset(&self, card_width: f64, gap: f64) -> f64 {
        self.offset as f64 * (card_width + gap)
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}
