//! Sliding game gallery

use std::ops::Range;

/// Tiles visible at once
pub const DEFAULT_VISIBLE: usize = 6;

/// Window over an ordered list, moved one tile per caret click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    offset: usize,
    visible: usize,
}

impl Default for Carousel {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBLE)
    }
}

impl Carousel {
    pub fn new(visible: usize) -> Self {
        Self {
            offset: 0,
            visible: visible.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Visible slice of a list of `len` items
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = self.offset.min(len);
        start..(start + self.visible).min(len)
    }

    pub fn can_step_left(&self) -> bool {
        self.offset > 0
    }

    pub fn can_step_right(&self, len: usize) -> bool {
        self.offset + self.visible < len
    }

    pub fn step_left(&mut self) -> bool {
        if !self.can_step_left() {
            return false;
        }
        self.offset -= 1;
        true
    }

    pub fn step_right(&mut self, len: usize) -> bool {
        if !self.can_step_right(len) {
            return false;
        }
        self.offset += 1;
        true
    }

    /// Keep the window full after the list shrank
    pub fn clamp(&mut self, len: usize) {
        self.offset = self.offset.min(len.saturating_sub(self.visible));
    }

    pub fn rewind(&mut self) {
        self.offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_and_carets() {
        let mut carousel = Carousel::new(3);
        assert_eq!(carousel.window(5), 0..3);
        assert!(!carousel.can_step_left());
        assert!(carousel.step_right(5));
        assert!(carousel.step_right(5));
        assert!(!carousel.step_right(5));
        assert_eq!(carousel.window(5), 2..5);
        assert!(carousel.step_left());
        assert_eq!(carousel.offset(), 1);
    }

    #[test]
    fn test_short_list_never_pages() {
        let mut carousel = Carousel::default();
        assert_eq!(carousel.window(2), 0..2);
        assert!(!carousel.step_right(2));
        assert_eq!(carousel.window(0), 0..0);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut carousel = Carousel::new(3);
        for _ in 0..4 {
            carousel.step_right(10);
        }
        carousel.clamp(5);
        assert_eq!(carousel.window(5), 2..5);
        carousel.clamp(1);
        assert_eq!(carousel.offset(), 0);
    }
}
