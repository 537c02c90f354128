//! Bottom-anchored scroll state
//!
//! The offset counts lines from the bottom: 0 means the newest line is in
//! view and new output keeps it there. Once the user scrolls up, new output
//! grows the offset so the visible window stays put.

use std::ops::Range;

/// State for a bottom-anchored scrolling region
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrollState {
    /// Lines scrolled up from the bottom (0 = following)
    pub offset: usize,
    /// Total content lines
    pub total_lines: usize,
    /// Visible rows
    pub viewport: usize,
}

impl ScrollState {
    /// Whether the view follows new output
    pub fn is_following(&self) -> bool {
        self.offset == 0
    }

    /// Record the current content length
    pub fn set_total(&mut self, total: usize) {
        if total < self.total_lines {
            // Content was replaced
            self.offset = 0;
        } else if self.offset > 0 {
            self.offset += total - self.total_lines;
        }
        self.total_lines = total;
        self.clamp();
    }

    /// Record the number of visible rows
    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows;
        self.clamp();
    }

    /// Scroll towards older lines
    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_add(lines);
        self.clamp();
    }

    /// Scroll towards newer lines
    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
    }

    /// Jump back to the newest line
    pub fn follow(&mut self) {
        self.offset = 0;
    }

    /// Indices of the lines in view
    pub fn visible_range(&self) -> Range<usize> {
        let end = self.total_lines.saturating_sub(self.offset);
        let start = end.saturating_sub(self.viewport);
        start..end
    }

    fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.viewport)
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(total: usize, viewport: usize) -> ScrollState {
        let mut state = ScrollState::default();
        state.set_viewport(viewport);
        state.set_total(total);
        state
    }

    #[test]
    fn test_follows_newest_lines() {
        let mut state = state(30, 10);
        assert_eq!(state.visible_range(), 20..30);

        state.set_total(35);
        assert!(state.is_following());
        assert_eq!(state.visible_range(), 25..35);
    }

    #[test]
    fn test_scrolled_view_stays_put() {
        let mut state = state(30, 10);
        state.scroll_up(5);
        assert_eq!(state.visible_range(), 15..25);

        state.set_total(40);
        assert!(!state.is_following());
        assert_eq!(state.visible_range(), 15..25);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut state = state(12, 10);
        state.scroll_up(100);
        assert_eq!(state.offset, 2);
        assert_eq!(state.visible_range(), 0..10);

        state.scroll_down(100);
        assert!(state.is_following());
    }

    #[test]
    fn test_short_content_fits() {
        let state = state(3, 10);
        assert_eq!(state.visible_range(), 0..3);
    }

    #[test]
    fn test_replaced_content_resets_to_follow() {
        let mut state = state(50, 10);
        state.scroll_up(20);
        state.set_total(0);
        assert!(state.is_following());
        assert_eq!(state.visible_range(), 0..0);
    }
}
