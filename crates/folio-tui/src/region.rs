//! Terminal-backed pinned region
//!
//! The flipbook is pinned while the reader scrolls through `length` virtual
//! lines. Raw key scrolling goes through the [`ScrollAnimator`]; programmatic
//! writes from the session bypass it.

use std::time::Duration;

use folio_core::phase::PAGES_SPAN;
use folio_core::{ScrollBounds, ScrollConfig, ScrollProgressSource};

use crate::scroll::ScrollAnimator;

/// Virtual scroll lines spent on each page
pub const LINES_PER_PAGE: f64 = 24.0;

/// Region length that gives every page `LINES_PER_PAGE` lines
pub fn region_length(page_count: usize) -> f64 {
    (page_count.max(1) as f64 * LINES_PER_PAGE / PAGES_SPAN).round()
}

#[derive(Debug, Clone)]
pub struct TerminalRegion {
    animator: ScrollAnimator,
    bounds: ScrollBounds,
    input_enabled: bool,
}

impl TerminalRegion {
    pub fn new(config: ScrollConfig, page_count: usize) -> Self {
        Self {
            animator: ScrollAnimator::new(config),
            bounds: ScrollBounds::new(0.0, region_length(page_count)),
            input_enabled: true,
        }
    }

    fn max(&self) -> f64 {
        self.bounds.end
    }

    /// Raw scroll by `delta` lines; ignored while input is disabled
    pub fn scroll_by(&mut self, delta: f64) -> bool {
        if !self.input_enabled {
            return false;
        }
        let max = self.max();
        self.animator.scroll_by(delta, max);
        true
    }

    pub fn scroll_down(&mut self) -> bool {
        if !self.input_enabled {
            return false;
        }
        let max = self.max();
        self.animator.scroll_down(max);
        true
    }

    pub fn scroll_up(&mut self) -> bool {
        if !self.input_enabled {
            return false;
        }
        let max = self.max();
        self.animator.scroll_up(max);
        true
    }

    pub fn half_page_down(&mut self, viewport: u16) -> bool {
        if !self.input_enabled {
            return false;
        }
        let max = self.max();
        self.animator.scroll_half_page_down(viewport, max);
        true
    }

    pub fn half_page_up(&mut self, viewport: u16) -> bool {
        if !self.input_enabled {
            return false;
        }
        let max = self.max();
        self.animator.scroll_half_page_up(viewport, max);
        true
    }

    /// Advance smoothing by one frame
    pub fn update(&mut self, dt: Duration) -> f64 {
        let max = self.max();
        self.animator.update(dt, max)
    }

    pub fn needs_update(&self) -> bool {
        self.animator.needs_update()
    }

    /// New page count: keep the reader at the same progress
    pub fn resize(&mut self, page_count: usize) {
        let progress = self.progress();
        self.bounds = ScrollBounds::new(0.0, region_length(page_count));
        self.animator.set_offset(self.bounds.offset_at(progress));
    }
}

impl ScrollProgressSource for TerminalRegion {
    fn bounds(&self) -> ScrollBounds {
        self.bounds
    }

    fn offset(&self) -> f64 {
        self.animator.current()
    }

    fn set_offset(&mut self, offset: f64) {
        self.animator
            .set_offset(offset.clamp(self.bounds.start, self.bounds.end));
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if !enabled {
            // Queued key scrolling must not land after the lock
            self.animator.cancel();
        }
        self.input_enabled = enabled;
    }

    fn input_enabled(&self) -> bool {
        self.input_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> ScrollConfig {
        ScrollConfig {
            smooth_enabled: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_region_length() {
        assert_eq!(region_length(9), 257.0);
        assert_eq!(region_length(0), region_length(1));
    }

    #[test]
    fn test_locked_input_is_ignored() {
        let mut region = TerminalRegion::new(instant(), 9);
        assert!(region.scroll_by(10.0));
        assert_eq!(region.offset(), 10.0);

        region.set_input_enabled(false);
        assert!(!region.scroll_by(10.0));
        assert!(!region.half_page_down(40));
        assert_eq!(region.offset(), 10.0);

        // Programmatic writes still land
        region.set_offset(100.0);
        assert_eq!(region.offset(), 100.0);
    }

    #[test]
    fn test_line_steps_follow_scroll_lines() {
        let config = ScrollConfig {
            scroll_lines: 3,
            ..instant()
        };
        let mut region = TerminalRegion::new(config, 9);
        assert!(region.scroll_down());
        assert!(region.scroll_down());
        assert_eq!(region.offset(), 6.0);
        assert!(region.scroll_up());
        assert_eq!(region.offset(), 3.0);

        region.set_input_enabled(false);
        assert!(!region.scroll_down());
        assert_eq!(region.offset(), 3.0);
    }

    #[test]
    fn test_lock_drops_queued_smooth_scroll() {
        let mut region = TerminalRegion::new(ScrollConfig::default(), 9);
        region.scroll_by(30.0);
        region.set_input_enabled(false);
        region.update(Duration::from_millis(500));
        assert_eq!(region.offset(), 0.0);
    }

    #[test]
    fn test_resize_keeps_progress() {
        let mut region = TerminalRegion::new(instant(), 9);
        region.set_offset(region.bounds().offset_at(0.5));
        region.resize(4);
        assert!((region.progress() - 0.5).abs() < 1e-2);
        assert_eq!(region.bounds().end, region_length(4));
    }
}
