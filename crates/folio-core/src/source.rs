//! Scroll position of the pinned region
//!
//! The host owns the real scroll container; the core only needs the offset
//! bounds of the pinned region, the current offset, a way to write it during
//! programmatic navigation, and a switch for raw user input.

use serde::{Deserialize, Serialize};

use crate::engine::timing::{inverse_lerp, lerp};
use crate::phase::clamp_progress;

/// Scroll offsets where the pinned region starts and ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollBounds {
    pub start: f64,
    pub end: f64,
}

impl ScrollBounds {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    #[inline]
    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }

    /// Normalized progress for a scroll offset, clamped to [0, 1]
    #[inline]
    pub fn progress_at(&self, offset: f64) -> f64 {
        inverse_lerp(self.start, self.end, offset)
    }

    /// Scroll offset for a progress value
    #[inline]
    pub fn offset_at(&self, progress: f64) -> f64 {
        lerp(self.start, self.end, clamp_progress(progress))
    }
}

/// Reports progress through the pinned region once per render tick
pub trait ScrollProgressSource {
    fn bounds(&self) -> ScrollBounds;

    /// Current raw scroll offset
    fn offset(&self) -> f64;

    /// Programmatic scroll (always honoured, even with input disabled)
    fn set_offset(&mut self, offset: f64);

    fn set_input_enabled(&mut self, enabled: bool);

    fn input_enabled(&self) -> bool;

    fn progress(&self) -> f64 {
        self.bounds().progress_at(self.offset())
    }
}

/// In-memory pinned region
///
/// Used by headless runs and tests; terminal and browser hosts provide their
/// own source.
#[derive(Debug, Clone)]
pub struct PinnedRegion {
    bounds: ScrollBounds,
    offset: f64,
    input_enabled: bool,
}

impl PinnedRegion {
    pub fn new(bounds: ScrollBounds) -> Self {
        Self {
            bounds,
            offset: bounds.start,
            input_enabled: true,
        }
    }

    /// Region of `len` offset units starting at zero
    pub fn with_length(len: f64) -> Self {
        Self::new(ScrollBounds::new(0.0, len))
    }

    /// Raw user scroll; ignored while input is disabled
    ///
    /// Returns whether the scroll was applied.
    pub fn user_scroll_by(&mut self, delta: f64) -> bool {
        if !self.input_enabled {
            return false;
        }
        self.set_offset(self.offset + delta);
        true
    }

    /// Raw user scroll to a progress value; ignored while input is disabled
    pub fn user_scroll_to_progress(&mut self, progress: f64) -> bool {
        if !self.input_enabled {
            return false;
        }
        self.set_offset(self.bounds.offset_at(progress));
        true
    }

    pub fn resize(&mut self, bounds: ScrollBounds) {
        let progress = self.progress();
        self.bounds = bounds;
        self.offset = bounds.offset_at(progress);
    }
}

impl ScrollProgressSource for PinnedRegion {
    fn bounds(&self) -> ScrollBounds {
        self.bounds
    }

    fn offset(&self) -> f64 {
        self.offset
    }

    fn set_offset(&mut self, offset: f64) {
        self.offset = offset.clamp(self.bounds.start, self.bounds.end);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn input_enabled(&self) -> bool {
        self.input_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_round_trip_points() {
        let bounds = ScrollBounds::new(200.0, 1200.0);
        assert_eq!(bounds.progress_at(200.0), 0.0);
        assert_eq!(bounds.progress_at(1200.0), 1.0);
        assert!((bounds.offset_at(0.92) - 1120.0).abs() < 1e-9);
        assert_eq!(bounds.progress_at(0.0), 0.0);
        assert_eq!(bounds.progress_at(5000.0), 1.0);
    }

    #[test]
    fn test_inverted_bounds_collapse() {
        let bounds = ScrollBounds::new(10.0, 5.0);
        assert!(bounds.is_empty());
    }

    #[test]
    fn test_user_scroll_respects_input_lock() {
        let mut region = PinnedRegion::with_length(1000.0);
        assert!(region.user_scroll_by(100.0));
        assert_eq!(region.offset(), 100.0);

        region.set_input_enabled(false);
        assert!(!region.user_scroll_by(100.0));
        assert_eq!(region.offset(), 100.0);

        // Programmatic writes still land
        region.set_offset(400.0);
        assert!((region.progress() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_offset_clamped_to_region() {
        let mut region = PinnedRegion::with_length(1000.0);
        region.set_offset(-50.0);
        assert_eq!(region.offset(), 0.0);
        region.set_offset(5000.0);
        assert_eq!(region.offset(), 1000.0);
    }

    #[test]
    fn test_resize_keeps_progress() {
        let mut region = PinnedRegion::with_length(1000.0);
        region.set_offset(500.0);
        region.resize(ScrollBounds::new(0.0, 2000.0));
        assert_eq!(region.offset(), 1000.0);
    }
}
