use std::time::Duration;

pub use folio_core::ScrollConfig;

/// Extension trait for ScrollConfig with utility methods
pub trait ScrollConfigExt {
    fn animation_duration(&self) -> Duration;

    /// Frame interval while something is animating
    fn animation_tick_duration(&self) -> Duration;

    /// Smooth scrolling is effectively enabled
    fn is_smooth(&self) -> bool;

    /// Offset units for one scroll step
    fn step(&self) -> f64;
}

impl ScrollConfigExt for ScrollConfig {
    #[inline]
    fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    #[inline]
    fn animation_tick_duration(&self) -> Duration {
        if self.animation_fps == 0 {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(1000 / self.animation_fps as u64)
        }
    }

    #[inline]
    fn is_smooth(&self) -> bool {
        self.smooth_enabled && self.animation_duration_ms > 0
    }

    #[inline]
    fn step(&self) -> f64 {
        self.scroll_lines.max(1) as f64
    }
}
