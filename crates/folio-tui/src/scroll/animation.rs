//! Scroll animation controller
//!
//! Time only moves when [`ScrollAnimator::update`] is called with the frame's
//! `dt`, so the animator stays in step with the flipbook session.

use std::time::Duration;

use folio_core::engine::timing::{is_complete, lerp, progress};

use super::config::{ScrollConfig, ScrollConfigExt};
use super::{EasingType, EasingTypeExt};

#[derive(Debug, Clone)]
struct ActiveAnimation {
    elapsed: Duration,
    from: f64,
    to: f64,
    duration: Duration,
    easing: EasingType,
}

/// Eases raw scroll input toward its target
///
/// Multiple `scroll_by` calls between two frames are batched into one
/// animation.
#[derive(Debug, Clone, Default)]
pub struct ScrollAnimator {
    animation: Option<ActiveAnimation>,
    config: ScrollConfig,
    current: f64,
    pending_delta: f64,
}

impl ScrollAnimator {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Animation or batched delta waiting for the next frame
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.animation.is_some() || self.pending_delta != 0.0
    }

    /// Where the current animation will land
    pub fn target(&self) -> f64 {
        self.animation.as_ref().map(|a| a.to).unwrap_or(self.current)
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Jump without animation, dropping anything in flight
    pub fn set_offset(&mut self, offset: f64) {
        self.animation = None;
        self.pending_delta = 0.0;
        self.current = offset;
    }

    pub fn scroll_to(&mut self, target: f64, max: f64) {
        let target = target.clamp(0.0, max);

        if !self.config.is_smooth() {
            self.set_offset(target);
            return;
        }
        if (self.current - target).abs() < f64::EPSILON {
            self.animation = None;
            return;
        }

        self.animation = Some(ActiveAnimation {
            elapsed: Duration::ZERO,
            from: self.current,
            to: target,
            duration: self.config.animation_duration(),
            easing: self.config.easing,
        });
    }

    /// Positive scrolls forward
    pub fn scroll_by(&mut self, delta: f64, max: f64) {
        if !self.config.is_smooth() {
            self.set_offset((self.current + delta).clamp(0.0, max));
            return;
        }
        self.pending_delta += delta;
    }

    pub fn scroll_down(&mut self, max: f64) {
        self.scroll_by(self.config.step(), max);
    }

    pub fn scroll_up(&mut self, max: f64) {
        self.scroll_by(-self.config.step(), max);
    }

    pub fn scroll_half_page_down(&mut self, viewport: u16, max: f64) {
        self.scroll_by(half_page(viewport), max);
    }

    pub fn scroll_half_page_up(&mut self, viewport: u16, max: f64) {
        self.scroll_by(-half_page(viewport), max);
    }

    /// Advance by `dt` and return the current offset
    pub fn update(&mut self, dt: Duration, max: f64) -> f64 {
        if self.pending_delta != 0.0 {
            let target = (self.target() + self.pending_delta).clamp(0.0, max);
            self.pending_delta = 0.0;

            if (target - self.current).abs() >= f64::EPSILON {
                self.animation = Some(ActiveAnimation {
                    elapsed: Duration::ZERO,
                    from: self.current,
                    to: target,
                    duration: self.config.animation_duration(),
                    easing: self.config.easing,
                });
                // The frame that starts an animation does not move it yet
                return self.current;
            }
        }

        if let Some(anim) = self.animation.as_mut() {
            anim.elapsed += dt;
            if is_complete(anim.elapsed, anim.duration) {
                self.current = anim.to.min(max);
                self.animation = None;
            } else {
                let t = anim.easing.apply(progress(anim.elapsed, anim.duration));
                self.current = lerp(anim.from, anim.to, t).min(max);
            }
        }

        self.current
    }

    /// Stop where the animation currently is
    pub fn cancel(&mut self) {
        self.animation = None;
        self.pending_delta = 0.0;
    }
}

fn half_page(viewport: u16) -> f64 {
    (viewport / 2).max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn smooth(duration_ms: u64) -> ScrollAnimator {
        ScrollAnimator::new(ScrollConfig {
            smooth_enabled: true,
            animation_duration_ms: duration_ms,
            ..Default::default()
        })
    }

    #[test]
    fn test_instant_scroll_when_disabled() {
        let mut animator = ScrollAnimator::new(ScrollConfig {
            smooth_enabled: false,
            ..Default::default()
        });

        animator.scroll_to(100.0, 200.0);
        assert_eq!(animator.current(), 100.0);
        assert!(!animator.is_animating());

        animator.scroll_by(500.0, 200.0);
        assert_eq!(animator.current(), 200.0);
    }

    #[test]
    fn test_scroll_by_batching() {
        let mut animator = smooth(100);
        animator.scroll_by(10.0, 200.0);
        animator.scroll_by(10.0, 200.0);
        animator.scroll_by(10.0, 200.0);
        assert!(animator.needs_update());

        animator.update(FRAME, 200.0);
        assert_eq!(animator.target(), 30.0);
    }

    #[test]
    fn test_animation_reaches_target() {
        let mut animator = smooth(100);
        animator.scroll_to(50.0, 200.0);

        let mut prev = 0.0;
        for _ in 0..10 {
            let offset = animator.update(FRAME, 200.0);
            assert!(offset >= prev);
            prev = offset;
        }
        assert_eq!(animator.current(), 50.0);
        assert!(!animator.needs_update());
    }

    #[test]
    fn test_clamped_to_bounds() {
        let mut animator = smooth(100);
        animator.set_offset(50.0);
        animator.scroll_to(300.0, 100.0);
        assert!(animator.target() <= 100.0);

        animator.scroll_by(-1000.0, 100.0);
        animator.update(FRAME, 100.0);
        assert_eq!(animator.target(), 0.0);
    }

    #[test]
    fn test_set_offset_cancels() {
        let mut animator = smooth(100);
        animator.scroll_by(40.0, 200.0);
        animator.update(FRAME, 200.0);
        animator.set_offset(7.0);
        assert!(!animator.needs_update());
        assert_eq!(animator.update(FRAME, 200.0), 7.0);
    }
}
