//! Time and coordinate helpers for the timeline engine
//!
//! Playback is frame-driven: callers accumulate elapsed time from the render
//! loop's `dt`, so nothing here reads a clock.

use std::time::Duration;

/// Calculate animation progress (0.0 to 1.0) from elapsed time and duration
///
/// A zero duration is always complete.
#[inline]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Check if a span of `duration` is complete after `elapsed`
#[inline]
pub fn is_complete(elapsed: Duration, duration: Duration) -> bool {
    elapsed >= duration
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Position of `value` between `from` and `to`, clamped to [0, 1]
///
/// A degenerate span reports 1.0 once `value` has reached it.
#[inline]
pub fn inverse_lerp(from: f64, to: f64, value: f64) -> f64 {
    let span = to - from;
    if span.abs() < f64::EPSILON {
        return if value >= to { 1.0 } else { 0.0 };
    }
    ((value - from) / span).clamp(0.0, 1.0)
}
