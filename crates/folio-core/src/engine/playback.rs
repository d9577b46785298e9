//! Time-based playback of scroll-offset tweens
//!
//! A playback is an ordered set of cues placed on a relative time axis. Cues
//! may run back to back (with gaps) or overlap; when several have started, the
//! one that started last owns the offset and picks up from whatever value the
//! earlier cues produced this frame. Each playback carries exactly one
//! finalizer, run once with the terminal outcome whether it completes or is
//! interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::easing::{EasingType, EasingTypeExt};
use super::timing::{is_complete, lerp, progress};
use crate::source::ScrollProgressSource;

pub type PlaybackId = Uuid;

/// Terminal state of a playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    Interrupted,
}

/// Single cleanup closure shared by the completion and interruption paths
pub type Finalizer = Box<dyn FnOnce(PlaybackOutcome, &mut dyn ScrollProgressSource)>;

/// Shared flag that asks a running playback to stop at the next frame
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Tween of the scroll offset placed on the playback's time axis
#[derive(Debug, Clone, PartialEq)]
pub struct TweenCue {
    pub at: Duration,
    /// Target scroll offset
    pub to: f64,
    pub duration: Duration,
    pub easing: EasingType,
}

impl TweenCue {
    #[inline]
    pub fn end(&self) -> Duration {
        self.at + self.duration
    }
}

/// Ordered cue list with an explicit total length (trailing gaps count)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackPlan {
    cues: Vec<TweenCue>,
    cursor: Duration,
    total: Duration,
}

impl PlaybackPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tween after everything scheduled so far
    pub fn tween(mut self, to: f64, duration: Duration, easing: EasingType) -> Self {
        let at = self.cursor;
        self.push(TweenCue {
            at,
            to,
            duration,
            easing,
        });
        self
    }

    /// Place a tween at an absolute time, possibly overlapping others
    pub fn tween_at(
        mut self,
        at: Duration,
        to: f64,
        duration: Duration,
        easing: EasingType,
    ) -> Self {
        self.push(TweenCue {
            at,
            to,
            duration,
            easing,
        });
        self
    }

    /// Append an idle span
    pub fn gap(mut self, duration: Duration) -> Self {
        self.cursor += duration;
        self.total = self.total.max(self.cursor);
        self
    }

    fn push(&mut self, cue: TweenCue) {
        let end = cue.end();
        let pos = self.cues.partition_point(|c| c.at <= cue.at);
        self.cues.insert(pos, cue);
        self.cursor = self.cursor.max(end);
        self.total = self.total.max(end);
    }

    /// End of the last scheduled cue or gap
    pub fn cursor(&self) -> Duration {
        self.cursor
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn cues(&self) -> &[TweenCue] {
        &self.cues
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty() && self.total.is_zero()
    }
}

pub struct Playback {
    id: PlaybackId,
    plan: PlaybackPlan,
    /// Offset each cue started from, captured when it first runs
    origins: Vec<Option<f64>>,
    elapsed: Duration,
    cancel: CancelToken,
    finalizer: Option<Finalizer>,
}

impl std::fmt::Debug for Playback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playback")
            .field("id", &self.id)
            .field("plan", &self.plan)
            .field("elapsed", &self.elapsed)
            .field("finalized", &self.finalizer.is_none())
            .finish()
    }
}

impl Playback {
    pub fn new(plan: PlaybackPlan, cancel: CancelToken, finalizer: Finalizer) -> Self {
        let origins = vec![None; plan.cues.len()];
        Self {
            id: Uuid::new_v4(),
            plan,
            origins,
            elapsed: Duration::ZERO,
            cancel,
            finalizer: Some(finalizer),
        }
    }

    pub fn id(&self) -> PlaybackId {
        self.id
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn plan(&self) -> &PlaybackPlan {
        &self.plan
    }

    pub fn is_finished(&self) -> bool {
        self.finalizer.is_none()
    }

    /// Advance by `dt`, writing the owning cue's offset to `source`
    ///
    /// Returns the outcome on the frame the playback terminates.
    pub fn advance(
        &mut self,
        dt: Duration,
        source: &mut dyn ScrollProgressSource,
    ) -> Option<PlaybackOutcome> {
        if self.is_finished() {
            return None;
        }
        if self.cancel.is_cancelled() {
            return self.finish(PlaybackOutcome::Interrupted, source);
        }

        self.elapsed += dt;

        let mut current = source.offset();
        let mut wrote = false;
        for (cue, origin) in self.plan.cues.iter().zip(self.origins.iter_mut()) {
            if cue.at > self.elapsed {
                break;
            }
            let from = *origin.get_or_insert(current);
            let t = progress(self.elapsed - cue.at, cue.duration);
            current = lerp(from, cue.to, cue.easing.apply(t));
            wrote = true;
        }
        if wrote {
            source.set_offset(current);
        }

        if is_complete(self.elapsed, self.plan.total) {
            return self.finish(PlaybackOutcome::Completed, source);
        }
        None
    }

    /// Stop immediately, running the finalizer with `Interrupted`
    pub fn interrupt(&mut self, source: &mut dyn ScrollProgressSource) -> Option<PlaybackOutcome> {
        self.finish(PlaybackOutcome::Interrupted, source)
    }

    fn finish(
        &mut self,
        outcome: PlaybackOutcome,
        source: &mut dyn ScrollProgressSource,
    ) -> Option<PlaybackOutcome> {
        let finalizer = self.finalizer.take()?;
        finalizer(outcome, source);
        Some(outcome)
    }
}
