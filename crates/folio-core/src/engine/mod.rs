//! Timeline engine: scrubbed segments and time-based playback
//!
//! # Layout
//!
//! - `easing` - Pure easing functions
//! - `timing` - Elapsed-time and interpolation helpers
//! - `scrub` - Segments keyed by progress coordinate, sampled per frame
//! - `playback` - Cues keyed by relative time, driving the scroll offset
//!
//! The engine never reads a clock. The render loop passes each frame's `dt`
//! to [`TimelineEngine::advance`].

pub mod easing;
pub mod playback;
pub mod scrub;
pub mod timing;

use std::time::Duration;

use tracing::debug;

pub use easing::{EasingType, EasingTypeExt};
pub use playback::{
    CancelToken, Finalizer, Playback, PlaybackId, PlaybackOutcome, PlaybackPlan, TweenCue,
};
pub use scrub::{FrameSample, ScrubTimeline};

use crate::source::ScrollProgressSource;
use crate::timeline::TimelineSegment;

#[derive(Debug, Default)]
pub struct TimelineEngine {
    scrub: ScrubTimeline,
    playbacks: Vec<Playback>,
}

impl TimelineEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // --- progress-keyed segments ---

    pub fn insert(&mut self, segment: TimelineSegment) {
        self.scrub.insert(segment);
    }

    pub fn insert_all<I>(&mut self, segments: I)
    where
        I: IntoIterator<Item = TimelineSegment>,
    {
        for segment in segments {
            self.scrub.insert(segment);
        }
    }

    /// Seek the scrubbed timeline to `progress`
    pub fn scrub(&self, progress: f64) -> FrameSample {
        self.scrub.sample(progress)
    }

    pub fn segments(&self) -> &ScrubTimeline {
        &self.scrub
    }

    pub fn segment_count(&self) -> usize {
        self.scrub.len()
    }

    /// Drop all scrubbed segments (playbacks keep running)
    pub fn dispose_segments(&mut self) {
        if !self.scrub.is_empty() {
            debug!(segments = self.scrub.len(), "Disposing timeline segments");
        }
        self.scrub.clear();
    }

    // --- time-based playback ---

    pub fn play(
        &mut self,
        plan: PlaybackPlan,
        cancel: CancelToken,
        finalizer: Finalizer,
    ) -> PlaybackId {
        let playback = Playback::new(plan, cancel, finalizer);
        let id = playback.id();
        debug!(
            playback = %id,
            cues = playback.plan().cues().len(),
            total_ms = playback.plan().total().as_millis() as u64,
            "Starting playback"
        );
        self.playbacks.push(playback);
        id
    }

    pub fn playback_count(&self) -> usize {
        self.playbacks.len()
    }

    pub fn is_playing(&self, id: PlaybackId) -> bool {
        self.playbacks.iter().any(|p| p.id() == id)
    }

    pub fn elapsed(&self, id: PlaybackId) -> Option<Duration> {
        self.playbacks.iter().find(|p| p.id() == id).map(|p| p.elapsed())
    }

    /// Advance every playback by `dt`; returns the ones that terminated
    pub fn advance(
        &mut self,
        dt: Duration,
        source: &mut dyn ScrollProgressSource,
    ) -> Vec<(PlaybackId, PlaybackOutcome)> {
        let mut finished = Vec::new();
        for playback in &mut self.playbacks {
            if let Some(outcome) = playback.advance(dt, source) {
                finished.push((playback.id(), outcome));
            }
        }
        self.playbacks.retain(|p| !p.is_finished());
        finished
    }

    /// Kill one playback, running its finalizer with `Interrupted`
    pub fn kill(&mut self, id: PlaybackId, source: &mut dyn ScrollProgressSource) -> bool {
        let Some(pos) = self.playbacks.iter().position(|p| p.id() == id) else {
            return false;
        };
        let mut playback = self.playbacks.remove(pos);
        debug!(playback = %id, "Killing playback");
        playback.interrupt(source).is_some()
    }

    pub fn kill_all(&mut self, source: &mut dyn ScrollProgressSource) -> usize {
        let mut killed = 0;
        for mut playback in self.playbacks.drain(..) {
            if playback.interrupt(source).is_some() {
                killed += 1;
            }
        }
        killed
    }

    /// Kill every playback and drop every segment
    pub fn dispose(&mut self, source: &mut dyn ScrollProgressSource) {
        self.kill_all(source);
        self.dispose_segments();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PinnedRegion;
    use crate::timeline::{Handle, Property};

    #[test]
    fn test_dispose_segments_then_reinsert() {
        let mut engine = TimelineEngine::new();
        let seg = TimelineSegment::new(Handle::Cover, Property::RotateY, 0.0, -180.0).at(0.0, 0.08);
        engine.insert(seg.clone());
        engine.dispose_segments();
        engine.insert(seg);
        assert_eq!(engine.segment_count(), 1);
        assert_eq!(engine.scrub(1.0).get(Handle::Cover, Property::RotateY), Some(-180.0));
    }

    #[test]
    fn test_finished_playbacks_are_removed() {
        let mut engine = TimelineEngine::new();
        let mut region = PinnedRegion::with_length(100.0);
        let plan = PlaybackPlan::new().tween(50.0, Duration::from_millis(10), EasingType::Linear);
        let id = engine.play(plan, CancelToken::new(), Box::new(|_, _| {}));

        assert!(engine.is_playing(id));
        let finished = engine.advance(Duration::from_millis(20), &mut region);
        assert_eq!(finished, vec![(id, PlaybackOutcome::Completed)]);
        assert_eq!(engine.playback_count(), 0);
        assert!(engine.elapsed(id).is_none());
    }

    #[test]
    fn test_kill_runs_finalizer_with_interrupted() {
        let mut engine = TimelineEngine::new();
        let mut region = PinnedRegion::with_length(100.0);
        let plan = PlaybackPlan::new().tween(50.0, Duration::from_secs(1), EasingType::Linear);
        let id = engine.play(
            plan,
            CancelToken::new(),
            Box::new(|outcome, source| {
                assert_eq!(outcome, PlaybackOutcome::Interrupted);
                source.set_input_enabled(true);
            }),
        );
        region.set_input_enabled(false);

        assert!(engine.kill(id, &mut region));
        assert!(region.input_enabled());
        assert!(!engine.kill(id, &mut region));
    }
}
