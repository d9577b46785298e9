//! Progress-keyed segment storage and the scrub primitive
//!
//! Segments are grouped into tracks, one per (handle, property). Sampling a
//! track at `p` hands ownership to the latest segment that has started; before
//! any segment starts the track shows the first segment's `from` value. The
//! result is a pure function of `p`, so scrubbing backward replays every
//! segment in reverse.

use std::collections::BTreeMap;

use crate::timeline::{Handle, Property, TimelineSegment};

type TrackKey = (Handle, Property);

#[derive(Debug, Default, Clone)]
pub struct ScrubTimeline {
    tracks: BTreeMap<TrackKey, Vec<TimelineSegment>>,
    len: usize,
}

impl ScrubTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a segment keyed by its progress coordinate
    pub fn insert(&mut self, segment: TimelineSegment) {
        let track = self
            .tracks
            .entry((segment.target, segment.property))
            .or_default();
        // Equal starts keep insertion order, so the later insert wins
        let pos = track.partition_point(|s| s.start <= segment.start);
        track.insert(pos, segment);
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Drop every segment
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.len = 0;
    }

    /// All segments, ordered by track then start
    pub fn segments(&self) -> impl Iterator<Item = &TimelineSegment> {
        self.tracks.values().flatten()
    }

    /// Value of a single track at `p`
    pub fn value(&self, handle: Handle, property: Property, p: f64) -> Option<f64> {
        self.tracks
            .get(&(handle, property))
            .and_then(|track| track_value(track, p))
    }

    /// Evaluate every track at `p`
    pub fn sample(&self, p: f64) -> FrameSample {
        let values = self
            .tracks
            .iter()
            .filter_map(|(key, track)| track_value(track, p).map(|v| (*key, v)))
            .collect();
        FrameSample { progress: p, values }
    }
}

fn track_value(track: &[TimelineSegment], p: f64) -> Option<f64> {
    let first = track.first()?;
    let started = track.partition_point(|s| s.start <= p);
    if started == 0 {
        Some(first.from)
    } else {
        Some(track[started - 1].value_at(p))
    }
}

/// Property values of every animated handle at one progress coordinate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSample {
    pub progress: f64,
    values: BTreeMap<TrackKey, f64>,
}

impl FrameSample {
    pub fn get(&self, handle: Handle, property: Property) -> Option<f64> {
        self.values.get(&(handle, property)).copied()
    }

    /// Value or a fallback when the handle/property is not animated
    pub fn get_or(&self, handle: Handle, property: Property, default: f64) -> f64 {
        self.get(handle, property).unwrap_or(default)
    }

    pub fn is_visible(&self, handle: Handle) -> bool {
        self.get_or(handle, Property::Visible, 0.0) >= 0.5
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, Property, f64)> + '_ {
        self.values.iter().map(|((h, p), v)| (*h, *p, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::easing::EasingType;

    fn scale(from: f64, to: f64, start: f64, duration: f64) -> TimelineSegment {
        TimelineSegment::new(Handle::Artifact, Property::Scale, from, to).at(start, duration)
    }

    #[test]
    fn test_before_first_segment_uses_from() {
        let mut timeline = ScrubTimeline::new();
        timeline.insert(scale(1.0, 0.5, 0.5, 0.1));
        assert_eq!(timeline.value(Handle::Artifact, Property::Scale, 0.2), Some(1.0));
    }

    #[test]
    fn test_sequential_segments_hand_over() {
        let mut timeline = ScrubTimeline::new();
        timeline.insert(scale(0.8, 0.6, 0.7, 0.1));
        timeline.insert(scale(1.0, 0.8, 0.5, 0.1));

        let scale = |p: f64| timeline.value(Handle::Artifact, Property::Scale, p);
        assert!((scale(0.55).unwrap() - 0.9).abs() < 1e-9);
        // Gap between segments holds the previous end value
        assert_eq!(scale(0.65), Some(0.8));
        assert!((scale(0.75).unwrap() - 0.7).abs() < 1e-9);
        assert_eq!(scale(1.0), Some(0.6));
    }

    #[test]
    fn test_scrub_is_symmetric() {
        let mut timeline = ScrubTimeline::new();
        timeline.insert(scale(1.0, 0.5, 0.2, 0.4).eased(EasingType::Sine));

        let at = |i: i32| {
            timeline
                .sample(i as f64 / 10.0)
                .get_or(Handle::Artifact, Property::Scale, 0.0)
        };
        let forward: Vec<f64> = (0..=10).map(at).collect();
        let backward: Vec<f64> = (0..=10).rev().map(at).collect();
        let reversed: Vec<f64> = backward.into_iter().rev().collect();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_clear_disposes_everything() {
        let mut timeline = ScrubTimeline::new();
        timeline.insert(scale(1.0, 0.5, 0.0, 1.0));
        timeline.insert(TimelineSegment::step(Handle::Contact, Property::Visible, 1.0, 0.9));
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.track_count(), 2);

        timeline.clear();
        assert!(timeline.is_empty());
        assert!(timeline.sample(0.5).is_empty());
    }
}
