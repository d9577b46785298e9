//! Builds the progress-keyed segment set for a whole book
//!
//! Phases, in progress order:
//!
//! 1. cover opens over `[0, COVER_END)`
//! 2. per page: content roles reveal, then the page turns (curl, main turn,
//!    settle) with the back face switched on late in the turn
//! 3. closing collapse over `[CONTACT_FADE_START, CONTACT_SETTLED)`
//!
//! Output is deterministic: the same input always yields the same segments in
//! the same order.

use tracing::debug;

use crate::engine::easing::EasingType;
use crate::phase::{
    BookLayout, PageSlot, PageSlots, PhaseRatios, CONTACT_FADE_START, CONTACT_SETTLED, COVER_END,
};
use crate::Result;

use super::segment::{ContentRole, Handle, Property, TimelineSegment};

/// Content reveal duration as a share of the content phase
pub const CONTENT_DURATION: f64 = 0.4;
/// Abbreviated reveal used while a programmatic navigation runs
pub const CONTENT_DURATION_ABBREVIATED: f64 = 0.25;
/// Content rises by this share of the artifact height
pub const CONTENT_RISE: f64 = 0.06;

/// Flip sub-phases as shares of the flip phase
pub const CURL_SHARE: f64 = 0.2;
pub const TURN_SHARE: f64 = 0.5;
pub const SETTLE_SHARE: f64 = 0.25;

pub const CURL_ANGLE: f64 = -15.0;
pub const TURN_ANGLE: f64 = -180.0;
pub const SHADOW_OPACITY: f64 = 0.35;

/// Back face switches on at this share of the main turn
pub const BACK_FACE_MARK: f64 = 0.75;
/// Back face is hidden this far before the mark when scrolling back
pub const BACK_FACE_EPSILON: f64 = 0.001;

/// Collapse keyframes: (scale, translate as share of height, opacity)
const COLLAPSE_STEPS: [(f64, f64, f64); 4] = [
    (1.0, 0.0, 1.0),
    (0.95, 0.02, 0.85),
    (0.8, 0.06, 0.5),
    (0.65, 0.12, 0.0),
];

/// Everything a build depends on; equal inputs give equal timelines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildInput {
    pub page_count: usize,
    pub layout: BookLayout,
    /// A programmatic navigation is running
    pub abbreviated: bool,
}

/// Segment set for one book plus the slots it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct PageTimeline {
    input: BuildInput,
    slots: PageSlots,
    segments: Vec<TimelineSegment>,
}

impl PageTimeline {
    pub fn input(&self) -> BuildInput {
        self.input
    }

    pub fn slots(&self) -> &PageSlots {
        &self.slots
    }

    pub fn segments(&self) -> &[TimelineSegment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<TimelineSegment> {
        self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PageTimelineBuilder {
    ratios: PhaseRatios,
}

impl PageTimelineBuilder {
    pub fn new(ratios: PhaseRatios) -> Self {
        Self { ratios }
    }

    pub fn ratios(&self) -> PhaseRatios {
        self.ratios
    }

    pub fn build(&self, input: BuildInput) -> Result<PageTimeline> {
        let slots = PageSlots::new(input.page_count, self.ratios)?;
        let mut segments = Vec::new();

        cover(&mut segments);
        for slot in slots.iter() {
            content(&mut segments, slot, &input);
            flip(&mut segments, slot);
        }
        collapse(&mut segments, &input.layout);

        debug!(
            pages = input.page_count,
            abbreviated = input.abbreviated,
            segments = segments.len(),
            "Built page timeline"
        );

        Ok(PageTimeline {
            input,
            slots,
            segments,
        })
    }
}

fn cover(out: &mut Vec<TimelineSegment>) {
    out.push(
        TimelineSegment::new(Handle::Cover, Property::RotateY, 0.0, TURN_ANGLE)
            .at(0.0, COVER_END)
            .eased(EasingType::EaseInOut),
    );
}

fn content(out: &mut Vec<TimelineSegment>, slot: &PageSlot, input: &BuildInput) {
    let share = if input.abbreviated {
        CONTENT_DURATION_ABBREVIATED
    } else {
        CONTENT_DURATION
    };
    let duration = slot.content_phase * share;
    let rise = input.layout.height * CONTENT_RISE;

    for role in ContentRole::ALL {
        let handle = Handle::Content(slot.index, role);
        let start = slot.start + slot.content_phase * role.offset();
        out.push(
            TimelineSegment::new(handle, Property::Opacity, 0.0, 1.0)
                .at(start, duration)
                .eased(EasingType::Cubic),
        );
        out.push(
            TimelineSegment::new(handle, Property::TranslateY, rise, 0.0)
                .at(start, duration)
                .eased(EasingType::Cubic),
        );
    }
}

fn flip(out: &mut Vec<TimelineSegment>, slot: &PageSlot) {
    let i = slot.index;
    let curl_start = slot.flip_start();
    let curl_len = slot.flip_phase * CURL_SHARE;
    let turn_start = curl_start + curl_len;
    let turn_len = slot.flip_phase * TURN_SHARE;
    let settle_start = turn_start + turn_len;
    let settle_len = slot.flip_phase * SETTLE_SHARE;

    // Curl: lift the corner and cast a shadow
    out.push(
        TimelineSegment::new(Handle::PageFront(i), Property::Curl, 0.0, CURL_ANGLE)
            .at(curl_start, curl_len)
            .eased(EasingType::EaseIn),
    );
    out.push(
        TimelineSegment::new(Handle::PageShadow(i), Property::Opacity, 0.0, SHADOW_OPACITY)
            .at(curl_start, curl_len),
    );

    // Main turn
    out.push(
        TimelineSegment::new(Handle::PageFront(i), Property::RotateY, 0.0, TURN_ANGLE)
            .at(turn_start, turn_len)
            .eased(EasingType::EaseInOut),
    );
    out.push(
        TimelineSegment::new(Handle::PageFront(i), Property::Curl, CURL_ANGLE, 0.0)
            .at(turn_start, turn_len)
            .eased(EasingType::EaseOut),
    );

    // Back face: hidden just before the mark (return path), shown at the mark
    let mark = turn_start + turn_len * BACK_FACE_MARK;
    out.push(TimelineSegment::step(
        Handle::PageBack(i),
        Property::Visible,
        0.0,
        mark - BACK_FACE_EPSILON,
    ));
    out.push(
        TimelineSegment::new(Handle::PageBack(i), Property::Visible, 0.0, 1.0)
            .at(mark, 0.0)
            .eased(EasingType::None),
    );

    // Settle
    out.push(
        TimelineSegment::new(Handle::PageShadow(i), Property::Opacity, SHADOW_OPACITY, 0.0)
            .at(settle_start, settle_len)
            .eased(EasingType::Cubic),
    );
}

fn collapse(out: &mut Vec<TimelineSegment>, layout: &BookLayout) {
    let step_len = (CONTACT_SETTLED - CONTACT_FADE_START) / (COLLAPSE_STEPS.len() - 1) as f64;

    for (n, pair) in COLLAPSE_STEPS.windows(2).enumerate() {
        let (scale_from, lift_from, fade_from) = pair[0];
        let (scale_to, lift_to, fade_to) = pair[1];
        let start = CONTACT_FADE_START + n as f64 * step_len;

        out.push(
            TimelineSegment::new(Handle::Artifact, Property::Scale, scale_from, scale_to)
                .at(start, step_len)
                .eased(EasingType::Sine),
        );
        out.push(
            TimelineSegment::new(
                Handle::Artifact,
                Property::TranslateY,
                -layout.height * lift_from,
                -layout.height * lift_to,
            )
            .at(start, step_len)
            .eased(EasingType::Sine),
        );
        out.push(
            TimelineSegment::new(Handle::Artifact, Property::Opacity, fade_from, fade_to)
                .at(start, step_len)
                .eased(EasingType::Linear),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScrubTimeline;
    use crate::Error;

    fn input(page_count: usize) -> BuildInput {
        BuildInput {
            page_count,
            layout: BookLayout::default(),
            abbreviated: false,
        }
    }

    fn scrubbed(timeline: &PageTimeline) -> ScrubTimeline {
        let mut scrub = ScrubTimeline::new();
        for seg in timeline.segments() {
            scrub.insert(seg.clone());
        }
        scrub
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let builder = PageTimelineBuilder::default();
        let first = builder.build(input(9)).unwrap();
        let second = builder.build(input(9)).unwrap();
        assert_eq!(first, second);

        let mut keys: Vec<String> = first
            .segments()
            .iter()
            .map(|s| format!("{:?}", s))
            .collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total, "duplicate segments in one build");
    }

    #[test]
    fn test_segment_count_scales_with_pages() {
        let builder = PageTimelineBuilder::default();
        // cover + 7 roles * 2 + 7 flip segments per page + 3 collapse steps * 3
        let expected = |n: usize| 1 + n * (14 + 7) + 9;
        assert_eq!(builder.build(input(1)).unwrap().len(), expected(1));
        assert_eq!(builder.build(input(9)).unwrap().len(), expected(9));
    }

    #[test]
    fn test_rejects_empty_book_and_bad_ratios() {
        let err = PageTimelineBuilder::default().build(input(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidPageCount(0)));

        let lopsided = PageTimelineBuilder::new(PhaseRatios {
            content: 0.7,
            flip: 0.4,
        });
        assert!(matches!(lopsided.build(input(3)), Err(Error::PhaseRatio { .. })));
    }

    #[test]
    fn test_cover_opens_in_cover_phase() {
        let timeline = PageTimelineBuilder::default().build(input(9)).unwrap();
        let scrub = scrubbed(&timeline);
        assert_eq!(scrub.value(Handle::Cover, Property::RotateY, 0.0), Some(0.0));
        assert_eq!(scrub.value(Handle::Cover, Property::RotateY, COVER_END), Some(TURN_ANGLE));
    }

    #[test]
    fn test_abbreviated_content_is_shorter() {
        let builder = PageTimelineBuilder::default();
        let full = builder.build(input(4)).unwrap();
        let short = builder
            .build(BuildInput {
                abbreviated: true,
                ..input(4)
            })
            .unwrap();

        let reveal = |t: &PageTimeline| {
            t.segments()
                .iter()
                .find(|s| {
                    s.target == Handle::Content(0, ContentRole::Title)
                        && s.property == Property::Opacity
                })
                .map(|s| s.duration)
                .unwrap()
        };
        let slot = *full.slots().get(0).unwrap();
        assert!((reveal(&full) - slot.content_phase * 0.4).abs() < 1e-12);
        assert!((reveal(&short) - slot.content_phase * 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_back_face_hidden_until_mark() {
        let timeline = PageTimelineBuilder::default().build(input(9)).unwrap();
        let scrub = scrubbed(&timeline);
        let slot = *timeline.slots().get(4).unwrap();
        let turn_start = slot.flip_start() + slot.flip_phase * CURL_SHARE;
        let turn_len = slot.flip_phase * TURN_SHARE;
        let mark = turn_start + turn_len * BACK_FACE_MARK;
        let visible = |p: f64| scrub.value(Handle::PageBack(4), Property::Visible, p).unwrap();

        // Never during the forward rotation before the mark
        let mut p = slot.start;
        while p < mark - BACK_FACE_EPSILON {
            assert_eq!(visible(p), 0.0, "back face visible at {}", p);
            p += turn_len / 50.0;
        }
        // Return path window just before the mark is hidden too
        assert_eq!(visible(mark - BACK_FACE_EPSILON / 2.0), 0.0);
        assert_eq!(visible(mark), 1.0);
        assert_eq!(visible(slot.end() + 0.01), 1.0);
    }

    #[test]
    fn test_page_turn_completes_and_reverses() {
        let timeline = PageTimelineBuilder::default().build(input(9)).unwrap();
        let scrub = scrubbed(&timeline);
        let slot = *timeline.slots().get(2).unwrap();

        assert_eq!(scrub.value(Handle::PageFront(2), Property::RotateY, slot.start), Some(0.0));
        let later = slot.end() + slot.window;
        let after = scrub.value(Handle::PageFront(2), Property::RotateY, later).unwrap();
        assert_eq!(after, TURN_ANGLE);
        // Curl returns to flat once the turn is over
        assert_eq!(scrub.value(Handle::PageFront(2), Property::Curl, later), Some(0.0));
    }

    #[test]
    fn test_collapse_keyframes() {
        let timeline = PageTimelineBuilder::default().build(input(9)).unwrap();
        let scrub = scrubbed(&timeline);
        let scale = |p: f64| scrub.value(Handle::Artifact, Property::Scale, p).unwrap();

        assert_eq!(scale(0.5), 1.0);
        assert_eq!(scale(CONTACT_FADE_START), 1.0);
        assert!((scale(CONTACT_FADE_START + 0.07 / 3.0) - 0.95).abs() < 1e-9);
        assert!((scale(CONTACT_SETTLED) - 0.65).abs() < 1e-9);
        assert!((scale(1.0) - 0.65).abs() < 1e-9);

        // Scrolling back through the collapse retraces it
        let mut prev = scale(CONTACT_SETTLED);
        let mut p = CONTACT_SETTLED;
        while p > CONTACT_FADE_START {
            p -= 0.005;
            let s = scale(p);
            assert!(s >= prev - 1e-12);
            prev = s;
        }
    }
}
