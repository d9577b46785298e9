//! Passive mode: progress → page index, contact panel state, scroll clamp

use serde::Serialize;
use tracing::{debug, trace};

use crate::arbiter::ModeArbiter;
use crate::engine::timing::inverse_lerp;
use crate::phase::{clamp_progress, page_window, CONTACT_FADE_START, CONTACT_SETTLED, COVER_END};
use crate::sink::{ContactStyle, StyleSink};
use crate::source::{ScrollBounds, ScrollProgressSource};

/// Absorbs float error when progress lands exactly on a slot start
const PAGE_EPSILON: f64 = 1e-9;

/// Contact panel accepts pointer events above this opacity
pub const CONTACT_INTERACTIVE_OPACITY: f64 = 0.5;

pub const INDICATOR_ACTIVE: f64 = 1.0;
pub const INDICATOR_INACTIVE: f64 = 0.35;

/// Derived passive state for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PassiveState {
    pub current_page_index: usize,
    pub contact_opacity: f64,
    pub contact_interactive: bool,
    /// Offset the source must be forced back to, if any
    pub scroll_clamp: Option<f64>,
}

impl PassiveState {
    pub fn contact_style(&self) -> ContactStyle {
        ContactStyle {
            opacity: self.contact_opacity,
            visible: self.contact_opacity > 0.0,
            interactive: self.contact_interactive,
        }
    }
}

/// Fractional page position: 0 at the first slot start, N at the contact boundary
#[inline]
pub fn page_progress(p: f64, page_count: usize) -> f64 {
    ((clamp_progress(p) - COVER_END) / page_window(page_count)).max(0.0)
}

#[inline]
pub fn current_page_index(p: f64, page_count: usize) -> usize {
    let last = page_count.saturating_sub(1);
    let index = (page_progress(p, page_count) + PAGE_EPSILON).floor() as usize;
    index.min(last)
}

#[inline]
pub fn contact_opacity(p: f64) -> f64 {
    let p = clamp_progress(p);
    if p < CONTACT_FADE_START {
        0.0
    } else if p >= CONTACT_SETTLED {
        1.0
    } else {
        inverse_lerp(CONTACT_FADE_START, CONTACT_SETTLED, p)
    }
}

#[inline]
pub fn is_contact_interactive(opacity: f64) -> bool {
    opacity > CONTACT_INTERACTIVE_OPACITY
}

/// One-way clamp: past the contact boundary, offsets beyond it snap back
///
/// Backward scroll is never restricted.
pub fn scroll_clamp(p: f64, offset: f64, bounds: ScrollBounds) -> Option<f64> {
    if clamp_progress(p) < CONTACT_SETTLED {
        return None;
    }
    let limit = bounds.offset_at(CONTACT_SETTLED);
    (offset > limit).then_some(limit)
}

/// Pure mapping of one progress reading
pub fn map_progress(p: f64, page_count: usize, offset: f64, bounds: ScrollBounds) -> PassiveState {
    let opacity = contact_opacity(p);
    PassiveState {
        current_page_index: current_page_index(p, page_count),
        contact_opacity: opacity,
        contact_interactive: is_contact_interactive(opacity),
        scroll_clamp: scroll_clamp(p, offset, bounds),
    }
}

/// Indicator opacities with the current page highlighted
pub fn indicator_opacities(current: usize, page_count: usize) -> Vec<f64> {
    (0..page_count)
        .map(|i| if i == current { INDICATOR_ACTIVE } else { INDICATOR_INACTIVE })
        .collect()
}

/// Passive handler run once per frame
#[derive(Debug, Clone)]
pub struct ProgressToStateMapper {
    arbiter: ModeArbiter,
    page_count: usize,
}

impl ProgressToStateMapper {
    pub fn new(arbiter: ModeArbiter, page_count: usize) -> Self {
        Self {
            arbiter,
            page_count: page_count.max(1),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn set_page_count(&mut self, page_count: usize) {
        self.page_count = page_count.max(1);
    }

    /// Map the source's progress and push the result to flags, sink and source
    ///
    /// Returns `None` when a smart navigation owns the viewport; nothing is
    /// written in that case.
    pub fn on_tick(
        &self,
        source: &mut dyn ScrollProgressSource,
        sink: &mut dyn StyleSink,
    ) -> Option<PassiveState> {
        if self.arbiter.passive_suppressed() {
            trace!("Passive tick suppressed during smart navigation");
            return None;
        }

        let state = map_progress(
            source.progress(),
            self.page_count,
            source.offset(),
            source.bounds(),
        );

        self.arbiter.set_current_page(state.current_page_index);
        sink.apply_page_index(state.current_page_index);
        sink.apply_contact(state.contact_style());
        sink.apply_indicators(&indicator_opacities(state.current_page_index, self.page_count));

        if let Some(limit) = state.scroll_clamp {
            debug!(offset = source.offset(), limit, "Clamping scroll at contact boundary");
            source.set_offset(limit);
        }

        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbiter::NavigationLock;
    use crate::sink::RecordingSink;
    use crate::source::PinnedRegion;

    #[test]
    fn test_page_index_scenario_a() {
        assert!((page_progress(0.5, 9) - 4.5).abs() < 1e-9);
        assert_eq!(current_page_index(0.5, 9), 4);
    }

    #[test]
    fn test_contact_settled_scenario_b() {
        let bounds = ScrollBounds::new(0.0, 1000.0);
        let state = map_progress(0.95, 9, 950.0, bounds);
        assert_eq!(state.contact_opacity, 1.0);
        assert!(state.contact_interactive);
        assert_eq!(state.current_page_index, 8);
        assert!((state.scroll_clamp.unwrap() - 920.0).abs() < 1e-9);
    }

    #[test]
    fn test_page_index_bounded_and_monotonic() {
        for n in [1usize, 2, 3, 7, 9, 25] {
            let mut prev = 0;
            for i in 0..=1000 {
                let p = i as f64 / 1000.0;
                let index = current_page_index(p, n);
                assert!(index < n, "index {} out of range for n={} p={}", index, n, p);
                assert!(index >= prev, "index decreased at p={} n={}", p, n);
                prev = index;
            }
        }
    }

    #[test]
    fn test_slot_start_maps_to_its_page() {
        let slots = crate::phase::PageSlots::new(9, Default::default()).unwrap();
        for slot in slots.iter() {
            assert_eq!(current_page_index(slot.start, 9), slot.index);
        }
    }

    #[test]
    fn test_contact_opacity_shape() {
        assert_eq!(contact_opacity(0.0), 0.0);
        assert_eq!(contact_opacity(0.8499), 0.0);
        assert_eq!(contact_opacity(0.85), 0.0);
        assert!((contact_opacity(0.885) - 0.5).abs() < 1e-9);
        assert_eq!(contact_opacity(0.92), 1.0);
        assert_eq!(contact_opacity(1.0), 1.0);

        let mut prev = 0.0;
        let mut p = CONTACT_FADE_START;
        while p <= CONTACT_SETTLED {
            let o = contact_opacity(p);
            assert!(o >= prev);
            // Continuous: small steps in p give small steps in opacity
            assert!(o - prev < 0.02);
            prev = o;
            p += 0.0005;
        }
    }

    #[test]
    fn test_interactive_only_past_half() {
        assert!(!is_contact_interactive(contact_opacity(0.88)));
        assert!(is_contact_interactive(contact_opacity(0.89)));
    }

    #[test]
    fn test_clamp_is_one_way() {
        let bounds = ScrollBounds::new(0.0, 1000.0);
        assert_eq!(scroll_clamp(0.9, 900.0, bounds), None);
        assert_eq!(scroll_clamp(0.92, 920.0, bounds), None);
        assert!(scroll_clamp(0.97, 970.0, bounds).is_some());
    }

    #[test]
    fn test_tick_writes_flags_sink_and_clamp() {
        let arbiter = ModeArbiter::new();
        let mapper = ProgressToStateMapper::new(arbiter.clone(), 9);
        let mut region = PinnedRegion::with_length(1000.0);
        let mut sink = RecordingSink::new();

        region.set_offset(980.0);
        let state = mapper.on_tick(&mut region, &mut sink).unwrap();

        assert_eq!(state.current_page_index, 8);
        assert_eq!(arbiter.current_page(), 8);
        assert_eq!(sink.page_index, Some(8));
        assert_eq!(sink.indicators.len(), 9);
        assert_eq!(sink.indicators[8], INDICATOR_ACTIVE);
        assert!(sink.contact.unwrap().interactive);
        assert!((region.offset() - 920.0).abs() < 1e-9);

        // Backward scroll is not restricted
        region.set_offset(500.0);
        mapper.on_tick(&mut region, &mut sink);
        assert_eq!(region.offset(), 500.0);
        assert_eq!(arbiter.current_page(), 4);
    }

    #[test]
    fn test_smart_scrolling_suppresses_everything() {
        let arbiter = ModeArbiter::new();
        let mapper = ProgressToStateMapper::new(arbiter.clone(), 9);
        let mut region = PinnedRegion::with_length(1000.0);
        let mut sink = RecordingSink::new();

        arbiter.set_current_page(2);
        arbiter.begin(NavigationLock::SMART);
        region.set_offset(990.0);

        assert!(mapper.on_tick(&mut region, &mut sink).is_none());
        assert_eq!(arbiter.current_page(), 2);
        assert_eq!(sink.passive_writes, 0);
        assert!(sink.contact.is_none());
        assert_eq!(region.offset(), 990.0);
    }
}
