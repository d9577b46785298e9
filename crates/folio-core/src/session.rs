//! One flipbook on one page
//!
//! `FlipbookSession` owns the engine, the built timeline, the passive mapper
//! and the navigation controller, and shares one [`ModeArbiter`] between
//! them. The host drives it with lifecycle hooks and one [`frame`] call per
//! render tick.
//!
//! [`frame`]: FlipbookSession::frame

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::arbiter::{ModeArbiter, SessionFlags};
use crate::config::FolioConfig;
use crate::engine::TimelineEngine;
use crate::mapper::{PassiveState, ProgressToStateMapper};
use crate::navigation::{
    NavState, NavigationController, NavigationHandle, NavigationOutcome, NavigationRequest, Ticket,
};
use crate::phase::{BookLayout, PageSlots, CONTACT_SETTLED};
use crate::sink::StyleSink;
use crate::source::ScrollProgressSource;
use crate::timeline::{BuildInput, PageTimelineBuilder};
use crate::Result;

/// What one frame did
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameReport {
    pub progress: f64,
    /// Playbacks that terminated this frame
    pub finished: usize,
    /// Segments were disposed and rebuilt
    pub rebuilt: bool,
    /// `None` when the passive tick was skipped
    pub passive: Option<PassiveState>,
    pub nav_state: NavState,
}

impl FrameReport {
    fn idle() -> Self {
        Self {
            progress: 0.0,
            finished: 0,
            rebuilt: false,
            passive: None,
            nav_state: NavState::Idle,
        }
    }
}

pub struct FlipbookSession<S: ScrollProgressSource, K: StyleSink> {
    arbiter: ModeArbiter,
    builder: PageTimelineBuilder,
    engine: TimelineEngine,
    mapper: ProgressToStateMapper,
    controller: NavigationController,
    sink: K,
    source: Option<S>,
    /// Requests issued before a source was attached
    pending: VecDeque<(NavigationRequest, Ticket)>,
    layout: BookLayout,
    page_count: usize,
    built: Option<BuildInput>,
    in_view: bool,
}

impl<S: ScrollProgressSource, K: StyleSink> FlipbookSession<S, K> {
    pub fn new(config: &FolioConfig, sink: K) -> Result<Self> {
        let ratios = config.book.ratios();
        let slots = PageSlots::new(config.book.page_count, ratios)?;
        let page_count = slots.len();
        let arbiter = ModeArbiter::new();

        info!(pages = page_count, "Creating flipbook session");

        Ok(Self {
            builder: PageTimelineBuilder::new(ratios),
            engine: TimelineEngine::new(),
            mapper: ProgressToStateMapper::new(arbiter.clone(), page_count),
            controller: NavigationController::new(
                arbiter.clone(),
                config.navigation.clone(),
                slots,
            ),
            arbiter,
            sink,
            source: None,
            pending: VecDeque::new(),
            layout: config.book.layout(),
            page_count,
            built: None,
            in_view: true,
        })
    }

    // --- lifecycle ---

    /// Attach the scroll source and replay requests that were waiting for it
    pub fn attach(&mut self, source: S) {
        info!(pending = self.pending.len(), "Scroll source attached");
        self.source = Some(source);
        self.flush_pending();
    }

    /// Interrupt any navigation and hand the source back
    pub fn detach(&mut self) -> Option<S> {
        let mut source = self.source.take()?;
        self.controller.interrupt(&mut self.engine, &mut source);
        self.engine.kill_all(&mut source);
        Some(source)
    }

    pub fn is_ready(&self) -> bool {
        self.source.is_some()
    }

    /// The pinned region entered the viewport
    pub fn on_enter(&mut self) {
        debug!("Pinned region entered");
        self.in_view = true;
    }

    /// The pinned region left the viewport; passive ticks stop
    pub fn on_leave(&mut self) {
        debug!("Pinned region left");
        self.in_view = false;
    }

    /// Layout was measured again; segments are rebuilt on the next frame
    pub fn on_refresh(&mut self, layout: BookLayout) {
        if layout != self.layout {
            debug!(width = layout.width, height = layout.height, "Layout changed");
            self.layout = layout;
        }
    }

    /// Change the number of pages; any active navigation is interrupted
    pub fn set_page_count(&mut self, page_count: usize) -> Result<()> {
        let slots = PageSlots::new(page_count, self.builder.ratios())?;
        if page_count == self.page_count {
            return Ok(());
        }
        self.interrupt();
        info!(from = self.page_count, to = page_count, "Page count changed");
        self.page_count = page_count;
        self.mapper.set_page_count(page_count);
        self.controller.set_slots(slots);
        Ok(())
    }

    /// Tear everything down: navigations, pending requests, segments, flags
    ///
    /// Returns the source with raw input re-enabled.
    pub fn unmount(&mut self) -> Option<S> {
        self.resolve_pending(NavigationOutcome::Interrupted);
        let mut source = self.source.take();
        if let Some(source) = source.as_mut() {
            self.controller.interrupt(&mut self.engine, source);
            self.engine.dispose(source);
            source.set_input_enabled(true);
        } else {
            self.engine.dispose_segments();
        }
        self.built = None;
        self.arbiter.reset();
        info!("Flipbook session unmounted");
        source
    }

    // --- per frame ---

    /// Advance playback, rebuild if needed, scrub, then run the passive tick
    pub fn frame(&mut self, dt: Duration) -> FrameReport {
        let finished = match self.source.as_mut() {
            Some(source) => self.engine.advance(dt, source),
            None => return FrameReport::idle(),
        };
        self.controller.retire(&finished);

        let rebuilt = self.ensure_timeline();

        let Some(source) = self.source.as_mut() else {
            return FrameReport::idle();
        };
        let progress = source.progress();
        let sample = self.engine.scrub(progress);
        self.sink.apply_sample(&sample);

        let passive = if self.in_view {
            self.mapper.on_tick(source, &mut self.sink)
        } else {
            None
        };

        FrameReport {
            progress,
            finished: finished.len(),
            rebuilt,
            passive,
            nav_state: self.controller.state(&self.engine),
        }
    }

    /// Dispose stale segments and rebuild when the build key changed
    fn ensure_timeline(&mut self) -> bool {
        let input = BuildInput {
            page_count: self.page_count,
            layout: self.layout,
            abbreviated: self.arbiter.is_animating(),
        };
        if self.built == Some(input) {
            return false;
        }

        match self.builder.build(input) {
            Ok(timeline) => {
                self.engine.dispose_segments();
                self.engine.insert_all(timeline.into_segments());
                self.built = Some(input);
                true
            }
            Err(e) => {
                warn!(error = %e, "Timeline rebuild failed, keeping previous segments");
                false
            }
        }
    }

    // --- navigation ---

    /// Issue a navigation; deferred until a source is attached
    pub fn request(&mut self, request: NavigationRequest) -> NavigationHandle {
        let (handle, ticket) = NavigationHandle::pair();
        match self.source.as_mut() {
            Some(source) => self.controller.dispatch(request, ticket, &mut self.engine, source),
            None => {
                debug!(?request, "Scroll source not attached, deferring request");
                self.pending.push_back((request, ticket));
            }
        }
        handle
    }

    pub fn scroll_to_page(&mut self, page: usize) -> NavigationHandle {
        self.request(NavigationRequest::GoToPage(page))
    }

    pub fn scroll_to_last_page(&mut self) -> NavigationHandle {
        self.request(NavigationRequest::LastPage)
    }

    pub fn natural_page_flip(&mut self, page: usize) -> NavigationHandle {
        self.request(NavigationRequest::FlipToPage(page))
    }

    pub fn scroll_to_contact(&mut self) -> NavigationHandle {
        self.request(NavigationRequest::GoToContact)
    }

    pub fn smart_scroll_to_contact(&mut self) -> NavigationHandle {
        self.request(NavigationRequest::SmartGoToContact)
    }

    /// Interrupt the active navigation, if any
    pub fn interrupt(&mut self) -> bool {
        match self.source.as_mut() {
            Some(source) => self.controller.interrupt(&mut self.engine, source),
            None => false,
        }
    }

    /// Non-animated fallback: put the viewport on the contact boundary
    pub fn jump_to_contact(&mut self) {
        let Some(source) = self.source.as_mut() else {
            warn!("Jump to contact without a scroll source");
            return;
        };
        self.controller.interrupt(&mut self.engine, source);
        let offset = source.bounds().offset_at(CONTACT_SETTLED);
        source.set_offset(offset);
        self.arbiter.set_current_page(self.page_count - 1);
        info!(offset, "Jumped to contact without animation");
    }

    fn flush_pending(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        while let Some((request, ticket)) = self.pending.pop_front() {
            if ticket.is_cancelled() {
                ticket.resolve(NavigationOutcome::Interrupted);
                continue;
            }
            debug!(?request, "Replaying deferred request");
            self.controller.dispatch(request, ticket, &mut self.engine, source);
        }
    }

    fn resolve_pending(&mut self, outcome: NavigationOutcome) {
        for (_, ticket) in self.pending.drain(..) {
            ticket.resolve(outcome);
        }
    }

    // --- observation ---

    pub fn current_page(&self) -> usize {
        self.arbiter.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.page_count
    }

    pub fn flags(&self) -> SessionFlags {
        self.arbiter.flags()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionFlags> {
        self.arbiter.subscribe()
    }

    pub fn is_animating(&self) -> bool {
        self.arbiter.is_animating()
    }

    pub fn is_auto_scrolling(&self) -> bool {
        self.arbiter.is_auto_scrolling()
    }

    pub fn is_smart_scrolling(&self) -> bool {
        self.arbiter.is_smart_scrolling()
    }

    pub fn nav_state(&self) -> NavState {
        self.controller.state(&self.engine)
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    pub fn layout(&self) -> BookLayout {
        self.layout
    }

    pub fn in_view(&self) -> bool {
        self.in_view
    }

    pub fn engine(&self) -> &TimelineEngine {
        &self.engine
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    pub fn source_mut(&mut self) -> Option<&mut S> {
        self.source.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavStage;
    use crate::phase::PhaseRatios;
    use crate::sink::RecordingSink;
    use crate::source::PinnedRegion;

    const DT: Duration = Duration::from_millis(16);

    type TestSession = FlipbookSession<PinnedRegion, RecordingSink>;

    fn session() -> TestSession {
        let mut session = TestSession::new(&FolioConfig::default(), RecordingSink::new()).unwrap();
        session.attach(PinnedRegion::with_length(10_000.0));
        session
    }

    fn run(session: &mut TestSession, total: Duration) {
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            session.frame(DT);
            elapsed += DT;
        }
    }

    fn scroll_to(session: &mut TestSession, progress: f64) {
        session
            .source_mut()
            .unwrap()
            .user_scroll_to_progress(progress);
    }

    #[test]
    fn test_rejects_invalid_book() {
        let mut config = FolioConfig::default();
        config.book.page_count = 0;
        assert!(matches!(
            TestSession::new(&config, RecordingSink::new()),
            Err(crate::Error::InvalidPageCount(0))
        ));

        let mut config = FolioConfig::default();
        config.book.flip_ratio = 0.5;
        assert!(matches!(
            TestSession::new(&config, RecordingSink::new()),
            Err(crate::Error::PhaseRatio { .. })
        ));
    }

    #[test]
    fn test_first_frame_builds_once() {
        let mut session = session();
        let expected = PageTimelineBuilder::new(PhaseRatios::default())
            .build(BuildInput {
                page_count: 9,
                layout: BookLayout::default(),
                abbreviated: false,
            })
            .unwrap()
            .len();

        assert!(session.frame(DT).rebuilt);
        assert!(!session.frame(DT).rebuilt);
        assert_eq!(session.engine().segment_count(), expected);

        // Same layout again is not a change
        session.on_refresh(BookLayout::default());
        assert!(!session.frame(DT).rebuilt);

        // Resizes rebuild without accumulating
        for width in [60.0, 72.0, 60.0] {
            session.on_refresh(BookLayout { width, height: 30.0 });
            assert!(session.frame(DT).rebuilt);
            assert_eq!(session.engine().segment_count(), expected);
        }
    }

    #[test]
    fn test_navigation_switches_to_abbreviated_timeline() {
        let mut session = session();
        session.frame(DT);

        session.scroll_to_page(2);
        assert!(session.frame(DT).rebuilt);
        run(&mut session, Duration::from_millis(1600));
        assert!(!session.is_animating());
        // Back to the full reveal once idle
        assert!(!session.frame(DT).rebuilt);
    }

    #[test]
    fn test_passive_tick_follows_user_scroll() {
        let mut session = session();
        scroll_to(&mut session, 0.5);
        let report = session.frame(DT);

        let passive = report.passive.unwrap();
        assert_eq!(passive.current_page_index, 4);
        assert_eq!(session.current_page(), 4);
        assert_eq!(session.sink().page_index, Some(4));
        assert!(session.sink().sample.is_some());
        assert!((report.progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_applies_past_contact_boundary() {
        let mut session = session();
        scroll_to(&mut session, 0.97);
        let report = session.frame(DT);
        assert!(report.passive.unwrap().scroll_clamp.is_some());
        let progress = session.source().unwrap().progress();
        assert!((progress - CONTACT_SETTLED).abs() < 1e-9);
    }

    #[test]
    fn test_smart_navigation_from_page_three() {
        let mut session = session();
        session.scroll_to_page(3);
        run(&mut session, Duration::from_millis(1600));
        assert_eq!(session.current_page(), 3);

        let mut handle = session.smart_scroll_to_contact();
        let writes_before = session.sink().passive_writes;
        let page_before = session.sink().page_index;

        session.frame(DT);
        assert_eq!(session.nav_state(), NavState::Navigating(NavStage::Flip));
        run(&mut session, Duration::from_millis(1600));
        assert_eq!(session.nav_state(), NavState::Navigating(NavStage::Gap));

        // Passive surface untouched while the smart navigation owns it
        assert_eq!(session.sink().passive_writes, writes_before);
        assert_eq!(session.sink().page_index, page_before);
        assert_eq!(session.current_page(), 3);

        run(&mut session, Duration::from_millis(1800));
        assert_eq!(handle.try_outcome(), Some(NavigationOutcome::Completed));

        let flags = session.flags();
        assert!(flags.is_idle());
        assert_eq!(flags.current_page, 8);
        let contact = session.sink().contact.unwrap();
        assert_eq!(contact.opacity, 1.0);
        assert!(contact.interactive);
    }

    #[test]
    fn test_rapid_smart_requests_run_once() {
        let mut session = session();
        let mut first = session.smart_scroll_to_contact();
        let mut second = session.smart_scroll_to_contact();

        assert_eq!(second.try_outcome(), Some(NavigationOutcome::Skipped));
        assert_eq!(session.engine().playback_count(), 1);
        run(&mut session, Duration::from_secs(5));
        assert_eq!(first.try_outcome(), Some(NavigationOutcome::Completed));
    }

    #[test]
    fn test_interrupt_mid_flip_restores_input() {
        let mut session = session();
        let mut handle = session.natural_page_flip(6);
        run(&mut session, Duration::from_millis(400));
        assert!(!session.source().unwrap().input_enabled());

        assert!(session.interrupt());
        assert_eq!(handle.try_outcome(), Some(NavigationOutcome::Interrupted));
        assert!(session.flags().is_idle());
        assert!(session.source().unwrap().input_enabled());
        assert_eq!(session.nav_state(), NavState::Idle);
    }

    #[test]
    fn test_flip_and_return() {
        let mut session = session();
        session.frame(DT);
        let original = session.current_page();

        session.natural_page_flip(5);
        run(&mut session, Duration::from_secs(3));
        assert_eq!(session.current_page(), 5);

        session.natural_page_flip(original);
        run(&mut session, Duration::from_secs(3));
        assert_eq!(session.current_page(), original);
        assert!(session.flags().is_idle());
    }

    #[tokio::test]
    async fn test_request_before_attach_waits_for_source() {
        let mut session = TestSession::new(&FolioConfig::default(), RecordingSink::new()).unwrap();
        let handle = session.scroll_to_page(2);
        let cancelled = session.scroll_to_contact();
        cancelled.cancel();

        assert!(!session.is_ready());
        assert_eq!(session.pending_requests(), 2);
        assert_eq!(session.frame(DT), FrameReport::idle());

        session.attach(PinnedRegion::with_length(10_000.0));
        assert_eq!(session.pending_requests(), 0);
        assert!(session.is_animating());
        assert_eq!(cancelled.await, NavigationOutcome::Interrupted);

        run(&mut session, Duration::from_millis(1600));
        assert_eq!(handle.await, NavigationOutcome::Completed);
        assert_eq!(session.current_page(), 2);
    }

    #[tokio::test]
    async fn test_unmount_resolves_everything() {
        let mut session = session();
        let running = session.smart_scroll_to_contact();
        run(&mut session, Duration::from_millis(500));

        let source = session.unmount().unwrap();
        assert!(source.input_enabled());
        assert_eq!(running.await, NavigationOutcome::Interrupted);
        assert_eq!(session.flags(), SessionFlags::default());
        assert_eq!(session.engine().segment_count(), 0);
        assert_eq!(session.engine().playback_count(), 0);
        assert!(!session.is_ready());
    }

    #[test]
    fn test_leave_stops_passive_ticks() {
        let mut session = session();
        session.on_leave();
        scroll_to(&mut session, 0.5);
        assert!(session.frame(DT).passive.is_none());
        assert_eq!(session.current_page(), 0);

        session.on_enter();
        assert!(session.frame(DT).passive.is_some());
        assert_eq!(session.current_page(), 4);
    }

    #[test]
    fn test_jump_to_contact_fallback() {
        let mut session = session();
        session.natural_page_flip(4);
        session.frame(DT);

        session.jump_to_contact();
        assert!(session.flags().is_idle());
        assert!((session.source().unwrap().progress() - CONTACT_SETTLED).abs() < 1e-9);

        session.frame(DT);
        assert_eq!(session.current_page(), 8);
        assert!(session.sink().contact.unwrap().interactive);
    }

    #[test]
    fn test_page_count_change() {
        let mut session = session();
        session.frame(DT);
        assert!(session.set_page_count(0).is_err());
        assert_eq!(session.total_pages(), 9);

        session.set_page_count(4).unwrap();
        assert!(session.frame(DT).rebuilt);
        scroll_to(&mut session, 0.99);
        session.frame(DT);
        assert_eq!(session.current_page(), 3);
    }
}
