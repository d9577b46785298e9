//! Navigation state machine
//!
//! ```text
//! Idle → Navigating(Flip) → Navigating(Gap) → Navigating(ContactScroll) → Idle
//!             └──────────────── interruption ───────────────────────────┘
//! ```
//!
//! Every navigation is one engine playback with one finalizer. Flags are
//! raised together before the playback starts and released together inside
//! the finalizer, on completion and interruption alike.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::{NavStage, NavState, NavigationId, NavigationOutcome, NavigationRequest, Ticket};
use crate::arbiter::{ModeArbiter, NavigationLock};
use crate::config::NavigationConfig;
use crate::engine::{Finalizer, PlaybackId, PlaybackOutcome, PlaybackPlan, TimelineEngine};
use crate::mapper::{current_page_index, page_progress};
use crate::phase::{PageSlots, CONTACT_SETTLED};
use crate::source::ScrollProgressSource;

/// The last flip counts as nearly complete past this share of its page
const NEARLY_COMPLETE: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
struct StageSpan {
    stage: NavStage,
    end: Duration,
}

#[derive(Debug, Clone)]
struct ActiveNavigation {
    id: NavigationId,
    request: NavigationRequest,
    playback: PlaybackId,
    stages: Vec<StageSpan>,
}

#[derive(Debug)]
pub struct NavigationController {
    arbiter: ModeArbiter,
    config: NavigationConfig,
    slots: PageSlots,
    active: Option<ActiveNavigation>,
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

impl NavigationController {
    pub fn new(arbiter: ModeArbiter, config: NavigationConfig, slots: PageSlots) -> Self {
        Self {
            arbiter,
            config,
            slots,
            active: None,
        }
    }

    /// Replace the page slots after a rebuild
    pub fn set_slots(&mut self, slots: PageSlots) {
        self.slots = slots;
    }

    pub fn page_count(&self) -> usize {
        self.slots.len()
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// A navigation owns the viewport
    pub fn is_busy(&self, engine: &TimelineEngine) -> bool {
        self.arbiter.is_animating()
            || self
                .active
                .as_ref()
                .is_some_and(|active| engine.is_playing(active.playback))
    }

    pub fn active_request(&self) -> Option<NavigationRequest> {
        self.active.as_ref().map(|a| a.request)
    }

    pub fn active_id(&self) -> Option<NavigationId> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn state(&self, engine: &TimelineEngine) -> NavState {
        let Some(active) = &self.active else {
            return NavState::Idle;
        };
        let Some(elapsed) = engine.elapsed(active.playback) else {
            return NavState::Idle;
        };
        active
            .stages
            .iter()
            .find(|span| elapsed < span.end)
            .or(active.stages.last())
            .map(|span| NavState::Navigating(span.stage))
            .unwrap_or(NavState::Idle)
    }

    /// Route a request to its operation
    pub fn dispatch(
        &mut self,
        request: NavigationRequest,
        ticket: Ticket,
        engine: &mut TimelineEngine,
        source: &mut dyn ScrollProgressSource,
    ) {
        match request {
            NavigationRequest::GoToPage(page) => self.scroll_to_page(page, ticket, engine, source),
            NavigationRequest::FlipToPage(page) => {
                self.natural_page_flip(page, ticket, engine, source)
            }
            NavigationRequest::LastPage => self.scroll_to_last_page(ticket, engine, source),
            NavigationRequest::GoToContact => self.scroll_to_contact(ticket, engine, source),
            NavigationRequest::SmartGoToContact => {
                self.smart_scroll_to_contact(ticket, engine, source)
            }
        }
    }

    /// Single tween to the start of a page slot
    pub fn scroll_to_page(
        &mut self,
        page: usize,
        ticket: Ticket,
        engine: &mut TimelineEngine,
        source: &mut dyn ScrollProgressSource,
    ) {
        let request = NavigationRequest::GoToPage(page);
        let Some(ticket) = self.admit(request, ticket, engine) else {
            return;
        };
        let page = self.clamp_page(page);
        let plan = PlaybackPlan::new().tween(
            self.page_offset(page, source),
            ms(self.config.page_ms),
            self.config.page_easing,
        );
        let stages = vec![StageSpan {
            stage: NavStage::Flip,
            end: plan.total(),
        }];
        self.start(request, ticket, plan, stages, NavigationLock::PAGE, page, engine, source);
    }

    pub fn scroll_to_last_page(
        &mut self,
        ticket: Ticket,
        engine: &mut TimelineEngine,
        source: &mut dyn ScrollProgressSource,
    ) {
        let last = self.last_page();
        self.scroll_to_page(last, ticket, engine, source);
    }

    /// Flip to `target` like a reader would
    ///
    /// More than one page away, each intermediate page gets its own turn,
    /// staggered so the turns overlap. Raw input is disabled meanwhile.
    pub fn natural_page_flip(
        &mut self,
        target: usize,
        ticket: Ticket,
        engine: &mut TimelineEngine,
        source: &mut dyn ScrollProgressSource,
    ) {
        let request = NavigationRequest::FlipToPage(target);
        let Some(ticket) = self.admit(request, ticket, engine) else {
            return;
        };
        let target = self.clamp_page(target);
        let current = self.arbiter.current_page().min(self.last_page());
        let distance = current.abs_diff(target);

        let plan = if distance > 1 {
            let step = ms(self.config.flip_step_ms);
            let stagger = ms(self.config.flip_stagger_ms);
            (1..=distance).fold(PlaybackPlan::new(), |plan, k| {
                let page = if target > current { current + k } else { current - k };
                plan.tween_at(
                    stagger * (k - 1) as u32,
                    self.page_offset(page, source),
                    step,
                    self.config.page_easing,
                )
            })
        } else {
            PlaybackPlan::new().tween(
                self.page_offset(target, source),
                ms(self.config.natural_flip_ms),
                self.config.natural_easing,
            )
        };
        debug!(current, target, distance, "Natural page flip");

        let stages = vec![StageSpan {
            stage: NavStage::Flip,
            end: plan.total(),
        }];
        self.start(request, ticket, plan, stages, NavigationLock::AUTO, target, engine, source);
    }

    /// Single tween to the contact boundary
    pub fn scroll_to_contact(
        &mut self,
        ticket: Ticket,
        engine: &mut TimelineEngine,
        source: &mut dyn ScrollProgressSource,
    ) {
        let request = NavigationRequest::GoToContact;
        let Some(ticket) = self.admit(request, ticket, engine) else {
            return;
        };
        let plan = PlaybackPlan::new().tween(
            contact_offset(source),
            ms(self.config.contact_ms),
            self.config.page_easing,
        );
        let stages = vec![StageSpan {
            stage: NavStage::ContactScroll,
            end: plan.total(),
        }];
        let last = self.last_page();
        self.start(request, ticket, plan, stages, NavigationLock::PAGE, last, engine, source);
    }

    /// Flip to the last page, let it settle, then scroll to the contact panel
    pub fn smart_scroll_to_contact(
        &mut self,
        ticket: Ticket,
        engine: &mut TimelineEngine,
        source: &mut dyn ScrollProgressSource,
    ) {
        let request = NavigationRequest::SmartGoToContact;
        let Some(ticket) = self.admit(request, ticket, engine) else {
            return;
        };
        let last = self.last_page();
        let current = self.arbiter.current_page();
        let flips = current < last;

        let mut plan = PlaybackPlan::new();
        let mut stages = Vec::with_capacity(3);

        if flips {
            plan = plan.tween(
                self.page_offset(last, source),
                ms(self.config.smart_flip_ms),
                self.config.page_easing,
            );
            stages.push(StageSpan {
                stage: NavStage::Flip,
                end: plan.cursor(),
            });

            let nearly_complete =
                page_progress(source.progress(), self.slots.len()) >= last as f64 - NEARLY_COMPLETE;
            let gap = if nearly_complete {
                self.config.short_gap_ms
            } else {
                self.config.settle_gap_ms
            };
            plan = plan.gap(ms(gap));
            stages.push(StageSpan {
                stage: NavStage::Gap,
                end: plan.cursor(),
            });
        }

        let contact_ms = if flips {
            self.config.smart_contact_ms
        } else {
            self.config.contact_ms
        };
        plan = plan.tween(contact_offset(source), ms(contact_ms), self.config.page_easing);
        stages.push(StageSpan {
            stage: NavStage::ContactScroll,
            end: plan.cursor(),
        });

        debug!(current, last, flips, stages = stages.len(), "Smart scroll to contact");
        self.start(request, ticket, plan, stages, NavigationLock::SMART, last, engine, source);
    }

    /// Forget navigations whose playback terminated this frame
    pub fn retire(&mut self, finished: &[(PlaybackId, PlaybackOutcome)]) {
        if let Some(active) = &self.active {
            if finished.iter().any(|(id, _)| *id == active.playback) {
                self.active = None;
            }
        }
    }

    /// Interrupt the active navigation; cleanup matches completion
    pub fn interrupt(
        &mut self,
        engine: &mut TimelineEngine,
        source: &mut dyn ScrollProgressSource,
    ) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        info!(navigation = %active.id, request = ?active.request, "Interrupting navigation");
        engine.kill(active.playback, source)
    }

    /// Re-entrancy guard: a live navigation is never preempted
    fn admit(
        &self,
        request: NavigationRequest,
        ticket: Ticket,
        engine: &TimelineEngine,
    ) -> Option<Ticket> {
        if self.is_busy(engine) {
            debug!(
                ?request,
                active = ?self.active_request(),
                "Navigation in flight, request skipped"
            );
            ticket.resolve(NavigationOutcome::Skipped);
            return None;
        }
        if ticket.is_cancelled() {
            ticket.resolve(NavigationOutcome::Interrupted);
            return None;
        }
        Some(ticket)
    }

    #[allow(clippy::too_many_arguments)]
    fn start(
        &mut self,
        request: NavigationRequest,
        ticket: Ticket,
        plan: PlaybackPlan,
        stages: Vec<StageSpan>,
        lock: NavigationLock,
        target_page: usize,
        engine: &mut TimelineEngine,
        source: &mut dyn ScrollProgressSource,
    ) {
        let (id, tx, cancel) = ticket.into_parts();
        let restore_input = lock.auto_scrolling;

        self.arbiter.begin(lock);
        if restore_input {
            source.set_input_enabled(false);
        }

        let arbiter = self.arbiter.clone();
        let page_count = self.slots.len();
        let finalizer: Finalizer = Box::new(move |outcome, source| {
            let page = match outcome {
                PlaybackOutcome::Completed => target_page,
                PlaybackOutcome::Interrupted => current_page_index(source.progress(), page_count),
            };
            if restore_input {
                source.set_input_enabled(true);
            }
            arbiter.release(page);
            debug!(navigation = %id, ?outcome, page, "Navigation finished");
            let _ = tx.send(outcome.into());
        });

        let total_ms = plan.total().as_millis() as u64;
        let playback = engine.play(plan, cancel, finalizer);
        info!(navigation = %id, ?request, total_ms, "Navigation started");

        self.active = Some(ActiveNavigation {
            id,
            request,
            playback,
            stages,
        });
    }

    fn last_page(&self) -> usize {
        self.slots.len().saturating_sub(1)
    }

    fn clamp_page(&self, page: usize) -> usize {
        let last = self.last_page();
        if page > last {
            warn!(page, last, "Requested page out of range, using last page");
        }
        page.min(last)
    }

    fn page_offset(&self, page: usize, source: &dyn ScrollProgressSource) -> f64 {
        let start = self.slots.get(page).unwrap_or(self.slots.last()).start;
        source.bounds().offset_at(start)
    }
}

fn contact_offset(source: &dyn ScrollProgressSource) -> f64 {
    source.bounds().offset_at(CONTACT_SETTLED)
}
