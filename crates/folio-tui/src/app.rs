use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use folio_core::{
    BookLayout, FlipbookSession, FolioConfig, FrameReport, NavigationHandle, NavigationOutcome,
    NavigationRequest,
};

use crate::input::Action;
use crate::region::TerminalRegion;
use crate::sink::TerminalSink;
use crate::theme::Theme;

/// Rows taken by the indicator row and the status bar
pub const CHROME_ROWS: u16 = 2;

pub type TerminalSession = FlipbookSession<TerminalRegion, TerminalSink>;

pub struct App {
    pub config: FolioConfig,
    pub session: TerminalSession,
    pub theme: Theme,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub viewport_height: u16,
    pub last_report: Option<FrameReport>,
    /// Navigation whose outcome is shown when it resolves
    inflight: Option<(NavigationRequest, NavigationHandle)>,
}

impl App {
    pub fn new(config: FolioConfig, theme: Theme) -> Result<Self> {
        let mut session = TerminalSession::new(&config, TerminalSink::default())?;
        session.attach(TerminalRegion::new(
            config.ui.scroll.clone(),
            config.book.page_count,
        ));

        Ok(Self {
            config,
            session,
            theme,
            should_quit: false,
            status_message: None,
            viewport_height: 0,
            last_report: None,
            inflight: None,
        })
    }

    /// Advance raw-input smoothing and the session by one frame
    pub fn tick(&mut self, dt: Duration) -> FrameReport {
        if let Some(region) = self.session.source_mut() {
            region.update(dt);
        }
        let report = self.session.frame(dt);
        self.poll_navigation();
        self.last_report = Some(report);
        report
    }

    /// Something is moving; the loop should poll at the animation rate
    pub fn needs_fast_update(&self) -> bool {
        self.session.is_animating()
            || self
                .session
                .source()
                .is_some_and(|region| region.needs_update())
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollDown => self.raw_scroll(|r, _| r.scroll_down()),
            Action::ScrollUp => self.raw_scroll(|r, _| r.scroll_up()),
            Action::HalfPageDown => self.raw_scroll(|r, h| r.half_page_down(h)),
            Action::HalfPageUp => self.raw_scroll(|r, h| r.half_page_up(h)),
            Action::FlipToPage(page) => {
                let total = self.session.total_pages();
                if page >= total {
                    self.set_status(format!("No page {} (book has {})", page + 1, total));
                } else {
                    self.navigate(NavigationRequest::FlipToPage(page));
                }
            }
            Action::FirstPage => self.navigate(NavigationRequest::GoToPage(0)),
            Action::LastPage => self.navigate(NavigationRequest::LastPage),
            Action::Contact => self.navigate(NavigationRequest::GoToContact),
            Action::SmartContact => self.navigate(NavigationRequest::SmartGoToContact),
            Action::Cancel => {
                if self.session.interrupt() {
                    self.poll_navigation();
                } else {
                    self.clear_status();
                }
            }
            Action::None => {}
        }
    }

    fn raw_scroll(&mut self, scroll: impl FnOnce(&mut TerminalRegion, u16) -> bool) {
        let viewport = self.viewport_height.max(2);
        let applied = self
            .session
            .source_mut()
            .map(|region| scroll(region, viewport))
            .unwrap_or(false);
        if !applied {
            self.set_status("Scrolling is locked while the book turns");
        }
    }

    fn navigate(&mut self, request: NavigationRequest) {
        let mut handle = self.session.request(request);
        if handle.try_outcome() == Some(NavigationOutcome::Skipped) {
            debug!(?request, "Navigation skipped");
            self.set_status("Busy: wait for the current navigation (x cancels)");
            return;
        }
        info!(?request, "Navigation requested");
        self.clear_status();
        self.inflight = Some((request, handle));
    }

    fn poll_navigation(&mut self) {
        let resolved = self
            .inflight
            .as_mut()
            .and_then(|(request, handle)| handle.try_outcome().map(|outcome| (*request, outcome)));
        if let Some((request, outcome)) = resolved {
            self.inflight = None;
            if outcome == NavigationOutcome::Interrupted {
                self.set_status(format!("{} interrupted", describe(request)));
            }
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport_height = height;
        self.session.on_refresh(BookLayout {
            width: width as f64,
            height: height.saturating_sub(CHROME_ROWS) as f64,
        });
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Interrupt everything and release the region
    pub fn shutdown(&mut self) {
        self.session.unmount();
        self.inflight = None;
    }
}

/// Human label for a navigation
pub fn describe(request: NavigationRequest) -> String {
    match request {
        NavigationRequest::GoToPage(page) => format!("Jump to page {}", page + 1),
        NavigationRequest::FlipToPage(page) => format!("Flip to page {}", page + 1),
        NavigationRequest::LastPage => "Jump to last page".to_string(),
        NavigationRequest::GoToContact => "Scroll to contact".to_string(),
        NavigationRequest::SmartGoToContact => "Smart scroll to contact".to_string(),
    }
}
