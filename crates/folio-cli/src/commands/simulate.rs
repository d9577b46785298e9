use std::time::Duration;

use anyhow::Result;
use clap::Subcommand;
use tracing::warn;

use folio_core::sink::RecordingSink;
use folio_core::{
    FlipbookSession, FolioConfig, NavState, NavigationRequest, PageSlots, PinnedRegion,
    ScrollProgressSource,
};

/// Simulated time after which a navigation is interrupted
const MAX_SIMULATED: Duration = Duration::from_secs(120);

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Tween straight to a page (1-based)
    Page { page: usize },
    /// Natural flip to a page (1-based)
    Flip { page: usize },
    /// Tween to the last page
    Last,
    /// Tween to the contact panel
    Contact,
    /// Flip to the last page, pause, then scroll to the contact panel
    Smart,
}

impl Target {
    pub fn request(self) -> NavigationRequest {
        match self {
            Target::Page { page } => NavigationRequest::GoToPage(page.saturating_sub(1)),
            Target::Flip { page } => NavigationRequest::FlipToPage(page.saturating_sub(1)),
            Target::Last => NavigationRequest::LastPage,
            Target::Contact => NavigationRequest::GoToContact,
            Target::Smart => NavigationRequest::SmartGoToContact,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub from_page: usize,
    pub fps: u32,
    pub realtime: bool,
    pub json: bool,
}

pub async fn run(config: &FolioConfig, target: Target, options: Options) -> Result<()> {
    let mut session = FlipbookSession::new(config, RecordingSink::new())?;
    let mut region = PinnedRegion::with_length(10_000.0);

    let slots = PageSlots::new(config.book.page_count, config.book.ratios())?;
    let start = slots.slot(options.from_page.saturating_sub(1))?.start;
    region.user_scroll_to_progress(start);
    session.attach(region);

    let dt = Duration::from_secs_f64(1.0 / options.fps.max(1) as f64);
    let mut interval = tokio::time::interval(dt);

    // Settle the passive state on the starting page
    session.frame(dt);

    let request = target.request();
    let mut handle = session.request(request);
    if !options.json {
        println!(
            "{:?} from page {} of {} at {} fps",
            request,
            session.current_page() + 1,
            session.total_pages(),
            options.fps
        );
    }

    let mut elapsed = Duration::ZERO;
    let mut last_state = None;

    while !handle.is_resolved() {
        if options.realtime {
            interval.tick().await;
        }
        let report = session.frame(dt);
        elapsed += dt;

        if options.json {
            let line = serde_json::json!({
                "t_ms": elapsed.as_millis() as u64,
                "page": session.current_page(),
                "report": report,
            });
            println!("{}", line);
        } else if last_state != Some(report.nav_state) {
            println!(
                "{:>7}ms  {:<28}  page {:>2}  progress {:.3}",
                elapsed.as_millis(),
                state_label(report.nav_state),
                session.current_page() + 1,
                report.progress
            );
            last_state = Some(report.nav_state);
        }

        if elapsed >= MAX_SIMULATED {
            warn!(?request, "Navigation did not finish, interrupting");
            session.interrupt();
        }
    }

    let outcome = handle.await;
    if !options.json {
        let flags = session.flags();
        let input = session
            .source()
            .map(|region| region.input_enabled())
            .unwrap_or(true);
        println!();
        println!("Outcome:   {:?}", outcome);
        println!("Page:      {} of {}", flags.current_page + 1, session.total_pages());
        println!("Elapsed:   {} ms", elapsed.as_millis());
        println!(
            "Flags:     animating={} auto={} smart={}",
            flags.is_animating, flags.is_auto_scrolling, flags.is_smart_scrolling
        );
        println!("Input:     {}", if input { "enabled" } else { "disabled" });
    }

    session.unmount();
    Ok(())
}

fn state_label(state: NavState) -> String {
    match state {
        NavState::Idle => "idle".to_string(),
        NavState::Navigating(stage) => format!("navigating ({:?})", stage),
    }
}
