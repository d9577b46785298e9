use std::io;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, size, EnterAlternateScreen, LeaveAlternateScreen,
        SetTitle,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Terminal,
};
use tracing::info;

use folio_core::FolioConfig;
use folio_tui::{
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    widgets::{BookWidget, ContactWidget, IndicatorsWidget, StatusBarWidget},
    App, Theme,
};

pub async fn run(config: FolioConfig) -> Result<()> {
    let mut app = App::new(config, Theme::default())?;
    let event_handler = EventHandler::with_animation_fps(
        app.config.ui.tick_rate_ms,
        app.config.ui.scroll.animation_fps,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("Folio"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (width, height) = size()?;
    app.resize(width, height);
    info!(pages = app.session.total_pages(), "Flipbook opened");

    let result = main_loop(&mut terminal, &mut app, &event_handler);

    app.shutdown();

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_handler: &EventHandler,
) -> Result<()> {
    let mut last_frame = Instant::now();
    let mut needs_fast_update = false;

    loop {
        let now = Instant::now();
        app.tick(now - last_frame);
        last_frame = now;

        terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(Block::default().style(Style::default().bg(app.theme.bg0)), area);

            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(1),    // Book and contact
                    Constraint::Length(1), // Page indicators
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(3, 5), Constraint::Ratio(2, 5)])
                .split(rows[0]);

            BookWidget::render(frame, columns[0], app);
            ContactWidget::render(frame, columns[1], app);
            IndicatorsWidget::render(frame, rows[1], app);
            StatusBarWidget::render(frame, rows[2], app);
        })?;

        // Faster polling while anything animates
        let event = if needs_fast_update {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => app.handle_action(handle_key_event(key)),
                AppEvent::Resize(w, h) => app.resize(w, h),
                AppEvent::Tick => {}
            }
        }

        needs_fast_update = app.needs_fast_update();

        if app.should_quit {
            info!("Flipbook closed");
            return Ok(());
        }
    }
}
