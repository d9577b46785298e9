use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use folio_core::{NavStage, NavState, Phase, SessionFlags};

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let flags = app.session.flags();
        let progress = app.last_report.map(|r| r.progress).unwrap_or(0.0);

        let status_text = match &app.status_message {
            Some(msg) => format!(" {}", msg),
            None => format!(
                " {} | {} | page {}/{} | {:>3.0}% {}",
                mode_str(&flags),
                state_str(app.session.nav_state()),
                flags.current_page + 1,
                app.session.total_pages(),
                progress * 100.0,
                phase_str(Phase::at(progress)),
            ),
        };

        let help_hint = " q:quit j/k:scroll 1-9:flip g/G:first/last c/s:contact x:cancel ";
        let padding_len = (area.width as usize)
            .saturating_sub(status_text.chars().count() + help_hint.chars().count());

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

fn mode_str(flags: &SessionFlags) -> &'static str {
    if flags.is_smart_scrolling {
        "SMART"
    } else if flags.is_auto_scrolling {
        "AUTO"
    } else if flags.is_animating {
        "NAV"
    } else {
        "SCROLL"
    }
}

fn state_str(state: NavState) -> &'static str {
    match state {
        NavState::Idle => "idle",
        NavState::Navigating(NavStage::Flip) => "flip",
        NavState::Navigating(NavStage::Gap) => "gap",
        NavState::Navigating(NavStage::ContactScroll) => "contact",
    }
}

fn phase_str(phase: Phase) -> &'static str {
    match phase {
        Phase::Cover => "cover",
        Phase::Pages => "pages",
        Phase::ContactFade => "fade",
        Phase::ContactSettled => "contact",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_precedence() {
        let mut flags = SessionFlags::default();
        assert_eq!(mode_str(&flags), "SCROLL");
        flags.is_animating = true;
        assert_eq!(mode_str(&flags), "NAV");
        flags.is_auto_scrolling = true;
        assert_eq!(mode_str(&flags), "AUTO");
        flags.is_smart_scrolling = true;
        assert_eq!(mode_str(&flags), "SMART");
    }
}
