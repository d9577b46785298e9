use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

pub struct ContactWidget;

impl ContactWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let style = app.session.sink().contact;
        if !style.visible {
            return;
        }
        let theme = &app.theme;
        let fade = |color| theme.fade(color, style.opacity);

        let border = if style.interactive { theme.accent } else { theme.grey0 };
        let block = Block::default()
            .title(" contact ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(fade(border)))
            .style(Style::default().bg(theme.bg1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = vec![
            Line::default(),
            Line::from(Span::styled(
                "Enjoyed the book?",
                Style::default().fg(fade(theme.fg1)).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled("hello@folio.example", Style::default().fg(fade(theme.blue)))),
            Line::default(),
        ];
        // Pointer events only once the panel is mostly opaque
        if style.interactive {
            lines.push(Line::from(Span::styled(
                "[ ready ]",
                Style::default().fg(theme.green),
            )));
        }

        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
    }
}
