use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub struct IndicatorsWidget;

impl IndicatorsWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let indicators = &app.session.sink().indicators;

        let spans: Vec<Span> = indicators
            .iter()
            .enumerate()
            .flat_map(|(i, &opacity)| {
                let dot = if i == app.session.sink().page_index { "●" } else { "○" };
                [
                    Span::styled(dot, Style::default().fg(theme.fade(theme.accent, opacity))),
                    Span::raw(" "),
                ]
            })
            .collect();

        frame.render_widget(
            Paragraph::new(Line::from(spans))
                .alignment(Alignment::Center)
                .style(Style::default().bg(theme.bg0)),
            area,
        );
    }
}
