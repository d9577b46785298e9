//! The flipbook artifact, drawn from the scrubbed frame sample

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use folio_core::engine::FrameSample;
use folio_core::timeline::{ContentRole, Handle, Property};

use crate::app::App;
use crate::theme::Theme;

/// A page counts as turned once it rotates past the spine
const SPINE_ANGLE: f64 = -90.0;
const TURN_EPSILON: f64 = 0.01;

/// Page mid-turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turn {
    pub page: usize,
    pub angle: f64,
    pub curl: f64,
    pub shadow: f64,
    pub back_visible: bool,
}

/// Everything the book widget needs, resolved from one sample
#[derive(Debug, Clone, PartialEq)]
pub struct BookView {
    pub scale: f64,
    /// Vertical offset in layout rows (negative lifts)
    pub lift: f64,
    pub opacity: f64,
    pub cover_angle: f64,
    /// Page lying on top of the stack
    pub page: usize,
    pub turn: Option<Turn>,
    /// (role, opacity, rise) for the top page
    pub content: Vec<(ContentRole, f64, f64)>,
}

impl BookView {
    pub fn from_sample(sample: &FrameSample, page_count: usize) -> Self {
        let rotate = |i| sample.get_or(Handle::PageFront(i), Property::RotateY, 0.0);
        let curl = |i| sample.get_or(Handle::PageFront(i), Property::Curl, 0.0);
        let last = page_count.saturating_sub(1);

        let page = (0..page_count)
            .find(|&i| rotate(i) > SPINE_ANGLE)
            .unwrap_or(last);

        let turn = (0..page_count)
            .find(|&i| {
                let angle = rotate(i);
                (angle < -TURN_EPSILON && angle > -180.0 + TURN_EPSILON) || curl(i) < -TURN_EPSILON
            })
            .map(|i| Turn {
                page: i,
                angle: rotate(i),
                curl: curl(i),
                shadow: sample.get_or(Handle::PageShadow(i), Property::Opacity, 0.0),
                back_visible: sample.is_visible(Handle::PageBack(i)),
            });

        let content = ContentRole::ALL
            .iter()
            .map(|&role| {
                let handle = Handle::Content(page, role);
                (
                    role,
                    sample.get_or(handle, Property::Opacity, 0.0),
                    sample.get_or(handle, Property::TranslateY, 0.0),
                )
            })
            .collect();

        Self {
            scale: sample.get_or(Handle::Artifact, Property::Scale, 1.0),
            lift: sample.get_or(Handle::Artifact, Property::TranslateY, 0.0),
            opacity: sample.get_or(Handle::Artifact, Property::Opacity, 1.0),
            cover_angle: sample.get_or(Handle::Cover, Property::RotateY, 0.0),
            page,
            turn,
            content,
        }
    }

    pub fn cover_closed(&self) -> bool {
        self.cover_angle > SPINE_ANGLE
    }

    /// Visible width share of a face rotated by `angle` degrees
    pub fn foreshorten(angle: f64) -> f64 {
        angle.to_radians().cos().abs()
    }
}

pub struct BookWidget;

impl BookWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let sink = app.session.sink();
        let view = BookView::from_sample(&sink.sample, app.session.total_pages());
        let theme = &app.theme;

        if view.opacity <= 0.0 {
            return;
        }

        let book = scaled_rect(area, view.scale, view.lift);
        if book.width < 4 || book.height < 3 {
            return;
        }

        if view.cover_closed() {
            Self::render_cover(frame, book, &view, theme);
            return;
        }

        let border = theme.fade(theme.grey2, view.opacity);
        let block = Block::default()
            .title(format!(" page {} ", view.page + 1))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(theme.fade(theme.paper, view.opacity)));
        let inner = block.inner(book);
        frame.render_widget(block, book);

        let lines = content_lines(&view, app.session.total_pages(), theme, inner.height);
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);

        if let Some(turn) = view.turn {
            Self::render_turn(frame, inner, &turn, view.opacity, theme);
        }
    }

    fn render_cover(frame: &mut Frame, book: Rect, view: &BookView, theme: &Theme) {
        let width = ((book.width as f64) * BookView::foreshorten(view.cover_angle)).round() as u16;
        let cover = Rect {
            width: width.clamp(2, book.width),
            ..book
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.fade(theme.yellow, view.opacity)))
            .style(Style::default().bg(theme.fade(theme.cover, view.opacity)));
        let inner = block.inner(cover);
        frame.render_widget(block, cover);

        let title = Line::from(Span::styled(
            "F O L I O",
            Style::default()
                .fg(theme.fade(theme.fg1, view.opacity))
                .add_modifier(Modifier::BOLD),
        ));
        let hint = Line::from(Span::styled(
            "scroll to open",
            Style::default().fg(theme.fade(theme.grey2, view.opacity)),
        ));
        let pad = inner.height.saturating_sub(2) / 2;
        let mut lines = vec![Line::default(); pad as usize];
        lines.push(title);
        lines.push(hint);
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
    }

    /// Turning page: a foreshortened strip from the right edge, dimmed by its shadow
    fn render_turn(frame: &mut Frame, inner: Rect, turn: &Turn, opacity: f64, theme: &Theme) {
        let share = BookView::foreshorten(turn.angle);
        let width = ((inner.width as f64) * share * 0.5).round() as u16;
        if width == 0 {
            return;
        }
        let strip = Rect {
            x: inner.x + inner.width.saturating_sub(width),
            width,
            ..inner
        };

        let (label, face) = if turn.back_visible {
            (format!("{} ◂", turn.page + 1), theme.fg0)
        } else {
            (format!("▸ {}", turn.page + 1), theme.paper)
        };
        let bg = crate::theme::blend(theme.fade(face, opacity), theme.shadow, turn.shadow);
        let corner = if turn.curl < -TURN_EPSILON { "◤" } else { "" };

        let mut lines = vec![Line::from(Span::styled(
            corner,
            Style::default().fg(theme.fade(theme.fg1, opacity)),
        ))];
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(theme.fade(theme.grey0, opacity)),
        )));
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Right)
                .style(Style::default().bg(bg)),
            strip,
        );
    }
}

fn content_lines(
    view: &BookView,
    page_count: usize,
    theme: &Theme,
    height: u16,
) -> Vec<Line<'static>> {
    let page = view.page + 1;
    let mut lines: Vec<Line<'static>> = Vec::new();

    for &(role, opacity, rise) in &view.content {
        if opacity <= 0.0 {
            continue;
        }
        let (text, color, bold) = match role {
            ContentRole::Badge => (format!("· chapter {} ·", page), theme.orange, false),
            ContentRole::Title => (format!("Page {}", page), theme.fg1, true),
            ContentRole::Subtitle => ("a scroll-driven story".to_string(), theme.grey2, false),
            ContentRole::Image => ("[ illustration ]".to_string(), theme.blue, false),
            ContentRole::Body => (
                "Keep scrolling and the page lifts, turns and settles.".to_string(),
                theme.fg0,
                false,
            ),
            ContentRole::Attribution => ("folio".to_string(), theme.grey0, false),
            ContentRole::PageNumber => (format!("{} / {}", page, page_count), theme.aqua, false),
        };

        // Rising content starts a few rows low
        let offset = rise.max(0.0).round() as usize;
        lines.extend(std::iter::repeat(Line::default()).take(offset.min(2)));

        let mut style = Style::default().fg(theme.fade(color, opacity * view.opacity));
        if bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        lines.push(Line::from(Span::styled(text, style)));
        lines.push(Line::default());
    }

    lines.truncate(height as usize);
    lines
}

/// `area` scaled around its center, then shifted by `lift` rows
fn scaled_rect(area: Rect, scale: f64, lift: f64) -> Rect {
    let scale = scale.clamp(0.0, 1.0);
    let width = ((area.width as f64) * 0.9 * scale).round() as u16;
    let height = ((area.height as f64) * 0.9 * scale).round() as u16;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let centered = area.y + (area.height.saturating_sub(height)) / 2;
    let y = (centered as f64 + lift.round()).max(area.y as f64) as u16;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::engine::ScrubTimeline;
    use folio_core::phase::PageSlots;
    use folio_core::timeline::{BuildInput, PageTimelineBuilder};
    use folio_core::{BookLayout, PhaseRatios};

    fn timeline(pages: usize) -> (ScrubTimeline, PageSlots) {
        let built = PageTimelineBuilder::new(PhaseRatios::default())
            .build(BuildInput {
                page_count: pages,
                layout: BookLayout::default(),
                abbreviated: false,
            })
            .unwrap();
        let slots = built.slots().clone();
        let mut scrub = ScrubTimeline::new();
        for segment in built.into_segments() {
            scrub.insert(segment);
        }
        (scrub, slots)
    }

    #[test]
    fn test_closed_cover_at_start() {
        let (scrub, _) = timeline(3);
        let view = BookView::from_sample(&scrub.sample(0.0), 3);
        assert!(view.cover_closed());
        assert_eq!(view.page, 0);
        assert!(view.turn.is_none());
        assert_eq!(view.scale, 1.0);
    }

    #[test]
    fn test_top_page_follows_turns() {
        let (scrub, slots) = timeline(3);
        let second = slots.get(1).unwrap();
        let view = BookView::from_sample(&scrub.sample(second.start + second.window * 0.05), 3);
        assert!(!view.cover_closed());
        assert_eq!(view.page, 1);
        assert!(view.turn.is_none());
    }

    #[test]
    fn test_turn_detected_mid_flip() {
        let (scrub, slots) = timeline(3);
        let first = slots.get(0).unwrap();
        // Late in the main turn: back face showing
        let turn_start = first.flip_start() + first.flip_phase * 0.2;
        let p = turn_start + first.flip_phase * 0.5 * 0.9;
        let view = BookView::from_sample(&scrub.sample(p), 3);

        let turn = view.turn.unwrap();
        assert_eq!(turn.page, 0);
        assert!(turn.back_visible);
        assert!(turn.angle < -90.0);
        assert_eq!(view.page, 1);
    }

    #[test]
    fn test_collapsed_book_is_small_and_faded() {
        let (scrub, _) = timeline(3);
        let view = BookView::from_sample(&scrub.sample(0.92), 3);
        assert!((view.scale - 0.65).abs() < 1e-9);
        assert!(view.opacity.abs() < 1e-9);
        assert!(view.lift < 0.0);
    }

    #[test]
    fn test_scaled_rect_stays_inside() {
        let area = Rect::new(0, 0, 80, 30);
        let rect = scaled_rect(area, 0.5, -40.0);
        assert_eq!(rect.y, 0);
        assert!(rect.width <= 40);
        assert_eq!(scaled_rect(area, 1.0, 0.0).width, 72);
    }
}
