use chrono::Local;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    location: Option<&str>,
    hijri: &str,
    fallback_reason: Option<&str>,
) {
    let gregorian = Local::now().format("%A, %b %d, %Y").to_string();

    let title_line = Line::from(vec![
        Span::styled("  ميقات  ", theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled("miqat", theme::gold()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(location.unwrap_or("Locating…"), theme::bold()),
    ]);

    let mut date_spans = Vec::new();
    if !hijri.is_empty() {
        date_spans.push(Span::styled(hijri, theme::teal()));
        date_spans.push(Span::styled("  ·  ", theme::dim()));
    }
    date_spans.push(Span::styled(gregorian, theme::dim()));

    let notice_line = match fallback_reason {
        Some(reason) => Line::from(Span::styled(reason, theme::amber())),
        None => Line::from(""),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::base());

    let paragraph = Paragraph::new(vec![title_line, Line::from(date_spans), notice_line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
