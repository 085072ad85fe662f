use chrono::FixedOffset;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::schedule::PrayerSchedule;
use crate::tui::theme;
use crate::utils::format::{day_fraction, day_timeline};

/// Day track on the viewer's clock. `viewer` is the offset `day_position`
/// was measured in.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    schedule: &PrayerSchedule,
    viewer: FixedOffset,
    day_position: Option<f64>,
) {
    let block = Block::default()
        .title(Span::styled(" Today ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width.saturating_sub(4) as usize;
    let marks: Vec<(f64, bool)> = schedule
        .entries()
        .iter()
        .map(|e| (day_fraction(e.instant.with_timezone(&viewer).time()), e.is_next))
        .collect();
    // before the first tick lands, pin the cursor to midnight
    let track = day_timeline(&marks, day_position.unwrap_or(0.0), width);

    let scale = format!(
        "{:<half$}{:>rest$}",
        "00:00",
        "24:00",
        half = width / 2,
        rest = width - width / 2
    );

    let lines = vec![
        Line::from(vec![Span::raw("  "), Span::styled(track, theme::teal())]),
        Line::from(vec![Span::raw("  "), Span::styled(scale, theme::dim())]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
