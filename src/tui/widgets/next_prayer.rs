use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

use crate::schedule::{CountdownState, PrayerSchedule};
use crate::tui::theme;
use crate::utils::format::format_clock;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    schedule: &PrayerSchedule,
    countdown: Option<&CountdownState>,
    twelve_hour: bool,
) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(countdown) = countdown else {
        frame.render_widget(Paragraph::new(Span::styled("  Waiting for clock…", theme::dim())), inner);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let entry = schedule.entry(countdown.next);
    let heading = Line::from(vec![
        Span::styled(
            format!("  {}", countdown.next.display_name().to_uppercase()),
            theme::gold().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  at {}", format_clock(entry.clock_time, twelve_hour)),
            theme::dim(),
        ),
    ]);
    frame.render_widget(Paragraph::new(heading), chunks[1]);

    let remaining_style = if countdown.is_arrived() {
        theme::teal().add_modifier(Modifier::BOLD)
    } else {
        theme::amber().add_modifier(Modifier::BOLD)
    };
    let remaining = Line::from(vec![
        Span::styled("  in  ", theme::dim()),
        Span::styled(countdown.remaining_label(), remaining_style),
    ]);
    frame.render_widget(Paragraph::new(remaining), chunks[2]);

    let gauge_area = Rect {
        x: chunks[4].x + 2,
        width: chunks[4].width.saturating_sub(4),
        ..chunks[4]
    };
    let gauge = Gauge::default()
        .gauge_style(theme::gauge())
        .ratio(countdown.progress_ratio.clamp(0.0, 1.0))
        .label(format!("{:.0}%", countdown.progress_ratio * 100.0));
    frame.render_widget(gauge, gauge_area);
}
