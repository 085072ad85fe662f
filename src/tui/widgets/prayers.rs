use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::PrayerName;
use crate::schedule::PrayerSchedule;
use crate::tui::theme;
use crate::utils::format::format_clock;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    schedule: &PrayerSchedule,
    reminders: &[PrayerName],
    twelve_hour: bool,
    now: DateTime<Utc>,
) {
    let title = if schedule.rolled_over() {
        " Prayers · Fajr is tomorrow "
    } else {
        " Prayers "
    };
    let block = Block::default()
        .title(Span::styled(title, theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let items: Vec<ListItem> = schedule
        .entries()
        .iter()
        .map(|entry| {
            let key = format!(" {} ", entry.name.index() + 1);
            let bell = if reminders.contains(&entry.name) { "🔔" } else { "  " };
            let (marker, style) = if entry.is_next {
                ("◆ next", theme::next_row())
            } else if entry.instant <= now {
                ("✓", theme::dim())
            } else {
                ("", theme::bold())
            };

            let line = Line::from(vec![
                Span::styled(key, theme::dim()),
                Span::styled(format!(" {:<9}", entry.name), style),
                Span::styled(format!("{:>9}  ", format_clock(entry.clock_time, twelve_hour)), style),
                Span::raw(bell),
                Span::styled(format!(" {}", marker), theme::gold()),
            ]);
            ListItem::new(line)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
