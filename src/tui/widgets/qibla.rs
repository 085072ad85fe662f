use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;
use crate::utils::format::compass_point;

pub fn render(frame: &mut Frame, area: Rect, bearing: Option<f64>) {
    let block = Block::default()
        .title(Span::styled(" Qibla ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let lines = match bearing {
        None => vec![Line::from(Span::styled("--", theme::dim()))],
        Some(bearing) => vec![
            Line::from(vec![
                Span::styled(
                    format!("{:.0}°", bearing),
                    theme::gold().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {}", compass_point(bearing)), theme::teal()),
            ]),
            Line::from(Span::styled("from North", theme::dim())),
        ],
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
