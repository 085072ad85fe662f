use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(14, 18, 24);
pub const SURFACE: Color = Color::Rgb(22, 28, 36);
pub const BORDER: Color = Color::Rgb(46, 58, 72);
pub const TEXT: Color = Color::Rgb(222, 226, 214);
pub const TEXT_DIM: Color = Color::Rgb(112, 124, 136);
pub const GOLD: Color = Color::Rgb(212, 175, 85);
pub const TEAL: Color = Color::Rgb(72, 160, 150);
pub const AMBER: Color = Color::Rgb(222, 146, 64);
pub const RED: Color = Color::Rgb(190, 88, 70);
pub const TRACK: Color = Color::Rgb(34, 42, 52);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn teal() -> Style {
    Style::default().fg(TEAL)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

/// Row highlight for the upcoming prayer.
pub fn next_row() -> Style {
    Style::default()
        .fg(GOLD)
        .bg(TRACK)
        .add_modifier(Modifier::BOLD)
}

pub fn gauge() -> Style {
    Style::default().fg(TEAL).bg(TRACK)
}
