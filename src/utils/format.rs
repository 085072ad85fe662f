use chrono::{Duration, NaiveTime, Timelike};

/// Format a duration as "HH:MM:SS". Hours are not wrapped at 24.
pub fn format_countdown(d: Duration) -> String {
    let secs = d.num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format a NaiveTime to "HH:MM"
pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// "h:MM AM/PM", midnight and noon shown as 12.
pub fn to_twelve_hour(t: NaiveTime) -> String {
    let (pm, hour) = t.hour12();
    format!("{}:{:02} {}", hour, t.minute(), if pm { "PM" } else { "AM" })
}

pub fn format_clock(t: NaiveTime, twelve_hour: bool) -> String {
    if twelve_hour {
        to_twelve_hour(t)
    } else {
        format_time(t)
    }
}

/// Position of a wall-clock time within the day, minute resolution.
pub fn day_fraction(t: NaiveTime) -> f64 {
    let minutes = t.hour() * 60 + t.minute();
    minutes as f64 / (24.0 * 60.0)
}

/// Create a simple ASCII progress bar from a ratio in [0, 1]
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// A day timeline of `width` cells with prayers marked `●` (next: `◆`) and
/// the current position marked `│`.
pub fn day_timeline(prayers: &[(f64, bool)], now: f64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let cell = |fraction: f64| ((fraction.clamp(0.0, 1.0) * width as f64) as usize).min(width - 1);
    let mut cells = vec!['─'; width];
    for (fraction, is_next) in prayers {
        cells[cell(*fraction)] = if *is_next { '◆' } else { '●' };
    }
    cells[cell(now)] = '│';
    cells.into_iter().collect()
}

/// Nearest of the eight compass points for a bearing in degrees.
pub fn compass_point(bearing: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let sector = (bearing.rem_euclid(360.0) / 45.0).round() as usize % 8;
    POINTS[sector]
}
