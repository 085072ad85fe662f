use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::models::PrayerName;
use crate::schedule::builder::PrayerSchedule;
use crate::utils::format::{day_fraction, format_countdown};

/// Live view of the wait for the next prayer at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownState {
    pub next: PrayerName,
    pub next_instant: DateTime<Utc>,
    /// Time left until `next_instant`, never negative.
    pub remaining: Duration,
    /// Share of the previous→next interval already elapsed, in [0, 1].
    pub progress_ratio: f64,
    /// Share of the local day elapsed, in [0, 1).
    pub day_position: f64,
}

impl CountdownState {
    /// The next prayer's time has been reached. The owner is expected to
    /// rebuild the schedule.
    pub fn is_arrived(&self) -> bool {
        self.remaining <= Duration::zero()
    }

    /// `HH:MM:SS`, or `Now` once the prayer has arrived.
    pub fn remaining_label(&self) -> String {
        if self.is_arrived() {
            "Now".to_string()
        } else {
            format_countdown(self.remaining)
        }
    }
}

/// Derive the countdown for `now`. Pure: the same inputs give the same state.
pub fn tick<Tz: TimeZone>(schedule: &PrayerSchedule, now: &DateTime<Tz>) -> CountdownState {
    let now_utc = now.with_timezone(&Utc);
    let next = schedule.next();
    let previous = schedule.previous_instant();

    let remaining = (next.instant - now_utc).max(Duration::zero());

    let total = next.instant - previous;
    let progress_ratio = if total <= Duration::zero() {
        1.0
    } else {
        let elapsed = now_utc - previous;
        (elapsed.num_milliseconds() as f64 / total.num_milliseconds() as f64).clamp(0.0, 1.0)
    };

    CountdownState {
        next: next.name,
        next_instant: next.instant,
        remaining,
        progress_ratio,
        day_position: day_fraction(now.time()),
    }
}
