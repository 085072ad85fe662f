pub mod builder;
pub mod countdown;
pub mod error;
pub mod ticker;

pub use builder::{build_schedule, parse_clock, PrayerSchedule, PrayerTimeEntry};
pub use countdown::{tick, CountdownState};
pub use error::{MalformedReason, ScheduleError};
pub use ticker::{Clock, ScheduleSlot, SystemClock, Ticker};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, FixedOffset, TimeZone};

    use crate::models::{PrayerName, RawTimings};

    pub fn sample_timings() -> RawTimings {
        [
            (PrayerName::Fajr, "05:00"),
            (PrayerName::Dhuhr, "12:15"),
            (PrayerName::Asr, "15:45"),
            (PrayerName::Maghrib, "18:20"),
            (PrayerName::Isha, "19:50"),
        ]
        .into_iter()
        .map(|(name, t)| (name, t.to_string()))
        .collect()
    }

    /// A March 2026 local time at UTC+3.
    pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, day, hour, minute, 0)
            .unwrap()
    }
}
