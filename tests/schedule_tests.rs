//! Schedule and countdown behaviour through the public API, including a
//! zone with daylight-saving transitions.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc,
};

use miqat::models::{PrayerName, RawTimings};
use miqat::schedule::{build_schedule, tick, MalformedReason, ScheduleError};

// ============= Helper Functions =============

fn timings(fajr: &str) -> RawTimings {
    [
        (PrayerName::Fajr, fajr),
        (PrayerName::Dhuhr, "12:15"),
        (PrayerName::Asr, "15:45"),
        (PrayerName::Maghrib, "18:20"),
        (PrayerName::Isha, "19:50"),
    ]
    .into_iter()
    .map(|(name, t)| (name, t.to_string()))
    .collect()
}

fn riyadh(day: u32, hour: u32, minute: u32, second: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 3, day, hour, minute, second)
        .unwrap()
}

fn utc(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, month, day, hour, minute, 0).unwrap()
}

/// Central-European-style zone for 2026: UTC+1, UTC+2 from 29 March 01:00 UTC
/// until 25 October 01:00 UTC.
#[derive(Debug, Clone, Copy)]
struct Cet2026;

impl Cet2026 {
    fn standard() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn summer() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }
}

impl TimeZone for Cet2026 {
    type Offset = FixedOffset;

    fn from_offset(_offset: &FixedOffset) -> Self {
        Cet2026
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
        self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
        // summer first so an ambiguous time lists its earlier instant first
        let valid: Vec<FixedOffset> = [Self::summer(), Self::standard()]
            .into_iter()
            .filter(|offset| self.offset_from_utc_datetime(&(*local - *offset)) == *offset)
            .collect();
        match valid.as_slice() {
            [] => LocalResult::None,
            [single] => LocalResult::Single(*single),
            [earlier, later, ..] => LocalResult::Ambiguous(*earlier, *later),
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
        self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
        let starts = NaiveDate::from_ymd_opt(2026, 3, 29)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        let ends = NaiveDate::from_ymd_opt(2026, 10, 25)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        if *utc >= starts && *utc < ends {
            Self::summer()
        } else {
            Self::standard()
        }
    }
}

// ============= Countdown scenarios =============

#[test]
fn afternoon_countdown_to_asr() {
    let now = riyadh(10, 13, 0, 0);
    let schedule = build_schedule(&timings("05:00"), &now).unwrap();
    let state = tick(&schedule, &now);

    assert_eq!(state.next, PrayerName::Asr);
    assert_eq!(state.remaining_label(), "02:45:00");
    assert!((state.progress_ratio - 45.0 / 210.0).abs() < 1e-9);
}

#[test]
fn evening_countdown_to_tomorrows_fajr() {
    let now = riyadh(10, 20, 30, 0);
    let schedule = build_schedule(&timings("05:00"), &now).unwrap();
    let state = tick(&schedule, &now);

    assert!(schedule.rolled_over());
    assert_eq!(state.next, PrayerName::Fajr);
    assert_eq!(state.remaining_label(), "08:30:00");
    assert_eq!(state.next_instant, riyadh(11, 5, 0, 0));
}

#[test]
fn arrival_then_rebuild_moves_to_the_next_prayer() {
    let schedule = build_schedule(&timings("05:00"), &riyadh(10, 19, 49, 0)).unwrap();
    assert_eq!(schedule.next().name, PrayerName::Isha);

    let before = tick(&schedule, &riyadh(10, 19, 49, 59));
    assert_eq!(before.remaining_label(), "00:00:01");
    assert!(!before.is_arrived());

    let arrived = tick(&schedule, &riyadh(10, 19, 50, 0));
    assert!(arrived.is_arrived());
    assert_eq!(arrived.remaining_label(), "Now");
    assert_eq!(arrived.progress_ratio, 1.0);

    // a late tick on the stale schedule still reads as arrived, never negative
    let late = tick(&schedule, &riyadh(10, 19, 52, 0));
    assert_eq!(late.remaining, Duration::zero());

    let rebuilt = build_schedule(&timings("05:00"), &riyadh(10, 19, 50, 0)).unwrap();
    assert_eq!(rebuilt.next().name, PrayerName::Fajr);
    assert!(rebuilt.rolled_over());
    let state = tick(&rebuilt, &riyadh(10, 19, 50, 0));
    assert_eq!(state.progress_ratio, 0.0);
}

#[test]
fn malformed_day_yields_no_schedule() {
    let mut raw = timings("05:00");
    raw.insert(PrayerName::Maghrib, "sunset".to_string());

    let err = build_schedule(&raw, &riyadh(10, 13, 0, 0)).unwrap_err();
    assert_eq!(err.prayer(), PrayerName::Maghrib);
    assert!(matches!(
        err,
        ScheduleError::MalformedTimings {
            reason: MalformedReason::Unparseable(_),
            ..
        }
    ));
}

// ============= Daylight saving =============

#[test]
fn fajr_inside_spring_gap_moves_an_hour_later() {
    let now = Cet2026.with_ymd_and_hms(2026, 3, 29, 0, 30, 0).unwrap();
    let schedule = build_schedule(&timings("02:30"), &now).unwrap();

    assert_eq!(schedule.next().name, PrayerName::Fajr);
    // 03:30 summer time
    assert_eq!(schedule.next_instant(), utc(3, 29, 1, 30));
    // yesterday's Isha, still standard time
    assert_eq!(schedule.previous_instant(), utc(3, 28, 18, 50));

    let state = tick(&schedule, &now);
    assert_eq!(state.remaining_label(), "02:00:00");
}

#[test]
fn ambiguous_fajr_takes_the_earlier_instant() {
    let now = Cet2026.with_ymd_and_hms(2026, 10, 25, 1, 0, 0).unwrap();
    let schedule = build_schedule(&timings("02:30"), &now).unwrap();

    assert_eq!(schedule.next().name, PrayerName::Fajr);
    assert_eq!(schedule.next_instant(), utc(10, 25, 0, 30));
    assert_eq!(tick(&schedule, &now).remaining_label(), "01:30:00");

    // the rest of the day is back on standard time
    assert_eq!(schedule.entry(PrayerName::Isha).instant, utc(10, 25, 18, 50));
}

#[test]
fn rollover_across_spring_forward_is_one_calendar_day() {
    let now = Cet2026.with_ymd_and_hms(2026, 3, 28, 21, 0, 0).unwrap();
    let schedule = build_schedule(&timings("05:00"), &now).unwrap();

    assert!(schedule.rolled_over());
    // 05:00 local the next morning is already summer time
    assert_eq!(schedule.next_instant(), utc(3, 29, 3, 0));
    assert_eq!(schedule.previous_instant(), utc(3, 28, 18, 50));
    assert_eq!(tick(&schedule, &now).remaining_label(), "07:00:00");
}
