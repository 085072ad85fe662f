use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::models::{PrayerName, RawTimings};
use crate::schedule::error::{MalformedReason, ScheduleError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrayerTimeEntry {
    pub name: PrayerName,
    pub clock_time: NaiveTime,
    pub instant: DateTime<Utc>,
    pub is_next: bool,
}

/// One day's five prayers, Fajr first, with exactly one marked as next.
///
/// Built once per timings fetch and never mutated afterwards. When every
/// prayer of the day has passed, the Fajr entry carries tomorrow's instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrayerSchedule {
    pub(crate) entries: Vec<PrayerTimeEntry>,
    pub(crate) next_index: usize,
    pub(crate) previous_instant: DateTime<Utc>,
    pub(crate) date: NaiveDate,
    pub(crate) rolled_over: bool,
}

impl PrayerSchedule {
    pub fn entries(&self) -> &[PrayerTimeEntry] {
        &self.entries
    }

    pub fn next(&self) -> &PrayerTimeEntry {
        &self.entries[self.next_index]
    }

    pub fn next_instant(&self) -> DateTime<Utc> {
        self.next().instant
    }

    /// Instant of the prayer before the next one. Yesterday's Isha when
    /// today's Fajr is next; today's Isha when tomorrow's Fajr is next.
    pub fn previous_instant(&self) -> DateTime<Utc> {
        self.previous_instant
    }

    /// Local calendar date the clock times were combined with.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// True when the next prayer is tomorrow's Fajr.
    pub fn rolled_over(&self) -> bool {
        self.rolled_over
    }

    pub fn entry(&self, name: PrayerName) -> &PrayerTimeEntry {
        &self.entries[name.index()]
    }
}

/// Parse a provider clock string. A trailing annotation such as `"05:00 (BST)"`
/// is ignored.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    let token = value.split_whitespace().next()?;
    NaiveTime::parse_from_str(token, "%H:%M").ok()
}

fn parse_clock_times(raw: &RawTimings) -> Result<Vec<NaiveTime>, ScheduleError> {
    let mut times: Vec<NaiveTime> = Vec::with_capacity(PrayerName::ALL.len());
    for name in PrayerName::ALL {
        let value = raw
            .get(&name)
            .ok_or_else(|| ScheduleError::malformed(name, MalformedReason::Missing))?;
        let time = parse_clock(value).ok_or_else(|| {
            ScheduleError::malformed(name, MalformedReason::Unparseable(value.clone()))
        })?;
        if let Some(prev) = times.last() {
            if time <= *prev {
                return Err(ScheduleError::malformed(name, MalformedReason::OutOfOrder));
            }
        }
        times.push(time);
    }
    Ok(times)
}

/// Resolve a local wall-clock time to an absolute instant.
///
/// Ambiguous times (fall-back) take the earlier instant. Times inside a
/// spring-forward gap are pushed one hour later.
pub fn combine<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

fn combine_for<Tz: TimeZone>(
    tz: &Tz,
    name: PrayerName,
    date: Option<NaiveDate>,
    time: NaiveTime,
) -> Result<DateTime<Utc>, ScheduleError> {
    date.and_then(|d| combine(tz, d, time))
        .ok_or_else(|| ScheduleError::malformed(name, MalformedReason::Unrepresentable))
}

/// Build the schedule for the local day containing `now`.
///
/// Either returns a full five-entry schedule or the first malformed entry;
/// never a partial one.
pub fn build_schedule<Tz: TimeZone>(
    raw: &RawTimings,
    now: &DateTime<Tz>,
) -> Result<PrayerSchedule, ScheduleError> {
    let clock_times = parse_clock_times(raw)?;
    let tz = now.timezone();
    let today = now.date_naive();
    let now_utc = now.with_timezone(&Utc);

    let mut entries = Vec::with_capacity(clock_times.len());
    for (name, clock_time) in PrayerName::ALL.into_iter().zip(clock_times.iter().copied()) {
        entries.push(PrayerTimeEntry {
            name,
            clock_time,
            instant: combine_for(&tz, name, Some(today), clock_time)?,
            is_next: false,
        });
    }

    let isha = PrayerName::Isha.index();
    let (next_index, previous_instant, rolled_over) =
        match entries.iter().position(|e| e.instant > now_utc) {
            Some(0) => {
                let yesterday_isha =
                    combine_for(&tz, PrayerName::Isha, today.pred_opt(), clock_times[isha])?;
                (0, yesterday_isha, false)
            }
            Some(i) => (i, entries[i - 1].instant, false),
            None => {
                let fajr = PrayerName::Fajr.index();
                entries[fajr].instant =
                    combine_for(&tz, PrayerName::Fajr, today.succ_opt(), clock_times[fajr])?;
                (fajr, entries[isha].instant, true)
            }
        };
    entries[next_index].is_next = true;

    Ok(PrayerSchedule {
        entries,
        next_index,
        previous_instant,
        date: today,
        rolled_over,
    })
}
