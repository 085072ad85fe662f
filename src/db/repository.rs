use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

use crate::models::{Coordinates, PrayerName, RawTimings};
use crate::providers::DailyTimings;

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ─── Cached timings ──────────────────────────────────────────────────────────

pub struct CacheRepo;

impl CacheRepo {
    pub fn get(
        conn: &Connection,
        date: NaiveDate,
        coords: Coordinates,
        source: &str,
    ) -> Result<Option<DailyTimings>> {
        let (lat, lng) = coords.cache_key();
        let row = conn
            .query_row(
                "SELECT fajr, dhuhr, asr, maghrib, isha, hijri, timezone
                 FROM timings_cache
                 WHERE date = ?1 AND latitude = ?2 AND longitude = ?3 AND source = ?4",
                params![date_key(date), lat, lng, source],
                |row| {
                    let mut times: Vec<Option<String>> = Vec::with_capacity(5);
                    for i in 0..5usize {
                        times.push(row.get(i)?);
                    }
                    Ok((
                        times,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, Option<String>>(6)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(|(times, hijri, timezone)| {
            let raw: RawTimings = PrayerName::ALL
                .into_iter()
                .zip(times)
                .filter_map(|(name, t)| t.map(|t| (name, t)))
                .collect();
            DailyTimings {
                raw,
                hijri,
                timezone,
            }
        }))
    }

    pub fn store(
        conn: &Connection,
        date: NaiveDate,
        coords: Coordinates,
        source: &str,
        timings: &DailyTimings,
    ) -> Result<()> {
        let (lat, lng) = coords.cache_key();
        let t = |name: PrayerName| timings.raw.get(&name).cloned();
        conn.execute(
            "INSERT OR REPLACE INTO timings_cache
                (date, latitude, longitude, source, fajr, dhuhr, asr, maghrib, isha, hijri, timezone)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                date_key(date),
                lat,
                lng,
                source,
                t(PrayerName::Fajr),
                t(PrayerName::Dhuhr),
                t(PrayerName::Asr),
                t(PrayerName::Maghrib),
                t(PrayerName::Isha),
                timings.hijri,
                timings.timezone,
            ],
        )?;
        Ok(())
    }

    /// Drop entries for days before `date`. Returns rows removed.
    pub fn prune_before(conn: &Connection, date: NaiveDate) -> Result<usize> {
        let removed = conn.execute(
            "DELETE FROM timings_cache WHERE date < ?1",
            params![date_key(date)],
        )?;
        Ok(removed)
    }

    pub fn clear_all(conn: &Connection) -> Result<usize> {
        let removed = conn.execute("DELETE FROM timings_cache", [])?;
        Ok(removed)
    }
}

// ─── Reminders ───────────────────────────────────────────────────────────────

pub struct ReminderRepo;

impl ReminderRepo {
    pub fn is_enabled(conn: &Connection, prayer: PrayerName) -> Result<bool> {
        let enabled = conn
            .query_row(
                "SELECT enabled FROM reminders WHERE prayer = ?1",
                params![prayer.as_str()],
                |row| row.get::<_, i32>(0),
            )
            .optional()?;
        Ok(enabled.unwrap_or(0) != 0)
    }

    /// Flip the reminder for `prayer` and return the new state.
    pub fn toggle(conn: &Connection, prayer: PrayerName) -> Result<bool> {
        let now_enabled = !Self::is_enabled(conn, prayer)?;
        conn.execute(
            "INSERT INTO reminders (prayer, enabled) VALUES (?1, ?2)
             ON CONFLICT(prayer) DO UPDATE SET enabled = excluded.enabled",
            params![prayer.as_str(), now_enabled as i32],
        )?;
        Ok(now_enabled)
    }

    pub fn enabled(conn: &Connection) -> Result<Vec<PrayerName>> {
        let mut stmt = conn.prepare("SELECT prayer FROM reminders WHERE enabled = 1")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut result = Vec::new();
        for row in rows {
            let name = row?;
            result.push(PrayerName::from_str(&name)?);
        }
        result.sort();
        Ok(result)
    }
}
