use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::str::FromStr;

use crate::cli::args::CacheCommands;
use crate::config::AppConfig;
use crate::db::repository::{CacheRepo, ReminderRepo};
use crate::models::PrayerName;
use crate::prayer_times::{qibla_for, resolve_place, Snapshot, TimingsService};
use crate::providers::{LocationSearch, OpenMeteoGeocoder};
use crate::schedule::{tick, CountdownState, PrayerTimeEntry};
use crate::utils::format::{format_clock, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn load_snapshot(conn: &Connection, config: &AppConfig) -> Result<Snapshot> {
    let resolved = resolve_place(config);
    let service = TimingsService::from_config(config)?;
    service.snapshot(conn, resolved, &Local::now())
}

// ─── Times ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TimesReport<'a> {
    location: String,
    date: NaiveDate,
    hijri: Option<&'a str>,
    next: PrayerName,
    remaining: String,
    remaining_seconds: i64,
    progress: f64,
    prayers: &'a [PrayerTimeEntry],
}

pub fn handle_times(conn: &Connection, config: &AppConfig, json: bool) -> Result<()> {
    let snapshot = load_snapshot(conn, config)?;
    let now = Local::now();
    let countdown = tick(&snapshot.schedule, &now);

    if json {
        let report = TimesReport {
            location: snapshot.location_label(),
            date: snapshot.schedule.date(),
            hijri: snapshot.daily.hijri.as_deref(),
            next: countdown.next,
            remaining: countdown.remaining_label(),
            remaining_seconds: countdown.remaining.num_seconds(),
            progress: countdown.progress_ratio,
            prayers: snapshot.schedule.entries(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let reminders = ReminderRepo::enabled(conn)?;
    let twelve_hour = config.display.twelve_hour;

    println!();
    if let Some(reason) = &snapshot.fallback_reason {
        println_colored!(AMBER, "  {}", reason);
        println!();
    }
    println_colored!(
        GOLD,
        "  Prayer Times · {} ({})",
        snapshot.location_label(),
        snapshot.schedule.date().format("%Y-%m-%d")
    );
    if let Some(hijri) = &snapshot.daily.hijri {
        println_colored!(DIM, "  {}", hijri);
    }
    println!();

    let now_utc = now.with_timezone(&Utc);
    for entry in snapshot.schedule.entries() {
        let time_str = format_clock(entry.clock_time, twelve_hour);
        let bell = if reminders.contains(&entry.name) { "🔔" } else { "" };
        if entry.is_next {
            println_colored!(AMBER, "  {:<10}  {:<9} ◆ next {}", entry.name.display_name(), time_str, bell);
        } else if entry.instant < now_utc {
            println_colored!(DIM, "  {:<10}  {:<9} {}", entry.name.display_name(), time_str, bell);
        } else {
            println_colored!(BOLD, "  {:<10}  {:<9} {}", entry.name.display_name(), time_str, bell);
        }
    }

    println!();
    print_countdown(&countdown);
    println!();
    Ok(())
}

fn print_countdown(countdown: &CountdownState) {
    println_colored!(
        AMBER,
        "  Next: {} in {}",
        countdown.next,
        countdown.remaining_label()
    );
    println_colored!(
        DIM,
        "  {} {:>3.0}%",
        progress_bar(countdown.progress_ratio, 30),
        countdown.progress_ratio * 100.0
    );
}

// ─── Next ────────────────────────────────────────────────────────────────────

pub fn handle_next(conn: &Connection, config: &AppConfig) -> Result<()> {
    let snapshot = load_snapshot(conn, config)?;
    let countdown = tick(&snapshot.schedule, &Local::now());
    let entry = snapshot.schedule.entry(countdown.next);
    println!(
        "{} {} ({})",
        countdown.next,
        format_clock(entry.clock_time, config.display.twelve_hour),
        countdown.remaining_label()
    );
    Ok(())
}

// ─── Qibla ───────────────────────────────────────────────────────────────────

pub fn handle_qibla(config: &AppConfig) -> Result<()> {
    let resolved = resolve_place(config);
    if let Some(reason) = &resolved.fallback_reason {
        println_colored!(AMBER, "  {}", reason);
    }
    let bearing = qibla_for(config, resolved.place.coords);
    println!();
    println_colored!(GOLD, "  Qibla from {}", resolved.place.name);
    println_colored!(BOLD, "  {}° from North ({:.2}°)", bearing.round(), bearing);
    println!();
    Ok(())
}

// ─── Locate ──────────────────────────────────────────────────────────────────

pub fn handle_locate(config: &mut AppConfig, query: &[String]) -> Result<()> {
    let query = query.join(" ");
    if query.trim().is_empty() {
        bail!("Enter a place name, e.g. `miqat locate London`");
    }

    let geocoder = OpenMeteoGeocoder::new(&config.endpoints.geocoding)?;
    let place = geocoder
        .search(&query)
        .with_context(|| format!("Searching for '{}'", query))?;

    config.location.set_place(&place);
    config.save()?;
    println_colored!(
        GREEN,
        "  ✓ Location set to {} ({:.4}, {:.4})",
        place.name,
        place.coords.latitude,
        place.coords.longitude
    );
    Ok(())
}

// ─── Reminders ───────────────────────────────────────────────────────────────

pub fn handle_remind(conn: &Connection, prayer_str: &str) -> Result<()> {
    let prayer = PrayerName::from_str(prayer_str).map_err(|_| {
        anyhow!(
            "Unknown prayer '{}'. Use: fajr, dhuhr, asr, maghrib, isha",
            prayer_str
        )
    })?;
    if ReminderRepo::toggle(conn, prayer)? {
        println_colored!(GREEN, "  🔔 Reminder on for {}", prayer);
    } else {
        println_colored!(DIM, "  Reminder off for {}", prayer);
    }
    Ok(())
}

// ─── Cache ───────────────────────────────────────────────────────────────────

pub fn handle_cache(conn: &Connection, action: &CacheCommands) -> Result<()> {
    match action {
        CacheCommands::Clear => {
            let removed = CacheRepo::clear_all(conn)?;
            println_colored!(GREEN, "  ✓ Removed {} cached day(s)", removed);
        }
    }
    Ok(())
}
