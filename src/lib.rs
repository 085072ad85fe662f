//! Prayer schedule, countdown and Qibla for the terminal.
//!
//! The core lives in [`schedule`]: [`schedule::build_schedule`] turns one
//! day's raw provider timings into an immutable [`schedule::PrayerSchedule`],
//! and [`schedule::tick`] derives the live [`schedule::CountdownState`] from
//! it. Everything else feeds those two functions or presents their output.

pub mod cli;
pub mod config;
pub mod db;
pub mod models;
pub mod prayer_times;
pub mod providers;
pub mod schedule;
pub mod tui;
pub mod utils;
