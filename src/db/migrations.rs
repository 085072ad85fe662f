use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS timings_cache (
            date       TEXT NOT NULL,
            latitude   TEXT NOT NULL,
            longitude  TEXT NOT NULL,
            source     TEXT NOT NULL,
            fajr       TEXT,
            dhuhr      TEXT,
            asr        TEXT,
            maghrib    TEXT,
            isha       TEXT,
            hijri      TEXT,
            timezone   TEXT,
            fetched_at TEXT DEFAULT (datetime('now')),
            PRIMARY KEY (date, latitude, longitude, source)
        );

        CREATE TABLE IF NOT EXISTS reminders (
            prayer   TEXT PRIMARY KEY
                     CHECK(prayer IN ('fajr','dhuhr','asr','maghrib','isha')),
            enabled  INTEGER NOT NULL DEFAULT 0
        );
    ")?;
    Ok(())
}
