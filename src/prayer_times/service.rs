use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, Offset, TimeZone};
use log::{debug, info, warn};
use rusqlite::Connection;

use crate::config::{AppConfig, TimingsSource};
use crate::db::repository::CacheRepo;
use crate::models::{Coordinates, Place};
use crate::providers::{
    location_label_from_timezone, qibla_bearing, resolve_location, AladhanClient,
    ConfiguredLocation, DailyTimings, GeolocationSource, IpGeolocation, OfflineQibla, OfflineTimings,
    QiblaProvider, ResolvedLocation, TimingsProvider,
};
use crate::schedule::{build_schedule, PrayerSchedule};

/// Days of cached timings kept behind today.
const CACHE_RETENTION_DAYS: i64 = 7;

/// Everything the views need for one location and day.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub place: Place,
    /// Set when the location fell back to Mecca.
    pub fallback_reason: Option<String>,
    pub daily: DailyTimings,
    pub schedule: PrayerSchedule,
}

impl Snapshot {
    /// Label for the header. A fallback location is named after the
    /// provider's timezone when one was reported.
    pub fn location_label(&self) -> String {
        match (&self.fallback_reason, &self.daily.timezone) {
            (Some(_), Some(tz)) => location_label_from_timezone(tz),
            _ => self.place.name.clone(),
        }
    }
}

/// Fetches timings through the configured provider, caching per location/day.
pub struct TimingsService {
    provider: Box<dyn TimingsProvider>,
}

impl TimingsService {
    pub fn new(provider: Box<dyn TimingsProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let provider: Box<dyn TimingsProvider> = match config.timings.source {
            TimingsSource::Offline => Box::new(
                OfflineTimings::new(
                    &config.timings.calc_method,
                    &config.timings.madhab,
                    config.timings.hijri_offset,
                )
                .context("Configuring offline calculation")?,
            ),
            TimingsSource::Aladhan => Box::new(
                AladhanClient::new(&config.endpoints.aladhan, config.timings.aladhan_method)
                    .context("Creating Aladhan client")?,
            ),
        };
        Ok(Self::new(provider))
    }

    pub fn source_name(&self) -> &'static str {
        self.provider.source_name()
    }

    /// Timings for `coords` on the local date of `now`, from cache when
    /// present, and the schedule built from them. Fresh timings are cached
    /// only once they produced a valid schedule.
    ///
    /// Providers that compute their own clock strings may read the day in
    /// the place's civil zone instead of the viewer's.
    pub fn snapshot<Tz: TimeZone>(
        &self,
        conn: &Connection,
        resolved: ResolvedLocation,
        now: &DateTime<Tz>,
    ) -> Result<Snapshot> {
        let viewer = now.offset().fix();
        match self.provider.clock_offset(resolved.place.coords, viewer) {
            Some(zone) if zone != viewer => {
                debug!("Reading {} on {}", resolved.place.name, zone);
                self.snapshot_in(conn, resolved, &now.with_timezone(&zone), zone)
            }
            _ => self.snapshot_in(conn, resolved, now, viewer),
        }
    }

    fn snapshot_in<Tz: TimeZone>(
        &self,
        conn: &Connection,
        resolved: ResolvedLocation,
        now: &DateTime<Tz>,
        zone: FixedOffset,
    ) -> Result<Snapshot> {
        let coords = resolved.place.coords;
        let date = now.date_naive();
        let source = zoned_tag(&self.provider.cache_tag(), zone);

        let (daily, cached) = match CacheRepo::get(conn, date, coords, &source)? {
            Some(daily) => {
                debug!("Cache hit for {} ({})", date, source);
                (daily, true)
            }
            None => {
                let daily = self
                    .provider
                    .daily_timings(coords, date, zone)
                    .with_context(|| format!("Fetching prayer times for {}", date))?;
                (daily, false)
            }
        };

        let schedule = build_schedule(&daily.raw, now)?;

        if !cached {
            CacheRepo::store(conn, date, coords, &source, &daily)?;
            let removed =
                CacheRepo::prune_before(conn, date - Duration::days(CACHE_RETENTION_DAYS))?;
            if removed > 0 {
                debug!("Pruned {} cached day(s)", removed);
            }
        }

        info!(
            "Schedule for {} on {} ({}): next {}",
            resolved.place.name,
            date,
            self.source_name(),
            schedule.next().name
        );

        Ok(Snapshot {
            place: resolved.place,
            fallback_reason: resolved.fallback_reason,
            daily,
            schedule,
        })
    }
}

/// Cache source key. Clock strings written in one zone never answer a
/// lookup made in another.
fn zoned_tag(tag: &str, zone: FixedOffset) -> String {
    format!("{}@{}", tag, zone)
}

/// Configured location first, then IP lookup, then Mecca.
pub fn resolve_place(config: &AppConfig) -> ResolvedLocation {
    let configured = ConfiguredLocation::new(config.location.place());
    if config.location.place().is_some() {
        return resolve_location(&[&configured]);
    }
    match IpGeolocation::new(&config.endpoints.ip_lookup, config.location.use_ip_lookup) {
        Ok(ip) => {
            let sources: [&dyn GeolocationSource; 2] = [&configured, &ip];
            resolve_location(&sources)
        }
        Err(e) => {
            warn!("IP lookup unavailable: {}", e);
            resolve_location(&[&configured])
        }
    }
}

/// Qibla bearing from the configured source. Network failures fall back to
/// the local great-circle calculation.
pub fn qibla_for(config: &AppConfig, coords: Coordinates) -> f64 {
    let mut providers: Vec<Box<dyn QiblaProvider>> = Vec::new();
    if config.timings.source == TimingsSource::Aladhan {
        match AladhanClient::new(&config.endpoints.aladhan, config.timings.aladhan_method) {
            Ok(client) => providers.push(Box::new(client)),
            Err(e) => warn!("Aladhan client unavailable: {}", e),
        }
    }
    providers.push(Box::new(OfflineQibla));

    for provider in &providers {
        match provider.qibla(coords) {
            Ok(bearing) => return bearing,
            Err(e) => warn!("Failed to fetch Qibla: {}", e),
        }
    }
    qibla_bearing(coords)
}
