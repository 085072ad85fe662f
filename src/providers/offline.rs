use std::panic;

use chrono::{FixedOffset, NaiveDate};
use log::{debug, warn};
use salah::prelude::{
    Configuration, Coordinates as SalahCoordinates, Madhab, Method, Prayer,
    PrayerSchedule as SalahSchedule,
};

use super::{DailyTimings, ProviderError, QiblaProvider, TimingsProvider};
use crate::models::{Coordinates, PrayerName, RawTimings, MECCA};
use crate::utils::hijri::hijri_label;

/// Astronomical prayer times computed locally, no network needed.
pub struct OfflineTimings {
    method_str: String,
    madhab_str: String,
    hijri_offset: i32,
}

impl OfflineTimings {
    pub fn new(method: &str, madhab: &str, hijri_offset: i32) -> Result<Self, ProviderError> {
        // Validate method + madhab early
        parse_method(method)?;
        parse_madhab(madhab)?;
        Ok(Self {
            method_str: method.to_string(),
            madhab_str: madhab.to_string(),
            hijri_offset,
        })
    }
}

/// Civil offset for a place at `longitude`, seen by a viewer at `viewer`.
///
/// The viewer's own offset wins when it is within two hours of the solar
/// zone, which covers daylight saving and zones drawn wide of their meridian.
/// Otherwise the place is read on its solar zone, so a day there never wraps
/// midnight.
pub fn civil_offset(longitude: f64, viewer: FixedOffset) -> FixedOffset {
    let solar_hours = (longitude / 15.0).round().clamp(-12.0, 14.0) as i32;
    let solar_secs = solar_hours * 3600;
    if (viewer.local_minus_utc() - solar_secs).abs() <= 2 * 3600 {
        viewer
    } else {
        FixedOffset::east_opt(solar_secs).unwrap_or(viewer)
    }
}

impl TimingsProvider for OfflineTimings {
    fn daily_timings(
        &self,
        coords: Coordinates,
        date: NaiveDate,
        zone: FixedOffset,
    ) -> Result<DailyTimings, ProviderError> {
        let location = SalahCoordinates::new(coords.latitude, coords.longitude);
        let params = Configuration::with(parse_method(&self.method_str)?, parse_madhab(&self.madhab_str)?);

        // salah unwraps internally when the sun never reaches a prayer's angle
        let times = panic::catch_unwind(move || {
            SalahSchedule::new()
                .on(date)
                .for_location(location)
                .with_configuration(params)
                .calculate()
        })
        .map_err(|_| {
            ProviderError::Calculation(format!(
                "No solution for {} at latitude {:.2} with {}",
                date, coords.latitude, self.method_str
            ))
        })?
        .map_err(|e| ProviderError::Calculation(e.to_string()))?;

        let raw: RawTimings = PrayerName::ALL
            .into_iter()
            .map(|name| {
                let prayer = match name {
                    PrayerName::Fajr => Prayer::Fajr,
                    PrayerName::Dhuhr => Prayer::Dhuhr,
                    PrayerName::Asr => Prayer::Asr,
                    PrayerName::Maghrib => Prayer::Maghrib,
                    PrayerName::Isha => Prayer::Isha,
                };
                let clock = times.time(prayer).with_timezone(&zone).format("%H:%M");
                (name, clock.to_string())
            })
            .collect();
        debug!("Offline timings for {} ({}): {:?}", date, zone, raw);

        let hijri = match hijri_label(date, self.hijri_offset) {
            Ok(label) => Some(label),
            Err(e) => {
                warn!("{}", e);
                None
            }
        };

        Ok(DailyTimings {
            raw,
            hijri,
            timezone: None,
        })
    }

    fn source_name(&self) -> &'static str {
        "offline"
    }

    fn cache_tag(&self) -> String {
        format!(
            "offline:{}:{}:{}",
            self.method_str, self.madhab_str, self.hijri_offset
        )
    }

    fn clock_offset(&self, coords: Coordinates, viewer: FixedOffset) -> Option<FixedOffset> {
        Some(civil_offset(coords.longitude, viewer))
    }
}

/// Great-circle initial bearing from `from` to the Kaaba, degrees from north.
pub fn qibla_bearing(from: Coordinates) -> f64 {
    let phi = from.latitude.to_radians();
    let phi_k = MECCA.latitude.to_radians();
    let delta = (MECCA.longitude - from.longitude).to_radians();

    let y = delta.sin();
    let x = phi.cos() * phi_k.tan() - phi.sin() * delta.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

pub struct OfflineQibla;

impl QiblaProvider for OfflineQibla {
    fn qibla(&self, coords: Coordinates) -> Result<f64, ProviderError> {
        Ok(qibla_bearing(coords))
    }
}

fn parse_method(s: &str) -> Result<Method, ProviderError> {
    match s {
        "MuslimWorldLeague" => Ok(Method::MuslimWorldLeague),
        "Egyptian" => Ok(Method::Egyptian),
        "Karachi" => Ok(Method::Karachi),
        "UmmAlQura" => Ok(Method::UmmAlQura),
        "Dubai" => Ok(Method::Dubai),
        "MoonsightingCommittee" => Ok(Method::MoonsightingCommittee),
        "NorthAmerica" => Ok(Method::NorthAmerica),
        "Kuwait" => Ok(Method::Kuwait),
        "Qatar" => Ok(Method::Qatar),
        "Singapore" => Ok(Method::Singapore),
        "Tehran" => Ok(Method::Tehran),
        "Turkey" => Ok(Method::Turkey),
        "Other" => Ok(Method::Other),
        _ => Err(ProviderError::Calculation(format!(
            "Unknown calculation method: '{}'. Use one of: {}",
            s,
            CALC_METHODS.join(", ")
        ))),
    }
}

fn parse_madhab(s: &str) -> Result<Madhab, ProviderError> {
    match s {
        "Hanafi" => Ok(Madhab::Hanafi),
        "Shafi" | "Shafi'i" => Ok(Madhab::Shafi),
        _ => Err(ProviderError::Calculation(format!("Unknown madhab: '{}'", s))),
    }
}

pub const CALC_METHODS: &[&str] = &[
    "MuslimWorldLeague",
    "Egyptian",
    "Karachi",
    "UmmAlQura",
    "Dubai",
    "MoonsightingCommittee",
    "NorthAmerica",
    "Kuwait",
    "Qatar",
    "Singapore",
    "Tehran",
    "Turkey",
    "Other",
];
