//! External collaborators the schedule depends on: timings, Qibla bearing,
//! geolocation and place search. Each is one request and one response.

pub mod aladhan;
pub mod geocoding;
pub mod geolocation;
mod http;
pub mod offline;

use chrono::{FixedOffset, NaiveDate};
use thiserror::Error;

use crate::models::{Coordinates, Place, RawTimings};

pub use aladhan::AladhanClient;
pub use geocoding::OpenMeteoGeocoder;
pub use geolocation::{resolve_location, ConfiguredLocation, IpGeolocation, ResolvedLocation};
pub use offline::{qibla_bearing, OfflineQibla, OfflineTimings};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} reported an error: {message}")]
    Api {
        service: &'static str,
        message: String,
    },

    #[error("Could not decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("No results for '{0}'")]
    NotFound(String),

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Prayer calculation failed: {0}")]
    Calculation(String),
}

/// One day's raw timings as delivered by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTimings {
    pub raw: RawTimings,
    pub hijri: Option<String>,
    /// IANA zone name reported by the provider, if any.
    pub timezone: Option<String>,
}

pub trait TimingsProvider {
    /// Timings for `coords` on `date`. Providers that compute rather than
    /// fetch write their clock strings in `zone`.
    fn daily_timings(
        &self,
        coords: Coordinates,
        date: NaiveDate,
        zone: FixedOffset,
    ) -> Result<DailyTimings, ProviderError>;

    fn source_name(&self) -> &'static str;

    /// Cache key component. Providers whose output depends on settings
    /// include them so a settings change misses the cache.
    fn cache_tag(&self) -> String {
        self.source_name().to_string()
    }

    /// Civil offset the day at `coords` should be read in, for a viewer at
    /// `viewer`. `None` keeps the viewer's own zone.
    fn clock_offset(&self, _coords: Coordinates, _viewer: FixedOffset) -> Option<FixedOffset> {
        None
    }
}

pub trait QiblaProvider {
    /// Bearing in degrees clockwise from true north.
    fn qibla(&self, coords: Coordinates) -> Result<f64, ProviderError>;
}

pub trait GeolocationSource {
    fn locate(&self) -> Result<Place, ProviderError>;
}

pub trait LocationSearch {
    fn search(&self, query: &str) -> Result<Place, ProviderError>;
}

/// Derive a display label from an IANA zone, e.g. "America/New_York" → "New York".
pub fn location_label_from_timezone(tz: &str) -> String {
    match tz.split('/').nth(1) {
        Some(city) if !city.is_empty() => city.replace('_', " "),
        _ => tz.to_string(),
    }
}
