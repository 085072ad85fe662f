use std::collections::HashMap;

use chrono::{FixedOffset, NaiveDate};
use log::info;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use super::http::{client, get_json, trim_base};
use super::{DailyTimings, ProviderError, QiblaProvider, TimingsProvider};
use crate::models::{Coordinates, PrayerName, RawTimings};

const SERVICE: &str = "Aladhan";

pub const DEFAULT_BASE_URL: &str = "https://api.aladhan.com";

/// Aladhan REST API client for daily timings and Qibla direction.
pub struct AladhanClient {
    client: Client,
    base_url: String,
    method: u8,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: u16,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: HashMap<String, String>,
    #[serde(default)]
    date: Option<DateData>,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct DateData {
    #[serde(default)]
    hijri: Option<HijriData>,
}

#[derive(Debug, Deserialize)]
struct HijriData {
    day: String,
    month: HijriMonth,
    year: String,
}

#[derive(Debug, Deserialize)]
struct HijriMonth {
    en: String,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QiblaData {
    direction: f64,
}

impl AladhanClient {
    /// `method` is Aladhan's calculation method id (2 = ISNA).
    pub fn new(base_url: &str, method: u8) -> Result<Self, ProviderError> {
        Ok(Self {
            client: client()?,
            base_url: trim_base(base_url),
            method,
        })
    }

    fn fetch(&self, url: &str, query: &[(&str, String)]) -> Result<Value, ProviderError> {
        let envelope: Envelope = get_json(&self.client, SERVICE, url, query)?;
        unwrap_envelope(envelope)
    }
}

fn unwrap_envelope(envelope: Envelope) -> Result<Value, ProviderError> {
    if envelope.code != 200 {
        let message = match &envelope.data {
            Value::String(s) => s.clone(),
            _ => envelope
                .status
                .unwrap_or_else(|| format!("code {}", envelope.code)),
        };
        return Err(ProviderError::Api {
            service: SERVICE,
            message,
        });
    }
    Ok(envelope.data)
}

fn decode<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, ProviderError> {
    serde_json::from_value(data).map_err(|e| ProviderError::Decode {
        service: SERVICE,
        message: e.to_string(),
    })
}

/// Pick the five prayers out of an Aladhan `data` object. Entries the
/// provider left out stay absent so the schedule builder can report them.
pub(crate) fn decode_timings(data: Value) -> Result<DailyTimings, ProviderError> {
    let data: TimingsData = decode(data)?;

    let raw: RawTimings = PrayerName::ALL
        .into_iter()
        .filter_map(|name| {
            data.timings
                .get(name.display_name())
                .map(|t| (name, t.clone()))
        })
        .collect();

    let hijri = data
        .date
        .and_then(|d| d.hijri)
        .map(|h| format!("{} {} {}", h.day, h.month.en, h.year));

    Ok(DailyTimings {
        raw,
        hijri,
        timezone: data.meta.and_then(|m| m.timezone),
    })
}

impl TimingsProvider for AladhanClient {
    fn daily_timings(
        &self,
        coords: Coordinates,
        date: NaiveDate,
        _zone: FixedOffset,
    ) -> Result<DailyTimings, ProviderError> {
        info!(
            "Fetching timings for ({}, {}) on {}",
            coords.latitude, coords.longitude, date
        );
        let url = format!("{}/v1/timings/{}", self.base_url, date.format("%d-%m-%Y"));
        let data = self.fetch(
            &url,
            &[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("method", self.method.to_string()),
            ],
        )?;
        decode_timings(data)
    }

    fn source_name(&self) -> &'static str {
        "aladhan"
    }

    fn cache_tag(&self) -> String {
        format!("aladhan:{}", self.method)
    }
}

impl QiblaProvider for AladhanClient {
    fn qibla(&self, coords: Coordinates) -> Result<f64, ProviderError> {
        let url = format!(
            "{}/v1/qibla/{}/{}",
            self.base_url, coords.latitude, coords.longitude
        );
        let data: QiblaData = decode(self.fetch(&url, &[])?)?;
        Ok(data.direction)
    }
}
