use log::info;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::http::{client, get_json, trim_base};
use super::{LocationSearch, ProviderError};
use crate::models::Place;

const SERVICE: &str = "Open-Meteo";

pub const DEFAULT_BASE_URL: &str = "https://geocoding-api.open-meteo.com";

/// Free-text place search through the Open-Meteo geocoding API.
pub struct OpenMeteoGeocoder {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
}

impl OpenMeteoGeocoder {
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: client()?,
            base_url: trim_base(base_url),
        })
    }
}

fn first_place(query: &str, response: SearchResponse) -> Result<Place, ProviderError> {
    let result = response
        .results
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::NotFound(query.to_string()))?;

    let name = match result.country {
        Some(country) => format!("{}, {}", result.name, country),
        None => result.name,
    };
    Ok(Place::new(result.latitude, result.longitude, name))
}

impl LocationSearch for OpenMeteoGeocoder {
    fn search(&self, query: &str) -> Result<Place, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ProviderError::NotFound(String::new()));
        }
        info!("Searching location '{}'", query);

        let url = format!("{}/v1/search", self.base_url);
        let response: SearchResponse = get_json(
            &self.client,
            SERVICE,
            &url,
            &[
                ("name", query.to_string()),
                ("count", "1".to_string()),
                ("language", "en".to_string()),
                ("format", "json".to_string()),
            ],
        )?;
        first_place(query, response)
    }
}
