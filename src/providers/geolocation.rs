use log::{info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::http::{client, get_json, trim_base};
use super::{GeolocationSource, ProviderError};
use crate::models::Place;

const SERVICE: &str = "ip-api";

pub const DEFAULT_BASE_URL: &str = "http://ip-api.com";

/// Location stored in the user's config, if any.
pub struct ConfiguredLocation {
    place: Option<Place>,
}

impl ConfiguredLocation {
    pub fn new(place: Option<Place>) -> Self {
        Self { place }
    }
}

impl GeolocationSource for ConfiguredLocation {
    fn locate(&self) -> Result<Place, ProviderError> {
        self.place
            .clone()
            .ok_or_else(|| ProviderError::Unavailable("no location configured".to_string()))
    }
}

/// Approximate location from the public IP address. Disabled lookups behave
/// like a denied permission.
pub struct IpGeolocation {
    client: Client,
    base_url: String,
    enabled: bool,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl IpGeolocation {
    pub fn new(base_url: &str, enabled: bool) -> Result<Self, ProviderError> {
        Ok(Self {
            client: client()?,
            base_url: trim_base(base_url),
            enabled,
        })
    }
}

fn place_from_ip(response: IpApiResponse) -> Result<Place, ProviderError> {
    if response.status != "success" {
        return Err(ProviderError::Unavailable(
            response.message.unwrap_or(response.status),
        ));
    }
    let (Some(lat), Some(lon)) = (response.lat, response.lon) else {
        return Err(ProviderError::Decode {
            service: SERVICE,
            message: "missing lat/lon".to_string(),
        });
    };
    let name = match (response.city, response.country) {
        (Some(city), Some(country)) => format!("{}, {}", city, country),
        (Some(city), None) => city,
        (None, Some(country)) => country,
        (None, None) => format!("{:.2}, {:.2}", lat, lon),
    };
    Ok(Place::new(lat, lon, name))
}

impl GeolocationSource for IpGeolocation {
    fn locate(&self) -> Result<Place, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::PermissionDenied);
        }
        let url = format!("{}/json", self.base_url);
        let response: IpApiResponse = get_json(&self.client, SERVICE, &url, &[])?;
        place_from_ip(response)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub place: Place,
    /// Set when every source failed and Mecca was used instead.
    pub fallback_reason: Option<String>,
}

/// Try each source in order; the first success wins. If all fail, fall back
/// to Mecca and keep the last error for display.
pub fn resolve_location(sources: &[&dyn GeolocationSource]) -> ResolvedLocation {
    let mut last_error = None;
    for source in sources {
        match source.locate() {
            Ok(place) => {
                info!("Location resolved: {}", place.name);
                return ResolvedLocation {
                    place,
                    fallback_reason: None,
                };
            }
            Err(e) => {
                warn!("Location source failed: {}", e);
                last_error = Some(e);
            }
        }
    }

    let reason = match last_error {
        Some(ProviderError::PermissionDenied) => "Location access denied. Using Makkah.".to_string(),
        Some(e) => format!("{}. Using Makkah.", e),
        None => "No location source. Using Makkah.".to_string(),
    };
    ResolvedLocation {
        place: Place::mecca(),
        fallback_reason: Some(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MECCA;

    struct Denied;

    impl GeolocationSource for Denied {
        fn locate(&self) -> Result<Place, ProviderError> {
            Err(ProviderError::PermissionDenied)
        }
    }

    #[test]
    fn configured_location_wins() {
        let configured = ConfiguredLocation::new(Some(Place::new(51.5, -0.12, "London")));
        let resolved = resolve_location(&[&Denied, &configured]);
        assert_eq!(resolved.place.name, "London");
        assert!(resolved.fallback_reason.is_none());
    }

    #[test]
    fn all_sources_failing_falls_back_to_mecca() {
        let unset = ConfiguredLocation::new(None);
        let resolved = resolve_location(&[&unset, &Denied]);
        assert_eq!(resolved.place.coords, MECCA);
        assert_eq!(
            resolved.fallback_reason.as_deref(),
            Some("Location access denied. Using Makkah.")
        );
    }

    #[test]
    fn no_sources_falls_back_to_mecca() {
        let resolved = resolve_location(&[]);
        assert_eq!(resolved.place, Place::mecca());
        assert!(resolved.fallback_reason.is_some());
    }

    #[test]
    fn disabled_ip_lookup_is_denied() {
        let ip = IpGeolocation::new(DEFAULT_BASE_URL, false).unwrap();
        assert!(matches!(ip.locate(), Err(ProviderError::PermissionDenied)));
    }

    #[test]
    fn ip_api_failure_is_unavailable() {
        let response: IpApiResponse = serde_json::from_value(serde_json::json!({
            "status": "fail", "message": "private range"
        }))
        .unwrap();
        assert!(matches!(
            place_from_ip(response),
            Err(ProviderError::Unavailable(m)) if m == "private range"
        ));
    }
}
