use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Cache key component, rounded to roughly 11 m.
    pub fn cache_key(&self) -> (String, String) {
        (
            format!("{:.4}", self.latitude),
            format!("{:.4}", self.longitude),
        )
    }
}

/// The Kaaba, Mecca. Used as the fallback location and the Qibla target.
pub const MECCA: Coordinates = Coordinates::new(21.4225, 39.8262);

/// A resolved location with a human-readable label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub coords: Coordinates,
    pub name: String,
}

impl Place {
    pub fn new(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            coords: Coordinates::new(latitude, longitude),
            name: name.into(),
        }
    }

    pub fn mecca() -> Self {
        Self {
            coords: MECCA,
            name: "Makkah".to_string(),
        }
    }
}
