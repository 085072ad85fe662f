use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::Place;
use crate::providers::{aladhan, geocoding, geolocation};

fn default_true() -> bool {
    true
}
fn default_calc_method() -> String {
    "MuslimWorldLeague".to_string()
}
fn default_madhab() -> String {
    "Shafi".to_string()
}
fn default_aladhan_method() -> u8 {
    2
}
fn default_tick_ms() -> u64 {
    1000
}
fn default_aladhan_url() -> String {
    aladhan::DEFAULT_BASE_URL.to_string()
}
fn default_geocoding_url() -> String {
    geocoding::DEFAULT_BASE_URL.to_string()
}
fn default_ip_lookup_url() -> String {
    geolocation::DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimingsSource {
    #[default]
    Offline,
    Aladhan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Ask ip-api for an approximate location when none is configured.
    #[serde(default = "default_true")]
    pub use_ip_lookup: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: None,
            latitude: None,
            longitude: None,
            use_ip_lookup: true,
        }
    }
}

impl LocationConfig {
    /// The configured place, when both coordinates are set.
    pub fn place(&self) -> Option<Place> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => {
                let name = self
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{:.4}, {:.4}", lat, lng));
                Some(Place::new(lat, lng, name))
            }
            _ => None,
        }
    }

    pub fn set_place(&mut self, place: &Place) {
        self.name = Some(place.name.clone());
        self.latitude = Some(place.coords.latitude);
        self.longitude = Some(place.coords.longitude);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingsConfig {
    #[serde(default)]
    pub source: TimingsSource,
    #[serde(default = "default_calc_method")]
    pub calc_method: String,
    #[serde(default = "default_madhab")]
    pub madhab: String,
    /// Aladhan calculation method id; 2 is ISNA.
    #[serde(default = "default_aladhan_method")]
    pub aladhan_method: u8,
    /// Days to add/subtract from the Hijri date for local moon sighting.
    #[serde(default)]
    pub hijri_offset: i32,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        Self {
            source: TimingsSource::default(),
            calc_method: default_calc_method(),
            madhab: default_madhab(),
            aladhan_method: default_aladhan_method(),
            hijri_offset: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_aladhan_url")]
    pub aladhan: String,
    #[serde(default = "default_geocoding_url")]
    pub geocoding: String,
    #[serde(default = "default_ip_lookup_url")]
    pub ip_lookup: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            aladhan: default_aladhan_url(),
            geocoding: default_geocoding_url(),
            ip_lookup: default_ip_lookup_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_true")]
    pub twelve_hour: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            twelve_hour: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub timings: TimingsConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "miqat").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("miqat.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [timings]
            source = "aladhan"

            [display]
            twelve_hour = false
            "#,
        )
        .unwrap();
        assert_eq!(config.timings.source, TimingsSource::Aladhan);
        assert_eq!(config.timings.calc_method, "MuslimWorldLeague");
        assert_eq!(config.timings.aladhan_method, 2);
        assert_eq!(config.display.tick_ms, 1000);
        assert!(!config.display.twelve_hour);
        assert!(config.location.place().is_none());
        assert!(config.location.use_ip_lookup);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config
            .location
            .set_place(&Place::new(33.6938, 73.0651, "Islamabad, Pakistan"));
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.location.place().unwrap().name, "Islamabad, Pakistan");
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, AppConfig::default());
    }
}
