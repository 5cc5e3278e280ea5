//! Application configuration management.
//!
//! Configuration is stored at `~/.config/cafe-finder/config.json`. Every field
//! has a default, so a missing or partial file is fine. The pinned location
//! can also be supplied through `CAFE_FINDER_LOCATION="lat,lng"` (a `.env`
//! file is honoured).

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cafefinder_core::api::{MIRROR_ENDPOINT, PRIMARY_ENDPOINT, SEARCH_RADIUS_METERS};
use cafefinder_core::controller::DEFAULT_LOCATION;
use cafefinder_core::geolocation::IP_LOOKUP_ENDPOINT;
use cafefinder_core::map::{TileLayer, OSM_ATTRIBUTION, OSM_TILE_URL};
use cafefinder_core::{ControllerSettings, Coordinate};

/// Application name used for config/cache/data directory paths
pub const APP_NAME: &str = "cafe-finder";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the pinned location
const LOCATION_ENV: &str = "CAFE_FINDER_LOCATION";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_location: Coordinate,
    pub fallback_zoom: u8,
    pub located_zoom: u8,
    pub search_radius_m: u32,
    pub primary_endpoint: String,
    pub mirror_endpoint: String,
    pub tile_url_template: String,
    pub tile_attribution: String,
    pub geolocation_enabled: bool,
    /// A fixed position to use instead of looking one up.
    pub location: Option<Coordinate>,
    /// `None` disables the IP lookup.
    pub ip_geolocation_endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let settings = ControllerSettings::default();
        Self {
            default_location: DEFAULT_LOCATION,
            fallback_zoom: settings.fallback_zoom,
            located_zoom: settings.located_zoom,
            search_radius_m: SEARCH_RADIUS_METERS,
            primary_endpoint: PRIMARY_ENDPOINT.to_string(),
            mirror_endpoint: MIRROR_ENDPOINT.to_string(),
            tile_url_template: OSM_TILE_URL.to_string(),
            tile_attribution: OSM_ATTRIBUTION.to_string(),
            geolocation_enabled: true,
            location: None,
            ip_geolocation_endpoint: Some(IP_LOOKUP_ENDPOINT.to_string()),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Cache directory (location fixes, logs).
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir().context("Could not find cache directory")?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// The pinned position, with the environment taking precedence over the
    /// config file. An unparsable environment value is ignored.
    pub fn pinned_location(&self) -> Option<Coordinate> {
        std::env::var(LOCATION_ENV)
            .ok()
            .and_then(|value| parse_location(&value))
            .or(self.location)
    }

    pub fn tile_layer(&self) -> TileLayer {
        TileLayer::new(self.tile_url_template.clone(), self.tile_attribution.clone())
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            default_location: self.default_location,
            fallback_zoom: self.fallback_zoom,
            located_zoom: self.located_zoom,
            tile_layer: self.tile_layer(),
            ..ControllerSettings::default()
        }
    }
}

/// Parse `"lat,lng"` (whitespace tolerated) into a valid coordinate.
pub fn parse_location(value: &str) -> Option<Coordinate> {
    let (lat, lng) = value.split_once(',')?;
    let position = Coordinate::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?);
    position.is_valid().then_some(position)
}
