//! Slippy-map tile math (Web Mercator, 256px tiles).

use crate::models::Coordinate;

pub const OSM_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";
pub const MAX_ZOOM: u8 = 18;

/// Edge length of one tile in world pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Web Mercator is undefined at the poles; latitudes are clamped here.
const MAX_LATITUDE: f64 = 85.051_128_78;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: OSM_TILE_URL.to_string(),
            attribution: OSM_ATTRIBUTION.to_string(),
            max_zoom: MAX_ZOOM,
        }
    }
}

impl TileLayer {
    pub fn new(url_template: impl Into<String>, attribution: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            attribution: attribution.into(),
            max_zoom: MAX_ZOOM,
        }
    }

    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    pub fn tile_url(&self, tile: TileCoord) -> String {
        self.url_template
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// Size of the whole world in pixels at `zoom`.
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Project a coordinate to world pixel space at a (possibly fractional) zoom.
/// `x` grows eastward and `y` southward.
pub fn project(position: Coordinate, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = position.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (position.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * size;
    (x, y)
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64, zoom: f64) -> Coordinate {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / size);
    let lat = n.sinh().atan().to_degrees();
    Coordinate::new(lat, lng)
}

/// The tile containing `position` at integer zoom `z`.
pub fn tile_for(position: Coordinate, z: u8) -> TileCoord {
    let (x, y) = project(position, f64::from(z));
    let last = (1u32 << z).saturating_sub(1);
    TileCoord {
        z,
        x: ((x / TILE_SIZE).floor().max(0.0) as u32).min(last),
        y: ((y / TILE_SIZE).floor().max(0.0) as u32).min(last),
    }
}
