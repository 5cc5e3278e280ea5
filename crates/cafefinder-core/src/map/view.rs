use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use super::tiles::{tile_for, TileCoord, TileLayer, MAX_ZOOM};
use super::MapSurface;
use crate::models::{Cafe, CafeId, Coordinate};

pub const ADD_FAVORITE_LABEL: &str = "Add to Favorites";
pub const REMOVE_FAVORITE_LABEL: &str = "Remove from Favorites";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Coordinate,
    pub zoom: f64,
}

/// An in-flight camera animation.
#[derive(Debug, Clone, Copy)]
pub struct FlyTo {
    pub from: Camera,
    pub to: Camera,
    pub started: Instant,
    pub duration: Duration,
}

impl FlyTo {
    /// Linear progress in [0, 1].
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Interpolated camera, eased with smoothstep.
    pub fn camera_at(&self, now: Instant) -> Camera {
        let t = self.progress(now);
        let e = t * t * (3.0 - 2.0 * t);
        let lerp = |a: f64, b: f64| a + (b - a) * e;
        Camera {
            center: Coordinate::new(
                lerp(self.from.center.lat, self.to.center.lat),
                lerp(self.from.center.lng, self.to.center.lng),
            ),
            zoom: lerp(self.from.zoom, self.to.zoom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIcon {
    Cafe,
    FavoriteCafe,
    User,
}

impl MarkerIcon {
    pub fn for_cafe(is_favorite: bool) -> Self {
        if is_favorite {
            MarkerIcon::FavoriteCafe
        } else {
            MarkerIcon::Cafe
        }
    }
}

/// A café marker and the record its popup is built from.
#[derive(Debug, Clone)]
pub struct Marker {
    pub cafe: Cafe,
    pub icon: MarkerIcon,
}

impl Marker {
    pub fn position(&self) -> Coordinate {
        self.cafe.position()
    }

    pub fn is_favorite(&self) -> bool {
        self.icon == MarkerIcon::FavoriteCafe
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub cafe_id: CafeId,
    pub title: String,
    pub rating_line: String,
    pub favorite_label: &'static str,
    pub is_favorite: bool,
}

impl Popup {
    pub fn for_cafe(cafe: &Cafe, is_favorite: bool) -> Self {
        Self {
            cafe_id: cafe.id.clone(),
            title: cafe.name.clone(),
            rating_line: format!("{} {}", cafe.stars(), cafe.rating_display()),
            favorite_label: if is_favorite {
                REMOVE_FAVORITE_LABEL
            } else {
                ADD_FAVORITE_LABEL
            },
            is_favorite,
        }
    }
}

/// A single map view: camera, tile layer, markers and at most one popup.
#[derive(Debug, Default)]
pub struct MapView {
    camera: Option<Camera>,
    flight: Option<FlyTo>,
    tile_layer: Option<TileLayer>,
    user_marker: Option<Coordinate>,
    markers: HashMap<CafeId, Marker>,
    popup: Option<Popup>,
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.camera.is_some()
    }

    pub fn max_zoom(&self) -> u8 {
        self.tile_layer.as_ref().map_or(MAX_ZOOM, |layer| layer.max_zoom)
    }

    fn clamp_zoom(&self, zoom: u8) -> f64 {
        f64::from(zoom.min(self.max_zoom()))
    }

    /// The camera as it should be drawn at `now`.
    pub fn camera_at(&self, now: Instant) -> Option<Camera> {
        match self.flight {
            Some(flight) => Some(flight.camera_at(now)),
            None => self.camera,
        }
    }

    /// Commit a finished animation. Returns true if one just landed.
    pub fn settle(&mut self, now: Instant) -> bool {
        match self.flight {
            Some(flight) if flight.is_finished(now) => {
                self.camera = Some(flight.to);
                self.flight = None;
                true
            }
            _ => false,
        }
    }

    pub fn flight(&self) -> Option<&FlyTo> {
        self.flight.as_ref()
    }

    pub fn is_flying(&self, now: Instant) -> bool {
        self.flight.is_some_and(|flight| !flight.is_finished(now))
    }

    /// Destination camera: the flight target if animating, else the camera.
    pub fn target_camera(&self) -> Option<Camera> {
        self.flight.map(|flight| flight.to).or(self.camera)
    }

    /// The tile under the camera center at `now`.
    pub fn center_tile(&self, now: Instant) -> Option<TileCoord> {
        let camera = self.camera_at(now)?;
        Some(tile_for(camera.center, camera.zoom.round() as u8))
    }

    pub fn tile_layer(&self) -> Option<&TileLayer> {
        self.tile_layer.as_ref()
    }

    pub fn user_marker(&self) -> Option<Coordinate> {
        self.user_marker
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    pub fn marker(&self, id: &CafeId) -> Option<&Marker> {
        self.markers.get(id)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }
}

impl MapSurface for MapView {
    fn init_view(&mut self, center: Coordinate, zoom: u8) {
        self.camera = Some(Camera {
            center,
            zoom: self.clamp_zoom(zoom),
        });
        self.flight = None;
        debug!(lat = center.lat, lng = center.lng, zoom, "Map view initialized");
    }

    fn add_tile_layer(&mut self, layer: TileLayer) {
        debug!(url = %layer.url_template, "Tile layer added");
        self.tile_layer = Some(layer);
    }

    fn add_user_marker(&mut self, position: Coordinate) {
        self.user_marker = Some(position);
    }

    fn clear_cafe_markers(&mut self) {
        self.markers.clear();
        self.popup = None;
    }

    fn add_cafe_marker(&mut self, cafe: &Cafe, is_favorite: bool) {
        self.markers.insert(
            cafe.id.clone(),
            Marker {
                cafe: cafe.clone(),
                icon: MarkerIcon::for_cafe(is_favorite),
            },
        );
    }

    fn update_cafe_marker(&mut self, cafe: &Cafe, is_favorite: bool) {
        let Some(marker) = self.markers.get_mut(&cafe.id) else {
            debug!(id = %cafe.id, "No marker to update");
            return;
        };
        marker.cafe = cafe.clone();
        marker.icon = MarkerIcon::for_cafe(is_favorite);

        if self.popup.as_ref().is_some_and(|p| p.cafe_id == cafe.id) {
            self.popup = Some(Popup::for_cafe(cafe, is_favorite));
        }
    }

    fn fly_to(&mut self, target: Coordinate, zoom: u8, duration: Duration) {
        let now = Instant::now();
        let to = Camera {
            center: target,
            zoom: self.clamp_zoom(zoom),
        };

        match self.camera_at(now) {
            Some(from) => {
                self.flight = Some(FlyTo {
                    from,
                    to,
                    started: now,
                    duration,
                });
                self.camera = Some(from);
            }
            None => self.camera = Some(to),
        }
    }

    fn open_popup(&mut self, id: &CafeId) -> bool {
        match self.markers.get(id) {
            Some(marker) => {
                self.popup = Some(Popup::for_cafe(&marker.cafe, marker.is_favorite()));
                true
            }
            None => false,
        }
    }

    fn close_popup(&mut self) {
        self.popup = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ElementType;
    use std::collections::BTreeMap;

    fn cafe(id: i64, rating: f64) -> Cafe {
        Cafe {
            id: CafeId::node(id),
            name: format!("Cafe {}", id),
            lat: 12.97 + id as f64 / 100.0,
            lng: 77.59,
            rating,
            tags: BTreeMap::new(),
        }
    }

    fn initialized() -> MapView {
        let mut view = MapView::new();
        view.init_view(Coordinate::new(12.97, 77.59), 15);
        view.add_tile_layer(TileLayer::default());
        view
    }

    #[test]
    fn test_popup_content() {
        let popup = Popup::for_cafe(&cafe(1, 4.3), false);
        assert_eq!(popup.title, "Cafe 1");
        assert_eq!(popup.rating_line, "★★★★ 4.3/5");
        assert_eq!(popup.favorite_label, "Add to Favorites");

        let popup = Popup::for_cafe(&cafe(1, 3.5), true);
        assert_eq!(popup.rating_line, "★★★ 3.5/5");
        assert_eq!(popup.favorite_label, "Remove from Favorites");
    }

    #[test]
    fn test_init_view_clamps_zoom() {
        let mut view = MapView::new();
        view.init_view(Coordinate::new(0.0, 0.0), 25);
        assert_eq!(view.camera_at(Instant::now()).unwrap().zoom, 18.0);
    }

    #[test]
    fn test_same_numeric_id_of_different_types_gets_two_markers() {
        let mut view = initialized();
        let node = cafe(5, 4.0);
        let mut way = cafe(5, 4.5);
        way.id = CafeId::osm(ElementType::Way, 5);

        view.add_cafe_marker(&node, false);
        view.add_cafe_marker(&way, false);
        assert_eq!(view.marker_count(), 2);
        assert_eq!(view.marker(&way.id).unwrap().cafe.rating, 4.5);
        assert_eq!(view.marker(&node.id).unwrap().cafe.rating, 4.0);
    }

    #[test]
    fn test_markers_add_and_clear() {
        let mut view = initialized();
        view.add_user_marker(Coordinate::new(12.97, 77.59));
        view.add_cafe_marker(&cafe(1, 4.0), false);
        view.add_cafe_marker(&cafe(2, 4.0), true);
        assert_eq!(view.marker_count(), 2);
        assert!(view.marker(&CafeId::node(2)).unwrap().is_favorite());

        view.open_popup(&CafeId::node(1));
        view.clear_cafe_markers();
        assert_eq!(view.marker_count(), 0);
        assert!(view.popup().is_none());
        assert!(view.user_marker().is_some());
    }

    #[test]
    fn test_update_marker_refreshes_open_popup() {
        let mut view = initialized();
        let c = cafe(1, 4.0);
        view.add_cafe_marker(&c, false);
        assert!(view.open_popup(&c.id));
        assert_eq!(view.popup().unwrap().favorite_label, ADD_FAVORITE_LABEL);

        view.update_cafe_marker(&c, true);
        assert_eq!(view.marker(&c.id).unwrap().icon, MarkerIcon::FavoriteCafe);
        assert_eq!(view.popup().unwrap().favorite_label, REMOVE_FAVORITE_LABEL);
    }

    #[test]
    fn test_update_missing_marker_is_ignored() {
        let mut view = initialized();
        view.update_cafe_marker(&cafe(9, 4.0), true);
        assert_eq!(view.marker_count(), 0);
    }

    #[test]
    fn test_open_popup_unknown_marker() {
        let mut view = initialized();
        assert!(!view.open_popup(&CafeId::node(404)));
        assert!(view.popup().is_none());
    }

    #[test]
    fn test_fly_to_interpolates_and_settles() {
        let mut view = initialized();
        let target = Coordinate::new(13.07, 77.69);
        view.fly_to(target, 17, Duration::from_secs(2));

        let flight = *view.flight().unwrap();
        let start = flight.camera_at(flight.started);
        assert_eq!(start.center, Coordinate::new(12.97, 77.59));
        assert_eq!(start.zoom, 15.0);

        let mid = flight.camera_at(flight.started + Duration::from_secs(1));
        assert!((mid.center.lat - 13.02).abs() < 1e-9);
        assert!((mid.zoom - 16.0).abs() < 1e-9);

        let end = flight.started + Duration::from_secs(2);
        assert!(!view.is_flying(end));
        assert!(view.settle(end));
        assert!(view.flight().is_none());
        let camera = view.camera_at(end).unwrap();
        assert_eq!(camera.center, target);
        assert_eq!(camera.zoom, 17.0);
    }

    #[test]
    fn test_fly_to_before_init_jumps() {
        let mut view = MapView::new();
        view.fly_to(Coordinate::new(1.0, 2.0), 17, Duration::from_secs(2));
        assert!(view.flight().is_none());
        assert_eq!(view.camera_at(Instant::now()).unwrap().center, Coordinate::new(1.0, 2.0));
    }

    #[test]
    fn test_zero_duration_flight_is_finished() {
        let mut view = initialized();
        view.fly_to(Coordinate::new(1.0, 2.0), 16, Duration::ZERO);
        let flight = *view.flight().unwrap();
        assert!(flight.is_finished(flight.started));
        assert_eq!(view.target_camera().unwrap().zoom, 16.0);
    }

    #[test]
    fn test_center_tile_follows_camera() {
        let view = initialized();
        let tile = view.center_tile(Instant::now()).unwrap();
        assert_eq!(tile.z, 15);
    }
}
