//! The map surface.
//!
//! `MapSurface` is the set of operations the controller drives: initial view,
//! tile layer, markers, animated fly-to and popups. `MapView` is the in-memory
//! implementation the terminal front end renders from.

pub mod tiles;
pub mod view;

use std::time::Duration;

use crate::models::{Cafe, CafeId, Coordinate};

pub use tiles::{tile_for, TileCoord, TileLayer, MAX_ZOOM, OSM_ATTRIBUTION, OSM_TILE_URL};
pub use view::{Camera, FlyTo, MapView, Marker, MarkerIcon, Popup};

pub trait MapSurface {
    /// Position the camera. Called once, when the working location is known.
    fn init_view(&mut self, center: Coordinate, zoom: u8);

    fn add_tile_layer(&mut self, layer: TileLayer);

    fn add_user_marker(&mut self, position: Coordinate);

    /// Remove every café marker (the user marker stays).
    fn clear_cafe_markers(&mut self);

    fn add_cafe_marker(&mut self, cafe: &Cafe, is_favorite: bool);

    /// Refresh an existing marker's icon and popup content in place.
    fn update_cafe_marker(&mut self, cafe: &Cafe, is_favorite: bool);

    /// Animate the camera to `target` over `duration`.
    fn fly_to(&mut self, target: Coordinate, zoom: u8, duration: Duration);

    /// Open the popup bound to a café marker. Returns `false` if there is
    /// no marker for `id`.
    fn open_popup(&mut self, id: &CafeId) -> bool;

    fn close_popup(&mut self);
}
