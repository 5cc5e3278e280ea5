//! Data models for cafe-finder.
//!
//! - `Cafe`, `CafeId`, `Coordinate`: the normalized records shown on the map
//! - Overpass types: the raw elements returned by the geodata endpoints

pub mod cafe;
pub mod overpass;

pub use cafe::{generate_rating, Cafe, CafeId, Coordinate, MAX_RATING, MIN_RATING};
pub use overpass::{ElementType, GeoPoint, OverpassElement, OverpassResponse, RelationMember};
