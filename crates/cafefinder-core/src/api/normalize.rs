//! Turning raw Overpass elements into café records.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use crate::models::{generate_rating, Cafe, CafeId, Coordinate, ElementType, GeoPoint, OverpassElement};

/// Name given to a place with no usable name tag.
pub const PLACEHOLDER_NAME: &str = "Local Café";

/// Tags tried, in order, when resolving a display name.
const NAME_TAGS: [&str; 5] = ["name", "brand", "operator", "name:en", "name:hi"];

/// Arithmetic mean of the vertices, latitude and longitude averaged
/// independently. `None` for an empty slice.
pub fn centroid(points: &[GeoPoint]) -> Option<Coordinate> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat_sum, lon_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.lat, lon + p.lon));
    Some(Coordinate::new(lat_sum / n, lon_sum / n))
}

fn tag<'a>(tags: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

/// First non-empty name-like tag, or the placeholder.
pub fn resolve_name(tags: &BTreeMap<String, String>) -> &str {
    NAME_TAGS
        .iter()
        .find_map(|key| tag(tags, key))
        .unwrap_or(PLACEHOLDER_NAME)
}

fn element_position(element: &OverpassElement) -> Option<Coordinate> {
    let position = match element.element_type {
        ElementType::Node => Coordinate::new(element.lat?, element.lon?),
        ElementType::Way | ElementType::Relation => centroid(&element.vertices())?,
        ElementType::Other => return None,
    };
    position.is_valid().then_some(position)
}

fn normalize_element<R: Rng + ?Sized>(element: OverpassElement, rng: &mut R) -> Option<Cafe> {
    let Some(position) = element_position(&element) else {
        debug!(id = element.id, kind = ?element.element_type, "Skipping element without location");
        return None;
    };

    let name = resolve_name(&element.tags);
    if name == PLACEHOLDER_NAME && tag(&element.tags, "name").is_none() && tag(&element.tags, "brand").is_none() {
        debug!(id = element.id, "Skipping element without a name");
        return None;
    }
    let name = name.to_string();

    Some(Cafe {
        id: CafeId::osm(element.element_type, element.id),
        name,
        lat: position.lat,
        lng: position.lng,
        rating: generate_rating(rng),
        tags: element.tags,
    })
}

/// Normalize a full response into a fresh working set.
pub fn normalize_elements<R: Rng + ?Sized>(elements: Vec<OverpassElement>, rng: &mut R) -> Vec<Cafe> {
    let total = elements.len();
    let cafes: Vec<Cafe> = elements
        .into_iter()
        .filter_map(|element| normalize_element(element, rng))
        .collect();
    debug!(total, kept = cafes.len(), "Normalized Overpass elements");
    cafes
}
