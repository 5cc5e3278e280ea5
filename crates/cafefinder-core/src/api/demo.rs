//! Demonstration cafés used when no geodata endpoint answers.
//!
//! The set is fixed so the map is always explorable, even without network
//! access. Only the ratings are random.

use std::collections::BTreeMap;

use rand::Rng;

use crate::models::{generate_rating, Cafe, CafeId, Coordinate};

/// Name and (latitude, longitude) offset from the query center.
const DEMO_CAFES: [(&str, (f64, f64)); 10] = [
    ("Café Coffee Day", (0.005, 0.005)),
    ("Third Wave Coffee", (-0.003, 0.007)),
    ("Blue Tokai Coffee", (0.008, -0.004)),
    ("Starbucks Reserve", (-0.006, -0.008)),
    ("The Coffee Bean & Tea Leaf", (0.002, -0.009)),
    ("Barista Coffee", (0.007, 0.003)),
    ("Chaayos", (-0.004, -0.005)),
    ("Doolally Taproom", (0.009, -0.007)),
    ("The Filter Coffee", (-0.008, 0.006)),
    ("Brew & Bake", (0.003, -0.008)),
];

/// The ten demonstration cafés placed around `center`.
pub fn demo_cafes<R: Rng + ?Sized>(center: Coordinate, rng: &mut R) -> Vec<Cafe> {
    DEMO_CAFES
        .iter()
        .enumerate()
        .map(|(index, (name, (dlat, dlng)))| {
            let position = center.offset(*dlat, *dlng);
            Cafe {
                id: CafeId::synthetic(index),
                name: (*name).to_string(),
                lat: position.lat,
                lng: position.lng,
                rating: generate_rating(rng),
                tags: BTreeMap::new(),
            }
        })
        .collect()
}
