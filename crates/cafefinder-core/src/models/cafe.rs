use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::overpass::ElementType;

/// Lowest synthetic rating a café can be given.
pub const MIN_RATING: f64 = 3.5;

/// Highest synthetic rating a café can be given.
pub const MAX_RATING: f64 = 5.0;

/// Mean Earth radius used for distance estimates.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Shift by fixed degree offsets.
    pub fn offset(&self, dlat: f64, dlng: f64) -> Self {
        Self::new(self.lat + dlat, self.lng + dlng)
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let dphi = (other.lat - self.lat).to_radians();
        let dlambda = (other.lng - self.lng).to_radians();

        let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// Identifier of a café.
///
/// Records from the geodata API are keyed by element type and id, since OSM
/// ids are only unique within one type. Demonstration entries use a synthetic
/// string id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CafeId {
    Osm {
        #[serde(rename = "type")]
        kind: ElementType,
        id: i64,
    },
    Synthetic(String),
}

impl CafeId {
    pub fn osm(kind: ElementType, id: i64) -> Self {
        CafeId::Osm { kind, id }
    }

    pub fn node(id: i64) -> Self {
        Self::osm(ElementType::Node, id)
    }

    pub fn synthetic(index: usize) -> Self {
        CafeId::Synthetic(format!("mock_{}", index))
    }
}

impl fmt::Display for CafeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CafeId::Osm { kind, id } => write!(f, "{}/{}", kind.as_str(), id),
            CafeId::Synthetic(id) => f.write_str(id),
        }
    }
}

/// A normalized café record, as held in the working set and in favorites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cafe {
    pub id: CafeId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub rating: f64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Cafe {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    /// One star per whole rating point.
    pub fn stars(&self) -> String {
        "★".repeat(self.rating.floor().max(0.0) as usize)
    }

    pub fn rating_display(&self) -> String {
        format!("{:.1}/5", self.rating)
    }

    /// A tag value, ignoring empty strings.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Draw a synthetic rating from [3.5, 5.0) and round it to one decimal.
///
/// Rounding a continuous draw means the two end values each cover half a
/// step, so they come up half as often as the tenths in between.
pub fn generate_rating<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let raw = MIN_RATING + rng.gen::<f64>() * (MAX_RATING - MIN_RATING);
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_cafe(rating: f64) -> Cafe {
        Cafe {
            id: CafeId::node(42),
            name: "Corner Brew".to_string(),
            lat: 12.97,
            lng: 77.59,
            rating,
            tags: BTreeMap::new(),
        }
    }

    #[test]
    fn test_generate_rating_in_range_with_one_decimal() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let rating = generate_rating(&mut rng);
            assert!((MIN_RATING..=MAX_RATING).contains(&rating), "out of range: {}", rating);
            let tenths = rating * 10.0;
            assert!((tenths - tenths.round()).abs() < 1e-9, "not one decimal: {}", rating);
        }
    }

    #[test]
    fn test_generate_rating_reaches_both_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let ratings: Vec<f64> = (0..2000).map(|_| generate_rating(&mut rng)).collect();
        assert!(ratings.iter().any(|r| *r == MIN_RATING));
        assert!(ratings.iter().any(|r| *r == MAX_RATING));
    }

    #[test]
    fn test_generate_rating_bounds_are_half_as_likely() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut counts = [0u32; 16];
        for _ in 0..30_000 {
            let tenths = (generate_rating(&mut rng) * 10.0).round() as usize;
            counts[tenths - 35] += 1;
        }

        // Interior tenths expect about 2000 draws each, the bounds about 1000.
        let interior = counts[1..15].iter().sum::<u32>() as f64 / 14.0;
        for edge in [counts[0], counts[15]] {
            let ratio = f64::from(edge) / interior;
            assert!((0.4..0.6).contains(&ratio), "edge ratio {}", ratio);
        }
    }

    #[test]
    fn test_cafe_id_serializes_untagged() {
        assert_eq!(
            serde_json::to_string(&CafeId::node(123)).unwrap(),
            r#"{"type":"node","id":123}"#
        );
        assert_eq!(serde_json::to_string(&CafeId::synthetic(3)).unwrap(), "\"mock_3\"");

        let way: CafeId = serde_json::from_str(r#"{"type":"way","id":987654321}"#).unwrap();
        assert_eq!(way, CafeId::osm(ElementType::Way, 987654321));
        let synthetic: CafeId = serde_json::from_str("\"mock_0\"").unwrap();
        assert_eq!(synthetic, CafeId::Synthetic("mock_0".to_string()));
    }

    #[test]
    fn test_cafe_id_distinguishes_element_types() {
        let node = CafeId::node(42);
        let way = CafeId::osm(ElementType::Way, 42);
        assert_ne!(node, way);
        assert_eq!(node.to_string(), "node/42");
        assert_eq!(way.to_string(), "way/42");
    }

    #[test]
    fn test_cafe_record_uses_lat_lng_field_names() {
        let json = serde_json::to_value(sample_cafe(4.2)).unwrap();
        assert_eq!(json["lat"], 12.97);
        assert_eq!(json["lng"], 77.59);
        assert_eq!(json["id"]["type"], "node");
        assert_eq!(json["id"]["id"], 42);
    }

    #[test]
    fn test_cafe_without_tags_deserializes() {
        let cafe: Cafe = serde_json::from_str(
            r#"{"id":"mock_1","name":"Chaayos","lat":1.0,"lng":2.0,"rating":3.9}"#,
        )
        .unwrap();
        assert!(cafe.tags.is_empty());
        assert_eq!(cafe.id, CafeId::synthetic(1));
    }

    #[test]
    fn test_stars_and_rating_display() {
        let cafe = sample_cafe(4.7);
        assert_eq!(cafe.stars(), "★★★★");
        assert_eq!(cafe.rating_display(), "4.7/5");
        assert_eq!(sample_cafe(5.0).stars(), "★★★★★");
    }

    #[test]
    fn test_distance_to() {
        let a = Coordinate::new(12.9716, 77.5946);
        assert!(a.distance_to(&a).abs() < 1e-6);

        // One hundredth of a degree of latitude is roughly 1.1 km.
        let b = a.offset(0.01, 0.0);
        let d = a.distance_to(&b);
        assert!((d - 1112.0).abs() < 5.0, "unexpected distance {}", d);
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(0.0, 0.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::NAN).is_valid());
    }
}
