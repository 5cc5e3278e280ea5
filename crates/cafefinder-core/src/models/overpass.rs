// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level document returned by an Overpass interpreter.
#[derive(Debug, Default, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Node,
    Way,
    Relation,
    #[serde(other)]
    Other,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Node => "node",
            ElementType::Way => "way",
            ElementType::Relation => "relation",
            ElementType::Other => "other",
        }
    }
}

/// A single typed geometry element.
///
/// Nodes carry `lat`/`lon`; ways (and relations queried with `out geom`)
/// carry vertex lists instead.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub geometry: Vec<GeoPoint>,
    #[serde(default)]
    pub members: Vec<RelationMember>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationMember {
    #[serde(rename = "type")]
    pub member_type: Option<String>,
    #[serde(rename = "ref")]
    pub reference: Option<i64>,
    pub role: Option<String>,
    #[serde(default)]
    pub geometry: Vec<GeoPoint>,
}

impl OverpassElement {
    /// Vertices usable for a centroid: the element's own geometry, or for
    /// relations the flattened geometry of their members.
    pub fn vertices(&self) -> Vec<GeoPoint> {
        if !self.geometry.is_empty() || self.element_type != ElementType::Relation {
            return self.geometry.clone();
        }
        self.members
            .iter()
            .flat_map(|m| m.geometry.iter().copied())
            .collect()
    }
}
