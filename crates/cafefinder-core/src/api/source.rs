use futures::future::BoxFuture;
use tracing::info;

use crate::models::{Cafe, Coordinate};

use super::client::{build_query, OverpassClient, SEARCH_RADIUS_METERS};
use super::normalize::normalize_elements;
use super::ApiError;

/// Anything that can produce a working set of cafés around a center.
pub trait CafeSource: Send + Sync {
    fn fetch_cafes(&self, center: Coordinate) -> BoxFuture<'static, Result<Vec<Cafe>, ApiError>>;
}

/// Overpass query plus normalization.
#[derive(Clone)]
pub struct OverpassCafeSource {
    client: OverpassClient,
    radius_m: u32,
}

impl OverpassCafeSource {
    pub fn new(client: OverpassClient) -> Self {
        Self {
            client,
            radius_m: SEARCH_RADIUS_METERS,
        }
    }

    pub fn with_radius(mut self, radius_m: u32) -> Self {
        self.radius_m = radius_m;
        self
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }
}

impl CafeSource for OverpassCafeSource {
    fn fetch_cafes(&self, center: Coordinate) -> BoxFuture<'static, Result<Vec<Cafe>, ApiError>> {
        let client = self.client.clone();
        let query = build_query(center, self.radius_m);
        let radius_m = self.radius_m;

        Box::pin(async move {
            info!(lat = center.lat, lng = center.lng, radius_m, "Fetching nearby cafés");
            let elements = client.fetch_elements(&query).await?;
            Ok(normalize_elements(elements, &mut rand::thread_rng()))
        })
    }
}
