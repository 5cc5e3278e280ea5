//! Café data source backed by the Overpass API.
//!
//! This module provides the `OverpassClient` for submitting geo-bounded
//! queries (with one fallback mirror), the normalization that turns raw
//! geometry elements into café records, and the fixed demonstration set used
//! when no endpoint can be reached.

pub mod client;
pub mod demo;
pub mod error;
pub mod normalize;
pub mod source;

pub use client::{
    build_query, OverpassClient, QueryTransport, ReqwestTransport, TransportResponse,
    MIRROR_ENDPOINT, PRIMARY_ENDPOINT, SEARCH_RADIUS_METERS,
};
pub use demo::demo_cafes;
pub use error::ApiError;
pub use normalize::{centroid, normalize_elements, resolve_name, PLACEHOLDER_NAME};
pub use source::{CafeSource, OverpassCafeSource};
