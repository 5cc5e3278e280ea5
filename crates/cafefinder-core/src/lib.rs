//! Core library for cafe-finder.
//!
//! This crate holds everything that is independent of the terminal front end:
//!
//! - `models`: café records, coordinates and the Overpass wire types
//! - `api`: the Overpass client, normalization and the demonstration fallback
//! - `geolocation`: one-shot location requests with staleness tolerance
//! - `storage`: namespaced key-value persistence
//! - `favorites`: the persisted favorites list
//! - `map`: the map surface (camera, fly-to, marker table, popups, tiles)
//! - `controller`: the application lifecycle and user actions

pub mod api;
pub mod controller;
pub mod favorites;
pub mod geolocation;
pub mod map;
pub mod models;
pub mod storage;

pub use controller::{Controller, ControllerSettings, Lifecycle, StatusMessage};
pub use favorites::{FavoritesStore, ToggleOutcome};
pub use models::{Cafe, CafeId, Coordinate};
