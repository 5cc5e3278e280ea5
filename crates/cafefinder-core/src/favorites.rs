//! The user's favorite cafés.
//!
//! Favorites are snapshots of café records stored under a single key as a
//! JSON array. They are loaded once at startup and every mutation rewrites
//! the whole list. Storage problems never surface to the caller: an
//! unreadable or corrupt list loads as empty, and a failed write leaves the
//! in-memory list authoritative.

use tracing::{debug, error, info, warn};

use crate::models::{Cafe, CafeId};
use crate::storage::KeyValueStore;

/// Storage key holding the serialized favorites list.
pub const FAVORITES_KEY: &str = "cafeFinder_favorites";

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The café is neither a favorite nor in the working set.
    NotFound,
}

pub struct FavoritesStore {
    storage: Box<dyn KeyValueStore>,
    favorites: Vec<Cafe>,
}

impl FavoritesStore {
    /// Load the persisted list, degrading to empty on any failure.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let favorites = Self::read(storage.as_ref());
        info!(count = favorites.len(), "Favorites loaded");
        Self { storage, favorites }
    }

    fn read(storage: &dyn KeyValueStore) -> Vec<Cafe> {
        let stored = match storage.get(FAVORITES_KEY) {
            Ok(Some(stored)) => stored,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!(error = %e, "Error loading favorites");
                return Vec::new();
            }
        };

        match serde_json::from_str(&stored) {
            Ok(favorites) => favorites,
            Err(e) => {
                error!(error = %e, "Stored favorites are corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist the full list, overwriting whatever was stored.
    pub fn save(&self) {
        let json = match serde_json::to_string(&self.favorites) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Error serializing favorites");
                return;
            }
        };

        if let Err(e) = self.storage.set(FAVORITES_KEY, &json) {
            error!(error = %e, "Error saving favorites");
        }
    }

    pub fn is_favorite(&self, id: &CafeId) -> bool {
        self.favorites.iter().any(|f| &f.id == id)
    }

    /// Remove the café if it is a favorite, otherwise add a snapshot of it
    /// from `working_set`. Saves after every change.
    pub fn toggle(&mut self, id: &CafeId, working_set: &[Cafe]) -> ToggleOutcome {
        if self.is_favorite(id) {
            self.favorites.retain(|f| &f.id != id);
            debug!(%id, "Removed favorite");
            self.save();
            return ToggleOutcome::Removed;
        }

        match working_set.iter().find(|c| &c.id == id) {
            Some(cafe) => {
                self.favorites.push(cafe.clone());
                debug!(%id, name = %cafe.name, "Added favorite");
                self.save();
                ToggleOutcome::Added
            }
            None => {
                warn!(%id, "Cannot favorite a café outside the working set");
                ToggleOutcome::NotFound
            }
        }
    }

    pub fn get(&self, id: &CafeId) -> Option<&Cafe> {
        self.favorites.iter().find(|f| &f.id == id)
    }

    pub fn list(&self) -> &[Cafe] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    /// Drop every favorite and persist the empty list.
    pub fn clear(&mut self) {
        self.favorites.clear();
        self.save();
    }
}
