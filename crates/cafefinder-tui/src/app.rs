//! Application state for the café finder TUI.
//!
//! `App` wraps the core `Controller` with the state that only matters to the
//! terminal: which overlay is showing, the favorites panel selection and the
//! keyboard marker focus.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use cafefinder_core::api::{OverpassCafeSource, OverpassClient};
use cafefinder_core::geolocation::{GeolocationOptions, SystemLocator};
use cafefinder_core::map::MapView;
use cafefinder_core::storage::{FileStore, KeyValueStore, MemoryStore};
use cafefinder_core::{CafeId, Controller, FavoritesStore, ToggleOutcome};

use crate::config::{Config, APP_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

pub struct App {
    pub config: Config,
    pub controller: Controller,
    pub state: AppState,

    /// Selected row in the favorites panel
    pub favorites_selection: usize,

    /// Index into the working set of the marker focused with Tab
    pub marker_focus: Option<usize>,
}

/// Favorites live in the data directory; fall back to memory if it is
/// unavailable so the session still works.
pub fn favorites_storage() -> Box<dyn KeyValueStore> {
    match FileStore::in_data_dir(APP_NAME) {
        Ok(store) => {
            debug!(dir = ?store.dir(), "Favorites storage ready");
            Box::new(store)
        }
        Err(e) => {
            warn!(error = %e, "Data directory unavailable, favorites will not persist");
            Box::new(MemoryStore::new())
        }
    }
}

pub fn build_locator(config: &Config) -> Result<SystemLocator> {
    let mut locator = SystemLocator::new(GeolocationOptions::default())
        .context("Failed to set up location lookup")?
        .enabled(config.geolocation_enabled)
        .with_pinned(config.pinned_location())
        .with_lookup_endpoint(config.ip_geolocation_endpoint.clone());

    match FileStore::in_cache_dir(APP_NAME) {
        Ok(store) => locator = locator.with_fix_store(Arc::new(store)),
        Err(e) => warn!(error = %e, "Cache directory unavailable, location fixes will not be reused"),
    }
    Ok(locator)
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let client = OverpassClient::new()?
            .with_endpoints(config.primary_endpoint.clone(), config.mirror_endpoint.clone());
        let source = OverpassCafeSource::new(client).with_radius(config.search_radius_m);
        let locator = build_locator(&config)?;
        let favorites = FavoritesStore::load(favorites_storage());

        let controller = Controller::new(
            config.controller_settings(),
            MapView::new(),
            Arc::new(locator),
            Arc::new(source),
            favorites,
        );
        Ok(Self::with_controller(config, controller))
    }

    pub fn with_controller(config: Config, controller: Controller) -> Self {
        Self {
            config,
            controller,
            state: AppState::Normal,
            favorites_selection: 0,
            marker_focus: None,
        }
    }

    pub fn start(&mut self) {
        info!("Starting location request");
        self.controller.begin();
    }

    /// Apply background results and settle finished map animations.
    pub fn check_background_tasks(&mut self) {
        self.controller.check_background_tasks();
        self.controller.map_mut().settle(Instant::now());

        let cafe_count = self.controller.cafes().len();
        if self.marker_focus.is_some_and(|i| i >= cafe_count) {
            self.marker_focus = None;
        }
        self.clamp_favorites_selection();
    }

    // ===== Map actions =====

    pub fn suggest_random_cafe(&mut self) {
        let mut rng = rand::thread_rng();
        if let Some(id) = self.controller.suggest_random_cafe(&mut rng) {
            self.marker_focus = self.controller.cafes().iter().position(|c| c.id == id);
        }
    }

    pub fn focus_next_marker(&mut self) {
        let len = self.controller.cafes().len();
        if len == 0 {
            return;
        }
        let next = match self.marker_focus {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.focus_marker(next);
    }

    pub fn focus_prev_marker(&mut self) {
        let len = self.controller.cafes().len();
        if len == 0 {
            return;
        }
        let prev = match self.marker_focus {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.focus_marker(prev);
    }

    fn focus_marker(&mut self, index: usize) {
        let Some(id) = self.controller.cafes().get(index).map(|c| c.id.clone()) else {
            return;
        };
        self.marker_focus = Some(index);
        self.controller.open_popup(&id);
    }

    /// Toggle the favorite state of the café whose popup is open.
    pub fn toggle_popup_favorite(&mut self) -> Option<ToggleOutcome> {
        let id = self.controller.map().popup()?.cafe_id.clone();
        Some(self.controller.toggle_favorite(&id))
    }

    pub fn close_popup(&mut self) {
        self.controller.close_popup();
    }

    // ===== Favorites panel =====

    pub fn open_favorites(&mut self) {
        self.favorites_selection = 0;
        self.controller.show_favorites_panel();
    }

    pub fn close_favorites(&mut self) {
        self.controller.hide_favorites_panel();
    }

    pub fn select_next_favorite(&mut self) {
        let len = self.controller.favorites().len();
        if len > 0 {
            self.favorites_selection = (self.favorites_selection + 1).min(len - 1);
        }
    }

    pub fn select_prev_favorite(&mut self) {
        self.favorites_selection = self.favorites_selection.saturating_sub(1);
    }

    pub fn selected_favorite_id(&self) -> Option<CafeId> {
        self.controller
            .favorites()
            .list()
            .get(self.favorites_selection)
            .map(|f| f.id.clone())
    }

    pub fn view_selected_favorite(&mut self) {
        if let Some(id) = self.selected_favorite_id() {
            self.controller.view_favorite(&id);
            self.marker_focus = self.controller.cafes().iter().position(|c| c.id == id);
        }
    }

    pub fn remove_selected_favorite(&mut self) {
        if let Some(id) = self.selected_favorite_id() {
            self.controller.toggle_favorite(&id);
            self.clamp_favorites_selection();
        }
    }

    fn clamp_favorites_selection(&mut self) {
        let len = self.controller.favorites().len();
        if self.favorites_selection >= len {
            self.favorites_selection = len.saturating_sub(1);
        }
    }
}
