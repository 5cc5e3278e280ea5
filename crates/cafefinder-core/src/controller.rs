//! Application lifecycle and user actions.
//!
//! The controller owns all application state: the working set of cafés, the
//! favorites, the map surface and the transient status. Slow work (location
//! requests, café fetches, deferred popups) runs in spawned tasks that report
//! back as `ControllerEvent`s over a bounded channel; `check_background_tasks`
//! drains that channel from the UI loop, so every mutation happens on a single
//! thread.
//!
//! ```text
//! Loading -> Locating -> Located | LocationFailed -> FetchingCafes -> Ready
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{demo_cafes, ApiError, CafeSource};
use crate::favorites::{FavoritesStore, ToggleOutcome};
use crate::geolocation::{LocationError, LocationProvider};
use crate::map::{MapSurface, MapView, TileLayer};
use crate::models::{Cafe, CafeId, Coordinate};

/// Used when the user's position cannot be determined (Bengaluru).
pub const DEFAULT_LOCATION: Coordinate = Coordinate::new(12.9716, 77.5946);

/// The one blocking acknowledgement the application raises.
pub const NO_CAFES_ALERT: &str = "No cafés found yet. Please wait for the data to load.";

/// How long a status message stays visible.
pub const STATUS_FADE: Duration = Duration::from_secs(5);

const CHANNEL_BUFFER_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Loading,
    Locating,
    Located,
    LocationFailed,
    FetchingCafes,
    Ready,
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub default_location: Coordinate,
    pub fallback_zoom: u8,
    pub located_zoom: u8,
    /// Zoom used when focusing a single café.
    pub focus_zoom: u8,
    pub suggest_flight: Duration,
    pub suggest_popup_delay: Duration,
    pub favorite_flight: Duration,
    pub favorite_popup_delay: Duration,
    pub tile_layer: TileLayer,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_location: DEFAULT_LOCATION,
            fallback_zoom: 12,
            located_zoom: 15,
            focus_zoom: 17,
            suggest_flight: Duration::from_millis(2000),
            suggest_popup_delay: Duration::from_millis(2100),
            favorite_flight: Duration::from_millis(1500),
            favorite_popup_delay: Duration::from_millis(1600),
            tile_layer: TileLayer::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub posted_at: Instant,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            posted_at: Instant::now(),
        }
    }

    pub fn is_faded(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.posted_at) >= STATUS_FADE
    }
}

/// Results delivered from spawned tasks.
#[derive(Debug)]
enum ControllerEvent {
    Located(Coordinate),
    LocationFailed(LocationError),
    CafesFetched {
        center: Coordinate,
        result: Result<Vec<Cafe>, ApiError>,
    },
    OpenPopup(CafeId),
}

/// Helper to deliver task results, logging if the controller is gone.
async fn send_event(tx: &mpsc::Sender<ControllerEvent>, event: ControllerEvent) {
    if let Err(e) = tx.send(event).await {
        error!(error = %e, "Failed to send controller event - channel closed");
    }
}

pub struct Controller<M: MapSurface = MapView> {
    settings: ControllerSettings,
    map: M,
    locator: Arc<dyn LocationProvider>,
    source: Arc<dyn CafeSource>,
    favorites: FavoritesStore,

    lifecycle: Lifecycle,
    loading: bool,
    cafes: Vec<Cafe>,
    user_location: Option<Coordinate>,
    search_center: Option<Coordinate>,

    status: Option<StatusMessage>,
    alert: Option<String>,
    favorites_panel_open: bool,

    event_rx: mpsc::Receiver<ControllerEvent>,
    event_tx: mpsc::Sender<ControllerEvent>,
}

impl<M: MapSurface> Controller<M> {
    pub fn new(
        settings: ControllerSettings,
        map: M,
        locator: Arc<dyn LocationProvider>,
        source: Arc<dyn CafeSource>,
        favorites: FavoritesStore,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            settings,
            map,
            locator,
            source,
            favorites,
            lifecycle: Lifecycle::Loading,
            loading: true,
            cafes: Vec::new(),
            user_location: None,
            search_center: None,
            status: None,
            alert: None,
            favorites_panel_open: false,
            event_rx,
            event_tx,
        }
    }

    // ===== Accessors =====

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn cafes(&self) -> &[Cafe] {
        &self.cafes
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn is_favorite(&self, id: &CafeId) -> bool {
        self.favorites.is_favorite(id)
    }

    pub fn user_location(&self) -> Option<Coordinate> {
        self.user_location
    }

    /// Where cafés were (or are being) searched for.
    pub fn search_center(&self) -> Option<Coordinate> {
        self.search_center
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Status text, unless it has faded by `now`.
    pub fn visible_status(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|s| !s.is_faded(now))
            .map(|s| s.text.as_str())
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn is_favorites_panel_open(&self) -> bool {
        self.favorites_panel_open
    }

    fn set_status(&mut self, text: impl Into<String>) {
        let status = StatusMessage::new(text);
        info!(status = %status.text, "Status");
        self.status = Some(status);
    }

    // ===== Lifecycle =====

    /// Start the location request. Only the first call has any effect.
    pub fn begin(&mut self) {
        if self.lifecycle != Lifecycle::Loading {
            warn!(lifecycle = ?self.lifecycle, "Controller already started");
            return;
        }
        self.lifecycle = Lifecycle::Locating;

        let locator = self.locator.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = match locator.locate().await {
                Ok(position) => ControllerEvent::Located(position),
                Err(e) => ControllerEvent::LocationFailed(e),
            };
            send_event(&tx, event).await;
        });
    }

    /// Apply every event that has arrived since the last call.
    pub fn check_background_tasks(&mut self) {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }

        for event in events {
            self.process_event(event);
        }
    }

    /// Wait for the next event and apply it.
    pub async fn wait_for_event(&mut self) {
        if let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }
    }

    fn process_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Located(position) => self.on_located(position),
            ControllerEvent::LocationFailed(e) => self.on_location_failed(e),
            ControllerEvent::CafesFetched { center, result } => self.on_cafes_fetched(center, result),
            ControllerEvent::OpenPopup(id) => {
                if !self.map.open_popup(&id) {
                    debug!(%id, "Deferred popup has no marker");
                }
            }
        }
    }

    fn on_located(&mut self, position: Coordinate) {
        info!(lat = position.lat, lng = position.lng, "Location found");
        self.lifecycle = Lifecycle::Located;
        self.user_location = Some(position);

        self.map.init_view(position, self.settings.located_zoom);
        self.map.add_tile_layer(self.settings.tile_layer.clone());
        self.map.add_user_marker(position);
        self.loading = false;

        self.set_status("Location found! Loading cafés...");
        self.fetch_cafes(position);
    }

    fn on_location_failed(&mut self, e: LocationError) {
        warn!(error = %e, "Location unavailable, using default area");
        self.lifecycle = Lifecycle::LocationFailed;
        let center = self.settings.default_location;

        self.map.init_view(center, self.settings.fallback_zoom);
        self.map.add_tile_layer(self.settings.tile_layer.clone());
        self.loading = false;

        self.set_status("Unable to get location. Showing default area.");
        self.fetch_cafes(center);
    }

    fn fetch_cafes(&mut self, center: Coordinate) {
        self.lifecycle = Lifecycle::FetchingCafes;
        self.search_center = Some(center);

        let source = self.source.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_cafes(center).await;
            send_event(&tx, ControllerEvent::CafesFetched { center, result }).await;
        });
    }

    fn on_cafes_fetched(&mut self, center: Coordinate, result: Result<Vec<Cafe>, ApiError>) {
        match result {
            Ok(cafes) => {
                info!(count = cafes.len(), "Cafés loaded");
                self.cafes = cafes;
                self.set_status(format!("Found {} cafés nearby", self.cafes.len()));
            }
            Err(e) => {
                error!(error = %e, "Error fetching cafés, using demonstration set");
                self.cafes = demo_cafes(center, &mut rand::thread_rng());
                self.set_status("Error loading cafés. Showing demo cafés.");
            }
        }

        self.render_markers();
        self.lifecycle = Lifecycle::Ready;
    }

    fn render_markers(&mut self) {
        self.map.clear_cafe_markers();
        for cafe in &self.cafes {
            self.map.add_cafe_marker(cafe, self.favorites.is_favorite(&cafe.id));
        }
    }

    fn schedule_popup(&self, id: CafeId, delay: Duration) {
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            send_event(&tx, ControllerEvent::OpenPopup(id)).await;
        });
    }

    // ===== User actions =====

    /// Add or remove a favorite and refresh its marker in place.
    pub fn toggle_favorite(&mut self, id: &CafeId) -> ToggleOutcome {
        let outcome = self.favorites.toggle(id, &self.cafes);
        if outcome != ToggleOutcome::NotFound {
            let is_favorite = outcome == ToggleOutcome::Added;
            if let Some(cafe) = self.cafes.iter().find(|c| &c.id == id) {
                self.map.update_cafe_marker(cafe, is_favorite);
            }
        }
        outcome
    }

    /// Fly to a uniformly chosen café and open its popup once the camera
    /// has arrived. With no cafés loaded, raises the blocking alert instead.
    pub fn suggest_random_cafe<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<CafeId> {
        if self.cafes.is_empty() {
            info!("Random suggestion requested before any cafés loaded");
            self.alert = Some(NO_CAFES_ALERT.to_string());
            return None;
        }

        let cafe = self.cafes[rng.gen_range(0..self.cafes.len())].clone();
        debug!(id = %cafe.id, name = %cafe.name, "Suggesting café");

        self.map
            .fly_to(cafe.position(), self.settings.focus_zoom, self.settings.suggest_flight);
        self.schedule_popup(cafe.id.clone(), self.settings.suggest_popup_delay);
        self.set_status(format!("Suggested: {}", cafe.name));
        Some(cafe.id)
    }

    /// Close the favorites panel and fly to a stored favorite.
    ///
    /// The popup can only open if the favorite is part of the current working
    /// set; otherwise the camera still moves and a notice is shown.
    pub fn view_favorite(&mut self, id: &CafeId) -> bool {
        self.favorites_panel_open = false;

        let Some(favorite) = self.favorites.get(id).cloned() else {
            warn!(%id, "View requested for unknown favorite");
            return false;
        };

        self.map.fly_to(
            favorite.position(),
            self.settings.focus_zoom,
            self.settings.favorite_flight,
        );

        if self.cafes.iter().any(|c| &c.id == id) {
            self.schedule_popup(favorite.id, self.settings.favorite_popup_delay);
        } else {
            self.set_status(format!("{} is outside the current search area", favorite.name));
        }
        true
    }

    pub fn open_popup(&mut self, id: &CafeId) -> bool {
        self.map.open_popup(id)
    }

    pub fn close_popup(&mut self) {
        self.map.close_popup();
    }

    pub fn show_favorites_panel(&mut self) {
        self.favorites_panel_open = true;
    }

    pub fn hide_favorites_panel(&mut self) {
        self.favorites_panel_open = false;
    }

    pub fn acknowledge_alert(&mut self) {
        self.alert = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::{ok, ScriptedTransport};
    use crate::api::{OverpassCafeSource, OverpassClient, MIRROR_ENDPOINT, PRIMARY_ENDPOINT};
    use crate::map::MarkerIcon;
    use crate::storage::{KeyValueStore, MemoryStore};
    use futures::future::BoxFuture;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedLocator(Result<Coordinate, LocationError>);

    impl LocationProvider for FixedLocator {
        fn locate(&self) -> BoxFuture<'static, Result<Coordinate, LocationError>> {
            let result = self.0.clone();
            Box::pin(async move { result })
        }
    }

    struct FixedSource {
        result: Result<Vec<Cafe>, ApiError>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn new(result: Result<Vec<Cafe>, ApiError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl CafeSource for FixedSource {
        fn fetch_cafes(&self, _center: Coordinate) -> BoxFuture<'static, Result<Vec<Cafe>, ApiError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = self.result.clone();
            Box::pin(async move { result })
        }
    }

    fn cafe(id: i64, name: &str) -> Cafe {
        Cafe {
            id: CafeId::node(id),
            name: name.to_string(),
            lat: 12.98 + id as f64 / 1000.0,
            lng: 77.60,
            rating: 4.2,
            tags: BTreeMap::new(),
        }
    }

    fn fast_settings() -> ControllerSettings {
        ControllerSettings {
            suggest_flight: Duration::from_millis(10),
            suggest_popup_delay: Duration::from_millis(20),
            favorite_flight: Duration::from_millis(10),
            favorite_popup_delay: Duration::from_millis(20),
            ..ControllerSettings::default()
        }
    }

    fn controller(
        location: Result<Coordinate, LocationError>,
        source: Arc<dyn CafeSource>,
    ) -> Controller {
        Controller::new(
            fast_settings(),
            MapView::new(),
            Arc::new(FixedLocator(location)),
            source,
            FavoritesStore::load(Box::new(MemoryStore::new())),
        )
    }

    /// Run the startup sequence through to `Ready`.
    async fn start(controller: &mut Controller) {
        controller.begin();
        controller.wait_for_event().await;
        controller.wait_for_event().await;
    }

    fn zoom(controller: &Controller) -> f64 {
        controller.map().camera_at(Instant::now()).unwrap().zoom
    }

    #[tokio::test]
    async fn test_located_startup() {
        let here = Coordinate::new(48.8566, 2.3522);
        let source = FixedSource::new(Ok(vec![cafe(1, "Brew"), cafe(2, "Roast")]));
        let mut c = controller(Ok(here), source.clone());
        assert_eq!(c.lifecycle(), Lifecycle::Loading);
        assert!(c.is_loading());

        c.begin();
        assert_eq!(c.lifecycle(), Lifecycle::Locating);

        c.wait_for_event().await;
        assert_eq!(c.lifecycle(), Lifecycle::FetchingCafes);
        assert!(!c.is_loading());
        assert_eq!(c.user_location(), Some(here));
        assert_eq!(c.map().user_marker(), Some(here));
        assert_eq!(zoom(&c), 15.0);
        assert_eq!(c.status().unwrap().text, "Location found! Loading cafés...");

        c.wait_for_event().await;
        assert_eq!(c.lifecycle(), Lifecycle::Ready);
        assert_eq!(c.cafes().len(), 2);
        assert_eq!(c.map().marker_count(), 2);
        assert_eq!(c.status().unwrap().text, "Found 2 cafés nearby");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denied_location_uses_default_at_zoom_12() {
        let source = FixedSource::new(Ok(vec![]));
        let mut c = controller(Err(LocationError::PermissionDenied), source);

        c.begin();
        c.wait_for_event().await;
        assert_eq!(c.search_center(), Some(DEFAULT_LOCATION));
        assert_eq!(c.map().camera_at(Instant::now()).unwrap().center, DEFAULT_LOCATION);
        assert_eq!(zoom(&c), 12.0);
        assert!(c.user_location().is_none());
        assert!(c.map().user_marker().is_none());
        assert!(c.map().tile_layer().is_some());
        assert_eq!(c.status().unwrap().text, "Unable to get location. Showing default area.");

        c.wait_for_event().await;
        assert_eq!(c.lifecycle(), Lifecycle::Ready);
        assert_eq!(c.status().unwrap().text, "Found 0 cafés nearby");
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_demo_cafes() {
        let source = FixedSource::new(Err(ApiError::Transport("offline".to_string())));
        let mut c = controller(Err(LocationError::Timeout), source);
        start(&mut c).await;

        assert_eq!(c.lifecycle(), Lifecycle::Ready);
        assert_eq!(c.cafes().len(), 10);
        assert_eq!(c.cafes()[0].id, CafeId::synthetic(0));
        assert_eq!(c.map().marker_count(), 10);
        assert_eq!(c.status().unwrap().text, "Error loading cafés. Showing demo cafés.");
    }

    #[tokio::test]
    async fn test_primary_failure_tries_mirror_before_demo() {
        let body = r#"{"elements":[{"type":"node","id":5,"lat":12.97,"lon":77.59,"tags":{"name":"Mirror Café"}}]}"#;
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(ApiError::Transport("connection reset".to_string())),
            ok(body),
        ]));
        let source = Arc::new(OverpassCafeSource::new(OverpassClient::with_transport(transport.clone())));
        let mut c = controller(Err(LocationError::PermissionDenied), source);
        start(&mut c).await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0, PRIMARY_ENDPOINT);
        assert_eq!(requests[1].0, MIRROR_ENDPOINT);
        assert_eq!(requests[0].1, requests[1].1);

        assert_eq!(c.cafes().len(), 1);
        assert_eq!(c.cafes()[0].name, "Mirror Café");
    }

    #[tokio::test]
    async fn test_random_suggestion_with_no_cafes_alerts_without_moving() {
        let source = FixedSource::new(Ok(vec![]));
        let mut c = controller(Ok(Coordinate::new(1.0, 2.0)), source);
        start(&mut c).await;
        let before = c.map().camera_at(Instant::now());

        let mut rng = StdRng::seed_from_u64(3);
        assert!(c.suggest_random_cafe(&mut rng).is_none());
        assert_eq!(c.alert(), Some(NO_CAFES_ALERT));
        assert!(c.map().flight().is_none());
        assert_eq!(c.map().camera_at(Instant::now()), before);

        c.acknowledge_alert();
        assert!(c.alert().is_none());
    }

    #[tokio::test]
    async fn test_random_suggestion_before_init_does_not_panic() {
        let source = FixedSource::new(Ok(vec![]));
        let mut c = controller(Ok(Coordinate::new(1.0, 2.0)), source);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(c.suggest_random_cafe(&mut rng).is_none());
        assert_eq!(c.alert(), Some(NO_CAFES_ALERT));
    }

    #[tokio::test]
    async fn test_random_suggestion_flies_then_opens_popup() {
        let cafes = vec![cafe(1, "Brew"), cafe(2, "Roast"), cafe(3, "Drip")];
        let source = FixedSource::new(Ok(cafes.clone()));
        let mut c = controller(Ok(Coordinate::new(12.97, 77.59)), source);
        start(&mut c).await;

        let mut rng = StdRng::seed_from_u64(9);
        let id = c.suggest_random_cafe(&mut rng).unwrap();
        let chosen = cafes.iter().find(|cafe| cafe.id == id).unwrap();

        let flight = *c.map().flight().unwrap();
        assert_eq!(flight.to.center, chosen.position());
        assert_eq!(flight.to.zoom, 17.0);
        assert_eq!(c.status().unwrap().text, format!("Suggested: {}", chosen.name));
        assert!(c.map().popup().is_none());

        c.wait_for_event().await;
        assert_eq!(c.map().popup().unwrap().cafe_id, id);
    }

    #[tokio::test]
    async fn test_toggle_updates_marker_without_refetch() {
        let source = FixedSource::new(Ok(vec![cafe(1, "Brew"), cafe(2, "Roast")]));
        let mut c = controller(Ok(Coordinate::new(12.97, 77.59)), source.clone());
        start(&mut c).await;

        let id = CafeId::node(1);
        assert_eq!(c.map().marker(&id).unwrap().icon, MarkerIcon::Cafe);

        assert_eq!(c.toggle_favorite(&id), ToggleOutcome::Added);
        assert_eq!(c.map().marker(&id).unwrap().icon, MarkerIcon::FavoriteCafe);
        assert!(c.is_favorite(&id));

        assert_eq!(c.toggle_favorite(&id), ToggleOutcome::Removed);
        assert_eq!(c.map().marker(&id).unwrap().icon, MarkerIcon::Cafe);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stored_favorites_render_as_favorite_markers() {
        let memory = MemoryStore::new();
        let brew = cafe(1, "Brew");
        memory
            .set(crate::favorites::FAVORITES_KEY, &serde_json::to_string(&vec![brew.clone()]).unwrap())
            .unwrap();

        let mut c = Controller::new(
            fast_settings(),
            MapView::new(),
            Arc::new(FixedLocator(Ok(Coordinate::new(12.97, 77.59)))),
            FixedSource::new(Ok(vec![brew.clone(), cafe(2, "Roast")])),
            FavoritesStore::load(Box::new(memory)),
        );
        start(&mut c).await;

        assert!(c.map().marker(&brew.id).unwrap().is_favorite());
        assert!(!c.map().marker(&CafeId::node(2)).unwrap().is_favorite());
    }

    #[tokio::test]
    async fn test_view_favorite_closes_panel_and_opens_popup() {
        let source = FixedSource::new(Ok(vec![cafe(1, "Brew"), cafe(2, "Roast")]));
        let mut c = controller(Ok(Coordinate::new(12.97, 77.59)), source);
        start(&mut c).await;

        let id = CafeId::node(2);
        c.toggle_favorite(&id);
        c.show_favorites_panel();
        assert!(c.is_favorites_panel_open());

        assert!(c.view_favorite(&id));
        assert!(!c.is_favorites_panel_open());
        assert_eq!(c.map().flight().unwrap().to.zoom, 17.0);

        c.wait_for_event().await;
        let popup = c.map().popup().unwrap();
        assert_eq!(popup.cafe_id, id);
        assert_eq!(popup.favorite_label, "Remove from Favorites");
    }

    #[tokio::test]
    async fn test_view_favorite_outside_working_set() {
        let memory = MemoryStore::new();
        let far = cafe(77, "Faraway");
        memory
            .set(crate::favorites::FAVORITES_KEY, &serde_json::to_string(&vec![far.clone()]).unwrap())
            .unwrap();

        let mut c = Controller::new(
            fast_settings(),
            MapView::new(),
            Arc::new(FixedLocator(Ok(Coordinate::new(12.97, 77.59)))),
            FixedSource::new(Ok(vec![cafe(1, "Brew")])),
            FavoritesStore::load(Box::new(memory)),
        );
        start(&mut c).await;

        assert!(c.view_favorite(&far.id));
        assert_eq!(c.map().flight().unwrap().to.center, far.position());
        assert_eq!(c.status().unwrap().text, "Faraway is outside the current search area");
        assert!(!c.view_favorite(&CafeId::node(404)));
    }

    #[tokio::test]
    async fn test_ready_is_terminal() {
        let source = FixedSource::new(Ok(vec![cafe(1, "Brew")]));
        let mut c = controller(Ok(Coordinate::new(12.97, 77.59)), source.clone());
        start(&mut c).await;
        assert_eq!(c.lifecycle(), Lifecycle::Ready);

        c.begin();
        c.toggle_favorite(&CafeId::node(1));
        c.suggest_random_cafe(&mut StdRng::seed_from_u64(1));
        c.show_favorites_panel();
        c.hide_favorites_panel();
        c.open_popup(&CafeId::node(1));
        c.close_popup();
        c.check_background_tasks();

        assert_eq!(c.lifecycle(), Lifecycle::Ready);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_status_message_fades() {
        let status = StatusMessage::new("Found 3 cafés nearby");
        assert!(!status.is_faded(status.posted_at));
        assert!(!status.is_faded(status.posted_at + Duration::from_millis(4999)));
        assert!(status.is_faded(status.posted_at + STATUS_FADE));
    }
}
