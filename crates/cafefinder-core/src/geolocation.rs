//! User location resolution.
//!
//! A location request is one-shot and bounded: it either yields a coordinate
//! or a `LocationError`, and never retries. The caller picks the fallback.
//!
//! `SystemLocator` is the adapter for a terminal host. It honours the usual
//! request options: a recently stored fix younger than `maximum_age` is
//! reused unless a different position has been pinned since, `enable_high_accuracy` prefers a pinned position over a coarse IP
//! lookup, and the lookup is bounded by `timeout`.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::Coordinate;
use crate::storage::{CachedData, KeyValueStore};

/// Storage key for the last successful fix.
pub const LAST_FIX_KEY: &str = "last_fix";

/// Default IP geolocation endpoint.
pub const IP_LOOKUP_ENDPOINT: &str = "http://ip-api.com/json";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default staleness tolerance for a stored fix (5 minutes).
const DEFAULT_MAXIMUM_AGE_SECS: u64 = 300;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Geolocation is not supported")]
    Unsupported,

    #[error("User denied geolocation")]
    PermissionDenied,

    #[error("Geolocation request timed out")]
    Timeout,

    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            maximum_age: Duration::from_secs(DEFAULT_MAXIMUM_AGE_SECS),
        }
    }
}

/// Provides a single best-effort position.
pub trait LocationProvider: Send + Sync {
    fn locate(&self) -> BoxFuture<'static, Result<Coordinate, LocationError>>;
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: Option<String>,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
}

/// Location adapter for a terminal host.
#[derive(Clone)]
pub struct SystemLocator {
    options: GeolocationOptions,
    enabled: bool,
    pinned: Option<Coordinate>,
    lookup_endpoint: Option<String>,
    http: Client,
    fixes: Option<Arc<dyn KeyValueStore>>,
}

impl SystemLocator {
    pub fn new(options: GeolocationOptions) -> Result<Self, LocationError> {
        let http = Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("cafe-finder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LocationError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            options,
            enabled: true,
            pinned: None,
            lookup_endpoint: Some(IP_LOOKUP_ENDPOINT.to_string()),
            http,
            fixes: None,
        })
    }

    /// Disabled location access behaves like a denied permission.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// A user-supplied position, treated as a precise fix.
    pub fn with_pinned(mut self, pinned: Option<Coordinate>) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn with_lookup_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.lookup_endpoint = endpoint;
        self
    }

    /// Where successful fixes are remembered for reuse within `maximum_age`.
    pub fn with_fix_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.fixes = Some(store);
        self
    }

    pub fn options(&self) -> &GeolocationOptions {
        &self.options
    }

    fn stored_fix(&self) -> Option<Coordinate> {
        let store = self.fixes.as_ref()?;
        let raw = match store.get(LAST_FIX_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                debug!(error = %e, "Failed to read stored fix");
                return None;
            }
        };
        let cached: CachedData<Coordinate> = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                debug!(error = %e, "Stored fix is corrupt");
                return None;
            }
        };

        if cached.is_fresh(self.options.maximum_age) && cached.data.is_valid() {
            debug!(age = %cached.age_display(), "Reusing stored fix");
            Some(cached.data)
        } else {
            None
        }
    }

    fn store_fix(&self, fix: Coordinate) {
        let Some(store) = self.fixes.as_ref() else {
            return;
        };
        let result = serde_json::to_string(&CachedData::new(fix))
            .map_err(|e| e.to_string())
            .and_then(|json| store.set(LAST_FIX_KEY, &json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            warn!(error = %e, "Failed to store location fix");
        }
    }

    async fn lookup(&self, endpoint: &str) -> Result<Coordinate, LocationError> {
        let request = async {
            let response = self.http.get(endpoint).send().await?.error_for_status()?;
            response.json::<IpLookupResponse>().await
        };

        let response = tokio::time::timeout(self.options.timeout, request)
            .await
            .map_err(|_| LocationError::Timeout)?
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if response.status.as_deref() != Some("success") {
            let reason = response
                .message
                .unwrap_or_else(|| "lookup failed".to_string());
            return Err(LocationError::Unavailable(reason));
        }

        let fix = match (response.lat, response.lon) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
            _ => return Err(LocationError::Unavailable("response missing coordinates".to_string())),
        };
        if !fix.is_valid() {
            return Err(LocationError::Unavailable("response has invalid coordinates".to_string()));
        }

        info!(lat = fix.lat, lng = fix.lng, city = ?response.city, "IP geolocation successful");
        Ok(fix)
    }

    async fn resolve(&self) -> Result<Coordinate, LocationError> {
        if !self.enabled {
            return Err(LocationError::PermissionDenied);
        }

        // A fix stored before the pinned position changed no longer applies
        let stored = self
            .stored_fix()
            .filter(|fix| self.pinned.map_or(true, |pinned| pinned == *fix));
        if let Some(fix) = stored {
            return Ok(fix);
        }

        let fix = match (self.options.enable_high_accuracy, self.pinned, self.lookup_endpoint.as_deref()) {
            (true, Some(pinned), _) => pinned,
            (_, _, Some(endpoint)) => self.lookup(endpoint).await?,
            (_, Some(pinned), None) => pinned,
            (_, None, None) => return Err(LocationError::Unsupported),
        };

        self.store_fix(fix);
        Ok(fix)
    }
}

impl LocationProvider for SystemLocator {
    fn locate(&self) -> BoxFuture<'static, Result<Coordinate, LocationError>> {
        let locator = self.clone();
        Box::pin(async move { locator.resolve().await })
    }
}
