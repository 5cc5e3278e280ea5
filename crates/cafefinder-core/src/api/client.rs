//! API client for the Overpass geodata interpreters.
//!
//! This module provides the `OverpassClient` struct, which submits Overpass QL
//! queries to a primary interpreter and, when that interpreter cannot be
//! reached at all, to exactly one mirror.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{header, Client};
use tracing::{debug, info, warn};

use crate::models::{Coordinate, OverpassElement, OverpassResponse};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Primary public Overpass interpreter.
pub const PRIMARY_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Mirror used only when the primary cannot be reached.
pub const MIRROR_ENDPOINT: &str = "https://overpass.kumi.systems/api/interpreter";

/// Search radius around the query center.
pub const SEARCH_RADIUS_METERS: u32 = 3000;

/// Server-side query timeout requested in the query header.
const QUERY_TIMEOUT_SECS: u32 = 30;

/// HTTP request timeout in seconds.
/// Slightly longer than the server-side query timeout so the server gets to
/// report its own timeout first.
const REQUEST_TIMEOUT_SECS: u64 = 35;

/// Status and body of an answered request.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a text body by POST.
///
/// An `Err` means no response was obtained (connection refused, DNS failure,
/// timeout); any HTTP status, including errors, is an `Ok`.
pub trait QueryTransport: Send + Sync {
    fn post_text(&self, url: &str, body: &str) -> BoxFuture<'static, Result<TransportResponse, ApiError>>;
}

/// reqwest-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("cafe-finder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl QueryTransport for ReqwestTransport {
    fn post_text(&self, url: &str, body: &str) -> BoxFuture<'static, Result<TransportResponse, ApiError>> {
        let request = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(body.to_string());
        let url = url.to_string();

        Box::pin(async move {
            let response = request
                .send()
                .await
                .map_err(|e| ApiError::Transport(format!("POST {} failed: {}", url, e)))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to read body from {}: {}", url, e)))?;

            Ok(TransportResponse { status, body })
        })
    }
}

/// Build the Overpass QL query for café-like places within `radius_m` of
/// `center`.
pub fn build_query(center: Coordinate, radius_m: u32) -> String {
    let around = format!("(around:{},{},{})", radius_m, center.lat, center.lng);
    let selectors = [
        r#"node["amenity"="cafe"]"#,
        r#"way["amenity"="cafe"]"#,
        r#"relation["amenity"="cafe"]"#,
        r#"node["amenity"="restaurant"]["cuisine"="coffee_shop"]"#,
        r#"node["shop"="coffee"]"#,
        r#"node["amenity"="fast_food"]["cuisine"="coffee_shop"]"#,
    ];

    let mut query = format!("[out:json][timeout:{}];\n(\n", QUERY_TIMEOUT_SECS);
    for selector in selectors {
        query.push_str("  ");
        query.push_str(selector);
        query.push_str(&around);
        query.push_str(";\n");
    }
    query.push_str(");\nout geom;\n");
    query
}

/// Overpass API client.
/// Clone is cheap - the transport is shared behind an Arc.
#[derive(Clone)]
pub struct OverpassClient {
    transport: Arc<dyn QueryTransport>,
    primary: String,
    mirror: String,
}

impl OverpassClient {
    /// Create a client using reqwest and the public endpoints
    pub fn new() -> Result<Self, ApiError> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new()?)))
    }

    pub fn with_transport(transport: Arc<dyn QueryTransport>) -> Self {
        Self {
            transport,
            primary: PRIMARY_ENDPOINT.to_string(),
            mirror: MIRROR_ENDPOINT.to_string(),
        }
    }

    /// Replace the primary and mirror endpoints.
    pub fn with_endpoints(mut self, primary: impl Into<String>, mirror: impl Into<String>) -> Self {
        self.primary = primary.into();
        self.mirror = mirror.into();
        self
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn mirror(&self) -> &str {
        &self.mirror
    }

    /// Check if response is successful, returning an error with body if not.
    fn check_response(response: TransportResponse) -> Result<TransportResponse, ApiError> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_status(response.status, &response.body))
        }
    }

    /// Submit `query` and return the raw elements.
    ///
    /// Only a transport failure of the primary triggers the mirror; an HTTP
    /// error status from the primary is final.
    pub async fn fetch_elements(&self, query: &str) -> Result<Vec<OverpassElement>, ApiError> {
        let response = match self.transport.post_text(&self.primary, query).await {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint = %self.primary, error = %e, "Primary server failed, trying fallback");
                self.transport.post_text(&self.mirror, query).await?
            }
        };

        let response = Self::check_response(response)?;
        debug!(bytes = response.body.len(), "Overpass response received");

        let parsed: OverpassResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse Overpass JSON: {}", e)))?;

        info!(elements = parsed.elements.len(), "Overpass query complete");
        Ok(parsed.elements)
    }
}

// ============================================================================
// Tests
// ============================================================================
