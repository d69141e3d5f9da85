//! OSRM map-matching and routing client.
//!
//! A stateless HTTP client over the two OSRM GET endpoints the engine
//! consumes. Requests are independent, carry no connection state and
//! are never retried; a failed or malformed response fails the whole
//! batch and the calling operator records a warning and moves on.
//!
//! The [`OsrmService`] trait is the seam for tests: operators take the
//! trait object, so a fake service can stand in for the HTTP layer.

use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::error::{Result, TraceError};
use crate::GpsPoint;

/// Default base URL of the OSRM match endpoint.
pub const DEFAULT_MATCH_URL: &str = "http://127.0.0.1:5000/match/v1/driving/";

/// Default base URL of the OSRM route endpoint.
pub const DEFAULT_ROUTE_URL: &str = "http://127.0.0.1:5000/route/v1/driving/";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Map-matching and routing operations consumed by the cleaning
/// operators. Implemented by [`OsrmClient`] over HTTP and by fakes in
/// tests.
pub trait OsrmService {
    /// Snap a batch of points to the road network.
    ///
    /// Returns one entry per input point: the snapped location, or
    /// `None` where the service produced a null tracepoint. An `Err`
    /// means the whole batch failed (HTTP or parse error).
    fn match_batch(&self, points: &[GpsPoint]) -> Result<Vec<Option<GpsPoint>>>;

    /// Driving path from `a` to `b`, including both endpoints as
    /// snapped by the router.
    fn route(&self, a: &GpsPoint, b: &GpsPoint) -> Result<Vec<GpsPoint>>;
}

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URL of the match endpoint, ending in a slash.
    pub match_url: String,
    /// Base URL of the route endpoint, ending in a slash.
    pub route_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            match_url: DEFAULT_MATCH_URL.to_string(),
            route_url: DEFAULT_ROUTE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Blocking HTTP client for an OSRM instance.
pub struct OsrmClient {
    config: OsrmConfig,
    http: reqwest::blocking::Client,
}

// Wire types, per the OSRM HTTP API.

#[derive(Debug, Deserialize)]
struct MatchResponse {
    tracepoints: Vec<Option<Tracepoint>>,
}

#[derive(Debug, Deserialize)]
struct Tracepoint {
    /// `[longitude, latitude]`
    location: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// GeoJSON `[[longitude, latitude], ...]`
    coordinates: Vec<[f64; 2]>,
}

impl OsrmClient {
    /// Create a client against the given endpoints.
    pub fn new(config: OsrmConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TraceError::OsrmBatch {
                url: config.match_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { config, http })
    }

    /// Client against a local OSRM with default endpoints.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OsrmConfig::default())
    }

    /// Join coordinates into OSRM's `lon,lat;lon,lat` path segment.
    fn coordinate_path(points: &[GpsPoint]) -> String {
        points
            .iter()
            .map(|p| format!("{},{}", p.longitude, p.latitude))
            .collect::<Vec<_>>()
            .join(";")
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        debug!("GET {url}");

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| TraceError::OsrmBatch {
                url: url.to_string(),
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TraceError::OsrmBatch {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        response.json::<T>().map_err(|e| TraceError::OsrmBatch {
            url: url.to_string(),
            reason: format!("malformed response: {e}"),
        })
    }
}

impl OsrmService for OsrmClient {
    fn match_batch(&self, points: &[GpsPoint]) -> Result<Vec<Option<GpsPoint>>> {
        let url = format!(
            "{}{}?overview=false",
            self.config.match_url,
            Self::coordinate_path(points)
        );

        let parsed: MatchResponse = self.get_json(&url)?;

        if parsed.tracepoints.len() != points.len() {
            return Err(TraceError::OsrmBatch {
                url,
                reason: format!(
                    "expected {} tracepoints, got {}",
                    points.len(),
                    parsed.tracepoints.len()
                ),
            });
        }

        Ok(parsed
            .tracepoints
            .into_iter()
            .map(|tp| tp.map(|t| GpsPoint::new(t.location[1], t.location[0])))
            .collect())
    }

    fn route(&self, a: &GpsPoint, b: &GpsPoint) -> Result<Vec<GpsPoint>> {
        let url = format!(
            "{}{}?overview=full&geometries=geojson",
            self.config.route_url,
            Self::coordinate_path(&[*a, *b])
        );

        let parsed: RouteResponse = self.get_json(&url)?;

        let route = parsed.routes.into_iter().next().ok_or_else(|| {
            TraceError::OsrmBatch {
                url,
                reason: "response contained no routes".to_string(),
            }
        })?;

        Ok(route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| GpsPoint::new(lat, lng))
            .collect())
    }
}
