//! # Trace Clean
//!
//! GPS trace cleaning, enrichment and stop detection for vehicle journeys.
//!
//! This library provides:
//! - A validated trace container built from noisy GPS pings
//! - Order-dependent cleaning operators (drop, impute, map-match, interpolate)
//! - Per-ping provenance tracking (what changed a ping, and when)
//! - Route-based interpolation against an OSRM routing service
//! - Two-stage stop event detection (temporal grouping + spatial merge)
//! - Cleaning, distance and stop summaries assembled into one output document
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel medoid scoring with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use traceclean::{CleanTrace, PingInput, TracePayload};
//! use traceclean::operators::{remove_nearby, RemoveNearbyConfig};
//!
//! let payload = TracePayload {
//!     trace: vec![
//!         PingInput::new(Some(19.0760), Some(72.8777), 0),
//!         PingInput::new(Some(19.0761), Some(72.8778), 30_000),
//!         PingInput::new(Some(19.0790), Some(72.8810), 60_000),
//!     ],
//!     ..TracePayload::default()
//! };
//!
//! let mut trace = CleanTrace::new(payload).unwrap();
//! remove_nearby(&mut trace, &RemoveNearbyConfig::default()).unwrap();
//!
//! let output = trace.build_output();
//! println!("dropped {} pings", output.cleaning_summary.dropped);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TraceError};

// Union-Find data structure for merging stop events
pub mod union_find;
pub use union_find::UnionFind;

// Geographic utilities (distance, bearing, midpoint calculations)
pub mod geo_utils;

// Payload documents and validation
pub mod payload;
pub use payload::{PingInput, TracePayload};

// Trace container
pub mod trace;
pub use trace::CleanTrace;

// OSRM map-matching and routing client
pub mod osrm;
pub use osrm::{OsrmClient, OsrmConfig, OsrmService};

// Cleaning operators
pub mod operators;
pub use operators::{
    impute_by_angle, impute_by_distance, interpolate, map_match, remove_nearby,
    AngleImputeConfig, DistanceImputeConfig, InterpolateConfig, MapMatchConfig,
    RemoveNearbyConfig,
};

// Stop event detection (temporal grouping + spatial merge of medoids)
pub mod stops;
pub use stops::{detect_stops, StopDetectionConfig};

// Enrichment, summaries and output assembly
pub mod output;
pub use output::{CleaningSummary, DistanceSummary, StopEventInfo, TraceOutput};

// Synthetic trace generator for tests and examples
pub mod synthetic;

// ============================================================================
// Operator Names
// ============================================================================

/// Provenance string recorded by the nearby-ping removal operator.
pub const OP_REMOVE_NEARBY: &str = "remove_nearby";
/// Provenance string recorded by the distance-based imputation operator.
pub const OP_IMPUTE_DISTANCE: &str = "impute_distorted_pings_with_distance";
/// Provenance string recorded by the angle-based imputation operator.
pub const OP_IMPUTE_ANGLE: &str = "impute_distorted_pings_with_angle";
/// Provenance string recorded by the map-matching operator.
pub const OP_MAP_MATCH: &str = "map_match_trace";
/// Provenance string recorded by the route interpolation operator.
pub const OP_INTERPOLATE: &str = "interpolate_trace";

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use traceclean::GpsPoint;
/// let point = GpsPoint::new(19.0760, 72.8777); // Mumbai
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A validated input ping. Immutable once the trace is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPing {
    /// Unique identifier within the trace.
    pub ping_id: String,
    /// Latitude in decimal degrees, if reported.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, if reported.
    pub longitude: Option<f64>,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    /// GPS error radius in meters, if reported.
    pub error_radius: Option<f64>,
    /// Event annotation carried through from the input.
    pub event_type: Option<String>,
    /// Pings flagged here are never dropped during cleaning.
    pub force_retain: bool,
    /// Free-form per-ping metadata, echoed into the output.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Update status of a cleaned ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    /// Location identical to the input.
    Unchanged,
    /// Removed during cleaning; cleaned coordinates are null.
    Dropped,
    /// Location rewritten by an imputation or map-matching operator.
    Updated,
    /// Synthetic ping inserted by the interpolation operator.
    Interpolated,
}

impl UpdateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStatus::Unchanged => "unchanged",
            UpdateStatus::Dropped => "dropped",
            UpdateStatus::Updated => "updated",
            UpdateStatus::Interpolated => "interpolated",
        }
    }
}

/// The mutable, provenance-carrying projection of a raw ping.
///
/// Raw input fields are preserved under `input_*` and never overwritten;
/// operators mutate only the cleaned coordinates and the provenance
/// fields. Enrichment and stop fields are recomputed on output.
#[derive(Debug, Clone, Serialize)]
pub struct CleanedPing {
    pub ping_id: String,
    pub input_latitude: Option<f64>,
    pub input_longitude: Option<f64>,
    pub timestamp: i64,
    pub error_radius: Option<f64>,
    pub event_type: Option<String>,
    pub force_retain: bool,
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Current location; null once the ping is dropped.
    pub cleaned_latitude: Option<f64>,
    pub cleaned_longitude: Option<f64>,
    pub update_status: UpdateStatus,
    /// Name of the operator that most recently mutated this ping.
    pub last_updated_by: Option<String>,
    /// True only for pings inserted by the interpolation operator.
    pub is_interpolated: bool,

    // Enrichment - recomputed on output, not owned by operators
    pub time_from_prev_ms: Option<i64>,
    pub distance_from_prev_m: Option<f64>,
    pub cumulative_time_ms: i64,
    pub cumulative_distance_m: f64,

    // Stop detection - populated only by the stop detector
    pub stop_event_status: bool,
    pub representative_stop_event_latitude: Option<f64>,
    pub representative_stop_event_longitude: Option<f64>,
    /// 1-based sequence number of the stop event this ping belongs to.
    pub stop_event_sequence_number: Option<u32>,
    /// Elapsed time from the stop's first ping, formatted as "Xm Ys".
    pub cumulative_stop_event_time: Option<String>,
}

impl CleanedPing {
    /// Build the initial cleaned record for a raw ping: the cleaned
    /// location starts equal to the input location.
    pub fn from_raw(raw: &RawPing) -> Self {
        Self {
            ping_id: raw.ping_id.clone(),
            input_latitude: raw.latitude,
            input_longitude: raw.longitude,
            timestamp: raw.timestamp,
            error_radius: raw.error_radius,
            event_type: raw.event_type.clone(),
            force_retain: raw.force_retain,
            metadata: raw.metadata.clone(),
            cleaned_latitude: raw.latitude,
            cleaned_longitude: raw.longitude,
            update_status: UpdateStatus::Unchanged,
            last_updated_by: None,
            is_interpolated: false,
            time_from_prev_ms: None,
            distance_from_prev_m: None,
            cumulative_time_ms: 0,
            cumulative_distance_m: 0.0,
            stop_event_status: false,
            representative_stop_event_latitude: None,
            representative_stop_event_longitude: None,
            stop_event_sequence_number: None,
            cumulative_stop_event_time: None,
        }
    }

    /// Factory for a synthetic ping inserted by the interpolation
    /// operator. Input fields are null: there was no raw sample.
    pub fn interpolated(ping_id: String, location: GpsPoint, timestamp: i64) -> Self {
        Self {
            ping_id,
            input_latitude: None,
            input_longitude: None,
            timestamp,
            error_radius: None,
            event_type: None,
            force_retain: false,
            metadata: serde_json::Map::new(),
            cleaned_latitude: Some(location.latitude),
            cleaned_longitude: Some(location.longitude),
            update_status: UpdateStatus::Interpolated,
            last_updated_by: Some(crate::OP_INTERPOLATE.to_string()),
            is_interpolated: true,
            time_from_prev_ms: None,
            distance_from_prev_m: None,
            cumulative_time_ms: 0,
            cumulative_distance_m: 0.0,
            stop_event_status: false,
            representative_stop_event_latitude: None,
            representative_stop_event_longitude: None,
            stop_event_sequence_number: None,
            cumulative_stop_event_time: None,
        }
    }

    /// Drop this ping: cleaned coordinates become null.
    pub fn mark_dropped(&mut self, operator: &str) {
        self.cleaned_latitude = None;
        self.cleaned_longitude = None;
        self.update_status = UpdateStatus::Dropped;
        self.last_updated_by = Some(operator.to_string());
    }

    /// Rewrite this ping's cleaned location.
    pub fn mark_updated(&mut self, location: GpsPoint, operator: &str) {
        self.cleaned_latitude = Some(location.latitude);
        self.cleaned_longitude = Some(location.longitude);
        self.update_status = UpdateStatus::Updated;
        self.last_updated_by = Some(operator.to_string());
    }

    /// Current cleaned location, if the ping still has one.
    pub fn cleaned_point(&self) -> Option<GpsPoint> {
        match (self.cleaned_latitude, self.cleaned_longitude) {
            (Some(lat), Some(lng)) => Some(GpsPoint::new(lat, lng)),
            _ => None,
        }
    }

    /// Input location as supplied, if both coordinates were present.
    pub fn input_point(&self) -> Option<GpsPoint> {
        match (self.input_latitude, self.input_longitude) {
            (Some(lat), Some(lng)) => Some(GpsPoint::new(lat, lng)),
            _ => None,
        }
    }

    /// Whether this ping has been dropped.
    pub fn is_dropped(&self) -> bool {
        self.update_status == UpdateStatus::Dropped
    }

    /// Whether a cleaning operator may touch this ping: interpolated
    /// pings belong to the interpolator alone, and dropped pings stay
    /// dropped.
    pub fn is_cleanable(&self) -> bool {
        !self.is_interpolated && !self.is_dropped()
    }
}
