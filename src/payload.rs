//! Trace payload documents and input validation.
//!
//! A [`TracePayload`] is the in-process input contract: a list of ping
//! documents plus vehicle metadata. Validation checks every field
//! against its range, enforces the all-or-none ping-id rule and
//! non-decreasing timestamps, and fails on the first violation.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};
use crate::RawPing;

/// Latest accepted timestamp: 1st Jan 2038 00:00:00 UTC in milliseconds.
pub const MAXIMUM_UNIX_TIMESTAMP_MS: i64 = 2_145_916_800_000;

/// Default vehicle type echoed into the output.
pub const DEFAULT_VEHICLE_TYPE: &str = "car";

/// Default vehicle speed in km/h echoed into the output.
pub const DEFAULT_VEHICLE_SPEED: f64 = 25.0;

/// A single ping as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingInput {
    /// Unique identifier. Must be present on every ping or on none;
    /// when absent everywhere, ids `p0`, `p1`, ... are assigned.
    #[serde(default)]
    pub ping_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub error_radius: Option<f64>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub force_retain: bool,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl PingInput {
    /// Convenience constructor for the common coordinate + timestamp case.
    pub fn new(latitude: Option<f64>, longitude: Option<f64>, timestamp: i64) -> Self {
        Self {
            ping_id: None,
            latitude,
            longitude,
            timestamp,
            error_radius: None,
            event_type: None,
            force_retain: false,
            metadata: serde_json::Map::new(),
        }
    }
}

/// The input trace payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracePayload {
    pub trace: Vec<PingInput>,
    #[serde(default = "default_vehicle_type")]
    pub vehicle_type: String,
    #[serde(default = "default_vehicle_speed")]
    pub vehicle_speed: f64,
}

fn default_vehicle_type() -> String {
    DEFAULT_VEHICLE_TYPE.to_string()
}

fn default_vehicle_speed() -> f64 {
    DEFAULT_VEHICLE_SPEED
}

impl Default for TracePayload {
    fn default() -> Self {
        Self {
            trace: Vec::new(),
            vehicle_type: default_vehicle_type(),
            vehicle_speed: default_vehicle_speed(),
        }
    }
}

impl TracePayload {
    /// Validate the payload and produce the immutable raw pings.
    ///
    /// Order is preserved exactly as supplied; a timestamp inversion is
    /// an error, not something to sort away.
    pub fn into_raw_pings(self) -> Result<Vec<RawPing>> {
        if self.trace.is_empty() {
            return Err(TraceError::validation(
                "trace",
                None,
                "trace cannot be an empty list",
            ));
        }

        if !(self.vehicle_speed.is_finite() && self.vehicle_speed > 0.0) {
            return Err(TraceError::validation(
                "vehicle_speed",
                None,
                format!("must be a positive number, got {}", self.vehicle_speed),
            ));
        }

        for (i, ping) in self.trace.iter().enumerate() {
            validate_ping(ping, i)?;
        }

        // ping_id must be present on every ping or on none
        let with_id = self.trace.iter().filter(|p| p.ping_id.is_some()).count();
        if with_id != 0 && with_id != self.trace.len() {
            return Err(TraceError::validation(
                "ping_id",
                None,
                "ping_id must be present in either all of the pings or in none of the pings",
            ));
        }

        // At least one ping must carry a usable location
        let any_located = self
            .trace
            .iter()
            .any(|p| p.latitude.is_some() && p.longitude.is_some());
        if !any_located {
            return Err(TraceError::validation(
                "trace",
                None,
                "trace should have at least one ping with non-null latitude and longitude",
            ));
        }

        // Timestamps must be non-decreasing in supplied order
        for i in 1..self.trace.len() {
            let previous = self.trace[i - 1].timestamp;
            let current = self.trace[i].timestamp;
            if current < previous {
                return Err(TraceError::Order {
                    index: i,
                    previous,
                    current,
                });
            }
        }

        let assign_ids = with_id == 0;
        let mut raw = Vec::with_capacity(self.trace.len());
        let mut seen_ids = std::collections::HashSet::new();

        for (i, ping) in self.trace.into_iter().enumerate() {
            let ping_id = if assign_ids {
                format!("p{i}")
            } else {
                ping.ping_id.expect("presence checked above")
            };

            if !seen_ids.insert(ping_id.clone()) {
                return Err(TraceError::validation(
                    "ping_id",
                    Some(i),
                    format!("duplicate ping_id '{ping_id}'"),
                ));
            }

            raw.push(RawPing {
                ping_id,
                latitude: ping.latitude,
                longitude: ping.longitude,
                timestamp: ping.timestamp,
                error_radius: ping.error_radius,
                event_type: ping.event_type,
                force_retain: ping.force_retain,
                metadata: ping.metadata,
            });
        }

        Ok(raw)
    }
}

fn validate_ping(ping: &PingInput, index: usize) -> Result<()> {
    if let Some(id) = &ping.ping_id {
        if id.is_empty() {
            return Err(TraceError::validation(
                "ping_id",
                Some(index),
                "ping_id cannot be an empty string",
            ));
        }
    }

    if let Some(lat) = ping.latitude {
        if !(lat.is_finite() && (-90.0..=90.0).contains(&lat)) {
            return Err(TraceError::validation(
                "latitude",
                Some(index),
                format!("must be within range [-90, 90], got {lat}"),
            ));
        }
    }

    if let Some(lng) = ping.longitude {
        if !(lng.is_finite() && (-180.0..=180.0).contains(&lng)) {
            return Err(TraceError::validation(
                "longitude",
                Some(index),
                format!("must be within range [-180, 180], got {lng}"),
            ));
        }
    }

    if !(0..=MAXIMUM_UNIX_TIMESTAMP_MS).contains(&ping.timestamp) {
        return Err(TraceError::validation(
            "timestamp",
            Some(index),
            format!(
                "must be unix milliseconds within [0, {MAXIMUM_UNIX_TIMESTAMP_MS}], got {}",
                ping.timestamp
            ),
        ));
    }

    if let Some(radius) = ping.error_radius {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(TraceError::validation(
                "error_radius",
                Some(index),
                format!("cannot be negative, got {radius}"),
            ));
        }
    }

    Ok(())
}
