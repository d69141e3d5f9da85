//! Shared test helpers: trace builders and a fake OSRM service.

use traceclean::{CleanTrace, GpsPoint, OsrmService, PingInput, Result, TraceError, TracePayload};

/// Build a trace from (lat, lng, timestamp) triples with default
/// vehicle metadata.
pub fn trace_from(coords: &[(f64, f64, i64)]) -> CleanTrace {
    let payload = TracePayload {
        trace: coords
            .iter()
            .map(|&(lat, lng, ts)| PingInput::new(Some(lat), Some(lng), ts))
            .collect(),
        ..TracePayload::default()
    };
    CleanTrace::new(payload).expect("valid test payload")
}

/// A controllable stand-in for the OSRM HTTP layer.
#[derive(Debug, Clone)]
pub struct FakeOsrm {
    /// Added to the latitude of every snapped point, in degrees.
    pub snap_shift_deg: f64,
    /// Batch positions that come back as null tracepoints.
    pub null_indices: Vec<usize>,
    /// Fail every match request.
    pub fail_match: bool,
    /// Number of interior points returned between route endpoints.
    pub route_interior_points: usize,
    /// Eastward offset applied to interior route points, in degrees;
    /// non-zero values make the returned route a detour.
    pub route_detour_deg: f64,
    /// Fail every route request.
    pub fail_route: bool,
}

impl Default for FakeOsrm {
    fn default() -> Self {
        Self {
            snap_shift_deg: 0.0,
            null_indices: Vec::new(),
            fail_match: false,
            route_interior_points: 3,
            route_detour_deg: 0.0,
            fail_route: false,
        }
    }
}

impl FakeOsrm {
    /// A service that snaps every point by a visible latitude shift.
    pub fn shifting(shift_deg: f64) -> Self {
        Self {
            snap_shift_deg: shift_deg,
            ..Self::default()
        }
    }
}

impl OsrmService for FakeOsrm {
    fn match_batch(&self, points: &[GpsPoint]) -> Result<Vec<Option<GpsPoint>>> {
        if self.fail_match {
            return Err(TraceError::OsrmBatch {
                url: "fake://match".to_string(),
                reason: "forced failure".to_string(),
            });
        }

        Ok(points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if self.null_indices.contains(&i) {
                    None
                } else {
                    Some(GpsPoint::new(p.latitude + self.snap_shift_deg, p.longitude))
                }
            })
            .collect())
    }

    fn route(&self, a: &GpsPoint, b: &GpsPoint) -> Result<Vec<GpsPoint>> {
        if self.fail_route {
            return Err(TraceError::OsrmBatch {
                url: "fake://route".to_string(),
                reason: "forced failure".to_string(),
            });
        }

        let k = self.route_interior_points;
        let mut points = Vec::with_capacity(k + 2);
        points.push(*a);
        for j in 1..=k {
            let fraction = j as f64 / (k + 1) as f64;
            points.push(GpsPoint::new(
                a.latitude + fraction * (b.latitude - a.latitude),
                a.longitude + fraction * (b.longitude - a.longitude) + self.route_detour_deg,
            ));
        }
        points.push(*b);
        Ok(points)
    }
}
