//! Route-based interpolation of sparse gaps between pings.

use std::collections::HashSet;
use std::time::Instant;

use log::info;

use crate::error::{Result, TraceError};
use crate::geo_utils::{haversine_distance, trace_distance};
use crate::osrm::OsrmService;
use crate::trace::CleanTrace;
use crate::{CleanedPing, GpsPoint};

/// A pair must span more than this many seconds to host a route.
const MIN_ROUTE_TIME_SECONDS: f64 = 1.0;
/// Routes longer than this multiple of the direct pair distance are
/// rejected as implausible.
const MAX_ROUTE_TO_DIRECT_RATIO: f64 = 1.5;
/// Routes implying slower travel than this (m/s) are rejected.
const MIN_ROUTE_SPEED_MPS: f64 = 1.0;

/// Parameters for [`interpolate`].
#[derive(Debug, Clone)]
pub struct InterpolateConfig {
    /// Gap must be at least this long (meters) to be densified.
    /// Default: 10.0
    pub min_dist_from_prev_ping: f64,
    /// Gap must be at most this long (meters) to be densified.
    /// Default: 250.0
    pub max_dist_from_prev_ping: f64,
}

impl Default for InterpolateConfig {
    fn default() -> Self {
        Self {
            min_dist_from_prev_ping: 10.0,
            max_dist_from_prev_ping: 250.0,
        }
    }
}

/// Insert synthetic pings along the driving route between sparse pairs.
///
/// Requires [`map_match`](super::map_match) to have been applied first.
/// Walks pairs of pings adjacent in the sequence where both are
/// eligible (non-dropped, non-interpolated, located); when their
/// great-circle distance falls inside the configured window and the
/// pair spans more than a second, the routing service supplies the
/// driving path and its interior points become interpolated pings.
/// A route is rejected as implausible when its total length (snap
/// distances included) exceeds 1.5x the direct pair distance or
/// implies travel slower than 1 m/s. Timestamps are spread
/// proportionally to cumulative route arclength, strictly inside the
/// pair's time span. Inserted ids follow the `{A}_1 ... {A}_K` scheme.
///
/// A failed or rejected route skips that pair and records a warning.
/// If the rebuilt sequence would violate time ordering or id
/// uniqueness the operator aborts with no mutation.
pub fn interpolate(
    trace: &mut CleanTrace,
    osrm: &dyn OsrmService,
    config: &InterpolateConfig,
) -> Result<()> {
    super::check_non_negative(config.min_dist_from_prev_ping, "min_dist_from_prev_ping")?;
    super::check_non_negative(config.max_dist_from_prev_ping, "max_dist_from_prev_ping")?;
    if config.min_dist_from_prev_ping >= config.max_dist_from_prev_ping {
        return Err(TraceError::validation(
            "min_dist_from_prev_ping",
            None,
            "min_dist_from_prev_ping must be less than max_dist_from_prev_ping",
        ));
    }

    if !trace.is_map_matched() {
        return Err(TraceError::Precondition {
            operator: "interpolate",
            reason: "map_match must be run before interpolate".to_string(),
        });
    }

    let started = Instant::now();
    let mut rebuilt: Vec<CleanedPing> = Vec::with_capacity(trace.len());
    let mut warnings: Vec<String> = Vec::new();
    let mut inserted_total = 0usize;

    for i in 0..trace.len() {
        rebuilt.push(trace.pings()[i].clone());

        let Some(next) = trace.pings().get(i + 1) else {
            continue;
        };
        let current = &trace.pings()[i];
        if !(current.is_cleanable() && next.is_cleanable()) {
            continue;
        }
        let (Some(a), Some(b)) = (current.cleaned_point(), next.cleaned_point()) else {
            continue;
        };

        let gap = haversine_distance(&a, &b);
        if gap < config.min_dist_from_prev_ping || gap > config.max_dist_from_prev_ping {
            continue;
        }

        let span_seconds = (next.timestamp - current.timestamp) as f64 / 1000.0;
        if span_seconds <= MIN_ROUTE_TIME_SECONDS {
            warnings.push(format!(
                "interpolate skipped pair {} -> {}: time span {span_seconds}s is too short",
                current.ping_id, next.ping_id
            ));
            continue;
        }

        let geometry = match osrm.route(&a, &b) {
            Ok(geometry) => geometry,
            Err(e) => {
                warnings.push(format!(
                    "interpolate skipped pair {} -> {}: {e}",
                    current.ping_id, next.ping_id
                ));
                continue;
            }
        };

        // The first and last route points are just the snapped endpoints
        if geometry.len() <= 2 {
            continue;
        }

        // Route plausibility: total length counts the snap distances at
        // both ends; reject detours and implausibly slow routes
        let route_length = haversine_distance(&a, &geometry[0])
            + trace_distance(&geometry)
            + haversine_distance(geometry.last().expect("non-empty route"), &b);
        if route_length > MAX_ROUTE_TO_DIRECT_RATIO * gap {
            warnings.push(format!(
                "interpolate skipped pair {} -> {}: route length {route_length:.1}m exceeds {MAX_ROUTE_TO_DIRECT_RATIO}x the direct {gap:.1}m",
                current.ping_id, next.ping_id
            ));
            continue;
        }
        if route_length / span_seconds <= MIN_ROUTE_SPEED_MPS {
            warnings.push(format!(
                "interpolate skipped pair {} -> {}: implied speed below {MIN_ROUTE_SPEED_MPS} m/s",
                current.ping_id, next.ping_id
            ));
            continue;
        }

        let interior = &geometry[1..geometry.len() - 1];

        let inserted = build_interpolated_pings(
            current.ping_id.clone(),
            current.timestamp,
            next.timestamp,
            &a,
            &b,
            interior,
        );
        inserted_total += inserted.len();
        rebuilt.extend(inserted);
    }

    check_invariants(&rebuilt)?;

    for warning in warnings {
        trace.push_warning(warning);
    }
    info!("interpolate inserted {inserted_total} pings");
    trace.replace_pings(rebuilt);
    trace.record_timing("interpolate", started.elapsed());
    Ok(())
}

/// Synthesize the interpolated pings for one gap.
///
/// Timestamps are linear in cumulative arclength along the route
/// `a -> interior... -> b`, clamped strictly inside `(t_a, t_b)` and
/// kept strictly increasing; a route point whose timestamp cannot fit
/// is skipped.
fn build_interpolated_pings(
    anchor_id: String,
    t_a: i64,
    t_b: i64,
    a: &GpsPoint,
    b: &GpsPoint,
    interior: &[GpsPoint],
) -> Vec<CleanedPing> {
    // Cumulative distance from `a` at each interior point, plus total through `b`
    let mut cumulative = Vec::with_capacity(interior.len());
    let mut running = 0.0;
    let mut prev = *a;
    for point in interior {
        running += haversine_distance(&prev, point);
        cumulative.push(running);
        prev = *point;
    }
    let total = running + haversine_distance(&prev, b);
    if total <= 0.0 {
        return Vec::new();
    }

    let span = (t_b - t_a) as f64;
    let mut pings = Vec::with_capacity(interior.len());
    let mut last_ts = t_a;
    let mut counter = 0u32;

    for (point, dist) in interior.iter().zip(&cumulative) {
        let timestamp = t_a + (span * dist / total).round() as i64;
        let timestamp = timestamp.clamp(t_a + 1, t_b - 1);
        if timestamp <= last_ts {
            continue;
        }
        last_ts = timestamp;
        counter += 1;
        pings.push(CleanedPing::interpolated(
            format!("{anchor_id}_{counter}"),
            *point,
            timestamp,
        ));
    }

    pings
}

/// Reject a rebuilt sequence that breaks time ordering or id
/// uniqueness; the caller leaves the trace untouched in that case.
fn check_invariants(pings: &[CleanedPing]) -> Result<()> {
    let mut ids = HashSet::with_capacity(pings.len());
    for pair in pings.windows(2) {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(TraceError::InternalInvariant {
                operator: "interpolate",
                reason: format!(
                    "timestamp order broken between {} and {}",
                    pair[0].ping_id, pair[1].ping_id
                ),
            });
        }
    }
    for ping in pings {
        if !ids.insert(ping.ping_id.as_str()) {
            return Err(TraceError::InternalInvariant {
                operator: "interpolate",
                reason: format!("duplicate ping_id '{}'", ping.ping_id),
            });
        }
    }
    Ok(())
}
