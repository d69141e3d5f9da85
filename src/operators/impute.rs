//! Imputation of distorted pings by distance ratio and by turn angle.
//!
//! Both operators share the neighbour rule: for an interior ping the
//! neighbours are the nearest pings on either side that still carry a
//! cleaned location. A ping judged distorted is replaced with the
//! spherical midpoint of its neighbours; `force_retain` does not
//! exempt a ping from imputation.

use std::time::Instant;

use log::info;

use crate::error::{Result, TraceError};
use crate::geo_utils::{change_in_direction, haversine_distance, spherical_midpoint};
use crate::trace::CleanTrace;
use crate::{OP_IMPUTE_ANGLE, OP_IMPUTE_DISTANCE};

/// Parameters for [`impute_by_distance`].
#[derive(Debug, Clone)]
pub struct DistanceImputeConfig {
    /// Maximum allowed ratio of (distance via the ping) to (direct
    /// distance between its neighbours). Default: 3.0
    pub max_dist_ratio: f64,
}

impl Default for DistanceImputeConfig {
    fn default() -> Self {
        Self { max_dist_ratio: 3.0 }
    }
}

/// Parameters for [`impute_by_angle`].
#[derive(Debug, Clone)]
pub struct AngleImputeConfig {
    /// Maximum change in direction at a ping, in degrees [0, 180].
    /// Default: 120.0
    pub max_delta_angle: f64,
}

impl Default for AngleImputeConfig {
    fn default() -> Self {
        Self {
            max_delta_angle: 120.0,
        }
    }
}

/// Replace pings whose detour ratio exceeds the threshold.
///
/// For each interior located ping, compares the path length through it
/// (`prev -> cur -> next`) against the direct neighbour distance. When
/// the direct distance is positive and the ratio exceeds
/// `max_dist_ratio`, the ping moves to the spherical midpoint of its
/// neighbours.
pub fn impute_by_distance(trace: &mut CleanTrace, config: &DistanceImputeConfig) -> Result<()> {
    // The path through a ping is never shorter than the direct neighbour
    // distance, so any ratio below 1 would impute every interior ping
    if !(config.max_dist_ratio.is_finite() && config.max_dist_ratio >= 1.0) {
        return Err(TraceError::validation(
            "max_dist_ratio",
            None,
            format!("cannot be less than 1, got {}", config.max_dist_ratio),
        ));
    }

    let started = Instant::now();
    let imputed = impute_interior(trace, OP_IMPUTE_DISTANCE, |prev, cur, next| {
        let via = haversine_distance(prev, cur) + haversine_distance(cur, next);
        let direct = haversine_distance(prev, next);
        direct > 0.0 && via / direct > config.max_dist_ratio
    });

    info!(
        "impute_by_distance updated {imputed} pings above ratio {}",
        config.max_dist_ratio
    );
    trace.record_timing("impute_by_distance", started.elapsed());
    Ok(())
}

/// Replace pings where the trace turns more sharply than the threshold.
///
/// The unsigned change in direction at the ping (0 for a straight
/// continuation, 180 for a full reversal) is compared against
/// `max_delta_angle`.
pub fn impute_by_angle(trace: &mut CleanTrace, config: &AngleImputeConfig) -> Result<()> {
    if !(config.max_delta_angle.is_finite() && (0.0..=180.0).contains(&config.max_delta_angle)) {
        return Err(TraceError::validation(
            "max_delta_angle",
            None,
            format!("must be within range [0, 180], got {}", config.max_delta_angle),
        ));
    }

    let started = Instant::now();
    let imputed = impute_interior(trace, OP_IMPUTE_ANGLE, |prev, cur, next| {
        change_in_direction(prev, cur, next) > config.max_delta_angle
    });

    info!(
        "impute_by_angle updated {imputed} pings above {} degrees",
        config.max_delta_angle
    );
    trace.record_timing("impute_by_angle", started.elapsed());
    Ok(())
}

/// Shared scan: walk interior located pings, impute where `distorted`
/// fires. End pings are left unchanged; interpolated pings may serve
/// as neighbours but are never imputed themselves. Neighbour reads go
/// against a snapshot of the pre-call positions, so one replacement
/// never shifts the neighbours of the next within the same call.
fn impute_interior(
    trace: &mut CleanTrace,
    operator: &str,
    distorted: impl Fn(&crate::GpsPoint, &crate::GpsPoint, &crate::GpsPoint) -> bool,
) -> usize {
    let pings = trace.pings_mut();
    let located: Vec<(usize, crate::GpsPoint)> = (0..pings.len())
        .filter_map(|i| pings[i].cleaned_point().map(|p| (i, p)))
        .collect();

    if located.len() < 3 {
        return 0;
    }

    let mut imputed = 0usize;
    for k in 1..located.len() - 1 {
        let (i, cur) = located[k];
        if !pings[i].is_cleanable() {
            continue;
        }

        let (_, prev) = located[k - 1];
        let (_, next) = located[k + 1];

        if distorted(&prev, &cur, &next) {
            pings[i].mark_updated(spherical_midpoint(&prev, &next), operator);
            imputed += 1;
        }
    }

    imputed
}
