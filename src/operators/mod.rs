//! Cleaning operators over a shared trace.
//!
//! Each operator is an independent function taking `&mut CleanTrace`
//! and a config struct; the caller decides the order. Operators are
//! order-dependent but deterministic: re-running one with the same
//! parameters on the same cleaned sequence produces the same result.
//!
//! Shared rules:
//! - Interpolated pings are never touched by any operator other than
//!   the interpolator that created them.
//! - Dropped pings stay dropped.
//! - Raw (`input_*`) fields are never overwritten.

mod impute;
mod interpolate;
mod map_match;
mod remove_nearby;

pub use impute::{impute_by_angle, impute_by_distance, AngleImputeConfig, DistanceImputeConfig};
pub use interpolate::{interpolate, InterpolateConfig};
pub use map_match::{map_match, MapMatchConfig};
pub use remove_nearby::{remove_nearby, RemoveNearbyConfig};

use crate::error::{Result, TraceError};

/// Reject non-finite or negative operator parameters.
pub(crate) fn check_non_negative(value: f64, field: &'static str) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TraceError::validation(
            field,
            None,
            format!("cannot be negative, got {value}"),
        ))
    }
}
