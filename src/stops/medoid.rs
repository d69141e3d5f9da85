//! Medoid selection for stop events.
//!
//! The medoid is the actual member ping minimizing the total
//! great-circle distance to all other members, so a stop's
//! representative location is always a real observed point cluster
//! center rather than an artificial average.

use crate::geo_utils::haversine_distance;
use crate::GpsPoint;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Index of the member minimizing the sum of distances to the others.
///
/// Returns 0 for a single-member slice; empty input is a caller bug
/// and yields 0 as well (callers always pass at least one point).
pub fn select_medoid(points: &[GpsPoint]) -> usize {
    if points.len() <= 1 {
        return 0;
    }

    #[cfg(feature = "parallel")]
    {
        points
            .par_iter()
            .enumerate()
            .map(|(i, p)| (i, total_distance(p, points)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    #[cfg(not(feature = "parallel"))]
    {
        let mut best_idx = 0;
        let mut best_total = f64::MAX;

        for (i, p) in points.iter().enumerate() {
            let total = total_distance(p, points);
            if total < best_total {
                best_total = total;
                best_idx = i;
            }
        }

        best_idx
    }
}

fn total_distance(point: &GpsPoint, points: &[GpsPoint]) -> f64 {
    points.iter().map(|other| haversine_distance(point, other)).sum()
}
