//! Removal of pings too close to the previously retained ping.

use std::time::Instant;

use log::info;

use crate::error::Result;
use crate::geo_utils::haversine_distance;
use crate::trace::CleanTrace;
use crate::OP_REMOVE_NEARBY;

/// Parameters for [`remove_nearby`].
#[derive(Debug, Clone)]
pub struct RemoveNearbyConfig {
    /// Minimum distance between consecutive retained pings, in meters.
    /// Default: 5.0
    pub min_dist_bw_consecutive_pings: f64,
}

impl Default for RemoveNearbyConfig {
    fn default() -> Self {
        Self {
            min_dist_bw_consecutive_pings: 5.0,
        }
    }
}

/// Drop pings closer than the threshold to the last retained ping.
///
/// Walks the cleaned sequence in order keeping an anchor at the last
/// retained ping. The first located ping is always retained and seeds
/// the anchor. A candidate closer than the threshold is dropped unless
/// it carries `force_retain`; retained candidates (forced or not)
/// become the new anchor. Interpolated and already-dropped pings are
/// skipped and never advance the anchor.
pub fn remove_nearby(trace: &mut CleanTrace, config: &RemoveNearbyConfig) -> Result<()> {
    super::check_non_negative(
        config.min_dist_bw_consecutive_pings,
        "min_dist_bw_consecutive_pings",
    )?;

    let started = Instant::now();
    let mut anchor = None;
    let mut dropped = 0usize;

    for ping in trace.pings_mut() {
        if !ping.is_cleanable() {
            continue;
        }
        let Some(point) = ping.cleaned_point() else {
            continue;
        };

        let Some(anchor_point) = anchor else {
            // First located ping seeds the anchor and is always kept
            anchor = Some(point);
            continue;
        };

        let distance = haversine_distance(&anchor_point, &point);
        if distance < config.min_dist_bw_consecutive_pings && !ping.force_retain {
            ping.mark_dropped(OP_REMOVE_NEARBY);
            dropped += 1;
        } else {
            anchor = Some(point);
        }
    }

    info!(
        "remove_nearby dropped {dropped} pings below {} m",
        config.min_dist_bw_consecutive_pings
    );
    trace.record_timing("remove_nearby", started.elapsed());
    Ok(())
}
