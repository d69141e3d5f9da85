//! Map matching of the cleaned sequence against the road network.

use std::time::Instant;

use log::info;

use crate::error::{Result, TraceError};
use crate::osrm::OsrmService;
use crate::trace::CleanTrace;
use crate::{GpsPoint, OP_MAP_MATCH};

/// Batch sizes above this are sent anyway, but flagged: a default OSRM
/// server configuration may reject the request.
const BATCH_SIZE_SERVER_LIMIT: usize = 100;

/// Parameters for [`map_match`].
#[derive(Debug, Clone)]
pub struct MapMatchConfig {
    /// Number of pings per match request. Default: 5
    pub ping_batch_size: usize,
}

impl Default for MapMatchConfig {
    fn default() -> Self {
        Self { ping_batch_size: 5 }
    }
}

/// Snap eligible pings to the road network in batches.
///
/// Eligible pings (non-dropped, non-interpolated, located) are taken
/// in sequence order and partitioned into contiguous chunks of
/// `ping_batch_size`. Each snapped point that differs from the current
/// cleaned location updates the ping. Null tracepoints leave their
/// ping unchanged; a batch whose request fails leaves all of its pings
/// unchanged and records a warning on the trace.
pub fn map_match(
    trace: &mut CleanTrace,
    osrm: &dyn OsrmService,
    config: &MapMatchConfig,
) -> Result<()> {
    if config.ping_batch_size < 2 {
        return Err(TraceError::validation(
            "ping_batch_size",
            None,
            format!("cannot be less than 2, got {}", config.ping_batch_size),
        ));
    }

    let started = Instant::now();

    if config.ping_batch_size > BATCH_SIZE_SERVER_LIMIT {
        trace.push_warning(format!(
            "map_match batch size {} exceeds {}; the OSRM server may reject requests",
            config.ping_batch_size, BATCH_SIZE_SERVER_LIMIT
        ));
    }

    let eligible: Vec<usize> = trace
        .pings()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_cleanable() && p.cleaned_point().is_some())
        .map(|(i, _)| i)
        .collect();

    let mut matched = 0usize;
    let mut failed_batches = 0usize;

    for chunk in eligible.chunks(config.ping_batch_size) {
        let points: Vec<GpsPoint> = chunk
            .iter()
            .map(|&i| trace.pings()[i].cleaned_point().expect("eligible"))
            .collect();

        let snapped = match osrm.match_batch(&points) {
            Ok(snapped) => snapped,
            Err(e) => {
                failed_batches += 1;
                trace.push_warning(format!("map_match batch of {} pings skipped: {e}", chunk.len()));
                continue;
            }
        };

        let pings = trace.pings_mut();
        for (&i, snap) in chunk.iter().zip(snapped) {
            let Some(location) = snap else {
                continue;
            };
            if pings[i].cleaned_point() != Some(location) {
                pings[i].mark_updated(location, OP_MAP_MATCH);
                matched += 1;
            }
        }
    }

    info!(
        "map_match updated {matched} of {} eligible pings ({failed_batches} batches failed)",
        eligible.len()
    );
    trace.set_map_matched();
    trace.record_timing("map_match", started.elapsed());
    Ok(())
}
