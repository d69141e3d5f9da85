//! Stop event detection over the cleaned trace.
//!
//! Two passes over the non-dropped cleaned sequence:
//! 1. Temporal grouping: a candidate group grows while the next ping
//!    stays within `max_dist_bw_consecutive_pings` of the group's
//!    first ping; a candidate qualifies as a stop event when it has
//!    at least `min_size` pings and spans at least `min_staying_time`
//!    seconds.
//! 2. Spatial merge: each event's medoid goes into an R-tree; events
//!    whose medoids fall within `max_dist_for_merging_stop_points`
//!    of each other are unioned into one. Merged events are numbered
//!    1.. by their earliest member ping, and their representative is
//!    the medoid of the merged membership.
//!
//! Member pings are annotated with the event's representative
//! location, its sequence number, and the elapsed time since the
//! event's first ping.

mod medoid;

pub(crate) use medoid::select_medoid;

use log::info;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::error::{Result, TraceError};
use crate::geo_utils::haversine_distance;
use crate::trace::CleanTrace;
use crate::union_find::UnionFind;
use crate::GpsPoint;

/// Parameters for [`detect_stops`].
#[derive(Debug, Clone)]
pub struct StopDetectionConfig {
    /// Max distance in meters between a ping and the first ping of a
    /// candidate group for the group to keep growing. Default: 10.0
    pub max_dist_bw_consecutive_pings: f64,
    /// Max separation between two stop-event medoids for the events to
    /// be merged. Expressed in raw degrees of latitude/longitude — the
    /// unit convention of the clustering library this engine replaces;
    /// the literal default is preserved. Default: 0.001
    pub max_dist_for_merging_stop_points: f64,
    /// Shortest duration in seconds that can constitute a stop event.
    /// Default: 120
    pub min_staying_time: u64,
    /// Minimum number of pings in a stop event. Default: 2
    pub min_size: usize,
}

impl Default for StopDetectionConfig {
    fn default() -> Self {
        Self {
            max_dist_bw_consecutive_pings: 10.0,
            max_dist_for_merging_stop_points: 0.001,
            min_staying_time: 120,
            min_size: 2,
        }
    }
}

/// A stop-event medoid indexed for the spatial merge pass.
#[derive(Debug, Clone, Copy)]
struct MedoidPoint {
    event: usize,
    lat: f64,
    lng: f64,
}

impl RTreeObject for MedoidPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lng])
    }
}

impl PointDistance for MedoidPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.lat - point[0];
        let dlng = self.lng - point[1];
        dlat * dlat + dlng * dlng
    }
}

/// Detect stop events and annotate their member pings.
///
/// Operates on the non-dropped cleaned sequence; dropped pings are
/// invisible here. Re-running replaces any previous annotation.
pub fn detect_stops(trace: &mut CleanTrace, config: &StopDetectionConfig) -> Result<()> {
    crate::operators::check_non_negative(
        config.max_dist_bw_consecutive_pings,
        "max_dist_bw_consecutive_pings",
    )?;
    crate::operators::check_non_negative(
        config.max_dist_for_merging_stop_points,
        "max_dist_for_merging_stop_points",
    )?;
    if config.min_size < 2 {
        return Err(TraceError::validation(
            "min_size",
            None,
            format!("cannot be less than 2, got {}", config.min_size),
        ));
    }

    // Positions of pings visible to stop detection
    let located: Vec<usize> = (0..trace.len())
        .filter(|&i| trace.pings()[i].cleaned_point().is_some())
        .collect();

    let candidates = temporal_groups(trace, &located, config);
    let events = merge_events(trace, candidates, config.max_dist_for_merging_stop_points);

    info!("detected {} stop events", events.len());
    annotate(trace, &events);
    Ok(())
}

/// Final stop events in sequence order, exposed to the summary builder.
pub(crate) fn detected_events(trace: &CleanTrace) -> Vec<(u32, Vec<usize>)> {
    let mut events: std::collections::BTreeMap<u32, Vec<usize>> = std::collections::BTreeMap::new();
    for (i, ping) in trace.pings().iter().enumerate() {
        if let Some(seq) = ping.stop_event_sequence_number {
            events.entry(seq).or_default().push(i);
        }
    }
    events.into_iter().collect()
}

/// Pass 1: greedy temporal grouping.
///
/// Each accepted group consumes its pings; after a rejected candidate
/// the scan advances a single ping.
fn temporal_groups(
    trace: &CleanTrace,
    located: &[usize],
    config: &StopDetectionConfig,
) -> Vec<Vec<usize>> {
    let pings = trace.pings();
    let mut groups = Vec::new();
    let mut start = 0usize;

    while start < located.len() {
        let first = pings[located[start]].cleaned_point().expect("located");
        let mut end = start + 1;
        while end < located.len() {
            let candidate = pings[located[end]].cleaned_point().expect("located");
            if haversine_distance(&first, &candidate) > config.max_dist_bw_consecutive_pings {
                break;
            }
            end += 1;
        }

        let members: Vec<usize> = located[start..end].to_vec();
        let span_seconds = (pings[*members.last().expect("non-empty")].timestamp
            - pings[members[0]].timestamp)
            / 1000;

        if members.len() >= config.min_size && span_seconds >= config.min_staying_time as i64 {
            groups.push(members);
            start = end;
        } else {
            start += 1;
        }
    }

    groups
}

/// Pass 2: merge candidate events whose medoids are near-coincident.
///
/// Returns `(sequence_number, member positions)` ordered by earliest
/// member ping; membership within an event is kept time-sorted.
fn merge_events(
    trace: &CleanTrace,
    candidates: Vec<Vec<usize>>,
    merge_threshold_degrees: f64,
) -> Vec<(u32, Vec<usize>)> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let pings = trace.pings();
    let medoids: Vec<MedoidPoint> = candidates
        .iter()
        .enumerate()
        .map(|(event, members)| {
            let points: Vec<GpsPoint> = members
                .iter()
                .map(|&i| pings[i].cleaned_point().expect("located"))
                .collect();
            let m = points[select_medoid(&points)];
            MedoidPoint {
                event,
                lat: m.latitude,
                lng: m.longitude,
            }
        })
        .collect();

    let rtree = RTree::bulk_load(medoids.clone());
    let mut uf: UnionFind<usize> = UnionFind::new();
    let threshold_2 = merge_threshold_degrees * merge_threshold_degrees;

    for medoid in &medoids {
        uf.make_set(medoid.event);
        for neighbor in rtree.locate_within_distance([medoid.lat, medoid.lng], threshold_2) {
            uf.union(&medoid.event, &neighbor.event);
        }
    }

    let mut merged: Vec<Vec<usize>> = uf
        .groups()
        .into_values()
        .map(|events| {
            let mut members: Vec<usize> = events
                .iter()
                .flat_map(|&e| candidates[e].iter().copied())
                .collect();
            members.sort_unstable();
            members
        })
        .collect();

    // Number components by earliest member ping
    merged.sort_by_key(|members| members[0]);
    merged
        .into_iter()
        .enumerate()
        .map(|(i, members)| (i as u32 + 1, members))
        .collect()
}

/// Write the stop fields onto every member ping; clear them elsewhere.
fn annotate(trace: &mut CleanTrace, events: &[(u32, Vec<usize>)]) {
    let pings = trace.pings_mut();

    for ping in pings.iter_mut() {
        ping.stop_event_status = false;
        ping.representative_stop_event_latitude = None;
        ping.representative_stop_event_longitude = None;
        ping.stop_event_sequence_number = None;
        ping.cumulative_stop_event_time = None;
    }

    for (sequence, members) in events {
        let points: Vec<GpsPoint> = members
            .iter()
            .map(|&i| pings[i].cleaned_point().expect("located"))
            .collect();
        let representative = points[select_medoid(&points)];
        let first_timestamp = pings[members[0]].timestamp;

        for &i in members {
            let elapsed_ms = pings[i].timestamp - first_timestamp;
            let ping = &mut pings[i];
            ping.stop_event_status = true;
            ping.representative_stop_event_latitude = Some(representative.latitude);
            ping.representative_stop_event_longitude = Some(representative.longitude);
            ping.stop_event_sequence_number = Some(*sequence);
            ping.cumulative_stop_event_time = Some(crate::output::format_duration_ms(elapsed_ms));
        }
    }
}
