//! Enrichment, summaries and output document assembly.
//!
//! Requesting output recomputes the per-ping enrichment (time and
//! distance gaps, running cumulatives) over the current cleaned
//! sequence and assembles the cleaning, distance and stop summaries
//! into a single serializable document.

use chrono::{TimeZone, Utc};
use serde::Serialize;

use crate::geo_utils::haversine_distance;
use crate::stops::detected_events;
use crate::trace::CleanTrace;
use crate::{CleanedPing, GpsPoint, UpdateStatus};

/// Counts of what cleaning did to the trace.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningSummary {
    pub total_pings_in_input: usize,
    /// Input pings with both coordinates present.
    pub input_non_null_pings: usize,
    /// Output pings with both cleaned coordinates present.
    pub output_non_null_pings: usize,
    /// Located pings whose position cleaning never touched.
    pub unchanged: usize,
    pub dropped: usize,
    pub updated: usize,
    pub interpolated: usize,
    /// Total wall time spent in cleaning operators, in seconds.
    pub total_execution_time: f64,
}

/// Path lengths of the raw vs cleaned trace.
#[derive(Debug, Clone, Serialize)]
pub struct DistanceSummary {
    pub raw_distance_m: f64,
    pub cleaned_distance_m: f64,
    /// `raw_distance_m - cleaned_distance_m`; negative when
    /// interpolation lengthened the path.
    pub reduction_m: f64,
    /// Reduction as a percentage of the raw distance, floored at 0.
    pub reduction_pct: f64,
}

/// One detected stop event.
#[derive(Debug, Clone, Serialize)]
pub struct StopEventInfo {
    pub sequence_number: u32,
    pub representative_latitude: f64,
    pub representative_longitude: f64,
    /// Timestamp of the event's first member ping, unix milliseconds.
    pub first_timestamp: i64,
    /// Timestamp of the event's last member ping, unix milliseconds.
    pub last_timestamp: i64,
    /// First timestamp as "YYYY-MM-DD HH:MM:SS" UTC.
    pub start_time: String,
    /// Last timestamp as "YYYY-MM-DD HH:MM:SS" UTC.
    pub end_time: String,
    /// Event duration formatted as "Xm Ys".
    pub duration: String,
    pub ping_ids: Vec<String>,
}

/// The complete trace cleaning output document.
#[derive(Debug, Clone, Serialize)]
pub struct TraceOutput {
    pub cleaned_trace: Vec<CleanedPing>,
    pub cleaning_summary: CleaningSummary,
    pub distance_summary: DistanceSummary,
    pub stop_summary: Vec<StopEventInfo>,
    pub vehicle_type: String,
    pub vehicle_speed: f64,
    /// Non-fatal problems accumulated across operator runs.
    pub warnings: Vec<String>,
}

impl CleanTrace {
    /// Recompute enrichment and assemble the output document.
    pub fn build_output(&mut self) -> TraceOutput {
        enrich(self);

        let cleaning_summary = cleaning_summary(self);
        let distance_summary = distance_summary(self);
        let stop_summary = stop_summary(self);

        TraceOutput {
            cleaned_trace: self.pings().to_vec(),
            cleaning_summary,
            distance_summary,
            stop_summary,
            vehicle_type: self.vehicle_type().to_string(),
            vehicle_speed: self.vehicle_speed(),
            warnings: self.warnings().to_vec(),
        }
    }
}

/// Recompute time/distance gaps and cumulatives over the cleaned
/// sequence, ignoring dropped pings. A dropped ping carries null gaps
/// and inherits the running cumulative at the moment it was skipped.
fn enrich(trace: &mut CleanTrace) {
    let mut prev: Option<(GpsPoint, i64)> = None;
    let mut cumulative_dist = 0.0;
    let mut cumulative_time = 0i64;

    for ping in trace.pings_mut() {
        let Some(point) = ping.cleaned_point() else {
            ping.time_from_prev_ms = None;
            ping.distance_from_prev_m = None;
            ping.cumulative_time_ms = cumulative_time;
            ping.cumulative_distance_m = cumulative_dist;
            continue;
        };

        let (dist_gap, time_gap) = match prev {
            Some((prev_point, prev_ts)) => (
                haversine_distance(&prev_point, &point),
                ping.timestamp - prev_ts,
            ),
            None => (0.0, 0),
        };

        cumulative_dist += dist_gap;
        cumulative_time += time_gap;
        ping.distance_from_prev_m = Some(dist_gap);
        ping.time_from_prev_ms = Some(time_gap);
        ping.cumulative_distance_m = cumulative_dist;
        ping.cumulative_time_ms = cumulative_time;
        prev = Some((point, ping.timestamp));
    }
}

fn cleaning_summary(trace: &CleanTrace) -> CleaningSummary {
    let pings = trace.pings();

    let input_non_null_pings = pings.iter().filter(|p| p.input_point().is_some()).count();
    let output_non_null_pings = pings.iter().filter(|p| p.cleaned_point().is_some()).count();

    let mut unchanged = 0;
    let mut dropped = 0;
    let mut updated = 0;
    let mut interpolated = 0;
    for ping in pings {
        match ping.update_status {
            UpdateStatus::Unchanged if ping.cleaned_point().is_some() => unchanged += 1,
            UpdateStatus::Unchanged => {}
            UpdateStatus::Dropped => dropped += 1,
            UpdateStatus::Updated => updated += 1,
            UpdateStatus::Interpolated => interpolated += 1,
        }
    }

    CleaningSummary {
        total_pings_in_input: trace.input_pings_count(),
        input_non_null_pings,
        output_non_null_pings,
        unchanged,
        dropped,
        updated,
        interpolated,
        total_execution_time: trace.total_execution_time(),
    }
}

fn distance_summary(trace: &CleanTrace) -> DistanceSummary {
    let raw: Vec<GpsPoint> = trace.pings().iter().filter_map(|p| p.input_point()).collect();
    let cleaned: Vec<GpsPoint> = trace
        .pings()
        .iter()
        .filter_map(|p| p.cleaned_point())
        .collect();

    let raw_distance_m = crate::geo_utils::trace_distance(&raw);
    let cleaned_distance_m = crate::geo_utils::trace_distance(&cleaned);
    let reduction_m = raw_distance_m - cleaned_distance_m;
    let reduction_pct = if raw_distance_m > 0.0 && reduction_m > 0.0 {
        reduction_m / raw_distance_m * 100.0
    } else {
        0.0
    };

    DistanceSummary {
        raw_distance_m,
        cleaned_distance_m,
        reduction_m,
        reduction_pct,
    }
}

fn stop_summary(trace: &CleanTrace) -> Vec<StopEventInfo> {
    let pings = trace.pings();

    detected_events(trace)
        .into_iter()
        .map(|(sequence_number, members)| {
            let first = &pings[members[0]];
            let last = &pings[*members.last().expect("non-empty event")];

            StopEventInfo {
                sequence_number,
                representative_latitude: first
                    .representative_stop_event_latitude
                    .unwrap_or_default(),
                representative_longitude: first
                    .representative_stop_event_longitude
                    .unwrap_or_default(),
                first_timestamp: first.timestamp,
                last_timestamp: last.timestamp,
                start_time: format_timestamp_ms(first.timestamp),
                end_time: format_timestamp_ms(last.timestamp),
                duration: format_duration_ms(last.timestamp - first.timestamp),
                ping_ids: members.iter().map(|&i| pings[i].ping_id.clone()).collect(),
            }
        })
        .collect()
}

/// Format a millisecond duration as "Xm Ys".
pub(crate) fn format_duration_ms(duration_ms: i64) -> String {
    let total_seconds = duration_ms.max(0) / 1000;
    format!("{}m {}s", total_seconds / 60, total_seconds % 60)
}

/// Format unix milliseconds as "YYYY-MM-DD HH:MM:SS" UTC.
pub(crate) fn format_timestamp_ms(timestamp_ms: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => String::new(),
    }
}
