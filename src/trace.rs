//! The trace container: an ordered sequence of cleaned pings.
//!
//! A [`CleanTrace`] is built once per journey from a validated payload
//! and then mutated serially by cleaning operators. It owns its ping
//! vector exclusively; the id index is rebuilt whenever interpolation
//! inserts new pings.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info};

use crate::error::Result;
use crate::{CleanedPing, TracePayload};

/// A cleanable GPS trace for a single vehicle journey.
#[derive(Debug)]
pub struct CleanTrace {
    pings: Vec<CleanedPing>,
    /// ping_id -> position in `pings`.
    index: HashMap<String, usize>,
    vehicle_type: String,
    vehicle_speed: f64,
    input_pings_count: usize,
    /// Non-fatal problems (failed OSRM batches, oversized batches)
    /// accumulated across operator runs, surfaced in the output.
    warnings: Vec<String>,
    /// Set once `map_match` has run; precondition for `interpolate`.
    map_matched: bool,
    /// Wall time per operator run, summed into the cleaning summary.
    timings: Vec<(&'static str, Duration)>,
}

impl CleanTrace {
    /// Validate a payload and build the trace, with cleaned locations
    /// initialised to the raw locations.
    pub fn new(payload: TracePayload) -> Result<Self> {
        let vehicle_type = payload.vehicle_type.clone();
        let vehicle_speed = payload.vehicle_speed;

        let raw = payload.into_raw_pings()?;
        let pings: Vec<CleanedPing> = raw.iter().map(CleanedPing::from_raw).collect();
        let index = build_index(&pings);
        let input_pings_count = pings.len();

        info!(
            "built clean trace with {} pings (vehicle_type={})",
            input_pings_count, vehicle_type
        );

        Ok(Self {
            pings,
            index,
            vehicle_type,
            vehicle_speed,
            input_pings_count,
            warnings: Vec::new(),
            map_matched: false,
            timings: Vec::new(),
        })
    }

    /// All pings in time order.
    pub fn pings(&self) -> &[CleanedPing] {
        &self.pings
    }

    /// Mutable access for operators. Insertions must go through
    /// [`CleanTrace::replace_pings`] so the id index stays coherent.
    pub(crate) fn pings_mut(&mut self) -> &mut [CleanedPing] {
        &mut self.pings
    }

    /// Swap in a rebuilt ping sequence (after interpolation) and
    /// reindex.
    pub(crate) fn replace_pings(&mut self, pings: Vec<CleanedPing>) {
        self.index = build_index(&pings);
        self.pings = pings;
    }

    /// Number of pings in the original input (interpolation excluded).
    pub fn input_pings_count(&self) -> usize {
        self.input_pings_count
    }

    /// Current number of pings, including interpolated ones.
    pub fn len(&self) -> usize {
        self.pings.len()
    }

    /// Whether the trace holds no pings. Construction rejects empty
    /// payloads, so this is only reachable through type misuse.
    pub fn is_empty(&self) -> bool {
        self.pings.is_empty()
    }

    /// Position of a ping by id.
    pub fn position_of(&self, ping_id: &str) -> Option<usize> {
        self.index.get(ping_id).copied()
    }

    /// Look up a ping by id.
    pub fn get(&self, ping_id: &str) -> Option<&CleanedPing> {
        self.position_of(ping_id).map(|i| &self.pings[i])
    }

    /// Vehicle type echoed into the output; never used in computation.
    pub fn vehicle_type(&self) -> &str {
        &self.vehicle_type
    }

    /// Vehicle speed in km/h echoed into the output.
    pub fn vehicle_speed(&self) -> f64 {
        self.vehicle_speed
    }

    /// Warnings accumulated by operators so far.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn push_warning(&mut self, warning: String) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Whether the map-matching operator has been applied.
    pub fn is_map_matched(&self) -> bool {
        self.map_matched
    }

    pub(crate) fn set_map_matched(&mut self) {
        self.map_matched = true;
    }

    pub(crate) fn record_timing(&mut self, operator: &'static str, elapsed: Duration) {
        debug!("{operator} took {:.3}s", elapsed.as_secs_f64());
        self.timings.push((operator, elapsed));
    }

    /// Total wall time spent in operators, in seconds.
    pub fn total_execution_time(&self) -> f64 {
        self.timings.iter().map(|(_, d)| d.as_secs_f64()).sum()
    }
}

fn build_index(pings: &[CleanedPing]) -> HashMap<String, usize> {
    pings
        .iter()
        .enumerate()
        .map(|(i, p)| (p.ping_id.clone(), i))
        .collect()
}
