//! Synthetic GPS trace generator for tests and examples.
//!
//! Generates deterministic, seeded ping sequences with known structure
//! (stationary clusters, straight corridors, planted outliers) so
//! cleaning and stop detection can be validated against ground truth.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo_utils::{meters_to_degrees, METERS_PER_DEG_LAT};
use crate::{GpsPoint, PingInput};

/// Builder for synthetic ping sequences.
///
/// # Example
/// ```
/// use traceclean::synthetic::TraceBuilder;
/// use traceclean::GpsPoint;
///
/// let pings = TraceBuilder::new(GpsPoint::new(19.0, 73.0), 42)
///     .stationary_cluster(10, 3.0, 300_000)
///     .straight_corridor(10, 50.0, 10_000)
///     .build();
/// assert_eq!(pings.len(), 20);
/// ```
pub struct TraceBuilder {
    rng: StdRng,
    position: GpsPoint,
    timestamp: i64,
    pings: Vec<PingInput>,
}

impl TraceBuilder {
    /// Start a builder at an origin with a deterministic seed.
    pub fn new(origin: GpsPoint, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            position: origin,
            timestamp: 0,
            pings: Vec::new(),
        }
    }

    /// Continue from a given timestamp (milliseconds).
    pub fn starting_at(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Emit `count` pings jittered around the current position, spread
    /// evenly over `duration_ms`. Jitter is uniform within
    /// `±jitter_meters` per axis, so every ping is guaranteed to stay
    /// within `jitter_meters * sqrt(2)` of the cluster center.
    pub fn stationary_cluster(mut self, count: usize, jitter_meters: f64, duration_ms: i64) -> Self {
        let step = if count > 1 {
            duration_ms / (count as i64 - 1)
        } else {
            duration_ms
        };
        let center = self.position;

        for i in 0..count {
            let jittered = self.jitter(&center, jitter_meters);
            let timestamp = self.timestamp + step * i as i64;
            self.push(jittered, timestamp);
        }

        self.timestamp += duration_ms + 1000;
        self
    }

    /// Emit `count` pings heading due north with `spacing_meters`
    /// between consecutive pings, one every `interval_ms`.
    pub fn straight_corridor(mut self, count: usize, spacing_meters: f64, interval_ms: i64) -> Self {
        for _ in 0..count {
            self.position = GpsPoint::new(
                self.position.latitude + spacing_meters / METERS_PER_DEG_LAT,
                self.position.longitude,
            );
            let point = self.position;
            let timestamp = self.timestamp;
            self.push(point, timestamp);
            self.timestamp += interval_ms;
        }
        self
    }

    /// Emit one ping displaced `offset_meters` east of the current
    /// position: a planted outlier for imputation tests.
    pub fn outlier(mut self, offset_meters: f64, interval_ms: i64) -> Self {
        let point = GpsPoint::new(
            self.position.latitude,
            self.position.longitude + meters_to_degrees(offset_meters, self.position.latitude),
        );
        let timestamp = self.timestamp;
        self.push(point, timestamp);
        self.timestamp += interval_ms;
        self
    }

    /// Finish and return the generated pings.
    pub fn build(self) -> Vec<PingInput> {
        self.pings
    }

    fn push(&mut self, point: GpsPoint, timestamp: i64) {
        self.pings
            .push(PingInput::new(Some(point.latitude), Some(point.longitude), timestamp));
    }

    /// Uniform jitter within `±jitter_meters` per axis.
    fn jitter(&mut self, center: &GpsPoint, jitter_meters: f64) -> GpsPoint {
        if jitter_meters <= 0.0 {
            return *center;
        }

        let north: f64 = self.rng.gen_range(-jitter_meters..=jitter_meters);
        let east: f64 = self.rng.gen_range(-jitter_meters..=jitter_meters);

        GpsPoint::new(
            center.latitude + north / METERS_PER_DEG_LAT,
            center.longitude + meters_to_degrees(east, center.latitude),
        )
    }
}
