//! Candidate path generators consumed by fitness evaluation.

use crate::config::EvaluationConfig;
use crate::geo::{bearing, haversine_distance, offset_by_bearing, GeoPoint};
use crate::models::{Position, Trajectory};

const MAX_SAMPLES_PER_LEG: usize = 10_000;

/// Anything able to expand itself into a sampled trajectory.
///
/// Implementations must be pure: the same start always yields the same
/// positions.
pub trait Individual: Send + Sync {
    /// Generate the ordered samples of this candidate starting at `start`.
    fn generate_positions(&self, start: &Position) -> Trajectory;
}

/// Straight legs from the start through each waypoint in order.
#[derive(Debug, Clone)]
pub struct WaypointPath {
    pub waypoints: Vec<Position>,
    pub sample_spacing_m: f64,
}

impl WaypointPath {
    pub fn new(waypoints: Vec<Position>, config: &EvaluationConfig) -> Self {
        Self {
            waypoints,
            sample_spacing_m: config.sample_spacing_m,
        }
    }

    /// Ground points flown at the configured default altitude.
    pub fn level(points: impl IntoIterator<Item = GeoPoint>, config: &EvaluationConfig) -> Self {
        let waypoints = points
            .into_iter()
            .map(|p| Position::new(p.lat, p.lon, config.default_altitude_m))
            .collect();
        Self::new(waypoints, config)
    }
}

impl Individual for WaypointPath {
    fn generate_positions(&self, start: &Position) -> Trajectory {
        let spacing = if self.sample_spacing_m.is_finite() {
            self.sample_spacing_m.max(1.0)
        } else {
            1.0
        };
        let mut positions = vec![*start];
        let mut from = *start;

        for to in &self.waypoints {
            let distance_m = haversine_distance(from.latitude, from.longitude, to.latitude, to.longitude);
            let heading = bearing(from.latitude, from.longitude, to.latitude, to.longitude);
            let steps = ((distance_m / spacing).ceil() as usize).clamp(1, MAX_SAMPLES_PER_LEG);

            for i in 1..steps {
                let t = i as f64 / steps as f64;
                let (lat, lon) = offset_by_bearing(from.latitude, from.longitude, distance_m * t, heading);
                let alt = from.altitude + t * (to.altitude - from.altitude);
                positions.push(Position::new(lat, lon, alt));
            }
            positions.push(*to);
            from = *to;
        }

        positions
    }
}

/// A fixed list of samples, ignoring the start.
#[derive(Debug, Clone, Default)]
pub struct FixedPath(pub Trajectory);

impl Individual for FixedPath {
    fn generate_positions(&self, _start: &Position) -> Trajectory {
        self.0.clone()
    }
}
