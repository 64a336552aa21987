//! Evaluation settings for path generation.

use serde::{Deserialize, Serialize};

/// Settings used when turning a waypoint genome into sampled positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Distance between generated samples along each leg, in meters
    pub sample_spacing_m: f64,
    /// Altitude given to waypoints that carry none of their own
    pub default_altitude_m: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            sample_spacing_m: 25.0,
            default_altitude_m: crate::tasks::REFERENCE_ALTITUDE_M,
        }
    }
}
