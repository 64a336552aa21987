//! Core value types shared by scoring, planning, and serialization.

use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};

/// A geographic sample along a candidate flight path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, alias = "alt")]
    pub altitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Horizontal component as a (lon, lat) point.
    pub fn lonlat(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }
}

/// Ordered samples of one candidate path. Order is travel order.
pub type Trajectory = Vec<Position>;
