//! Geodesy helpers and polygon geometry for task scoring.

use crate::models::Position;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// A 2D geographic point. `lon` is the x axis, `lat` the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Displacement in a local East-North-Up frame, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl Enu {
    pub fn length(&self) -> f64 {
        (self.east * self.east + self.north * self.north + self.up * self.up).sqrt()
    }
}

// ==== ENU (East-North-Up) Coordinate Conversion ====

fn geodetic_to_ecef(lat_deg: f64, lon_deg: f64, alt_m: f64) -> (f64, f64, f64) {
    let phi = lat_deg.to_radians();
    let lambda = lon_deg.to_radians();
    let sin_phi = phi.sin();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_phi * sin_phi).sqrt();

    (
        (n + alt_m) * phi.cos() * lambda.cos(),
        (n + alt_m) * phi.cos() * lambda.sin(),
        (n * (1.0 - WGS84_E2) + alt_m) * sin_phi,
    )
}

/// Convert a geodetic point into the ENU frame anchored at `reference`.
///
/// Both points go through WGS84 ECEF; the difference is rotated into the
/// tangent plane at the reference. `Enu::length()` is a straight-line
/// distance in meters.
///
/// # Arguments
/// * `lat`, `lon`, `alt` - Point to convert (degrees, degrees, meters)
/// * `ref_lat`, `ref_lon`, `ref_alt` - Frame origin
pub fn lla_to_enu(lat: f64, lon: f64, alt: f64, ref_lat: f64, ref_lon: f64, ref_alt: f64) -> Enu {
    let (x, y, z) = geodetic_to_ecef(lat, lon, alt);
    let (rx, ry, rz) = geodetic_to_ecef(ref_lat, ref_lon, ref_alt);
    let (dx, dy, dz) = (x - rx, y - ry, z - rz);

    let phi = ref_lat.to_radians();
    let lambda = ref_lon.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_lambda, cos_lambda) = lambda.sin_cos();

    Enu {
        east: -sin_lambda * dx + cos_lambda * dy,
        north: -sin_phi * cos_lambda * dx - sin_phi * sin_lambda * dy + cos_phi * dz,
        up: cos_phi * cos_lambda * dx + cos_phi * sin_lambda * dy + sin_phi * dz,
    }
}

/// Distance in meters between two 2D points, both held at `altitude_m`.
pub fn enu_distance(a: GeoPoint, b: GeoPoint, altitude_m: f64) -> f64 {
    lla_to_enu(a.lat, a.lon, altitude_m, b.lat, b.lon, altitude_m).length()
}

/// Calculate distance between two points in meters using Haversine formula.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Total ground distance along a trajectory in meters.
pub fn path_length_m(positions: &[Position]) -> f64 {
    positions
        .windows(2)
        .map(|w| haversine_distance(w[0].latitude, w[0].longitude, w[1].latitude, w[1].longitude))
        .sum()
}

/// Calculate bearing from point 1 to point 2 in radians.
/// Returns bearing in radians, 0 = north, π/2 = east.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Offset a position by distance and bearing.
///
/// # Returns
/// (new_lat, new_lon) in degrees
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_rad: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_ad, cos_ad) = angular_distance.sin_cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

// ==== Polygons ====

/// Ordered ring of geographic vertices bounding a task area.
///
/// The ring may be stored open or closed; containment treats the last
/// vertex as connected to the first either way.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoPolygon {
    vertices: Vec<GeoPoint>,
}

impl GeoPolygon {
    pub fn new(vertices: Vec<GeoPoint>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Even-odd (ray casting) containment test.
    pub fn contains(&self, point: GeoPoint) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];

            if ((vi.lat > point.lat) != (vj.lat > point.lat))
                && (point.lon < (vj.lon - vi.lon) * (point.lat - vi.lat) / (vj.lat - vi.lat) + vi.lon)
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }

    /// Centre of the axis-aligned bounding box, or `None` when empty.
    pub fn bounding_center(&self) -> Option<GeoPoint> {
        let first = self.vertices.first()?;
        let (mut min_lon, mut max_lon) = (first.lon, first.lon);
        let (mut min_lat, mut max_lat) = (first.lat, first.lat);
        for v in &self.vertices[1..] {
            min_lon = min_lon.min(v.lon);
            max_lon = max_lon.max(v.lon);
            min_lat = min_lat.min(v.lat);
            max_lat = max_lat.max(v.lat);
        }
        Some(GeoPoint::new(
            (min_lon + max_lon) / 2.0,
            (min_lat + max_lat) / 2.0,
        ))
    }

    /// Shift every vertex by the given degree offsets.
    pub fn translate(&mut self, d_lon: f64, d_lat: f64) {
        for v in &mut self.vertices {
            v.lon += d_lon;
            v.lat += d_lat;
        }
    }

    /// Move one vertex. Returns false when `index` is out of range.
    pub fn set_vertex(&mut self, index: usize, point: GeoPoint) -> bool {
        match self.vertices.get_mut(index) {
            Some(v) => {
                *v = point;
                true
            }
            None => false,
        }
    }

    /// Insert a vertex before `index`; an index past the end appends.
    pub fn insert_vertex(&mut self, index: usize, point: GeoPoint) {
        let index = index.min(self.vertices.len());
        self.vertices.insert(index, point);
    }

    pub fn remove_vertex(&mut self, index: usize) -> Option<GeoPoint> {
        if index < self.vertices.len() {
            Some(self.vertices.remove(index))
        } else {
            None
        }
    }
}

impl From<Vec<GeoPoint>> for GeoPolygon {
    fn from(vertices: Vec<GeoPoint>) -> Self {
        Self::new(vertices)
    }
}
