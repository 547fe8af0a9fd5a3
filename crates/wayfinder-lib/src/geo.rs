//! Coordinate and viewport value types.
//!
//! - [`GeoPoint`] - a latitude/longitude pair in degrees
//! - [`Span`] - latitude/longitude extents of a viewport
//! - [`Region`] - a rectangular viewport (center plus span)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Approximate length of one degree of latitude, in metres.
pub const METERS_PER_DEGREE_LATITUDE: f64 = 111_320.0;

/// Slack allowed by [`Region::contains`] to absorb floating-point rounding.
const CONTAINMENT_EPSILON: f64 = 1e-9;

/// Geographic coordinate in degrees.
///
/// Deserialization goes through [`GeoPoint::new`], so decoded points are
/// always valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = Error;

    fn try_from(raw: RawGeoPoint) -> Result<Self> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    /// Construct a validated coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let point = Self {
            latitude,
            longitude,
        };
        if point.is_valid() {
            Ok(point)
        } else {
            Err(Error::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    /// Whether both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Latitude and longitude extents of a viewport, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Rectangular viewport described by its center and span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: GeoPoint,
    pub span: Span,
}

impl Region {
    /// Build a region spanning the given distances in metres around `center`.
    ///
    /// Longitudinal metres are scaled by the cosine of the center latitude, so
    /// the region stays roughly square on the ground.
    pub fn from_meters(center: GeoPoint, latitudinal_m: f64, longitudinal_m: f64) -> Self {
        let meters_per_degree_longitude =
            METERS_PER_DEGREE_LATITUDE * center.latitude.to_radians().cos();
        let longitude_delta = if meters_per_degree_longitude > f64::EPSILON {
            longitudinal_m / meters_per_degree_longitude
        } else {
            360.0
        };

        Self {
            center,
            span: Span {
                latitude_delta: latitudinal_m / METERS_PER_DEGREE_LATITUDE,
                longitude_delta,
            },
        }
    }

    /// Southern and northern edges.
    pub fn latitude_bounds(&self) -> (f64, f64) {
        let half = self.span.latitude_delta / 2.0;
        (self.center.latitude - half, self.center.latitude + half)
    }

    /// Western and eastern edges.
    pub fn longitude_bounds(&self) -> (f64, f64) {
        let half = self.span.longitude_delta / 2.0;
        (self.center.longitude - half, self.center.longitude + half)
    }

    /// Whether `point` lies inside the rectangle `center +/- span / 2`.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        let (south, north) = self.latitude_bounds();
        let (west, east) = self.longitude_bounds();
        point.latitude >= south - CONTAINMENT_EPSILON
            && point.latitude <= north + CONTAINMENT_EPSILON
            && point.longitude >= west - CONTAINMENT_EPSILON
            && point.longitude <= east + CONTAINMENT_EPSILON
    }
}
