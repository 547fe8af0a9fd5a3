//! Camera region fitting.

use crate::error::{Error, Result};
use crate::geo::{GeoPoint, Region, Span};

/// Padding, in degrees, added around fitted routes.
pub const DEFAULT_REGION_PADDING: f64 = 0.005;

/// Compute the smallest region containing every point, grown by `padding`
/// degrees on each axis.
///
/// The padding is added even for a single point, so the result always has a
/// visible span. The scan is order independent. Points outside the valid
/// latitude/longitude ranges fail with [`Error::InvalidCoordinate`].
pub fn fit_region(points: &[GeoPoint], padding: f64) -> Result<Region> {
    validate_padding(padding)?;

    let (first, rest) = points.split_first().ok_or(Error::EmptyInput)?;
    if let Some(bad) = points.iter().find(|point| !point.is_valid()) {
        return Err(Error::InvalidCoordinate {
            latitude: bad.latitude,
            longitude: bad.longitude,
        });
    }

    let mut min_lat = first.latitude;
    let mut max_lat = first.latitude;
    let mut min_lon = first.longitude;
    let mut max_lon = first.longitude;

    for point in rest {
        min_lat = min_lat.min(point.latitude);
        max_lat = max_lat.max(point.latitude);
        min_lon = min_lon.min(point.longitude);
        max_lon = max_lon.max(point.longitude);
    }

    Ok(Region {
        center: GeoPoint {
            latitude: (min_lat + max_lat) / 2.0,
            longitude: (min_lon + max_lon) / 2.0,
        },
        span: Span {
            latitude_delta: max_lat - min_lat + padding,
            longitude_delta: max_lon - min_lon + padding,
        },
    })
}

/// Check that `padding` is a finite, non-negative number of degrees.
pub fn validate_padding(padding: f64) -> Result<()> {
    if !padding.is_finite() || padding < 0.0 {
        return Err(Error::InvalidPadding { padding });
    }
    Ok(())
}
