//! Argument parsers shared by the subcommands.

use std::time::Duration;

use wayfinder_lib::GeoPoint;

/// Parse a `LAT,LON` pair in decimal degrees.
pub fn parse_point(value: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON but got '{}'", value))?;
    let latitude = parse_degrees(lat, "latitude")?;
    let longitude = parse_degrees(lon, "longitude")?;
    GeoPoint::new(latitude, longitude).map_err(|err| err.to_string())
}

fn parse_degrees(raw: &str, label: &str) -> Result<f64, String> {
    let raw = raw.trim();
    raw.parse::<f64>()
        .map_err(|err| format!("invalid {} '{}': {}", label, raw, err))
}

/// Parse a positive number of seconds.
pub fn parse_timeout(value: &str) -> Result<Duration, String> {
    let seconds = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid timeout '{}': {}", value, err))?;
    if seconds.is_nan() || seconds <= 0.0 {
        return Err(format!("timeout must be a positive number of seconds, got {}", value));
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|err| format!("timeout {} is out of range: {}", value, err))
}

/// Parse a non-negative padding in degrees.
pub fn parse_padding(value: &str) -> Result<f64, String> {
    let padding = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid padding '{}': {}", value, err))?;
    if !padding.is_finite() || padding < 0.0 {
        return Err(format!("padding must be a non-negative number of degrees, got {}", value));
    }
    Ok(padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_latitude() {
        let point = parse_point("-31.970839, 115.817337").unwrap();
        assert_eq!(point.latitude, -31.970839);
        assert_eq!(point.longitude, 115.817337);
    }

    #[test]
    fn rejects_missing_separator() {
        let err = parse_point("-31.97").unwrap_err();
        assert!(err.contains("LAT,LON"));
    }

    #[test]
    fn rejects_out_of_range() {
        let err = parse_point("95,0").unwrap_err();
        assert!(err.contains("invalid coordinate"));
    }

    #[test]
    fn rejects_garbage_longitude() {
        let err = parse_point("1,east").unwrap_err();
        assert!(err.contains("invalid longitude 'east'"));
    }

    #[test]
    fn timeout_must_be_positive() {
        assert_eq!(parse_timeout("2").unwrap(), Duration::from_secs(2));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("-1").is_err());
    }

    #[test]
    fn timeout_must_fit_a_duration() {
        assert!(parse_timeout("1e30").unwrap_err().contains("out of range"));
        assert!(parse_timeout("inf").is_err());
        assert!(parse_timeout("NaN").is_err());
    }

    #[test]
    fn padding_may_be_zero() {
        assert_eq!(parse_padding("0").unwrap(), 0.0);
        assert!(parse_padding("-0.1").is_err());
    }
}
