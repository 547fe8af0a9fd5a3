use thiserror::Error;

use crate::directions::RoutingError;
use crate::location::LocationError;
use crate::panorama::PanoramaError;

/// Convenient result alias for the Wayfinder library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// Raised when a region is requested for zero points.
    #[error("cannot fit a region around an empty set of points")]
    EmptyInput,

    /// Raised when region padding is negative or not a finite number.
    #[error("region padding must be a finite, non-negative number of degrees (got {padding})")]
    InvalidPadding { padding: f64 },

    /// Raised when a coordinate falls outside the valid latitude/longitude range.
    #[error("invalid coordinate ({latitude}, {longitude}); latitude must be within [-90, 90] and longitude within [-180, 180]")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Raised when a landmark name could not be found in the catalog.
    #[error("unknown landmark: {name}{}", format_suggestions(.suggestions))]
    UnknownLandmark {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a configuration value could not be parsed or is out of range.
    #[error("invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    /// Location resolution failed.
    #[error(transparent)]
    Location(#[from] LocationError),

    /// The directions service rejected or failed the request.
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// The panorama service failed.
    #[error(transparent)]
    Panorama(#[from] PanoramaError),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
