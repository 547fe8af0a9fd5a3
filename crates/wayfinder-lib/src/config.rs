//! Navigation settings.
//!
//! # Environment Variables
//!
//! - `WAYFINDER_LOCATION_TIMEOUT_SECS`: seconds to wait for a position fix (default: 10)
//! - `WAYFINDER_REGION_PADDING`: degrees added around fitted routes (default: 0.005)
//! - `WAYFINDER_DIRECTIONS_URL`: OSRM server base URL (default: public demo server)
//! - `WAYFINDER_MAX_LOCATION_ACCURACY_M`: skip position fixes less accurate than this
//!   many metres (default: accept any accuracy)

use std::time::Duration;

use crate::directions::TransportMode;
use crate::error::{Error, Result};
use crate::geo::Region;
use crate::landmarks::HOME;
use crate::osrm::DEFAULT_OSRM_URL;
use crate::region::DEFAULT_REGION_PADDING;

pub const LOCATION_TIMEOUT_ENV: &str = "WAYFINDER_LOCATION_TIMEOUT_SECS";
pub const REGION_PADDING_ENV: &str = "WAYFINDER_REGION_PADDING";
pub const DIRECTIONS_URL_ENV: &str = "WAYFINDER_DIRECTIONS_URL";
pub const MAX_LOCATION_ACCURACY_ENV: &str = "WAYFINDER_MAX_LOCATION_ACCURACY_M";

/// Default wait for the first usable position.
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Extent of the initial camera region around home, in metres.
const INITIAL_REGION_EXTENT_M: f64 = 1_300.0;

/// Settings shared by the navigation components.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationConfig {
    pub location_timeout: Duration,
    pub region_padding: f64,
    pub transport_mode: TransportMode,
    /// Camera region shown before any route has been committed.
    pub initial_region: Region,
    pub directions_url: String,
    /// Largest accepted horizontal accuracy radius, in metres.
    pub max_location_accuracy_m: Option<f64>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            region_padding: DEFAULT_REGION_PADDING,
            transport_mode: TransportMode::Walking,
            initial_region: Region::from_meters(
                HOME.coordinate,
                INITIAL_REGION_EXTENT_M,
                INITIAL_REGION_EXTENT_M,
            ),
            directions_url: DEFAULT_OSRM_URL.to_string(),
            max_location_accuracy_m: None,
        }
    }
}

impl NavigationConfig {
    /// Defaults overridden by any `WAYFINDER_*` variables that are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`NavigationConfig::from_env`] with an explicit variable lookup,
    /// so tests do not have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(LOCATION_TIMEOUT_ENV) {
            config.location_timeout = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|secs| *secs > 0.0)
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .ok_or_else(|| invalid(LOCATION_TIMEOUT_ENV, &raw))?;
        }

        if let Some(raw) = lookup(REGION_PADDING_ENV) {
            config.region_padding = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|padding| padding.is_finite() && *padding >= 0.0)
                .ok_or_else(|| invalid(REGION_PADDING_ENV, &raw))?;
        }

        if let Some(raw) = lookup(DIRECTIONS_URL_ENV) {
            let url = raw.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid(DIRECTIONS_URL_ENV, &raw));
            }
            config.directions_url = url.to_string();
        }

        if let Some(raw) = lookup(MAX_LOCATION_ACCURACY_ENV) {
            let meters = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|meters| meters.is_finite() && *meters > 0.0)
                .ok_or_else(|| invalid(MAX_LOCATION_ACCURACY_ENV, &raw))?;
            config.max_location_accuracy_m = Some(meters);
        }

        Ok(config)
    }

    pub fn with_location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = timeout;
        self
    }

    pub fn with_region_padding(mut self, padding: f64) -> Self {
        self.region_padding = padding;
        self
    }

    pub fn with_initial_region(mut self, region: Region) -> Self {
        self.initial_region = region;
        self
    }

    pub fn with_directions_url(mut self, url: impl Into<String>) -> Self {
        self.directions_url = url.into();
        self
    }

    pub fn with_max_location_accuracy(mut self, meters: Option<f64>) -> Self {
        self.max_location_accuracy_m = meters;
        self
    }
}

fn invalid(key: &str, value: &str) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    }
}
