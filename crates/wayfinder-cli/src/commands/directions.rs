//! Directions command handler.
//!
//! Runs one request through [`NavigationController`] exactly as the map
//! screen would: resolve the current position, ask the routing backend for
//! a walking route, then fit the map region around both endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use wayfinder_lib::{
    find_landmark, FixedLocationSource, GeoPoint, LocationSource, NavigationConfig,
    NavigationController, OsrmDirections,
};

use crate::args::{parse_point, parse_timeout};
use crate::output::{render_directions, DirectionsReport, OutputFormat};

#[derive(Args, Debug, Clone)]
pub struct DirectionsArgs {
    /// Destination landmark name (see `wayfinder landmarks`).
    #[arg(long = "to")]
    pub to: String,

    /// Current position as LAT,LON. Without it no position is available.
    #[arg(long = "from", value_parser = parse_point, allow_hyphen_values = true)]
    pub from: Option<GeoPoint>,

    /// Seconds to wait for a position fix.
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Base URL of the OSRM routing service.
    #[arg(long = "osrm-url")]
    pub osrm_url: Option<String>,
}

pub async fn handle_directions(args: &DirectionsArgs, format: OutputFormat) -> Result<()> {
    let destination = find_landmark(&args.to)?;

    let mut config = NavigationConfig::from_env().context("invalid configuration")?;
    if let Some(timeout) = args.timeout {
        config = config.with_location_timeout(timeout);
    }
    if let Some(url) = &args.osrm_url {
        config = config.with_directions_url(url.as_str());
    }

    let location: Arc<dyn LocationSource> = match args.from {
        Some(position) => Arc::new(FixedLocationSource::new(position)),
        None => Arc::new(FixedLocationSource::unavailable()),
    };
    let directions = OsrmDirections::new(config.directions_url.as_str())
        .context("failed to create routing client")?;

    let controller = NavigationController::new(location, Arc::new(directions), config);
    let outcome = controller.request_directions(destination.coordinate).await;
    let state = controller.snapshot();

    let report = DirectionsReport::new(&destination, &outcome, &state);
    render_directions(&report, format)
}
