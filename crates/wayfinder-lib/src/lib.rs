//! Wayfinder library entry points.
//!
//! This crate holds the non-visual core of a walking-directions map screen:
//! resolving the user's position from a live location feed, requesting a
//! route from a directions service, and fitting a camera region around the
//! route endpoints. Presentation layers (the CLI, a GUI) drive the
//! [`NavigationController`] and read its published state instead of
//! reimplementing this behavior.
//!

#![deny(warnings)]

pub mod config;
pub mod directions;
pub mod error;
pub mod geo;
pub mod landmarks;
pub mod location;
pub mod logging;
pub mod navigation;
pub mod osrm;
pub mod panorama;
pub mod region;

pub use config::NavigationConfig;
pub use directions::{
    DirectionsRequest, DirectionsService, Route, RouteRequester, RoutingError, TransportMode,
};
pub use error::{Error, Result};
pub use geo::{GeoPoint, Region, Span};
pub use landmarks::{find_landmark, Landmark, LANDMARKS};
pub use location::{
    BroadcastLocationSource, FixedLocationSource, LocationError, LocationEvent, LocationProvider,
    LocationSource, LocationStream, LocationUpdate,
};
pub use navigation::{
    AbortReason, DirectionsOutcome, NavigationController, NavigationSnapshot, OperationPhase,
    PanoramaOutcome, RequestToken,
};
pub use osrm::OsrmDirections;
pub use panorama::{NoPanorama, PanoramaError, PanoramaScene, PanoramaService};
pub use region::{fit_region, validate_padding, DEFAULT_REGION_PADDING};
