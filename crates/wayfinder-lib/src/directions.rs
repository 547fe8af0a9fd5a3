//! Route requests against an external directions service.
//!
//! This module provides:
//! - [`TransportMode`] - how the route will be travelled
//! - [`Route`] - a path returned by the service
//! - [`DirectionsService`] - the external collaborator computing routes
//! - [`RouteRequester`] - a single, retry-free route request

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::geo::GeoPoint;

/// Supported transport modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TransportMode {
    #[default]
    Walking,
}

impl TransportMode {
    /// Routing profile name used by OSRM-compatible services.
    pub fn osrm_profile(self) -> &'static str {
        match self {
            TransportMode::Walking => "foot",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            TransportMode::Walking => "walking",
        };
        f.write_str(value)
    }
}

/// Reason the directions service could not produce a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The service found no path between the endpoints.
    #[error("no route found")]
    NoRoute,

    /// The service could not be reached or answered unexpectedly.
    #[error("directions service unavailable: {message}")]
    Network { message: String },

    /// The request was rejected as malformed.
    #[error("invalid directions request: {message}")]
    InvalidRequest { message: String },
}

/// Path computed by the directions service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Ordered vertices of the path polyline.
    pub path: Vec<GeoPoint>,
    /// Total length in metres.
    pub distance_m: f64,
    /// Expected travel time as reported by the service.
    #[serde(serialize_with = "serialize_seconds")]
    pub expected_travel_time: Duration,
    pub transport_mode: TransportMode,
}

impl Route {
    /// First vertex of the path.
    pub fn start(&self) -> Option<GeoPoint> {
        self.path.first().copied()
    }

    /// Last vertex of the path.
    pub fn end(&self) -> Option<GeoPoint> {
        self.path.last().copied()
    }
}

fn serialize_seconds<S: serde::Serializer>(
    value: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}

/// Request handed to a [`DirectionsService`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionsRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub transport_mode: TransportMode,
}

/// External service computing routes between two points.
#[async_trait]
pub trait DirectionsService: Send + Sync {
    /// Compute candidate routes, best first.
    async fn calculate(&self, request: &DirectionsRequest) -> Result<Vec<Route>, RoutingError>;
}

/// Issues exactly one directions call per request and keeps the best route.
#[derive(Clone)]
pub struct RouteRequester {
    service: Arc<dyn DirectionsService>,
}

impl RouteRequester {
    pub fn new(service: Arc<dyn DirectionsService>) -> Self {
        Self { service }
    }

    /// Request a route from `origin` to `destination`.
    ///
    /// Fails with [`RoutingError::InvalidRequest`] before calling the service
    /// when either endpoint is not a valid coordinate.
    pub async fn request_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
    ) -> Result<Route, RoutingError> {
        for (label, point) in [("origin", origin), ("destination", destination)] {
            if !point.is_valid() {
                return Err(RoutingError::InvalidRequest {
                    message: format!(
                        "{label} ({}, {}) is not a valid coordinate",
                        point.latitude, point.longitude
                    ),
                });
            }
        }

        let request = DirectionsRequest {
            origin,
            destination,
            transport_mode: mode,
        };
        debug!(%origin, %destination, %mode, "requesting directions");

        let routes = self.service.calculate(&request).await?;
        let candidates = routes.len();
        let route = routes.into_iter().next().ok_or(RoutingError::NoRoute)?;

        info!(
            candidates,
            distance_m = route.distance_m,
            travel_secs = route.expected_travel_time.as_secs(),
            vertices = route.path.len(),
            "received route"
        );
        Ok(route)
    }
}

impl fmt::Debug for RouteRequester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRequester").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingService {
        calls: AtomicUsize,
        result: Result<Vec<Route>, RoutingError>,
    }

    #[async_trait]
    impl DirectionsService for CountingService {
        async fn calculate(
            &self,
            _request: &DirectionsRequest,
        ) -> Result<Vec<Route>, RoutingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint::new(latitude, longitude).unwrap()
    }

    fn route(distance_m: f64) -> Route {
        Route {
            path: vec![point(0.0, 0.0), point(0.001, 0.001)],
            distance_m,
            expected_travel_time: Duration::from_secs(120),
            transport_mode: TransportMode::Walking,
        }
    }

    fn requester(result: Result<Vec<Route>, RoutingError>) -> (RouteRequester, Arc<CountingService>) {
        let service = Arc::new(CountingService {
            calls: AtomicUsize::new(0),
            result,
        });
        (RouteRequester::new(service.clone()), service)
    }

    #[tokio::test]
    async fn keeps_the_first_route() {
        let (requester, service) = requester(Ok(vec![route(150.0), route(300.0)]));
        let route = requester
            .request_route(point(0.0, 0.0), point(0.001, 0.001), TransportMode::Walking)
            .await
            .expect("route");
        assert_eq!(route.distance_m, 150.0);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_result_is_no_route() {
        let (requester, _) = requester(Ok(Vec::new()));
        let err = requester
            .request_route(point(0.0, 0.0), point(1.0, 1.0), TransportMode::Walking)
            .await
            .unwrap_err();
        assert_eq!(err, RoutingError::NoRoute);
    }

    #[tokio::test]
    async fn service_errors_are_not_retried() {
        let (requester, service) = requester(Err(RoutingError::Network {
            message: "connection reset".to_string(),
        }));
        let err = requester
            .request_route(point(0.0, 0.0), point(1.0, 1.0), TransportMode::Walking)
            .await
            .unwrap_err();
        assert!(matches!(err, RoutingError::Network { .. }));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_endpoints_skip_the_service() {
        let (requester, service) = requester(Ok(vec![route(1.0)]));
        let bogus = GeoPoint {
            latitude: 0.0,
            longitude: 200.0,
        };
        let err = requester
            .request_route(point(0.0, 0.0), bogus, TransportMode::Walking)
            .await
            .unwrap_err();
        assert!(matches!(err, RoutingError::InvalidRequest { .. }));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn walking_uses_foot_profile() {
        assert_eq!(TransportMode::Walking.osrm_profile(), "foot");
        assert_eq!(TransportMode::Walking.to_string(), "walking");
    }
}
