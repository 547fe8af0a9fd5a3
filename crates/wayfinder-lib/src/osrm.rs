//! [`DirectionsService`] backed by an OSRM-compatible HTTP routing server.
//!
//! Requests use the `route` service with full GeoJSON geometry:
//!
//! ```text
//! GET {base}/route/v1/{profile}/{lon},{lat};{lon},{lat}?overview=full&geometries=geojson
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::directions::{DirectionsRequest, DirectionsService, Route, RoutingError};
use crate::geo::GeoPoint;

/// Public OSRM demo server.
pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest response body read from the server.
pub const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

/// HTTP client for an OSRM routing server.
#[derive(Debug, Clone)]
pub struct OsrmDirections {
    client: Client,
    base_url: String,
}

impl OsrmDirections {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RoutingError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent())
            .build()
            .map_err(network_error)?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing `reqwest` client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the route URL for `request`.
    pub fn route_url(&self, request: &DirectionsRequest) -> String {
        format!(
            "{base}/route/v1/{profile}/{from_lon},{from_lat};{to_lon},{to_lat}?overview=full&geometries=geojson",
            base = self.base_url,
            profile = request.transport_mode.osrm_profile(),
            from_lon = request.origin.longitude,
            from_lat = request.origin.latitude,
            to_lon = request.destination.longitude,
            to_lat = request.destination.latitude,
        )
    }
}

#[async_trait]
impl DirectionsService for OsrmDirections {
    async fn calculate(&self, request: &DirectionsRequest) -> Result<Vec<Route>, RoutingError> {
        let url = self.route_url(request);
        debug!(%url, "querying OSRM");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(network_error)?;

        // OSRM reports NoRoute and InvalidQuery with 4xx statuses but a JSON
        // body, so the body is parsed before looking at the status.
        let status = response.status();
        let body = read_body(response).await?;
        match parse_route_response(&body, request) {
            Err(RoutingError::Network { message }) if !status.is_success() => {
                warn!(%status, %message, "OSRM request failed");
                Err(RoutingError::Network {
                    message: format!("HTTP {status}: {message}"),
                })
            }
            other => other,
        }
    }
}

/// Read the response body, giving up once it exceeds [`MAX_RESPONSE_BYTES`].
async fn read_body(mut response: reqwest::Response) -> Result<String, RoutingError> {
    if let Some(declared) = response.content_length() {
        ensure_body_size(usize::try_from(declared).unwrap_or(usize::MAX))?;
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(network_error)? {
        ensure_body_size(body.len().saturating_add(chunk.len()))?;
        body.extend_from_slice(&chunk);
    }

    String::from_utf8(body).map_err(|err| RoutingError::Network {
        message: format!("OSRM response is not UTF-8: {err}"),
    })
}

fn ensure_body_size(len: usize) -> Result<(), RoutingError> {
    if len > MAX_RESPONSE_BYTES {
        return Err(RoutingError::Network {
            message: format!(
                "OSRM response exceeds {MAX_RESPONSE_BYTES} bytes (got at least {len})"
            ),
        });
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
struct RouteEntry {
    distance: f64,
    duration: f64,
    geometry: LineString,
}

#[derive(Debug, Deserialize)]
struct LineString {
    coordinates: Vec<[f64; 2]>,
}

/// Decode an OSRM `route` response body into routes for `request`.
pub fn parse_route_response(
    body: &str,
    request: &DirectionsRequest,
) -> Result<Vec<Route>, RoutingError> {
    let response: RouteResponse = serde_json::from_str(body).map_err(|err| RoutingError::Network {
        message: format!("malformed OSRM response: {err}"),
    })?;

    let detail = || response.message.clone().unwrap_or_else(|| response.code.clone());
    match response.code.as_str() {
        "Ok" => {}
        "NoRoute" | "NoSegment" => return Err(RoutingError::NoRoute),
        "InvalidUrl" | "InvalidService" | "InvalidVersion" | "InvalidOptions"
        | "InvalidQuery" | "InvalidValue" => {
            return Err(RoutingError::InvalidRequest { message: detail() })
        }
        _ => return Err(RoutingError::Network { message: detail() }),
    }

    response
        .routes
        .into_iter()
        .map(|entry| {
            let path = entry
                .geometry
                .coordinates
                .into_iter()
                .map(|[longitude, latitude]| GeoPoint::new(latitude, longitude))
                .collect::<crate::Result<Vec<_>>>()
                .map_err(|err| RoutingError::Network {
                    message: format!("OSRM returned an invalid vertex: {err}"),
                })?;
            let expected_travel_time = Duration::try_from_secs_f64(entry.duration.max(0.0))
                .map_err(|err| RoutingError::Network {
                    message: format!("OSRM returned an invalid duration {}: {err}", entry.duration),
                })?;
            Ok(Route {
                path,
                distance_m: entry.distance,
                expected_travel_time,
                transport_mode: request.transport_mode,
            })
        })
        .collect()
}

fn network_error(err: reqwest::Error) -> RoutingError {
    RoutingError::Network {
        message: err.to_string(),
    }
}

fn user_agent() -> String {
    format!("wayfinder-lib/{version}", version = env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directions::TransportMode;

    fn request() -> DirectionsRequest {
        DirectionsRequest {
            origin: GeoPoint::new(-31.970839, 115.817337).unwrap(),
            destination: GeoPoint::new(-31.956956, 115.855986).unwrap(),
            transport_mode: TransportMode::Walking,
        }
    }

    #[test]
    fn route_url_orders_longitude_first() {
        let client = OsrmDirections::with_client(Client::new(), "http://localhost:5000/");
        assert_eq!(
            client.route_url(&request()),
            "http://localhost:5000/route/v1/foot/115.817337,-31.970839;115.855986,-31.956956?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn parses_routes_in_order() {
        let body = r#"{
            "code": "Ok",
            "routes": [
                {
                    "distance": 4210.5,
                    "duration": 3031.2,
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[115.817337, -31.970839], [115.83, -31.965], [115.855986, -31.956956]]
                    }
                },
                {
                    "distance": 5000.0,
                    "duration": 3600.0,
                    "geometry": {"type": "LineString", "coordinates": []}
                }
            ],
            "waypoints": []
        }"#;

        let routes = parse_route_response(body, &request()).expect("parse");
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].path.len(), 3);
        assert_eq!(routes[0].path[1].latitude, -31.965);
        assert_eq!(routes[0].path[1].longitude, 115.83);
        assert_eq!(routes[0].distance_m, 4210.5);
        assert_eq!(routes[0].expected_travel_time.as_secs(), 3031);
        assert_eq!(routes[0].transport_mode, TransportMode::Walking);
    }

    #[test]
    fn no_route_code_maps_to_no_route() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        assert_eq!(
            parse_route_response(body, &request()),
            Err(RoutingError::NoRoute)
        );
    }

    #[test]
    fn invalid_query_maps_to_invalid_request() {
        let body = r#"{"code": "InvalidQuery", "message": "Query string malformed close to position 28"}"#;
        match parse_route_response(body, &request()) {
            Err(RoutingError::InvalidRequest { message }) => {
                assert!(message.contains("malformed"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unknown_code_maps_to_network_error() {
        let body = r#"{"code": "TooBig"}"#;
        assert_eq!(
            parse_route_response(body, &request()),
            Err(RoutingError::Network {
                message: "TooBig".to_string()
            })
        );
    }

    #[test]
    fn garbage_body_maps_to_network_error() {
        let err = parse_route_response("<html>bad gateway</html>", &request()).unwrap_err();
        assert!(matches!(err, RoutingError::Network { .. }));
    }

    #[test]
    fn oversized_duration_is_a_network_error() {
        let body = r#"{"code": "Ok", "routes": [{"distance": 1.0, "duration": 1e20,
            "geometry": {"coordinates": [[115.817337, -31.970839]]}}]}"#;
        match parse_route_response(body, &request()) {
            Err(RoutingError::Network { message }) => {
                assert!(message.contains("invalid duration"), "{message}");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn body_size_is_capped() {
        assert!(ensure_body_size(0).is_ok());
        assert!(ensure_body_size(MAX_RESPONSE_BYTES).is_ok());
        assert!(matches!(
            ensure_body_size(MAX_RESPONSE_BYTES + 1),
            Err(RoutingError::Network { .. })
        ));
    }

    #[test]
    fn out_of_range_vertex_is_rejected() {
        let body = r#"{"code": "Ok", "routes": [{"distance": 1.0, "duration": 1.0,
            "geometry": {"coordinates": [[0.0, 95.0]]}}]}"#;
        assert!(matches!(
            parse_route_response(body, &request()),
            Err(RoutingError::Network { .. })
        ));
    }
}
