//! Directions orchestration and the observable map state.
//!
//! [`NavigationController::request_directions`] runs one operation through
//!
//! ```text
//! Started -> AwaitingLocation -> AwaitingRoute -> Committed
//!    \              \                  \
//!     +--------------+------------------+--> Aborted
//! ```
//!
//! Every call issues a fresh [`RequestToken`] and makes it the active one.
//! An operation only writes state if its token is still active when it
//! commits, so the most recently started request wins no matter which
//! network round trip finishes first. Failures never escape the controller:
//! they are logged and the previous route and region stay on screen.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::NavigationConfig;
use crate::directions::{DirectionsService, Route, RouteRequester, RoutingError};
use crate::error::Error;
use crate::geo::{GeoPoint, Region};
use crate::location::{LocationError, LocationProvider, LocationSource};
use crate::panorama::{NoPanorama, PanoramaError, PanoramaScene, PanoramaService};
use crate::region::{fit_region, validate_padding};

/// Identifies one in-flight request. Tokens increase monotonically and are
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stage of a directions operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationPhase {
    Started,
    AwaitingLocation,
    AwaitingRoute,
    Committed,
    Aborted,
}

impl fmt::Display for OperationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            OperationPhase::Started => "started",
            OperationPhase::AwaitingLocation => "awaiting_location",
            OperationPhase::AwaitingRoute => "awaiting_route",
            OperationPhase::Committed => "committed",
            OperationPhase::Aborted => "aborted",
        };
        f.write_str(value)
    }
}

/// Why a directions operation stopped without committing.
#[derive(Debug, Clone, PartialEq)]
pub enum AbortReason {
    Location(LocationError),
    Routing(RoutingError),
    Region(Error),
    /// A newer request started while this one was in flight.
    Superseded,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Location(err) => write!(f, "{err}"),
            AbortReason::Routing(err) => write!(f, "{err}"),
            AbortReason::Region(err) => write!(f, "{err}"),
            AbortReason::Superseded => f.write_str("superseded by a newer request"),
        }
    }
}

/// Terminal state of one `request_directions` call.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectionsOutcome {
    Committed {
        token: RequestToken,
    },
    Aborted {
        token: RequestToken,
        /// Phase the operation was in when it stopped.
        phase: OperationPhase,
        reason: AbortReason,
    },
}

impl DirectionsOutcome {
    pub fn token(&self) -> RequestToken {
        match self {
            DirectionsOutcome::Committed { token } | DirectionsOutcome::Aborted { token, .. } => {
                *token
            }
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, DirectionsOutcome::Committed { .. })
    }

    /// Final phase: `Committed` or `Aborted`.
    pub fn phase(&self) -> OperationPhase {
        match self {
            DirectionsOutcome::Committed { .. } => OperationPhase::Committed,
            DirectionsOutcome::Aborted { .. } => OperationPhase::Aborted,
        }
    }
}

/// Result of a `show_panorama` call.
#[derive(Debug, Clone, PartialEq)]
pub enum PanoramaOutcome {
    /// The scene is now part of the published state.
    Presented(PanoramaScene),
    /// No imagery exists near the point.
    Unavailable,
    Failed(PanoramaError),
    /// A newer lookup or a dismissal happened first; nothing was written.
    Superseded,
}

/// State read by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationSnapshot {
    /// Route to draw, if any has been committed.
    pub route: Option<Route>,
    /// Camera viewport.
    pub region: Region,
    /// Look-around scene to present, if any.
    pub panorama: Option<PanoramaScene>,
}

#[derive(Debug, Default)]
struct Tokens {
    last_issued: u64,
    directions: Option<RequestToken>,
    panorama: Option<RequestToken>,
}

impl Tokens {
    fn issue(&mut self) -> RequestToken {
        self.last_issued += 1;
        RequestToken(self.last_issued)
    }
}

/// Sequences location, routing and region fitting for the map screen.
pub struct NavigationController {
    location: LocationProvider,
    routes: RouteRequester,
    panoramas: Arc<dyn PanoramaService>,
    config: NavigationConfig,
    tokens: Mutex<Tokens>,
    state: watch::Sender<NavigationSnapshot>,
}

impl NavigationController {
    /// Create a controller showing `config.initial_region` and no route.
    pub fn new(
        location_source: Arc<dyn LocationSource>,
        directions: Arc<dyn DirectionsService>,
        config: NavigationConfig,
    ) -> Self {
        let (state, _) = watch::channel(NavigationSnapshot {
            route: None,
            region: config.initial_region,
            panorama: None,
        });

        Self {
            location: LocationProvider::new(location_source)
                .with_max_accuracy(config.max_location_accuracy_m),
            routes: RouteRequester::new(directions),
            panoramas: Arc::new(NoPanorama),
            config,
            tokens: Mutex::new(Tokens::default()),
            state,
        }
    }

    /// Use `service` for look-around lookups.
    pub fn with_panorama_service(mut self, service: Arc<dyn PanoramaService>) -> Self {
        self.panoramas = service;
        self
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Receiver notified after every committed change.
    pub fn subscribe(&self) -> watch::Receiver<NavigationSnapshot> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> NavigationSnapshot {
        self.state.borrow().clone()
    }

    pub fn current_route(&self) -> Option<Route> {
        self.state.borrow().route.clone()
    }

    pub fn current_region(&self) -> Region {
        self.state.borrow().region
    }

    /// Token of the most recently started directions request.
    pub fn active_token(&self) -> Option<RequestToken> {
        self.lock_tokens().directions
    }

    /// Fetch a walking route from the current position to `destination`.
    ///
    /// Supersedes any request still in flight. Never fails: the returned
    /// outcome only reports what happened.
    pub async fn request_directions(&self, destination: GeoPoint) -> DirectionsOutcome {
        let token = {
            let mut tokens = self.lock_tokens();
            let token = tokens.issue();
            tokens.directions = Some(token);
            token
        };

        self.run_directions(token, destination)
            .instrument(info_span!("directions", %token))
            .await
    }

    async fn run_directions(&self, token: RequestToken, destination: GeoPoint) -> DirectionsOutcome {
        info!(%destination, phase = ?OperationPhase::Started, "directions requested");

        // Checked before any location or routing work is started.
        if let Err(err) = validate_padding(self.config.region_padding) {
            error!(error = %err, "refusing directions request");
            return self.abort(token, OperationPhase::Started, AbortReason::Region(err));
        }

        debug!(phase = ?OperationPhase::AwaitingLocation, "resolving current position");
        let located = self.location.resolve_once(self.config.location_timeout).await;
        if !self.is_active(token) {
            return self.abort(token, OperationPhase::AwaitingLocation, AbortReason::Superseded);
        }
        let position = match located {
            Ok(position) => position,
            Err(err) => {
                return self.abort(
                    token,
                    OperationPhase::AwaitingLocation,
                    AbortReason::Location(err),
                )
            }
        };

        debug!(phase = ?OperationPhase::AwaitingRoute, %position, "requesting route");
        let routed = self
            .routes
            .request_route(position, destination, self.config.transport_mode)
            .await;
        if !self.is_active(token) {
            return self.abort(token, OperationPhase::AwaitingRoute, AbortReason::Superseded);
        }
        let route = match routed {
            Ok(route) => route,
            Err(err) => {
                return self.abort(token, OperationPhase::AwaitingRoute, AbortReason::Routing(err))
            }
        };

        let region = match fit_region(&[position, destination], self.config.region_padding) {
            Ok(region) => region,
            Err(err) => {
                error!(error = %err, "failed to fit region around route endpoints");
                return self.abort(token, OperationPhase::AwaitingRoute, AbortReason::Region(err));
            }
        };

        if self.commit(token, route, region) {
            info!(
                phase = ?OperationPhase::Committed,
                center = %region.center,
                lat_span = region.span.latitude_delta,
                lon_span = region.span.longitude_delta,
                "route committed"
            );
            DirectionsOutcome::Committed { token }
        } else {
            self.abort(token, OperationPhase::AwaitingRoute, AbortReason::Superseded)
        }
    }

    /// Publish route and region together if `token` is still active.
    fn commit(&self, token: RequestToken, route: Route, region: Region) -> bool {
        // Held across the publish so a newer request cannot start between the
        // token check and the write.
        let tokens = self.lock_tokens();
        if tokens.directions != Some(token) {
            return false;
        }
        self.state.send_modify(|state| {
            state.route = Some(route);
            state.region = region;
        });
        true
    }

    fn abort(
        &self,
        token: RequestToken,
        phase: OperationPhase,
        reason: AbortReason,
    ) -> DirectionsOutcome {
        match &reason {
            AbortReason::Superseded => debug!(?phase, "discarding superseded directions request"),
            other => warn!(?phase, reason = %other, "directions request aborted"),
        }
        DirectionsOutcome::Aborted {
            token,
            phase,
            reason,
        }
    }

    fn is_active(&self, token: RequestToken) -> bool {
        self.lock_tokens().directions == Some(token)
    }

    /// Look up street-level imagery at `point` and present it.
    ///
    /// The published scene is replaced by the result, so a failed or empty
    /// lookup clears any scene shown before.
    pub async fn show_panorama(&self, point: GeoPoint) -> PanoramaOutcome {
        let token = {
            let mut tokens = self.lock_tokens();
            let token = tokens.issue();
            tokens.panorama = Some(token);
            token
        };
        debug!(%token, %point, "looking up panorama");

        let (scene, outcome) = match self.panoramas.scene(point).await {
            Ok(Some(scene)) => (Some(scene.clone()), PanoramaOutcome::Presented(scene)),
            Ok(None) => {
                info!(%point, "no look-around imagery at this point");
                (None, PanoramaOutcome::Unavailable)
            }
            Err(err) => {
                warn!(error = %err, %point, "cannot retrieve look-around scene");
                (None, PanoramaOutcome::Failed(err))
            }
        };

        let tokens = self.lock_tokens();
        if tokens.panorama != Some(token) {
            debug!(%token, "discarding superseded panorama lookup");
            return PanoramaOutcome::Superseded;
        }
        self.state.send_modify(|state| state.panorama = scene);
        outcome
    }

    /// Close the look-around viewer and ignore lookups still in flight.
    pub fn dismiss_panorama(&self) {
        let mut tokens = self.lock_tokens();
        tokens.panorama = None;
        self.state.send_if_modified(|state| state.panorama.take().is_some());
    }

    fn lock_tokens(&self) -> MutexGuard<'_, Tokens> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationController")
            .field("config", &self.config)
            .field("active_token", &self.active_token())
            .finish_non_exhaustive()
    }
}
