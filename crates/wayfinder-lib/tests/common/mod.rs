//! Common test utilities: scripted location feeds, directions services and
//! panorama services whose completion the test controls.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::oneshot;

use wayfinder_lib::{
    DirectionsRequest, DirectionsService, GeoPoint, LocationError, LocationEvent, LocationSource,
    LocationStream, NavigationConfig, PanoramaError, PanoramaScene, PanoramaService, Route,
    RoutingError,
};

/// Behaviour of one location subscription.
#[allow(dead_code)]
pub enum Feed {
    /// Yields whatever the test sends through the gate, then ends.
    Gate(oneshot::Receiver<LocationEvent>),
    /// Yields the events in order, then ends.
    Events(Vec<LocationEvent>),
    /// Never yields.
    Silent,
}

/// Location source handing out one scripted [`Feed`] per subscription.
///
/// Subscriptions beyond the script are silent.
#[derive(Default)]
pub struct ScriptedLocationSource {
    feeds: Mutex<VecDeque<Feed>>,
    opened: AtomicUsize,
    live: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl ScriptedLocationSource {
    pub fn new(feeds: Vec<Feed>) -> Self {
        Self {
            feeds: Mutex::new(feeds.into()),
            ..Self::default()
        }
    }

    /// Source whose every subscription immediately reports `position`.
    pub fn always(position: GeoPoint) -> Self {
        let feeds = (0..64)
            .map(|_| Feed::Events(vec![Ok(wayfinder_lib::LocationUpdate::at(position))]))
            .collect();
        Self::new(feeds)
    }

    /// Subscriptions opened so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Subscriptions not yet dropped.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl LocationSource for ScriptedLocationSource {
    fn subscribe(&self) -> LocationStream {
        let feed = self
            .feeds
            .lock()
            .expect("feeds lock")
            .pop_front()
            .unwrap_or(Feed::Silent);
        self.opened.fetch_add(1, Ordering::SeqCst);

        let inner: LocationStream = match feed {
            Feed::Gate(gate) => stream::once(async move {
                gate.await
                    .unwrap_or_else(|_| Err(LocationError::unavailable("gate dropped")))
            })
            .boxed(),
            Feed::Events(events) => stream::iter(events).boxed(),
            Feed::Silent => stream::pending::<LocationEvent>().boxed(),
        };

        Tracked {
            inner,
            _guard: LiveGuard::new(self.live.clone()),
        }
        .boxed()
    }
}

struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct Tracked {
    inner: LocationStream,
    _guard: LiveGuard,
}

impl Stream for Tracked {
    type Item = LocationEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

/// Scripted reply of a directions call.
#[allow(dead_code)]
pub enum Reply {
    Ready(Result<Vec<Route>, RoutingError>),
    Gate(oneshot::Receiver<Result<Vec<Route>, RoutingError>>),
}

/// Directions service replaying scripted replies; once the script runs out it
/// answers with a straight line between the endpoints.
#[derive(Default)]
pub struct ScriptedDirections {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<DirectionsRequest>>,
}

#[allow(dead_code)]
impl ScriptedDirections {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn straight_line() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().expect("replies lock").push_back(reply);
    }

    pub fn calls(&self) -> Vec<DirectionsRequest> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl DirectionsService for ScriptedDirections {
    async fn calculate(&self, request: &DirectionsRequest) -> Result<Vec<Route>, RoutingError> {
        self.calls.lock().expect("calls lock").push(*request);
        let reply = self.replies.lock().expect("replies lock").pop_front();
        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Gate(gate)) => gate.await.unwrap_or_else(|_| {
                Err(RoutingError::Network {
                    message: "gate dropped".to_string(),
                })
            }),
            None => Ok(vec![straight_route(request.origin, request.destination)]),
        }
    }
}

/// Result of one panorama lookup.
pub type SceneResult = Result<Option<PanoramaScene>, PanoramaError>;

/// Panorama service whose lookups each wait on the next scripted gate.
///
/// Lookups beyond the script find no imagery.
#[derive(Default)]
pub struct GatedPanorama {
    gates: Mutex<VecDeque<oneshot::Receiver<SceneResult>>>,
    started: AtomicUsize,
}

#[allow(dead_code)]
impl GatedPanorama {
    pub fn new(gates: Vec<oneshot::Receiver<SceneResult>>) -> Self {
        Self {
            gates: Mutex::new(gates.into()),
            started: AtomicUsize::new(0),
        }
    }

    /// Lookups started so far.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PanoramaService for GatedPanorama {
    async fn scene(&self, _point: GeoPoint) -> SceneResult {
        let gate = self.gates.lock().expect("gates lock").pop_front();
        self.started.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(gate) => gate
                .await
                .unwrap_or_else(|_| Err(PanoramaError::new("gate dropped"))),
            None => Ok(None),
        }
    }
}

#[allow(dead_code)]
pub fn scene(scene_id: &str, location: GeoPoint) -> PanoramaScene {
    PanoramaScene {
        scene_id: scene_id.to_string(),
        location,
    }
}

/// Two-vertex route from `origin` to `destination`.
#[allow(dead_code)]
pub fn straight_route(origin: GeoPoint, destination: GeoPoint) -> Route {
    Route {
        path: vec![origin, destination],
        distance_m: 1_000.0,
        expected_travel_time: Duration::from_secs(720),
        transport_mode: wayfinder_lib::TransportMode::Walking,
    }
}

#[allow(dead_code)]
pub fn config() -> NavigationConfig {
    NavigationConfig::default().with_location_timeout(Duration::from_secs(2))
}

/// Yield to the scheduler until `condition` holds.
#[allow(dead_code)]
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
