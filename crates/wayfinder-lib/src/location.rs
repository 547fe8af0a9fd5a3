//! Single-shot resolution of the user's position from a live location feed.
//!
//! A [`LocationSource`] hands out independent subscriptions to a stream of
//! position-or-error events. [`LocationProvider::resolve_once`] waits for the
//! first event carrying a usable coordinate and then drops its subscription,
//! on success, failure and timeout alike.

use std::sync::Arc;
use std::time::Duration;

use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, trace, warn};

use crate::geo::GeoPoint;

/// Buffered events per subscriber before a slow subscriber starts lagging.
const DEFAULT_FEED_CAPACITY: usize = 16;

/// Failure to obtain the current position.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    /// No usable update arrived before the deadline.
    #[error("no usable location update within {timeout:?}")]
    Timeout { timeout: Duration },

    /// The feed reported an error or ended without a usable update.
    #[error("location unavailable: {reason}")]
    Unavailable { reason: String },
}

impl LocationError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        LocationError::Unavailable {
            reason: reason.into(),
        }
    }
}

/// One event from a live location feed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocationUpdate {
    /// Reported position; absent for updates such as authorization changes.
    pub coordinate: Option<GeoPoint>,
    /// Horizontal accuracy radius in metres, when the source reports one.
    pub horizontal_accuracy_m: Option<f64>,
}

impl LocationUpdate {
    /// An update carrying a position fix.
    pub fn at(coordinate: GeoPoint) -> Self {
        Self {
            coordinate: Some(coordinate),
            horizontal_accuracy_m: None,
        }
    }

    /// An update with no position fix.
    pub fn without_fix() -> Self {
        Self::default()
    }

    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.horizontal_accuracy_m = Some(meters);
        self
    }

    /// The coordinate, if it is valid and accurate enough.
    ///
    /// A negative or NaN accuracy marks the fix itself as invalid. With
    /// `max_accuracy_m` set, fixes reporting a larger radius are rejected;
    /// fixes that report no accuracy are accepted.
    fn usable_coordinate(&self, max_accuracy_m: Option<f64>) -> Option<GeoPoint> {
        if let Some(accuracy) = self.horizontal_accuracy_m {
            if accuracy.is_nan() || accuracy < 0.0 {
                return None;
            }
            if max_accuracy_m.is_some_and(|max| accuracy > max) {
                return None;
            }
        }
        self.coordinate.filter(GeoPoint::is_valid)
    }
}

/// Item yielded by a location subscription.
pub type LocationEvent = std::result::Result<LocationUpdate, LocationError>;

/// A live subscription. Dropping it unsubscribes.
pub type LocationStream = BoxStream<'static, LocationEvent>;

/// Provider of live location feeds.
pub trait LocationSource: Send + Sync {
    /// Open a new, independent subscription.
    fn subscribe(&self) -> LocationStream;
}

/// Resolves the current position from a [`LocationSource`].
#[derive(Clone)]
pub struct LocationProvider {
    source: Arc<dyn LocationSource>,
    max_accuracy_m: Option<f64>,
}

impl LocationProvider {
    pub fn new(source: Arc<dyn LocationSource>) -> Self {
        Self {
            source,
            max_accuracy_m: None,
        }
    }

    /// Skip fixes whose reported accuracy radius exceeds `meters`.
    pub fn with_max_accuracy(mut self, meters: Option<f64>) -> Self {
        self.max_accuracy_m = meters;
        self
    }

    /// Wait for the first usable position, giving up after `timeout`.
    ///
    /// Updates without a valid coordinate are skipped. An error event or the
    /// end of the stream resolves to [`LocationError::Unavailable`].
    pub async fn resolve_once(&self, timeout: Duration) -> Result<GeoPoint, LocationError> {
        let mut updates = self.source.subscribe();
        debug!(?timeout, "subscribed to location updates");

        let first_fix = async {
            while let Some(event) = updates.next().await {
                let update = match event {
                    Ok(update) => update,
                    Err(error) => return Err(error),
                };
                match update.usable_coordinate(self.max_accuracy_m) {
                    Some(coordinate) => return Ok(coordinate),
                    None => trace!(
                        accuracy_m = update.horizontal_accuracy_m,
                        "skipping location update without a usable coordinate"
                    ),
                }
            }
            Err(LocationError::unavailable(
                "location feed ended before a position fix",
            ))
        };

        let result = match tokio::time::timeout(timeout, first_fix).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout { timeout }),
        };

        drop(updates);
        match &result {
            Ok(position) => debug!(%position, "resolved current position"),
            Err(error) => debug!(%error, "location resolution failed"),
        }
        result
    }
}

impl std::fmt::Debug for LocationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationProvider")
            .field("max_accuracy_m", &self.max_accuracy_m)
            .finish_non_exhaustive()
    }
}

/// Live location feed fanned out to every subscriber.
///
/// Subscribers only observe events published after they subscribed.
#[derive(Debug, Clone)]
pub struct BroadcastLocationSource {
    sender: broadcast::Sender<LocationEvent>,
}

impl Default for BroadcastLocationSource {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }
}

impl BroadcastLocationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an update, returning how many subscribers received it.
    pub fn publish(&self, update: LocationUpdate) -> usize {
        self.sender.send(Ok(update)).unwrap_or(0)
    }

    /// Publish a feed error, returning how many subscribers received it.
    pub fn publish_error(&self, reason: impl Into<String>) -> usize {
        self.sender
            .send(Err(LocationError::unavailable(reason)))
            .unwrap_or(0)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl LocationSource for BroadcastLocationSource {
    fn subscribe(&self) -> LocationStream {
        BroadcastStream::new(self.sender.subscribe())
            .filter_map(|item| {
                future::ready(match item {
                    Ok(event) => Some(event),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(skipped, "location subscriber lagged behind the feed");
                        None
                    }
                })
            })
            .boxed()
    }
}

/// Source reporting one fixed position, or none at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocationSource {
    position: Option<GeoPoint>,
}

impl FixedLocationSource {
    pub fn new(position: GeoPoint) -> Self {
        Self {
            position: Some(position),
        }
    }

    /// A source whose every subscription fails with `Unavailable`.
    pub fn unavailable() -> Self {
        Self { position: None }
    }
}

impl LocationSource for FixedLocationSource {
    fn subscribe(&self) -> LocationStream {
        let event = match self.position {
            Some(position) => Ok(LocationUpdate::at(position)),
            None => Err(LocationError::unavailable("no position has been configured")),
        };
        stream::iter([event]).boxed()
    }
}
