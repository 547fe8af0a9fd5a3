//! Street-level "look around" imagery lookups.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::geo::GeoPoint;

/// Failure reported by a [`PanoramaService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("panorama lookup failed: {message}")]
pub struct PanoramaError {
    pub message: String,
}

impl PanoramaError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Handle to a street-level scene the presentation layer can open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanoramaScene {
    /// Opaque identifier understood by the viewer.
    pub scene_id: String,
    /// Where the imagery was captured, which may differ from the requested point.
    pub location: GeoPoint,
}

/// External provider of look-around scenes.
#[async_trait]
pub trait PanoramaService: Send + Sync {
    /// Find a scene near `point`; `Ok(None)` when no imagery exists there.
    async fn scene(&self, point: GeoPoint) -> Result<Option<PanoramaScene>, PanoramaError>;
}

/// Service used when no imagery provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPanorama;

#[async_trait]
impl PanoramaService for NoPanorama {
    async fn scene(&self, _point: GeoPoint) -> Result<Option<PanoramaScene>, PanoramaError> {
        Ok(None)
    }
}
