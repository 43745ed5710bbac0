//! Error types shared by the asset, configuration and viewer layers.

use std::time::Duration;

/// Failure of an asynchronous asset request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    /// The transport failed or the server answered with a non-success status.
    #[error("network error: {0}")]
    Network(String),
    /// The bytes arrived but could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
    /// Nothing exists at the requested location.
    #[error("asset not found: {0}")]
    NotFound(String),
    /// The request did not complete before its deadline.
    #[error("request for {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },
    /// The request was abandoned by its owner.
    #[error("request cancelled")]
    Cancelled,
}

impl AssetError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AssetError::Network(_) | AssetError::Timeout { .. })
    }
}

/// Invalid or incomplete configuration, either from JSON or from markup attributes.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("element `{element}` lacks required attribute `{attribute}`")]
    MissingAttribute { element: String, attribute: String },
    #[error("unknown appearance set `{0}`")]
    UnknownAppearanceSet(String),
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    #[error("invalid {name} bounds [{min}, {max}]")]
    InvalidBounds {
        name: &'static str,
        min: f32,
        max: f32,
    },
    #[error("invalid trigger position `{0}`")]
    InvalidTriggerPosition(String),
    #[error("unknown ease `{0}`")]
    UnknownEase(String),
}

/// Errors surfaced by a viewer controller.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The operation needs the model to be loaded first.
    #[error("the viewer is not ready")]
    NotReady,
}

/// Failure to set up or drive the GPU canvas.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("event loop: {0}")]
    EventLoop(String),
    #[error("window creation: {0}")]
    Window(String),
    #[error("surface: {0}")]
    Surface(String),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),
    #[error("device request: {0}")]
    Device(String),
    /// Reading the rendered frame back failed.
    #[error("frame readback: {0}")]
    Readback(String),
}

/// Result alias used by the viewer layer.
pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
