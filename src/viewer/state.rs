use crate::error::AssetError;

/// The lifecycle of a viewer.
///
/// ```text
/// Uninitialized -> LoadingAsset -> Ready <-> SwappingAppearance
///                       |
///                       +-> Failed -- retry() --> LoadingAsset
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ViewerState {
    #[default]
    Uninitialized,
    /// The model is being fetched and imported.
    LoadingAsset,
    /// The model is shown and the options respond to clicks.
    Ready,
    /// The textures of a new appearance set are loading.
    SwappingAppearance,
    /// The model could not be loaded. Only [`retry`](crate::viewer::ViewerController::retry)
    /// leaves this state.
    Failed(AssetError),
}

impl ViewerState {
    /// Whether the model is loaded.
    pub fn is_ready(&self) -> bool {
        matches!(self, ViewerState::Ready | ViewerState::SwappingAppearance)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ViewerState::Failed(_))
    }

    pub fn error(&self) -> Option<&AssetError> {
        match self {
            ViewerState::Failed(e) => Some(e),
            _ => None,
        }
    }
}
