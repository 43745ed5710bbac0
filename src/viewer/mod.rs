//! Product viewers.
//!
//! A [`ViewerController`] binds one viewer element of the page to a 3D scene: it loads
//! the product model, shares one physically-based material between the configured
//! objects, and swaps appearances, lights and camera views as the user clicks the
//! option controls of the page.

pub use self::config::{
    CameraConfig, EnvLight, EnvironmentConfig, LightPreset, MaterialParams, Primitive,
    Selectors, ViewerConfig,
};
pub use self::controller::{ViewerController, SCREENSHOT_FILE};
pub use self::loading::{LoadingIndicator, LOADING_CLASS};
pub use self::options::{
    effective_repeat, ColorOption, LightOption, SceneOption, TextureOption, ViewerOptions,
    ACTIVE_CLASS, VISIBLE_CLASS,
};
pub use self::state::ViewerState;

mod config;
mod controller;
mod loading;
mod options;
mod state;
