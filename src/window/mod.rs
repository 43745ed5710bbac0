//! The window, and things to handle the rendering loop and events.

mod canvas;
mod events;
mod rendering;
mod screenshot;
mod window;

pub use canvas::{Canvas, CanvasSetup, NumSamples};
pub use screenshot::encode_png;
pub use window::Window;
