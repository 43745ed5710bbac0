//! Camera trait with the orbit camera used by the viewers.

pub use self::camera3d::Camera3d;
pub use self::orbit3d::{OrbitBounds, OrbitCamera3d};
pub use self::view::CameraView;

mod camera3d;
mod orbit3d;
mod view;
