use crate::event::WindowEvent;
use glamx::{Mat4, Pose3, Vec3};

/// A viewpoint driven by window input.
///
/// The viewer feeds it the window events, ticks it once per frame, and hands the view and
/// projection to the material when drawing.
pub trait Camera3d {
    /// Reacts to mouse, keyboard and framebuffer resize events.
    fn handle_event(&mut self, event: &WindowEvent);

    /// The camera position, in world space.
    fn eye(&self) -> Vec3;

    /// World space to camera space.
    fn view_transform(&self) -> Pose3;

    /// Advances pending motion by `dt` seconds.
    ///
    /// Returns `true` if the viewpoint moved and the frame must be redrawn.
    fn update(&mut self, dt: f32) -> bool;

    /// The view transformation and the projection matrix, with depth in [0, 1].
    fn view_transform_pair(&self) -> (Pose3, Mat4);
}
