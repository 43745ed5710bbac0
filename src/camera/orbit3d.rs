use crate::camera::{Camera3d, CameraView};
use crate::event::{Action, MouseButton, WindowEvent};
use glamx::{Mat4, Pose3, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

const EPS: f32 = 1.0e-6;

/// Limits applied to an [`OrbitCamera3d`] after every motion.
///
/// Angles are in radians, with the polar angle measured from the `+Y` axis and the
/// azimuth measured around `+Y` from the `+Z` axis.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrbitBounds {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    /// `(min, max)` azimuth. When `min > max` the allowed range wraps around `±π`.
    pub azimuth: Option<(f32, f32)>,
}

impl Default for OrbitBounds {
    fn default() -> Self {
        OrbitBounds {
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar: 0.0,
            max_polar: PI,
            azimuth: None,
        }
    }
}

impl OrbitBounds {
    /// Bounds on the eye-target distance only.
    pub fn distance(min: f32, max: f32) -> Self {
        OrbitBounds {
            min_distance: min,
            max_distance: max,
            ..Default::default()
        }
    }

    /// Adds bounds on the polar angle.
    pub fn with_polar(mut self, min: f32, max: f32) -> Self {
        self.min_polar = min;
        self.max_polar = max;
        self
    }

    /// Adds bounds on the azimuth.
    pub fn with_azimuth(mut self, min: f32, max: f32) -> Self {
        self.azimuth = Some((min, max));
        self
    }

    fn clamp_azimuth(&self, theta: f32) -> f32 {
        let Some((mut min, mut max)) = self.azimuth else {
            return theta;
        };

        if min < -PI {
            min += 2.0 * PI;
        } else if min > PI {
            min -= 2.0 * PI;
        }

        if max < -PI {
            max += 2.0 * PI;
        } else if max > PI {
            max -= 2.0 * PI;
        }

        if min.is_nan() || max.is_nan() {
            theta
        } else if min <= max {
            theta.clamp(min, max)
        } else if theta > (min + max) / 2.0 {
            theta.max(min)
        } else {
            theta.min(max)
        }
    }
}

/// Brings `angle` into `[-π, π)`.
fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

/// Clamps into `[a, b]` whichever order the bounds come in. NaN bounds are ignored.
fn clamp_between(value: f32, a: f32, b: f32) -> f32 {
    value.max(a.min(b)).min(a.max(b))
}

/// Orbit camera turning around a target point.
///
/// # Default Controls
/// - **Left mouse + drag**: Rotate around the target
/// - **Right mouse + drag**: Pan the target, if panning is enabled
/// - **Mouse wheel**: Move towards or away from the target
///
/// With damping enabled, user input is applied over the following frames with an
/// exponential falloff, so [`Camera3d::update`] must be called once per frame. The
/// camera can also turn on its own around the vertical axis (auto-rotation).
#[derive(Clone, Debug)]
pub struct OrbitCamera3d {
    target: Vec3,
    distance: f32,
    /// Azimuth around `+Y`, zero on `+Z`.
    theta: f32,
    /// Angle from `+Y`.
    phi: f32,

    bounds: OrbitBounds,
    damping: Option<f32>,
    auto_rotate: Option<f32>,
    pan_enabled: bool,
    rotate_speed: f32,
    zoom_speed: f32,

    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,

    rotate_button: Option<MouseButton>,
    pan_button: Option<MouseButton>,
    rotating: bool,
    panning: bool,
    last_cursor_pos: Option<Vec2>,

    fov: f32,
    znear: f32,
    zfar: f32,
    framebuffer_size: Vec2,
    proj: Mat4,
}

impl OrbitCamera3d {
    /// Creates a new orbit camera with a 45° field of view and clip planes at 0.1 and 1024.
    pub fn new(eye: Vec3, at: Vec3) -> OrbitCamera3d {
        OrbitCamera3d::new_with_frustum(PI / 4.0, 0.1, 1024.0, eye, at)
    }

    /// Creates a new orbit camera with custom frustum parameters. `fov` is vertical, in radians.
    pub fn new_with_frustum(fov: f32, znear: f32, zfar: f32, eye: Vec3, at: Vec3) -> OrbitCamera3d {
        let mut res = OrbitCamera3d {
            target: Vec3::ZERO,
            distance: 1.0,
            theta: 0.0,
            phi: PI / 2.0,
            bounds: OrbitBounds::default(),
            damping: None,
            auto_rotate: None,
            pan_enabled: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            rotate_button: Some(MouseButton::LEFT),
            pan_button: Some(MouseButton::RIGHT),
            rotating: false,
            panning: false,
            last_cursor_pos: None,
            fov,
            znear,
            zfar,
            framebuffer_size: Vec2::new(800.0, 600.0),
            proj: Mat4::IDENTITY,
        };

        res.look_at(eye, at);
        res
    }

    /// Moves the camera to `eye`, looking at `at`, and drops any pending motion.
    ///
    /// The bounds are not applied until the next [`update`](Camera3d::update).
    pub fn look_at(&mut self, eye: Vec3, at: Vec3) {
        let offset = eye - at;
        self.target = at;
        self.distance = offset.length();

        if self.distance > EPS {
            self.theta = offset.x.atan2(offset.z);
            self.phi = (offset.y / self.distance).clamp(-1.0, 1.0).acos();
        } else {
            self.theta = 0.0;
            self.phi = PI / 2.0;
        }

        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
        self.update_projection();
    }

    /// Jumps to `view`.
    pub fn set_view(&mut self, view: &CameraView) {
        self.look_at(view.position, view.target);
    }

    /// The current eye and target.
    pub fn view(&self) -> CameraView {
        CameraView::new(self.eye(), self.target)
    }

    /// The point the camera orbits around.
    #[inline]
    pub fn at(&self) -> Vec3 {
        self.target
    }

    /// The distance between the eye and the target.
    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// The azimuth, in radians.
    #[inline]
    pub fn azimuth(&self) -> f32 {
        self.theta
    }

    /// The polar angle, in radians.
    #[inline]
    pub fn polar(&self) -> f32 {
        self.phi
    }

    #[inline]
    pub fn bounds(&self) -> &OrbitBounds {
        &self.bounds
    }

    /// Sets the limits applied on every update.
    pub fn set_bounds(&mut self, bounds: OrbitBounds) {
        self.bounds = bounds;
        self.apply_bounds();
        self.update_projection();
    }

    /// Enables damping with the given factor in `(0, 1]`, or disables it with `None`.
    ///
    /// The usual factor is `0.05`.
    pub fn set_damping(&mut self, factor: Option<f32>) {
        self.damping = factor.map(|f| f.clamp(EPS, 1.0));
    }

    /// Makes the camera turn around the target by itself.
    ///
    /// At speed `1.0` a full turn takes 60 seconds. Negative speeds turn the other way.
    pub fn set_auto_rotate(&mut self, speed: Option<f32>) {
        self.auto_rotate = speed;
    }

    /// The auto-rotation speed, if enabled.
    #[inline]
    pub fn auto_rotate(&self) -> Option<f32> {
        self.auto_rotate
    }

    /// Enables or disables panning with the pan button.
    pub fn set_pan_enabled(&mut self, enabled: bool) {
        self.pan_enabled = enabled;
        self.panning &= enabled;
    }

    /// Sets the button used to rotate the camera. Use `None` to disable rotation.
    pub fn rebind_rotate_button(&mut self, new_button: Option<MouseButton>) {
        self.rotate_button = new_button;
    }

    /// Sets the button used to pan the camera. Use `None` to disable panning by mouse.
    pub fn rebind_pan_button(&mut self, new_button: Option<MouseButton>) {
        self.pan_button = new_button;
    }

    /// Sets the vertical field of view, in radians.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
        self.update_projection();
    }

    /// The vertical field of view, in radians.
    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Sets the near and far clip planes.
    pub fn set_clip_planes(&mut self, znear: f32, zfar: f32) {
        self.znear = znear;
        self.zfar = zfar;
        self.update_projection();
    }

    /// Rotates by `angle` radians around the vertical axis, counterclockwise seen from above.
    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    /// Rotates towards the top pole by `angle` radians.
    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Multiplies the distance to the target by `factor` at the next update.
    pub fn dolly(&mut self, factor: f32) {
        if factor > 0.0 {
            self.scale *= factor;
        }
    }

    /// Moves the target by `offset` at the next update.
    pub fn pan(&mut self, offset: Vec3) {
        self.pan_offset += offset;
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    fn handle_rotate(&mut self, dpos: Vec2) {
        let height = self.framebuffer_size.y.max(1.0);
        self.rotate_left(2.0 * PI * dpos.x / height * self.rotate_speed);
        self.rotate_up(2.0 * PI * dpos.y / height * self.rotate_speed);
    }

    fn handle_pan(&mut self, dpos: Vec2) {
        let height = self.framebuffer_size.y.max(1.0);
        // World units covered by one pixel at the target's depth.
        let unit = 2.0 * self.distance * (self.fov / 2.0).tan() / height;
        let view = self.view_transform();
        let right = view.rotation.inverse() * Vec3::X;
        let up = view.rotation.inverse() * Vec3::Y;
        self.pan(right * (-dpos.x * unit) + up * (dpos.y * unit));
    }

    fn handle_scroll(&mut self, yoff: f32) {
        if yoff > 0.0 {
            self.dolly(self.zoom_scale());
        } else if yoff < 0.0 {
            self.dolly(1.0 / self.zoom_scale());
        }
    }

    fn offset(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.distance * sin_phi * self.theta.sin(),
            self.distance * self.phi.cos(),
            self.distance * sin_phi * self.theta.cos(),
        )
    }

    fn apply_bounds(&mut self) {
        let bounds = &self.bounds;
        self.theta = bounds.clamp_azimuth(wrap_angle(self.theta));
        self.phi = clamp_between(self.phi, bounds.min_polar, bounds.max_polar).clamp(EPS, PI - EPS);
        self.distance = clamp_between(self.distance, bounds.min_distance, bounds.max_distance);
    }

    fn update_projection(&mut self) {
        let aspect = self.framebuffer_size.x / self.framebuffer_size.y.max(1.0);
        self.proj = Mat4::perspective_rh(self.fov, aspect, self.znear, self.zfar);
    }
}

impl Camera3d for OrbitCamera3d {
    fn handle_event(&mut self, event: &WindowEvent) {
        match *event {
            WindowEvent::MouseButton(button, action, _) => {
                let pressed = action == Action::Press;
                if Some(button) == self.rotate_button {
                    self.rotating = pressed;
                }
                if Some(button) == self.pan_button {
                    self.panning = pressed && self.pan_enabled;
                }
            }
            WindowEvent::CursorPos(x, y, _) => {
                let curr_pos = Vec2::new(x as f32, y as f32);

                if let Some(last) = self.last_cursor_pos {
                    let dpos = curr_pos - last;
                    if self.rotating {
                        self.handle_rotate(dpos);
                    }
                    if self.panning {
                        self.handle_pan(dpos);
                    }
                }

                self.last_cursor_pos = Some(curr_pos);
            }
            WindowEvent::Scroll(_, off, _) => self.handle_scroll(off as f32),
            WindowEvent::FramebufferSize(w, h) => {
                self.framebuffer_size = Vec2::new(w.max(1) as f32, h.max(1) as f32);
                self.update_projection();
            }
            _ => {}
        }
    }

    fn eye(&self) -> Vec3 {
        self.target + self.offset()
    }

    fn view_transform(&self) -> Pose3 {
        Pose3::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    fn update(&mut self, dt: f32) -> bool {
        let before = (self.eye(), self.target);

        if let Some(speed) = self.auto_rotate {
            if !self.rotating {
                self.rotate_left(2.0 * PI / 60.0 * speed * dt);
            }
        }

        let factor = self.damping.unwrap_or(1.0);
        self.theta += self.delta_theta * factor;
        self.phi += self.delta_phi * factor;
        self.distance *= self.scale;
        self.target += self.pan_offset * factor;
        self.apply_bounds();

        if self.damping.is_some() {
            self.delta_theta *= 1.0 - factor;
            self.delta_phi *= 1.0 - factor;
            self.pan_offset *= 1.0 - factor;

            if self.delta_theta.abs() < EPS && self.delta_phi.abs() < EPS {
                self.delta_theta = 0.0;
                self.delta_phi = 0.0;
            }
            if self.pan_offset.length_squared() < EPS * EPS {
                self.pan_offset = Vec3::ZERO;
            }
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        let (eye, target) = before;
        eye.distance_squared(self.eye()) > EPS * EPS
            || target.distance_squared(self.target) > EPS * EPS
    }

    #[inline]
    fn view_transform_pair(&self) -> (Pose3, Mat4) {
        (self.view_transform(), self.proj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Modifiers;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1.0e-4
    }

    #[test]
    fn spherical_coordinates_follow_the_eye() {
        let cam = OrbitCamera3d::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        assert!(close(cam.distance(), 5.0));
        assert!(close(cam.azimuth(), 0.0));
        assert!(close(cam.polar(), PI / 2.0));

        let cam = OrbitCamera3d::new(Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO);
        assert!(close(cam.azimuth(), PI / 2.0));
        assert!((cam.eye() - Vec3::new(5.0, 0.0, 0.0)).length() < 1.0e-4);
    }

    #[test]
    fn distance_and_polar_are_clamped() {
        let mut cam = OrbitCamera3d::new(Vec3::new(-15.0, 10.0, 15.0), Vec3::new(0.0, 1.0, 0.0));
        cam.set_bounds(OrbitBounds::distance(8.0, 16.0).with_polar(0.0, PI / 2.0));
        assert!(cam.distance() <= 16.0);

        cam.rotate_up(-10.0);
        cam.update(0.016);
        assert!(close(cam.polar(), PI / 2.0));

        for _ in 0..100 {
            cam.dolly(0.5);
            cam.update(0.016);
        }
        assert!(close(cam.distance(), 8.0));
    }

    #[test]
    fn wrapped_azimuth_range() {
        // 3.2 is past π and is brought back to 3.2 - 2π.
        let bounds = OrbitBounds::default().with_azimuth(3.2, -1.2);
        let min = 3.2 - 2.0 * PI;
        assert!(close(bounds.clamp_azimuth(-2.0), -2.0));
        assert!(close(bounds.clamp_azimuth(-0.5), -1.2));
        assert!(close(bounds.clamp_azimuth(-3.14), min));

        // A range that still crosses ±π after normalization.
        let bounds = OrbitBounds::default().with_azimuth(2.5, -2.5);
        assert!(close(bounds.clamp_azimuth(3.0), 3.0));
        assert!(close(bounds.clamp_azimuth(-3.0), -3.0));
        assert!(close(bounds.clamp_azimuth(1.0), 2.5));
        assert!(close(bounds.clamp_azimuth(-1.0), -2.5));
    }

    #[test]
    fn rotation_across_the_seam_stays_in_the_wrapped_range() {
        let mut cam = OrbitCamera3d::new(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO);
        cam.set_bounds(OrbitBounds::distance(1.0, 10.0).with_azimuth(2.5, -2.5));

        for _ in 0..10 {
            cam.rotate_left(-0.5);
            cam.update(0.0);
            let theta = cam.azimuth();
            assert!((-PI..=PI).contains(&theta));
            assert!(theta >= 2.5 - 1.0e-5 || theta <= -2.5 + 1.0e-5, "{}", theta);
        }
        assert!(close(cam.azimuth(), -2.5));

        for _ in 0..10 {
            cam.rotate_left(0.5);
            cam.update(0.0);
        }
        assert!(close(cam.azimuth(), 2.5));
    }

    #[test]
    fn inverted_and_nan_bounds_do_not_panic() {
        let mut cam = OrbitCamera3d::new(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO);
        cam.set_bounds(OrbitBounds::distance(16.0, 8.0).with_polar(f32::NAN, 1.0));
        cam.update(0.016);
        assert!(close(cam.distance(), 16.0));
        assert!(cam.polar() <= 1.0);
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let mut cam = OrbitCamera3d::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        cam.set_damping(Some(0.05));
        cam.rotate_left(-1.0);

        assert!(cam.update(0.016));
        assert!(close(cam.azimuth(), 0.05));
        assert!(cam.update(0.016));
        assert!(cam.azimuth() > 0.05 && cam.azimuth() < 1.0);

        for _ in 0..1000 {
            cam.update(0.016);
        }
        assert!(close(cam.azimuth(), 1.0));
        assert!(!cam.update(0.016));
    }

    #[test]
    fn auto_rotation_turns_once_per_minute() {
        let mut cam = OrbitCamera3d::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        cam.set_auto_rotate(Some(1.0));
        assert!(cam.update(15.0));
        assert!(close(cam.azimuth().abs(), PI / 2.0));
    }

    #[test]
    fn drag_rotates_only_while_pressed() {
        let mut cam = OrbitCamera3d::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let none = Modifiers::empty();

        cam.handle_event(&WindowEvent::CursorPos(10.0, 10.0, none));
        cam.handle_event(&WindowEvent::CursorPos(60.0, 10.0, none));
        assert!(!cam.update(0.016));

        cam.handle_event(&WindowEvent::MouseButton(MouseButton::LEFT, Action::Press, none));
        cam.handle_event(&WindowEvent::CursorPos(110.0, 10.0, none));
        assert!(cam.update(0.016));
        assert!(cam.azimuth() < 0.0);
    }

    #[test]
    fn disabled_pan_keeps_the_target() {
        let mut cam = OrbitCamera3d::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        cam.set_pan_enabled(false);
        let none = Modifiers::empty();

        cam.handle_event(&WindowEvent::CursorPos(0.0, 0.0, none));
        cam.handle_event(&WindowEvent::MouseButton(MouseButton::RIGHT, Action::Press, none));
        cam.handle_event(&WindowEvent::CursorPos(50.0, 50.0, none));
        cam.update(0.016);
        assert_eq!(cam.at(), Vec3::ZERO);
    }

    #[test]
    fn wheel_up_moves_closer() {
        let mut cam = OrbitCamera3d::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        cam.handle_event(&WindowEvent::Scroll(0.0, 1.0, Modifiers::empty()));
        cam.update(0.016);
        assert!(cam.distance() < 5.0);
    }
}
