use crate::camera::CameraView;
use glamx::{Vec2, Vec3};

/// Values that can be interpolated linearly.
pub trait Lerp: Clone {
    /// Returns `self` at `t = 0` and `other` at `t = 1`.
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec2 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        *self + (*other - *self) * t
    }
}

impl Lerp for Vec3 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        *self + (*other - *self) * t
    }
}

impl Lerp for CameraView {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        CameraView::new(
            Lerp::lerp(&self.position, &other.position, t),
            Lerp::lerp(&self.target, &other.target, t),
        )
    }
}
