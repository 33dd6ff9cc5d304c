//! Interpolation between animatable values.

use crate::geometry::{PhaseShift, Point, Rect, Vector};

/// Trait for types that can be interpolated between two values.
///
/// `t = 0.0` returns `self`, `t = 1.0` returns `to`. Values outside [0, 1]
/// extrapolate, which is how spring overshoot reaches the layer.
pub trait Interpolate: Sized {
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

#[inline]
fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

impl Interpolate for f64 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        lerp(*self, *to, t)
    }
}

impl Interpolate for Point {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Point::new(lerp(self.x, to.x, t), lerp(self.y, to.y, t))
    }
}

impl Interpolate for Vector {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Vector::new(lerp(self.dx, to.dx, t), lerp(self.dy, to.dy, t))
    }
}

impl Interpolate for Rect {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Rect::new(
            lerp(self.x, to.x, t),
            lerp(self.y, to.y, t),
            lerp(self.w, to.w, t),
            lerp(self.h, to.h, t),
        )
    }
}

impl Interpolate for PhaseShift {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        PhaseShift {
            translation: self.translation.interpolate(&to.translation, t),
            scale: lerp(self.scale, to.scale, t),
        }
    }
}
