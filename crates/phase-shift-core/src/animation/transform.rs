//! 2D affine transforms.
//!
//! Layers carry a translation plus uniform scale (`PhaseShift`), which is
//! resolved into a `Transform2D` anchored at the layer's center whenever a
//! renderer or a geometry query needs the actual matrix.
//!
//! ```
//! use phase_shift_core::animation::transform::Transform2D;
//!
//! let shrink = Transform2D::scale_uniform(0.5).about_point(100.0, 100.0);
//! assert_eq!(shrink.apply_point(100.0, 100.0), (100.0, 100.0));
//! assert_eq!(shrink.apply_point(200.0, 100.0), (150.0, 100.0));
//! ```

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// A 2D affine transformation matrix.
///
/// Stored as a 3x2 matrix (the bottom row [0, 0, 1] is implicit):
/// ```text
/// | a  c  tx |
/// | b  d  ty |
/// | 0  0  1  |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    /// Create an identity transform (no change).
    pub const fn identity() -> Self {
        Self::translate(0.0, 0.0)
    }

    /// Create a translation transform.
    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx,
            ty,
        }
    }

    /// Create a uniform scale transform.
    pub const fn scale_uniform(s: f64) -> Self {
        Self {
            a: s,
            b: 0.0,
            c: 0.0,
            d: s,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Compose this transform with another (this * other).
    ///
    /// The resulting transform applies `other` first, then `self`.
    pub fn then(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    /// Apply this transform to a point.
    pub fn apply_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    /// Axis-aligned bounding box of a transformed rectangle.
    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.apply_point(rect.x, rect.y),
            self.apply_point(rect.x + rect.w, rect.y),
            self.apply_point(rect.x, rect.y + rect.h),
            self.apply_point(rect.x + rect.w, rect.y + rect.h),
        ];

        let (mut min_x, mut min_y) = corners[0];
        let (mut max_x, mut max_y) = corners[0];
        for (x, y) in &corners[1..] {
            min_x = min_x.min(*x);
            min_y = min_y.min(*y);
            max_x = max_x.max(*x);
            max_y = max_y.max(*y);
        }

        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Re-anchor this transform so it applies around `(x, y)` instead of the
    /// coordinate origin.
    pub fn about_point(&self, x: f64, y: f64) -> Self {
        Self::translate(x, y)
            .then(self)
            .then(&Self::translate(-x, -y))
    }

    /// Check if this is approximately an identity transform.
    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.a - 1.0).abs() < epsilon
            && self.b.abs() < epsilon
            && self.c.abs() < epsilon
            && (self.d - 1.0).abs() < epsilon
            && self.tx.abs() < epsilon
            && self.ty.abs() < epsilon
    }
}
