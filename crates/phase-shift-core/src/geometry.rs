//! Rectangles and the phase shift geometry.
//!
//! A phase shift is a translation plus a uniform scale, applied about a
//! view's center. Presenting starts the destination at the shift that makes
//! it coincide with the source rectangle and animates back to identity;
//! dismissing animates from the live frame toward a near-zero scale centered
//! on the source.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::animation::transform::Transform2D;

/// Scale a dismissed view shrinks toward. Never exactly zero so the layer
/// matrix stays invertible.
pub const DISMISS_SCALE: f64 = 0.01;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `self` to `to`.
    pub fn vector_to(&self, to: &Point) -> Vector {
        Vector::new(to.x - self.x, to.y - self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }
}

impl std::ops::Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

/// Axis-aligned rectangle. All rectangles handed to the core share the
/// window coordinate space unless a function says otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn from_center(center: Point, w: f64, h: f64) -> Self {
        Self::new(center.x - w * 0.5, center.y - h * 0.5, w, h)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// True when both sides are positive and finite.
    pub fn has_area(&self) -> bool {
        self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    /// Same rectangle at the coordinate origin.
    pub fn bounds(&self) -> Self {
        Self::new(0.0, 0.0, self.w, self.h)
    }
}

/// Translation plus uniform scale, applied about a view's center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseShift {
    pub translation: Vector,
    pub scale: f64,
}

impl Default for PhaseShift {
    fn default() -> Self {
        Self::identity()
    }
}

impl PhaseShift {
    pub const fn new(translation: Vector, scale: f64) -> Self {
        Self { translation, scale }
    }

    pub const fn identity() -> Self {
        Self::new(Vector::ZERO, 1.0)
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.translation.dx.abs() < epsilon
            && self.translation.dy.abs() < epsilon
            && (self.scale - 1.0).abs() < epsilon
    }

    /// Matrix form, relative to the anchor (the view's center).
    pub fn to_transform(&self) -> Transform2D {
        Transform2D::translate(self.translation.dx, self.translation.dy)
            .then(&Transform2D::scale_uniform(self.scale))
    }

    /// Matrix form in the coordinate space of `frame`, anchored at its center.
    pub fn transform_for(&self, frame: &Rect) -> Transform2D {
        let center = frame.center();
        self.to_transform().about_point(center.x, center.y)
    }

    /// Where `frame` is drawn once this shift is applied to it.
    pub fn apply_to_rect(&self, frame: &Rect) -> Rect {
        self.transform_for(frame).apply_rect(frame)
    }
}

/// Result of the presentation geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftGeometry {
    pub shift: PhaseShift,
    /// Set when a rectangle had no usable area and scale fell back to 1.
    pub degenerate: bool,
}

/// Initial shift for a presentation: applied to `final_frame`, it lands on
/// `source_in_container`. Both rectangles must be in the same space.
///
/// Scale is the smaller of the two axis ratios so differing aspect ratios
/// never distort the destination.
pub fn presentation_shift(source_in_container: &Rect, final_frame: &Rect) -> ShiftGeometry {
    let mut degenerate = false;

    let mut translation = final_frame.center().vector_to(&source_in_container.center());
    if !translation.is_finite() {
        warn!(?source_in_container, ?final_frame, "non-finite phase shift translation; ignoring");
        translation = Vector::ZERO;
        degenerate = true;
    }

    let scale = match uniform_scale(source_in_container, final_frame) {
        Some(scale) => scale,
        None => {
            warn!(
                ?source_in_container,
                ?final_frame,
                "zero-area rectangle in phase shift; animating without scale"
            );
            degenerate = true;
            1.0
        }
    };

    ShiftGeometry {
        shift: PhaseShift::new(translation, scale),
        degenerate,
    }
}

/// Dismissal delta: moves the view's live frame center onto the source
/// center while shrinking toward [`DISMISS_SCALE`].
pub fn dismissal_shift(current_frame: &Rect, source_in_container: &Rect) -> PhaseShift {
    let translation = current_frame.center().vector_to(&source_in_container.center());
    if !translation.is_finite() {
        warn!(?current_frame, ?source_in_container, "non-finite dismissal translation; fading in place");
        return PhaseShift::new(Vector::ZERO, DISMISS_SCALE);
    }

    PhaseShift::new(translation, DISMISS_SCALE)
}

fn uniform_scale(source: &Rect, destination: &Rect) -> Option<f64> {
    if !source.has_area() || !destination.has_area() {
        return None;
    }

    let scale = (source.w / destination.w).min(source.h / destination.h);
    (scale.is_finite() && scale > 0.0).then_some(scale)
}
