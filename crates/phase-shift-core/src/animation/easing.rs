//! Easing curves for transition timing.
//!
//! The presentation and dismissal curves of a `TransitionConfiguration` are
//! selected from these CSS-compatible timing functions:
//! - Linear
//! - Ease, EaseIn, EaseOut, EaseInOut (standard CSS curves)
//! - CubicBezier (custom bezier curves)
//!
//! # Usage
//!
//! ```
//! use phase_shift_core::animation::easing::EasingFunction;
//!
//! let ease = EasingFunction::EaseOut;
//! let progress = ease.evaluate(0.5);
//!
//! let custom = EasingFunction::cubic_bezier(0.4, 0.0, 0.2, 1.0);
//! let progress = custom.evaluate(0.5);
//! ```

use phase_shift_config::CurveName;
use serde::{Deserialize, Serialize};

/// Easing function for animation timing.
///
/// Maps a linear progress value (0.0 to 1.0) to an eased output value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,

    /// CSS `ease`, equivalent to `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    Ease,

    /// CSS `ease-in`, equivalent to `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,

    /// CSS `ease-out`, equivalent to `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,

    /// CSS `ease-in-out`, equivalent to `cubic-bezier(0.42, 0, 0.58, 1)`.
    #[default]
    EaseInOut,

    /// Custom cubic bezier curve with control points (x1, y1) and (x2, y2).
    /// x values must be in [0, 1], y values can be any float.
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl EasingFunction {
    /// Evaluate the easing function at the given progress.
    ///
    /// Input is clamped to [0, 1]. Output may leave that range for bezier
    /// curves with out-of-range y control points.
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
        }
    }

    /// Create a custom cubic bezier easing function.
    ///
    /// # Panics
    /// Panics if x1 or x2 are outside [0, 1].
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2),
            "Bezier x values must be in [0, 1]"
        );
        Self::CubicBezier { x1, y1, x2, y2 }
    }
}

impl From<CurveName> for EasingFunction {
    fn from(name: CurveName) -> Self {
        match name {
            CurveName::Linear => Self::Linear,
            CurveName::Ease => Self::Ease,
            CurveName::EaseIn => Self::EaseIn,
            CurveName::EaseOut => Self::EaseOut,
            CurveName::EaseInOut => Self::EaseInOut,
        }
    }
}

/// Evaluate a cubic bezier curve at progress `progress`.
///
/// Newton-Raphson finds the curve parameter whose x matches the progress,
/// then the y coordinate at that parameter is returned.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, progress: f64) -> f64 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let t = solve_bezier_x(x1, x2, progress);
    bezier_component(y1, y2, t)
}

fn solve_bezier_x(x1: f64, x2: f64, target_x: f64) -> f64 {
    let mut t = target_x;

    for _ in 0..8 {
        let x = bezier_component(x1, x2, t) - target_x;
        if x.abs() < 1e-7 {
            break;
        }

        let dx = bezier_derivative(x1, x2, t);
        if dx.abs() < 1e-7 {
            break;
        }

        t = (t - x / dx).clamp(0.0, 1.0);
    }

    t
}

/// One coordinate of the curve: 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_component(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

/// d/dt = 3(1-t)²·p1 + 6(1-t)t·(p2-p1) + 3t²·(1-p2)
#[inline]
fn bezier_derivative(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 0.001;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_linear() {
        let ease = EasingFunction::Linear;
        assert!(approx_eq(ease.evaluate(0.0), 0.0));
        assert!(approx_eq(ease.evaluate(0.25), 0.25));
        assert!(approx_eq(ease.evaluate(0.75), 0.75));
        assert!(approx_eq(ease.evaluate(1.0), 1.0));
    }

    #[test]
    fn test_ease_in() {
        let ease = EasingFunction::EaseIn;
        assert!(approx_eq(ease.evaluate(0.0), 0.0));
        assert!(approx_eq(ease.evaluate(1.0), 1.0));
        assert!(ease.evaluate(0.25) < 0.25);
        assert!(ease.evaluate(0.5) < 0.5);
    }

    #[test]
    fn test_ease_out() {
        let ease = EasingFunction::EaseOut;
        assert!(approx_eq(ease.evaluate(0.0), 0.0));
        assert!(approx_eq(ease.evaluate(1.0), 1.0));
        assert!(ease.evaluate(0.25) > 0.25);
        assert!(ease.evaluate(0.5) > 0.5);
    }

    #[test]
    fn test_ease_in_out_is_symmetric() {
        let ease = EasingFunction::EaseInOut;
        assert!(approx_eq(ease.evaluate(0.5), 0.5));
        assert!(approx_eq(ease.evaluate(0.25) + ease.evaluate(0.75), 1.0));
    }

    #[test]
    fn test_ease_is_monotonic() {
        let ease = EasingFunction::Ease;
        let mut previous = 0.0;
        for step in 1..=20 {
            let value = ease.evaluate(step as f64 / 20.0);
            assert!(value >= previous, "ease dipped at step {step}");
            previous = value;
        }
    }

    #[test]
    fn test_custom_bezier() {
        let linear_bezier = EasingFunction::cubic_bezier(0.0, 0.0, 1.0, 1.0);
        assert!(approx_eq(linear_bezier.evaluate(0.5), 0.5));
    }

    #[test]
    fn test_clamping() {
        let ease = EasingFunction::Ease;
        assert!(approx_eq(ease.evaluate(-0.5), 0.0));
        assert!(approx_eq(ease.evaluate(1.5), 1.0));
    }

    #[test]
    fn test_curve_names_map_to_functions() {
        assert_eq!(EasingFunction::from(CurveName::EaseOut), EasingFunction::EaseOut);
        assert_eq!(EasingFunction::from(CurveName::Linear), EasingFunction::Linear);
    }

    #[test]
    #[should_panic(expected = "Bezier x values must be in [0, 1]")]
    fn test_invalid_bezier_x() {
        EasingFunction::cubic_bezier(-0.1, 0.0, 1.5, 1.0);
    }
}
