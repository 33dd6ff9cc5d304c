//! Animation primitives for phase shift transitions.
//!
//! This module provides:
//! - **Easing Functions**: Standard timing curves, including cubic beziers
//! - **Spring Timing**: Closed-form damped spring response
//! - **Interpolation**: Linear blending of geometry values
//! - **Transforms**: 2D affine matrices for renderers
//! - **Animator**: The frame-driven phase shift animator
//!
//! # Architecture
//!
//! ```text
//! PhaseShiftAnimator
//!   ├── EasingFunction (time → eased time)
//!   ├── SpringTiming   (eased time → progress, may overshoot)
//!   └── Interpolate    (progress → layer shift and opacity)
//! ```

pub mod animator;
pub mod easing;
pub mod interpolate;
pub mod spring;
pub mod transform;

pub use animator::{AnimatorState, FRAME_INTERVAL, Keyframe, PRESENT_INITIAL_OPACITY, PhaseShiftAnimator};
pub use easing::EasingFunction;
pub use interpolate::Interpolate;
pub use spring::SpringTiming;
pub use transform::Transform2D;
