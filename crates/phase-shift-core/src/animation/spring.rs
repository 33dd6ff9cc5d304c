//! Spring timing for transition progress.
//!
//! Progress follows the analytical solution of a damped harmonic oscillator
//! pulled toward 1.0:
//!
//! ```text
//! x''(t) + 2ζω₀x'(t) + ω₀²(x(t) - 1) = 0,   x(0) = 0,   x'(0) = v₀
//! ```
//!
//! The natural frequency is derived from the transition duration so a
//! critically damped spring is within 1% of its target when the duration
//! elapses. Lower damping ratios overshoot and oscillate; the animator snaps
//! to the exact final state at the end of the duration either way.

use serde::{Deserialize, Serialize};

/// For a critically damped spring to reach within 1% of its target at T,
/// e^(-ω₀T)(1 + ω₀T) = 0.01, so ω₀ ≈ 6.6 / T.
const SETTLE_FACTOR: f64 = 6.6;

/// Shortest duration the frequency is derived from.
const MIN_DURATION: f64 = 0.01;

/// Ratios this close to 1.0 use the critically damped solution.
const CRITICAL_BAND: f64 = 1e-3;

/// Spring parameters resolved from a transition configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringTiming {
    /// Natural frequency (ω₀), radians per second.
    omega: f64,
    /// Damping ratio (ζ), clamped to [0, 1].
    damping: f64,
    /// Initial velocity (v₀), fractions of the travel per second.
    velocity: f64,
}

impl SpringTiming {
    /// Derive spring parameters from a duration in seconds.
    pub fn new(duration: f64, damping: f64, initial_velocity: f64) -> Self {
        let duration = if duration.is_finite() {
            duration.max(MIN_DURATION)
        } else {
            MIN_DURATION
        };

        Self {
            omega: SETTLE_FACTOR / duration,
            damping: damping.clamp(0.0, 1.0),
            velocity: if initial_velocity.is_finite() {
                initial_velocity
            } else {
                0.0
            },
        }
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Spring position at `t` seconds. Starts at 0.0 and settles at 1.0;
    /// underdamped springs overshoot past 1.0.
    pub fn position(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }

        let omega = self.omega;
        let zeta = self.damping;
        let v0 = self.velocity;

        // Displacement from the target: y = x - 1, y(0) = -1, y'(0) = v0.
        let displacement = if (1.0 - zeta) < CRITICAL_BAND {
            let decay = (-omega * t).exp();
            decay * ((v0 - omega) * t - 1.0)
        } else {
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let decay = (-zeta * omega * t).exp();
            let b = (v0 - zeta * omega) / omega_d;
            decay * (b * (omega_d * t).sin() - (omega_d * t).cos())
        };

        1.0 + displacement
    }
}
