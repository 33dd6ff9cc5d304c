//! Error types for the transition core.

use thiserror::Error;

use crate::transition::ParticipantKey;

/// A transition could not start because a required participant was missing.
///
/// The animator reports these through a non-finished completion; they never
/// reach the caller of `present`/`dismiss`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    /// The session has no transition container.
    #[error("transition container is missing")]
    MissingContainer,

    /// The session has no layer for a participant.
    #[error("{0:?} layer is missing")]
    MissingLayer(ParticipantKey),

    /// The session has no final frame for a participant.
    #[error("final frame for {0:?} is missing")]
    MissingFinalFrame(ParticipantKey),
}

/// Invalid transition configuration values.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("duration must be positive and finite, got {0}")]
    InvalidDuration(f64),

    #[error("damping ratio must be within [0, 1], got {0}")]
    InvalidDamping(f64),

    #[error("initial spring velocity must be finite, got {0}")]
    InvalidVelocity(f64),

    /// The settings file could not be loaded.
    #[error(transparent)]
    Settings(#[from] phase_shift_config::ConfigError),
}
