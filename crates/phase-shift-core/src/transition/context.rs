//! Transition configuration and context values.

use std::path::Path;
use std::time::Duration;

use phase_shift_config::{PhaseShiftConfig, Preset, TransitionSettings};

use crate::animation::easing::EasingFunction;
use crate::error::ConfigurationError;
use crate::geometry::Rect;

/// Timing for one presentation: duration, spring and easing curves.
///
/// Immutable once built; `with_*` methods return a new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionConfiguration {
    duration: f64,
    damping: f64,
    initial_velocity: f64,
    presentation_curve: EasingFunction,
    dismissal_curve: EasingFunction,
}

impl Default for TransitionConfiguration {
    fn default() -> Self {
        Self::new(0.45, 0.85, 0.5)
    }
}

impl TransitionConfiguration {
    /// Build a configuration with the default curves (ease-out in, ease-in-out
    /// back).
    ///
    /// # Panics
    /// Panics if `duration` is not positive and finite, `damping` is outside
    /// [0, 1], or `initial_velocity` is not finite.
    pub fn new(duration: f64, damping: f64, initial_velocity: f64) -> Self {
        match Self::try_new(duration, damping, initial_velocity) {
            Ok(configuration) => configuration,
            Err(error) => panic!("invalid transition configuration: {error}"),
        }
    }

    /// Fallible form of [`TransitionConfiguration::new`].
    pub fn try_new(
        duration: f64,
        damping: f64,
        initial_velocity: f64,
    ) -> crate::Result<Self> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(ConfigurationError::InvalidDuration(duration));
        }
        if !(0.0..=1.0).contains(&damping) {
            return Err(ConfigurationError::InvalidDamping(damping));
        }
        if !initial_velocity.is_finite() {
            return Err(ConfigurationError::InvalidVelocity(initial_velocity));
        }

        Ok(Self {
            duration,
            damping,
            initial_velocity,
            presentation_curve: EasingFunction::EaseOut,
            dismissal_curve: EasingFunction::EaseInOut,
        })
    }

    /// Snappy timing for small sources.
    pub fn fast() -> Self {
        Self::new(0.3, 0.9, 0.6)
    }

    /// Slow, bouncier timing.
    pub fn slow() -> Self {
        Self::new(0.7, 0.75, 0.3)
    }

    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Default => Self::default(),
            Preset::Fast => Self::fast(),
            Preset::Slow => Self::slow(),
        }
    }

    /// Resolve file settings: start from the preset, apply overrides, validate.
    pub fn from_settings(settings: &TransitionSettings) -> crate::Result<Self> {
        let base = Self::preset(settings.preset);
        let mut configuration = Self::try_new(
            settings.duration.unwrap_or(base.duration),
            settings.damping.unwrap_or(base.damping),
            settings.initial_velocity.unwrap_or(base.initial_velocity),
        )?;

        configuration.presentation_curve = settings
            .presentation_curve
            .map(EasingFunction::from)
            .unwrap_or(base.presentation_curve);
        configuration.dismissal_curve = settings
            .dismissal_curve
            .map(EasingFunction::from)
            .unwrap_or(base.dismissal_curve);

        Ok(configuration)
    }

    /// Load and resolve a `phaseshift.toml` file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let config = PhaseShiftConfig::load_from_file(path)?;
        Self::from_settings(&config.transition)
    }

    pub fn with_presentation_curve(mut self, curve: EasingFunction) -> Self {
        self.presentation_curve = curve;
        self
    }

    pub fn with_dismissal_curve(mut self, curve: EasingFunction) -> Self {
        self.dismissal_curve = curve;
        self
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// The one duration value handed to hosts, for both directions.
    pub fn transition_duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration)
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn initial_velocity(&self) -> f64 {
        self.initial_velocity
    }

    pub fn presentation_curve(&self) -> EasingFunction {
        self.presentation_curve
    }

    pub fn dismissal_curve(&self) -> EasingFunction {
        self.dismissal_curve
    }
}

/// Rectangle, in window coordinates, a presentation grows out of and a
/// dismissal shrinks back into. Capture it when the user interacts; a frame
/// taken before scrolling points at the wrong place.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SourceFrame(Rect);

impl SourceFrame {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self(Rect::new(x, y, w, h))
    }

    pub fn rect(&self) -> Rect {
        self.0
    }
}

impl From<Rect> for SourceFrame {
    fn from(rect: Rect) -> Self {
        Self(rect)
    }
}

/// Source frame plus configuration, handed to animators as one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionContext {
    pub source_frame: SourceFrame,
    pub configuration: TransitionConfiguration,
}

impl TransitionContext {
    pub fn new(source_frame: SourceFrame, configuration: TransitionConfiguration) -> Self {
        Self {
            source_frame,
            configuration,
        }
    }
}
