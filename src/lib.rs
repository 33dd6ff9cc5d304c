//! Phase shift modal transitions.
//!
//! Facade over the workspace: the transition core re-exported at the root,
//! and the settings file crate under [`config`].

pub use phase_shift_config as config;
pub use phase_shift_core::*;

/// Load `phaseshift.toml` from the current directory, falling back to the
/// default configuration when it is missing or invalid.
pub fn load_configuration() -> TransitionConfiguration {
    let settings = config::PhaseShiftConfig::load_or_default();
    match TransitionConfiguration::from_settings(&settings.transition) {
        Ok(configuration) => configuration,
        Err(error) => {
            tracing::warn!(%error, "invalid transition settings; using defaults");
            TransitionConfiguration::default()
        }
    }
}
