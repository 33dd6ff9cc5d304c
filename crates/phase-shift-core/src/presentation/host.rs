//! Host-side presentation traits.
//!
//! A [`PresentingHost`] shows at most one [`PresentedUnit`] at a time and runs
//! the unit's transitions through its [`TransitioningDelegate`].

use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::layer::LayerRef;
use crate::transition::TransitioningDelegate;

static NEXT_MARKER: AtomicU64 = AtomicU64::new(1);

/// Identity tag carried by every presented unit. Hosts and coordinators
/// compare markers to answer "is this the modal on top".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresentationMarker(u64);

impl PresentationMarker {
    pub fn new() -> Self {
        Self(NEXT_MARKER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for PresentationMarker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalPresentationStyle {
    /// Host presents without consulting the delegate.
    FullScreen,
    /// Host asks the unit's transitioning delegate for animators.
    #[default]
    Custom,
}

pub trait PresentingHost {
    /// Whether any unit is currently presented, ours or not.
    fn has_active_presentation(&self) -> bool;

    /// Marker of the unit currently presented, if any.
    fn presented_marker(&self) -> Option<PresentationMarker>;

    /// Show `unit`. The host keeps the only strong reference to it.
    fn present(&self, unit: Rc<dyn PresentedUnit>);

    /// Dismiss the presented unit. `completion` runs once the unit is gone;
    /// a dismissal that gets rolled back drops it without running.
    fn dismiss_presented(&self, completion: Box<dyn FnOnce()>);
}

pub trait PresentedUnit {
    fn marker(&self) -> PresentationMarker;

    fn root_layer(&self) -> LayerRef;

    fn presentation_style(&self) -> ModalPresentationStyle;

    fn transitioning_delegate(&self) -> Option<Rc<dyn TransitioningDelegate>>;

    /// Called by the host when it starts presenting the unit.
    fn attach_to(&self, host: Weak<dyn PresentingHost>);

    /// Ask the presenting host to take the unit down. With no live host the
    /// completion runs immediately.
    fn dismiss(&self, completion: Box<dyn FnOnce()>);
}
