//! The host transition protocol.
//!
//! A presenting host drives each phase of a presentation the same way:
//! ask the unit's [`TransitioningDelegate`] for an animator, hand that
//! animator a [`TransitionSession`] describing the participants, and wait
//! for the session's completion to finalize or roll back.
//!
//! ```text
//! PresentingHost ──▶ TransitioningDelegate ──▶ TransitionAnimator
//!       ▲                                            │
//!       └────────── TransitionSession::complete ◀────┘
//! ```

pub mod context;
pub mod provider;

use std::rc::Rc;
use std::time::Duration;

use crate::geometry::Rect;
use crate::layer::{ContainerRef, LayerRef};

pub use context::{SourceFrame, TransitionConfiguration, TransitionContext};
pub use provider::PhaseShiftTransitionProvider;

/// Which half of the round trip is animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionDirection {
    Presenting,
    Dismissing,
}

/// Participant lookup key. For a presentation `To` is the incoming unit; for
/// a dismissal `From` is the outgoing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticipantKey {
    From,
    To,
}

/// What the host exposes to an animator for one phase.
pub trait TransitionSession {
    /// Container the animation happens in. Its space is the one every frame
    /// below is expressed in.
    fn container(&self) -> Option<ContainerRef>;

    fn layer(&self, key: ParticipantKey) -> Option<LayerRef>;

    /// Frame the participant must occupy once the transition finishes.
    fn final_frame(&self, key: ParticipantKey) -> Option<Rect>;

    /// Report the end of the transition. `finished == false` tells the host
    /// to roll back.
    fn complete_transition(&self, finished: bool);
}

/// Animates one phase. Single use.
pub trait TransitionAnimator {
    fn transition_duration(&self) -> Duration;

    /// Start animating. Completion is reported through the session exactly
    /// once.
    fn animate_transition(self: Rc<Self>, session: Rc<dyn TransitionSession>);

    /// Stop a running animation where it is and report it unfinished.
    fn interrupt(&self);
}

/// Answers "who animates this phase" for a presented unit.
pub trait TransitioningDelegate {
    fn animator_for_presentation(&self) -> Option<Rc<dyn TransitionAnimator>>;

    fn animator_for_dismissal(&self) -> Option<Rc<dyn TransitionAnimator>>;
}
