//! Presentation state machine.
//!
//! ```text
//!            present            host shows unit
//!   Idle ─────────────▶ InProgress ─────────────▶ Presenting
//!    ▲                                                │
//!    └────────────── dismissal completed ◀────────────┘
//! ```
//!
//! The [`PresentationCoordinator`] owns the state. The
//! [`synchronizer`] decides what an external "should be presented" flag
//! means for it.

pub mod coordinator;
pub mod events;
pub mod host;
pub mod synchronizer;

use serde::{Deserialize, Serialize};

pub use coordinator::{PresentationCoordinator, RETRY_BACKOFF};
pub use events::{EventQueue, MAX_PENDING_EVENTS, PresentationEvent};
pub use host::{ModalPresentationStyle, PresentationMarker, PresentedUnit, PresentingHost};
pub use synchronizer::{SyncAction, decide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationState {
    #[default]
    Idle,
    /// Accepted; the unit has not been handed to the host yet.
    InProgress,
    Presenting,
}
