//! Presentation lifecycle events.
//!
//! The coordinator records one event per decision it takes. Callers poll them
//! with [`PresentationCoordinator::drain_events`](super::PresentationCoordinator::drain_events).

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::PresentationState;
use super::host::PresentationMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PresentationEvent {
    /// A `present` call moved the coordinator from idle to in progress.
    Accepted,
    /// A `present` call arrived while another presentation was active.
    Rejected {
        /// State at the time of the call.
        state: PresentationState,
    },
    /// The host was busy; a retry runs after the backoff.
    RetryScheduled,
    /// A pending retry found nothing left to do.
    RetryAbandoned,
    /// The host was asked to display the unit.
    Presented { marker: PresentationMarker },
    /// Dismissal completed and the callback fired.
    Dismissed { marker: PresentationMarker },
    /// State was forced back to idle without a dismissal.
    Reset {
        /// State before the reset.
        from: PresentationState,
    },
}

impl PresentationEvent {
    pub fn marker(&self) -> Option<PresentationMarker> {
        match self {
            Self::Presented { marker } | Self::Dismissed { marker } => Some(*marker),
            _ => None,
        }
    }

    pub fn is_retry(&self) -> bool {
        matches!(self, Self::RetryScheduled | Self::RetryAbandoned)
    }
}

/// Events kept for a caller that never drains. The oldest are dropped first.
pub const MAX_PENDING_EVENTS: usize = 256;

#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<PresentationEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PresentationEvent) {
        if self.events.len() == MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn pop(&mut self) -> Option<PresentationEvent> {
        self.events.pop_front()
    }

    /// Drain all events from the queue, returning an iterator.
    pub fn drain(&mut self) -> impl Iterator<Item = PresentationEvent> + '_ {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
