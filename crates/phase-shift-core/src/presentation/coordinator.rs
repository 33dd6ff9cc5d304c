use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, warn};

use super::events::{EventQueue, PresentationEvent};
use super::host::{PresentationMarker, PresentedUnit, PresentingHost};
use super::synchronizer::{SyncAction, decide};
use super::PresentationState;
use crate::content::{Content, DismissAction};
use crate::queue::MainQueue;
use crate::transition::{
    PhaseShiftTransitionProvider, SourceFrame, TransitionConfiguration, TransitionContext,
};

/// Delay before a presentation blocked by a busy host is tried again.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(100);

type DismissCallback = Box<dyn FnOnce()>;

#[derive(Default)]
struct Inner {
    state: PresentationState,
    host: Option<Weak<dyn PresentingHost>>,
    unit: Option<Weak<dyn PresentedUnit>>,
    marker: Option<PresentationMarker>,
    configuration: Option<TransitionConfiguration>,
    on_dismiss: Option<DismissCallback>,
    /// Last flag passed to `update_presentation_state`.
    desired: Option<bool>,
    /// Bumped on every write to `desired`.
    desired_revision: u64,
    sync_retry_pending: bool,
    /// Bumped on every accepted `present`, so a continuation from an
    /// abandoned attempt cannot start a later one.
    attempt: u64,
    events: EventQueue,
}

impl Inner {
    /// Back to idle. Returns the dismissal callback so it can be run or
    /// dropped outside the borrow.
    fn clear(&mut self) -> Option<DismissCallback> {
        self.state = PresentationState::Idle;
        self.host = None;
        self.unit = None;
        self.marker = None;
        self.configuration = None;
        self.on_dismiss.take()
    }
}

/// Presents one modal at a time through a [`PresentingHost`].
///
/// Only weak references to the host and the presented unit are kept; the
/// host owns the unit. All continuations run on the [`MainQueue`] and
/// re-check state when they fire.
pub struct PresentationCoordinator {
    queue: MainQueue,
    weak_self: Weak<Self>,
    inner: RefCell<Inner>,
}

impl fmt::Debug for PresentationCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("PresentationCoordinator")
            .field("state", &inner.state)
            .field("marker", &inner.marker)
            .field("configuration", &inner.configuration)
            .field("desired", &inner.desired)
            .finish()
    }
}

impl PresentationCoordinator {
    pub fn new(queue: MainQueue) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            queue,
            weak_self: weak_self.clone(),
            inner: RefCell::new(Inner::default()),
        })
    }

    pub fn state(&self) -> PresentationState {
        self.inner.borrow().state
    }

    /// True only once the unit has been handed to the host.
    pub fn is_presenting(&self) -> bool {
        self.state() == PresentationState::Presenting
    }

    /// Configuration of the current presentation.
    pub fn configuration(&self) -> Option<TransitionConfiguration> {
        self.inner.borrow().configuration
    }

    pub fn marker(&self) -> Option<PresentationMarker> {
        self.inner.borrow().marker
    }

    pub fn has_host(&self) -> bool {
        self.inner.borrow().host.is_some()
    }

    pub fn has_presented_unit(&self) -> bool {
        self.inner.borrow().unit.is_some()
    }

    pub fn has_dismiss_handler(&self) -> bool {
        self.inner.borrow().on_dismiss.is_some()
    }

    /// Events recorded since the last drain, oldest first. At most
    /// [`MAX_PENDING_EVENTS`](super::events::MAX_PENDING_EVENTS) are kept.
    pub fn drain_events(&self) -> Vec<PresentationEvent> {
        self.inner.borrow_mut().events.drain().collect()
    }

    pub fn queue(&self) -> &MainQueue {
        &self.queue
    }

    /// Present `content`, growing out of `source_frame`.
    ///
    /// Ignored unless idle. When `host` is already showing something else the
    /// call is re-run from scratch after [`RETRY_BACKOFF`]. Otherwise the
    /// coordinator is in progress when this returns and the unit reaches the
    /// host on the next turn of the queue. `on_dismiss` runs once the
    /// presentation has been dismissed.
    pub fn present(
        &self,
        content: Content,
        source_frame: SourceFrame,
        configuration: TransitionConfiguration,
        host: &Rc<dyn PresentingHost>,
        on_dismiss: impl FnOnce() + 'static,
    ) {
        let state = self.state();
        if state != PresentationState::Idle {
            debug!(?state, "presentation already active; ignoring present");
            self.push_event(PresentationEvent::Rejected { state });
            return;
        }

        if host.has_active_presentation() {
            debug!(
                backoff_ms = RETRY_BACKOFF.as_millis() as u64,
                "host busy with another presentation; retrying"
            );
            self.push_event(PresentationEvent::RetryScheduled);
            self.schedule_present_retry(content, source_frame, configuration, host, Box::new(on_dismiss));
            return;
        }

        {
            let mut inner = self.inner.borrow_mut();
            inner.state = PresentationState::InProgress;
            inner.attempt += 1;
            inner.host = Some(Rc::downgrade(host));
            inner.configuration = Some(configuration);
            inner.on_dismiss = Some(Box::new(on_dismiss));
            inner.events.push(PresentationEvent::Accepted);
        }
        debug!(?source_frame, "presentation accepted");

        let attempt = self.inner.borrow().attempt;
        let coordinator = self.weak_self.clone();
        self.queue.dispatch(move || {
            if let Some(coordinator) = coordinator.upgrade() {
                coordinator.begin_presentation(attempt, content, source_frame);
            }
        });
    }

    fn schedule_present_retry(
        &self,
        content: Content,
        source_frame: SourceFrame,
        configuration: TransitionConfiguration,
        host: &Rc<dyn PresentingHost>,
        on_dismiss: DismissCallback,
    ) {
        let coordinator = self.weak_self.clone();
        let host = Rc::downgrade(host);
        let revision_at_call = self.inner.borrow().desired_revision;
        self.queue.dispatch_after(RETRY_BACKOFF, move || {
            let Some(coordinator) = coordinator.upgrade() else {
                return;
            };
            let Some(host) = host.upgrade() else {
                coordinator.abandon_retry("presenting host released");
                return;
            };

            let (state, desired, revision) = {
                let inner = coordinator.inner.borrow();
                (inner.state, inner.desired, inner.desired_revision)
            };
            if state != PresentationState::Idle {
                coordinator.abandon_retry("another presentation started");
                return;
            }
            // Only a flag lowered after the call cancels it.
            if desired == Some(false) && revision != revision_at_call {
                coordinator.abandon_retry("presentation no longer desired");
                return;
            }

            coordinator.present(content, source_frame, configuration, &host, on_dismiss);
        });
    }

    fn begin_presentation(&self, attempt: u64, content: Content, source_frame: SourceFrame) {
        let (state, current, host, configuration) = {
            let inner = self.inner.borrow();
            (
                inner.state,
                inner.attempt,
                inner.host.as_ref().and_then(Weak::upgrade),
                inner.configuration,
            )
        };
        if state != PresentationState::InProgress || current != attempt {
            debug!(?state, "presentation cancelled before it started");
            return;
        }
        let Some(host) = host else {
            warn!("presenting host released before the presentation started");
            self.reset();
            return;
        };
        let configuration = configuration.unwrap_or_default();

        if host.has_active_presentation() {
            // The host got busy within the turn. Start over, which schedules
            // the backoff retry.
            let on_dismiss = self
                .inner
                .borrow_mut()
                .clear()
                .unwrap_or_else(|| Box::new(|| {}));
            self.present(content, source_frame, configuration, &host, on_dismiss);
            return;
        }

        let provider = Rc::new(PhaseShiftTransitionProvider::new(
            TransitionContext::new(source_frame, configuration),
            self.queue.clone(),
        ));
        let unit = content.into_unit(provider, self.dismiss_action());
        let marker = unit.marker();

        {
            let mut inner = self.inner.borrow_mut();
            inner.unit = Some(Rc::downgrade(&unit));
            inner.marker = Some(marker);
            inner.state = PresentationState::Presenting;
            inner.events.push(PresentationEvent::Presented { marker });
        }
        debug!(marker = marker.value(), "handing unit to presenting host");

        host.present(unit);
    }

    /// A dismissal trigger bound to this coordinator. Does nothing once the
    /// coordinator is gone.
    pub fn dismiss_action(&self) -> DismissAction {
        let coordinator = self.weak_self.clone();
        DismissAction::new(move || {
            if let Some(coordinator) = coordinator.upgrade() {
                coordinator.dismiss();
            }
        })
    }

    /// Dismiss the current presentation. Ignored unless presenting.
    pub fn dismiss(&self) {
        let (state, unit, marker, host) = {
            let inner = self.inner.borrow();
            (
                inner.state,
                inner.unit.as_ref().and_then(Weak::upgrade),
                inner.marker,
                inner.host.as_ref().and_then(Weak::upgrade),
            )
        };
        if state != PresentationState::Presenting {
            debug!(?state, "nothing presented; ignoring dismiss");
            return;
        }
        let Some(marker) = marker else {
            warn!("presenting without a marker; resetting");
            self.reset();
            return;
        };
        let Some(unit) = unit else {
            debug!(marker = marker.value(), "presented unit already released");
            self.finish_dismissal(marker);
            return;
        };

        if let Some(host) = host {
            let on_top = host.presented_marker();
            if on_top != Some(marker) {
                warn!(
                    marker = marker.value(),
                    on_top = ?on_top.map(|marker| marker.value()),
                    "host is not showing our presentation; resetting"
                );
                self.reset();
                return;
            }
        }

        debug!(marker = marker.value(), "dismissing presentation");
        let coordinator = self.weak_self.clone();
        unit.dismiss(Box::new(move || {
            if let Some(coordinator) = coordinator.upgrade() {
                coordinator.finish_dismissal(marker);
            }
        }));
    }

    fn finish_dismissal(&self, marker: PresentationMarker) {
        let on_dismiss = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != PresentationState::Presenting || inner.marker != Some(marker) {
                debug!(marker = marker.value(), "stale dismissal completion");
                return;
            }
            let on_dismiss = inner.clear();
            inner.events.push(PresentationEvent::Dismissed { marker });
            on_dismiss
        };

        debug!(marker = marker.value(), "presentation dismissed");
        if let Some(on_dismiss) = on_dismiss {
            on_dismiss();
        }
    }

    /// Force the coordinator back to idle without running the dismissal
    /// callback.
    pub fn reset(&self) {
        let (from, dropped) = {
            let mut inner = self.inner.borrow_mut();
            let from = inner.state;
            if from == PresentationState::Idle {
                return;
            }
            let dropped = inner.clear();
            inner.events.push(PresentationEvent::Reset { from });
            (from, dropped)
        };

        warn!(?from, "presentation state reset to idle");
        drop(dropped);
    }

    /// Reconcile an external "should be presented" flag. The decision is
    /// re-derived on every call; a scheduled retry calls back in with the
    /// latest flag.
    pub fn update_presentation_state(&self, desired: bool, host: &Rc<dyn PresentingHost>) -> SyncAction {
        {
            let mut inner = self.inner.borrow_mut();
            inner.desired = Some(desired);
            inner.desired_revision += 1;
        }

        let is_presenting = self.is_presenting();
        let host_active = host.has_active_presentation();
        let action = decide(desired, is_presenting, host_active);
        debug!(desired, is_presenting, host_active, ?action, "presentation state sync");

        match action {
            SyncAction::RetryAfterBackoff => self.schedule_sync_retry(host),
            SyncAction::Dismiss => self.dismiss(),
            SyncAction::Reset => {
                warn!("host has no active presentation while presenting");
                self.reset();
            }
            SyncAction::None => {}
        }
        action
    }

    fn schedule_sync_retry(&self, host: &Rc<dyn PresentingHost>) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.sync_retry_pending {
                return;
            }
            inner.sync_retry_pending = true;
            inner.events.push(PresentationEvent::RetryScheduled);
        }

        let coordinator = self.weak_self.clone();
        let host = Rc::downgrade(host);
        self.queue.dispatch_after(RETRY_BACKOFF, move || {
            let Some(coordinator) = coordinator.upgrade() else {
                return;
            };
            let desired = {
                let mut inner = coordinator.inner.borrow_mut();
                inner.sync_retry_pending = false;
                inner.desired
            };
            let Some(host) = host.upgrade() else {
                coordinator.abandon_retry("presenting host released");
                return;
            };

            match desired {
                Some(desired) => {
                    coordinator.update_presentation_state(desired, &host);
                }
                None => coordinator.abandon_retry("no desired state recorded"),
            }
        });
    }

    fn abandon_retry(&self, reason: &'static str) {
        debug!(reason, "presentation retry abandoned");
        self.push_event(PresentationEvent::RetryAbandoned);
    }

    fn push_event(&self, event: PresentationEvent) {
        self.inner.borrow_mut().events.push(event);
    }
}
