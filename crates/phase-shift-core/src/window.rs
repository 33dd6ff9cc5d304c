//! Headless presenting host over a retained layer tree.
//!
//! `WindowHost` owns one transition container the size of its window. It
//! presents one unit at a time: for a custom-style unit it asks the unit's
//! delegate for an animator, hands it a session for the phase, and finalizes
//! or rolls back when the session completes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::geometry::Rect;
use crate::layer::{Container, ContainerRef, LayerRef};
use crate::presentation::{ModalPresentationStyle, PresentationMarker, PresentedUnit, PresentingHost};
use crate::queue::MainQueue;
use crate::transition::{ParticipantKey, TransitionAnimator, TransitionDirection, TransitionSession};

type Completion = Box<dyn FnOnce()>;

struct InFlight {
    direction: TransitionDirection,
    animator: Rc<dyn TransitionAnimator>,
    layer: LayerRef,
    completions: Vec<Completion>,
}

#[derive(Default)]
struct HostState {
    presented: Option<Rc<dyn PresentedUnit>>,
    in_flight: Option<InFlight>,
    /// Dismissals requested while the presentation was still animating.
    pending_dismissal: Vec<Completion>,
    present_calls: usize,
}

pub struct WindowHost {
    queue: MainQueue,
    container: ContainerRef,
    weak_self: Weak<Self>,
    state: RefCell<HostState>,
}

impl fmt::Debug for WindowHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("WindowHost")
            .field("bounds", &self.container.borrow().frame_in_window())
            .field("presented", &state.presented.as_ref().map(|unit| unit.marker()))
            .field("transitioning", &state.in_flight.as_ref().map(|in_flight| in_flight.direction))
            .field("present_calls", &state.present_calls)
            .finish()
    }
}

impl WindowHost {
    /// Host for a window occupying `bounds` in screen space. The container
    /// covers the whole window.
    pub fn new(queue: MainQueue, bounds: Rect) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            queue,
            container: Container::new(bounds).into_ref(),
            weak_self: weak_self.clone(),
            state: RefCell::new(HostState::default()),
        })
    }

    pub fn container(&self) -> ContainerRef {
        self.container.clone()
    }

    pub fn queue(&self) -> &MainQueue {
        &self.queue
    }

    /// Number of `present` calls received, accepted or not.
    pub fn present_calls(&self) -> usize {
        self.state.borrow().present_calls
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.borrow().in_flight.is_some()
    }

    pub fn transition_direction(&self) -> Option<TransitionDirection> {
        self.state.borrow().in_flight.as_ref().map(|in_flight| in_flight.direction)
    }

    pub fn presented_layer(&self) -> Option<LayerRef> {
        self.state.borrow().presented.as_ref().map(|unit| unit.root_layer())
    }

    /// Interrupt the running transition, if any. The phase rolls back.
    pub fn interrupt_transition(&self) {
        let animator = self
            .state
            .borrow()
            .in_flight
            .as_ref()
            .map(|in_flight| in_flight.animator.clone());
        if let Some(animator) = animator {
            animator.interrupt();
        }
    }

    /// Animator for one phase of `unit`. `None` runs the phase without
    /// animation.
    fn animator_for(unit: &dyn PresentedUnit, direction: TransitionDirection) -> Option<Rc<dyn TransitionAnimator>> {
        if unit.presentation_style() != ModalPresentationStyle::Custom {
            return None;
        }
        let delegate = unit.transitioning_delegate()?;
        match direction {
            TransitionDirection::Presenting => delegate.animator_for_presentation(),
            TransitionDirection::Dismissing => delegate.animator_for_dismissal(),
        }
    }

    fn begin(&self, direction: TransitionDirection, animator: Rc<dyn TransitionAnimator>, layer: LayerRef, completions: Vec<Completion>) {
        self.state.borrow_mut().in_flight = Some(InFlight {
            direction,
            animator: animator.clone(),
            layer: layer.clone(),
            completions,
        });

        debug!(?direction, duration = ?animator.transition_duration(), "transition started");
        let session = Rc::new(HostSession {
            host: self.weak_self.clone(),
            container: self.container.clone(),
            direction,
            layer,
            completed: Cell::new(false),
        });
        animator.animate_transition(session);
    }

    fn start_dismissal(&self, unit: Rc<dyn PresentedUnit>, completions: Vec<Completion>) {
        let layer = unit.root_layer();
        match Self::animator_for(unit.as_ref(), TransitionDirection::Dismissing) {
            Some(animator) => self.begin(TransitionDirection::Dismissing, animator, layer, completions),
            None => {
                self.container.borrow_mut().remove(&layer);
                self.state.borrow_mut().presented = None;
                debug!(marker = unit.marker().value(), "dismissed without animation");
                drop(unit);
                run_all(completions);
            }
        }
    }

    fn finish_transition(&self, direction: TransitionDirection, finished: bool) {
        let in_flight = {
            let mut state = self.state.borrow_mut();
            match state.in_flight.take() {
                Some(in_flight) if in_flight.direction == direction => in_flight,
                other => {
                    state.in_flight = other;
                    warn!(?direction, "completion for a transition that is not running");
                    return;
                }
            }
        };

        match (direction, finished) {
            (TransitionDirection::Presenting, true) => {
                debug!("presentation finished");
                let (unit, pending) = {
                    let mut state = self.state.borrow_mut();
                    (state.presented.clone(), std::mem::take(&mut state.pending_dismissal))
                };
                if !pending.is_empty() {
                    if let Some(unit) = unit {
                        self.start_dismissal(unit, pending);
                    }
                }
            }
            (TransitionDirection::Presenting, false) => {
                warn!("presentation did not finish; rolling back");
                self.container.borrow_mut().remove(&in_flight.layer);
                in_flight.layer.borrow_mut().reset_appearance();
                let (unit, pending) = {
                    let mut state = self.state.borrow_mut();
                    (state.presented.take(), std::mem::take(&mut state.pending_dismissal))
                };
                drop(unit);
                run_all(pending);
            }
            (TransitionDirection::Dismissing, true) => {
                self.container.borrow_mut().remove(&in_flight.layer);
                in_flight.layer.borrow_mut().reset_appearance();
                // Clear before the completions run so they observe an idle host.
                let unit = self.state.borrow_mut().presented.take();
                debug!(
                    marker = ?unit.as_ref().map(|unit| unit.marker().value()),
                    "dismissal finished"
                );
                drop(unit);
                run_all(in_flight.completions);
            }
            (TransitionDirection::Dismissing, false) => {
                warn!("dismissal did not finish; restoring presentation");
                in_flight.layer.borrow_mut().reset_appearance();
                self.container.borrow_mut().add(&in_flight.layer);
            }
        }
    }
}

fn run_all(completions: Vec<Completion>) {
    for completion in completions {
        completion();
    }
}

impl PresentingHost for WindowHost {
    fn has_active_presentation(&self) -> bool {
        self.state.borrow().presented.is_some()
    }

    fn presented_marker(&self) -> Option<PresentationMarker> {
        self.state.borrow().presented.as_ref().map(|unit| unit.marker())
    }

    fn present(&self, unit: Rc<dyn PresentedUnit>) {
        {
            let mut state = self.state.borrow_mut();
            state.present_calls += 1;
            if let Some(current) = state.presented.as_ref() {
                warn!(
                    current = current.marker().value(),
                    requested = unit.marker().value(),
                    "already presenting; ignoring present"
                );
                return;
            }
            state.presented = Some(unit.clone());
        }

        let host: Weak<dyn PresentingHost> = self.weak_self.clone();
        unit.attach_to(host);

        let layer = unit.root_layer();
        match Self::animator_for(unit.as_ref(), TransitionDirection::Presenting) {
            Some(animator) => self.begin(TransitionDirection::Presenting, animator, layer, Vec::new()),
            None => {
                let bounds = self.container.borrow().bounds();
                {
                    let mut layer = layer.borrow_mut();
                    layer.frame = bounds;
                    layer.reset_appearance();
                }
                self.container.borrow_mut().add(&layer);
                debug!(marker = unit.marker().value(), "presented without animation");
            }
        }
    }

    fn dismiss_presented(&self, completion: Box<dyn FnOnce()>) {
        let (presented, running) = {
            let state = self.state.borrow();
            (
                state.presented.clone(),
                state.in_flight.as_ref().map(|in_flight| in_flight.direction),
            )
        };
        let Some(unit) = presented else {
            debug!("nothing presented; completing dismissal");
            completion();
            return;
        };

        match running {
            Some(TransitionDirection::Dismissing) => {
                if let Some(in_flight) = self.state.borrow_mut().in_flight.as_mut() {
                    in_flight.completions.push(completion);
                }
            }
            Some(TransitionDirection::Presenting) => {
                debug!("presentation still animating; dismissal deferred");
                self.state.borrow_mut().pending_dismissal.push(completion);
            }
            None => self.start_dismissal(unit, vec![completion]),
        }
    }
}

/// The host side of one transition phase.
struct HostSession {
    host: Weak<WindowHost>,
    container: ContainerRef,
    direction: TransitionDirection,
    layer: LayerRef,
    completed: Cell<bool>,
}

impl TransitionSession for HostSession {
    fn container(&self) -> Option<ContainerRef> {
        Some(self.container.clone())
    }

    fn layer(&self, key: ParticipantKey) -> Option<LayerRef> {
        match (self.direction, key) {
            (TransitionDirection::Presenting, ParticipantKey::To)
            | (TransitionDirection::Dismissing, ParticipantKey::From) => Some(self.layer.clone()),
            _ => None,
        }
    }

    fn final_frame(&self, key: ParticipantKey) -> Option<Rect> {
        match (self.direction, key) {
            (TransitionDirection::Presenting, ParticipantKey::To) => Some(self.container.borrow().bounds()),
            _ => None,
        }
    }

    fn complete_transition(&self, finished: bool) {
        if self.completed.replace(true) {
            warn!(direction = ?self.direction, "transition completed twice; ignoring");
            return;
        }
        if let Some(host) = self.host.upgrade() {
            host.finish_transition(self.direction, finished);
        }
    }
}
