//! The phase shift animator.
//!
//! One animator runs one phase:
//!
//! - **Presenting** attaches the destination layer to the container at its
//!   final frame, shifts it onto the source rectangle at half opacity, then
//!   springs it back to identity and full opacity.
//! - **Dismissing** measures the outgoing layer's live frame, then springs it
//!   toward the source center at [`DISMISS_SCALE`] while fading it out. The
//!   layer stays attached to the container for every frame; the host removes
//!   it after completion.
//!
//! Frames are tasks on the [`MainQueue`], one every [`FRAME_INTERVAL`]. The
//! phase ends on the first frame at or past the configured duration, which
//! applies the final state exactly and reports completion once.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, error, warn};

use super::easing::EasingFunction;
use super::interpolate::Interpolate;
use super::spring::SpringTiming;
use crate::error::SetupError;
use crate::geometry::{DISMISS_SCALE, PhaseShift, dismissal_shift, presentation_shift};
use crate::layer::{ContainerRef, Layer, LayerRef};
use crate::queue::MainQueue;
use crate::transition::{
    ParticipantKey, TransitionAnimator, TransitionContext, TransitionDirection, TransitionSession,
};

/// Spacing between animation frames (60 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_nanos(16_666_667);

/// Opacity a presented layer starts from. Dimmed, not invisible, so the
/// content never pops in.
pub const PRESENT_INITIAL_OPACITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimatorState {
    #[default]
    NotStarted,
    Animating,
    Completed,
}

/// Appearance of the animated layer at one end of the phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub shift: PhaseShift,
    pub opacity: f64,
}

impl Keyframe {
    pub const IDENTITY: Self = Self {
        shift: PhaseShift::identity(),
        opacity: 1.0,
    };

    fn of(layer: &Layer) -> Self {
        Self {
            shift: layer.shift,
            opacity: layer.opacity,
        }
    }

    fn apply(&self, layer: &mut Layer, scale_floor: f64) {
        layer.shift = PhaseShift::new(self.shift.translation, self.shift.scale.max(scale_floor));
        layer.opacity = self.opacity.clamp(0.0, 1.0);
    }
}

impl Interpolate for Keyframe {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Self {
            shift: self.shift.interpolate(&to.shift, t),
            opacity: self.opacity.interpolate(&to.opacity, t),
        }
    }
}

struct Run {
    session: Rc<dyn TransitionSession>,
    container: ContainerRef,
    layer: LayerRef,
    from: Keyframe,
    to: Keyframe,
    /// Spring overshoot must never push the scale through zero.
    scale_floor: f64,
    started_at: Duration,
}

struct Prepared {
    container: ContainerRef,
    layer: LayerRef,
    from: Keyframe,
    to: Keyframe,
}

pub struct PhaseShiftAnimator {
    direction: TransitionDirection,
    context: TransitionContext,
    queue: MainQueue,
    timing: SpringTiming,
    curve: EasingFunction,
    state: Cell<AnimatorState>,
    run: RefCell<Option<Run>>,
}

impl fmt::Debug for PhaseShiftAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseShiftAnimator")
            .field("direction", &self.direction)
            .field("context", &self.context)
            .field("state", &self.state.get())
            .finish()
    }
}

impl PhaseShiftAnimator {
    pub fn new(direction: TransitionDirection, context: TransitionContext, queue: MainQueue) -> Self {
        let configuration = context.configuration;
        let curve = match direction {
            TransitionDirection::Presenting => configuration.presentation_curve(),
            TransitionDirection::Dismissing => configuration.dismissal_curve(),
        };

        Self {
            direction,
            context,
            queue,
            timing: SpringTiming::new(
                configuration.duration(),
                configuration.damping(),
                configuration.initial_velocity(),
            ),
            curve,
            state: Cell::new(AnimatorState::NotStarted),
            run: RefCell::new(None),
        }
    }

    pub fn direction(&self) -> TransitionDirection {
        self.direction
    }

    pub fn state(&self) -> AnimatorState {
        self.state.get()
    }

    pub fn context(&self) -> &TransitionContext {
        &self.context
    }

    /// Progress `elapsed` seconds into the phase: eased time fed through the
    /// spring. Exactly 1.0 once the duration has passed.
    pub fn progress_at(&self, elapsed: f64) -> f64 {
        let duration = self.context.configuration.duration();
        if elapsed >= duration {
            return 1.0;
        }
        if elapsed <= 0.0 {
            return 0.0;
        }

        let eased = self.curve.evaluate(elapsed / duration);
        self.timing.position(eased * duration)
    }

    fn prepare(&self, session: &dyn TransitionSession) -> Result<Prepared, SetupError> {
        let container = session.container().ok_or(SetupError::MissingContainer)?;
        let source = container
            .borrow()
            .convert_from_window(&self.context.source_frame.rect());

        match self.direction {
            TransitionDirection::Presenting => {
                let layer = session
                    .layer(ParticipantKey::To)
                    .ok_or(SetupError::MissingLayer(ParticipantKey::To))?;
                let final_frame = session
                    .final_frame(ParticipantKey::To)
                    .ok_or(SetupError::MissingFinalFrame(ParticipantKey::To))?;

                let geometry = presentation_shift(&source, &final_frame);
                let from = Keyframe {
                    shift: geometry.shift,
                    opacity: PRESENT_INITIAL_OPACITY,
                };

                container.borrow_mut().add(&layer);
                {
                    let mut layer = layer.borrow_mut();
                    layer.frame = final_frame;
                    from.apply(&mut layer, 0.0);
                }

                Ok(Prepared {
                    container,
                    layer,
                    from,
                    to: Keyframe::IDENTITY,
                })
            }
            TransitionDirection::Dismissing => {
                let layer = session
                    .layer(ParticipantKey::From)
                    .ok_or(SetupError::MissingLayer(ParticipantKey::From))?;

                container.borrow_mut().add(&layer);
                let (from, live_frame) = {
                    let layer = layer.borrow();
                    (Keyframe::of(&layer), layer.presentation_frame())
                };

                // The delta is measured from the live frame, so it is added to
                // whatever shift the layer already carries.
                let delta = dismissal_shift(&live_frame, &source);
                let to = Keyframe {
                    shift: PhaseShift::new(from.shift.translation + delta.translation, delta.scale),
                    opacity: 0.0,
                };

                Ok(Prepared {
                    container,
                    layer,
                    from,
                    to,
                })
            }
        }
    }

    fn start(self: Rc<Self>, session: Rc<dyn TransitionSession>) {
        if self.state.get() != AnimatorState::NotStarted {
            warn!(direction = ?self.direction, "phase shift animator already used; ignoring");
            return;
        }

        match self.prepare(session.as_ref()) {
            Err(error) => {
                error!(%error, direction = ?self.direction, "phase shift transition setup failed");
                self.state.set(AnimatorState::Completed);
                session.complete_transition(false);
            }
            Ok(prepared) => {
                debug!(
                    direction = ?self.direction,
                    from = ?prepared.from,
                    to = ?prepared.to,
                    duration = self.context.configuration.duration(),
                    "phase shift transition started"
                );

                let scale_floor = prepared
                    .from
                    .shift
                    .scale
                    .min(prepared.to.shift.scale)
                    .min(DISMISS_SCALE);
                *self.run.borrow_mut() = Some(Run {
                    session,
                    container: prepared.container,
                    layer: prepared.layer,
                    from: prepared.from,
                    to: prepared.to,
                    scale_floor,
                    started_at: self.queue.now(),
                });
                self.state.set(AnimatorState::Animating);
                self.schedule_frame();
            }
        }
    }

    fn schedule_frame(self: &Rc<Self>) {
        let animator = Rc::clone(self);
        self.queue
            .dispatch_after(FRAME_INTERVAL, move || animator.step());
    }

    fn step(self: &Rc<Self>) {
        if self.state.get() != AnimatorState::Animating {
            return;
        }

        let done = {
            let run = self.run.borrow();
            let Some(run) = run.as_ref() else {
                return;
            };

            if self.direction == TransitionDirection::Dismissing
                && run.container.borrow_mut().add(&run.layer)
            {
                warn!("outgoing layer was detached mid-dismissal; reattached");
            }

            let elapsed = (self.queue.now().saturating_sub(run.started_at)).as_secs_f64();
            let done = elapsed >= self.context.configuration.duration();
            let keyframe = if done {
                run.to
            } else {
                run.from.interpolate(&run.to, self.progress_at(elapsed))
            };
            keyframe.apply(&mut run.layer.borrow_mut(), run.scale_floor);
            done
        };

        if done {
            self.finish(true);
        } else {
            self.schedule_frame();
        }
    }

    fn finish(&self, finished: bool) {
        if self.state.get() == AnimatorState::Completed {
            return;
        }
        self.state.set(AnimatorState::Completed);

        // Release the borrow before the host reacts to the completion.
        let run = self.run.borrow_mut().take();
        if let Some(run) = run {
            debug!(direction = ?self.direction, finished, "phase shift transition ended");
            run.session.complete_transition(finished);
        }
    }
}

impl TransitionAnimator for PhaseShiftAnimator {
    fn transition_duration(&self) -> Duration {
        self.context.configuration.transition_duration()
    }

    fn animate_transition(self: Rc<Self>, session: Rc<dyn TransitionSession>) {
        self.start(session);
    }

    fn interrupt(&self) {
        if self.state.get() == AnimatorState::Animating {
            debug!(direction = ?self.direction, "phase shift transition interrupted");
            self.finish(false);
        }
    }
}
