//! Transition provider handing phase shift animators to hosts.

use std::rc::Rc;

use crate::animation::animator::PhaseShiftAnimator;
use crate::queue::MainQueue;

use super::{TransitionAnimator, TransitionContext, TransitionDirection, TransitioningDelegate};

/// Builds a fresh [`PhaseShiftAnimator`] for each phase, bound to the source
/// frame and configuration of the presentation it belongs to.
#[derive(Debug, Clone)]
pub struct PhaseShiftTransitionProvider {
    context: TransitionContext,
    queue: MainQueue,
}

impl PhaseShiftTransitionProvider {
    pub fn new(context: TransitionContext, queue: MainQueue) -> Self {
        Self { context, queue }
    }

    pub fn context(&self) -> &TransitionContext {
        &self.context
    }

    fn animator(&self, direction: TransitionDirection) -> Rc<dyn TransitionAnimator> {
        Rc::new(PhaseShiftAnimator::new(
            direction,
            self.context,
            self.queue.clone(),
        ))
    }
}

impl TransitioningDelegate for PhaseShiftTransitionProvider {
    fn animator_for_presentation(&self) -> Option<Rc<dyn TransitionAnimator>> {
        Some(self.animator(TransitionDirection::Presenting))
    }

    fn animator_for_dismissal(&self) -> Option<Rc<dyn TransitionAnimator>> {
        Some(self.animator(TransitionDirection::Dismissing))
    }
}
