use std::cell::{Cell, RefCell};
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use phase_shift_core::content::{NavigationDepth, Navigator};
use phase_shift_core::{
    Content, DismissAction, Environment, MainQueue, PhaseShiftTransitionProvider,
    PresentationCoordinator, PresentationEvent, PresentationState, PresentingHost, RETRY_BACKOFF,
    Rect, Screen, SourceFrame, SyncAction, TransitionConfiguration, TransitionContext, WindowHost,
};

const WINDOW: Rect = Rect::new(0.0, 0.0, 400.0, 800.0);
const CELL: SourceFrame = SourceFrame::new(40.0, 100.0, 80.0, 80.0);

/// Screen that hands its environment back to the test.
#[derive(Default, Clone)]
struct Capture {
    environment: Rc<RefCell<Option<Environment>>>,
}

impl Capture {
    fn environment(&self) -> Environment {
        self.environment
            .borrow()
            .clone()
            .expect("screen never appeared")
    }
}

impl Screen for Capture {
    fn on_appear(&mut self, environment: &Environment) {
        *self.environment.borrow_mut() = Some(environment.clone());
    }
}

struct Fixture {
    queue: MainQueue,
    window: Rc<WindowHost>,
    host: Rc<dyn PresentingHost>,
    coordinator: Rc<PresentationCoordinator>,
}

impl Fixture {
    fn new() -> Self {
        let queue = MainQueue::new();
        let window = WindowHost::new(queue.clone(), WINDOW);
        let host: Rc<dyn PresentingHost> = window.clone();
        let coordinator = PresentationCoordinator::new(queue.clone());
        Self {
            queue,
            window,
            host,
            coordinator,
        }
    }

    fn present(&self, content: Content, on_dismiss: impl FnOnce() + 'static) {
        self.coordinator.present(
            content,
            CELL,
            TransitionConfiguration::fast(),
            &self.host,
            on_dismiss,
        );
    }

    /// Put an unrelated unit on screen, bypassing the coordinator.
    fn present_foreign(&self) {
        let provider = Rc::new(PhaseShiftTransitionProvider::new(
            TransitionContext::new(CELL, TransitionConfiguration::fast()),
            self.queue.clone(),
        ));
        let unit = Content::single(Capture::default()).into_unit(provider, DismissAction::new(|| {}));
        self.window.present(unit);
        self.queue.run_until_idle();
    }
}

fn counter() -> (Rc<Cell<usize>>, impl FnOnce() + 'static) {
    let count = Rc::new(Cell::new(0));
    let handle = count.clone();
    (count, move || handle.set(handle.get() + 1))
}

#[test]
fn two_presents_on_the_same_turn_reach_the_host_once() {
    let fixture = Fixture::new();

    fixture.present(Content::single(Capture::default()), || {});
    fixture.present(Content::single(Capture::default()), || {});
    fixture.queue.run_until_idle();

    assert_eq!(fixture.window.present_calls(), 1);
    assert_eq!(fixture.coordinator.state(), PresentationState::Presenting);
    assert_eq!(fixture.window.container().borrow().len(), 1);
}

#[test]
fn present_while_in_progress_leaves_state_alone() {
    let fixture = Fixture::new();

    fixture.present(Content::single(Capture::default()), || {});
    assert_eq!(fixture.coordinator.state(), PresentationState::InProgress);

    fixture.present(Content::navigation(Capture::default()), || {});
    assert_eq!(fixture.coordinator.state(), PresentationState::InProgress);
    assert_eq!(fixture.window.present_calls(), 0);

    let events = fixture.coordinator.drain_events();
    assert_eq!(
        events,
        vec![
            PresentationEvent::Accepted,
            PresentationEvent::Rejected {
                state: PresentationState::InProgress
            },
        ]
    );
}

#[test]
fn presented_layer_grows_from_the_cell() {
    let fixture = Fixture::new();
    fixture.present(Content::single(Capture::default()), || {});
    fixture.queue.turn();

    let layer = fixture.window.presented_layer().expect("unit presented");
    {
        let layer = layer.borrow();
        assert!((layer.shift.scale - 0.1).abs() < 1e-9);
        assert!((layer.shift.translation.dx + 120.0).abs() < 1e-9);
        assert!((layer.shift.translation.dy + 260.0).abs() < 1e-9);
    }

    fixture.queue.run_until_idle();
    let layer = layer.borrow();
    assert_eq!(layer.frame, WINDOW);
    assert!(layer.shift.is_identity(1e-12));
    assert_eq!(layer.opacity, 1.0);
}

#[test]
fn dismissing_twice_calls_back_once() {
    let fixture = Fixture::new();
    let (dismissed, on_dismiss) = counter();

    fixture.present(Content::single(Capture::default()), on_dismiss);
    fixture.queue.run_until_idle();

    fixture.coordinator.dismiss();
    fixture.coordinator.dismiss();
    fixture.queue.run_until_idle();
    fixture.coordinator.dismiss();
    fixture.queue.run_until_idle();

    assert_eq!(dismissed.get(), 1);
    assert_eq!(fixture.coordinator.state(), PresentationState::Idle);
    assert!(!fixture.window.has_active_presentation());
    assert!(fixture.window.container().borrow().is_empty());
}

#[test]
fn busy_host_is_retried_on_the_backoff_without_spinning() {
    let fixture = Fixture::new();
    fixture.present_foreign();

    fixture.present(Content::single(Capture::default()), || {});
    assert_eq!(fixture.coordinator.state(), PresentationState::Idle);
    assert_eq!(fixture.queue.pending(), 1);

    // Each retry runs once per backoff and leaves exactly one successor.
    for _ in 0..5 {
        assert_eq!(fixture.queue.advance(RETRY_BACKOFF), 1);
        assert_eq!(fixture.queue.pending(), 1);
    }
    assert_eq!(fixture.window.present_calls(), 1);

    let (done, completion) = counter();
    fixture.window.dismiss_presented(Box::new(completion));
    fixture.queue.run_until_idle();

    assert_eq!(done.get(), 1);
    assert_eq!(fixture.window.present_calls(), 2);
    assert!(fixture.coordinator.is_presenting());
    assert_eq!(fixture.coordinator.marker(), fixture.window.presented_marker());
}

#[test]
fn retry_is_abandoned_once_presentation_is_no_longer_wanted() {
    let fixture = Fixture::new();
    fixture.present_foreign();

    fixture.present(Content::single(Capture::default()), || {});
    let action = fixture.coordinator.update_presentation_state(false, &fixture.host);
    assert_eq!(action, SyncAction::None);

    fixture.queue.advance(RETRY_BACKOFF);
    assert!(fixture.queue.is_idle());
    assert_eq!(fixture.window.present_calls(), 1);
    assert!(
        fixture
            .coordinator
            .drain_events()
            .contains(&PresentationEvent::RetryAbandoned)
    );
}

#[test]
fn flag_lowered_before_the_call_does_not_cancel_its_retry() {
    let fixture = Fixture::new();

    fixture.present(Content::single(Capture::default()), || {});
    fixture.queue.run_until_idle();
    fixture.coordinator.update_presentation_state(true, &fixture.host);
    assert_eq!(
        fixture.coordinator.update_presentation_state(false, &fixture.host),
        SyncAction::Dismiss
    );
    fixture.queue.run_until_idle();
    assert_eq!(fixture.coordinator.state(), PresentationState::Idle);
    fixture.coordinator.drain_events();

    fixture.present_foreign();
    let calls_before = fixture.window.present_calls();
    let (dismissed, on_dismiss) = counter();
    fixture.present(Content::single(Capture::default()), on_dismiss);
    assert_eq!(
        fixture.coordinator.drain_events(),
        vec![PresentationEvent::RetryScheduled]
    );

    fixture.window.dismiss_presented(Box::new(|| {}));
    fixture.queue.run_until_idle();

    assert!(fixture.coordinator.is_presenting());
    assert_eq!(fixture.window.present_calls(), calls_before + 1);
    assert_eq!(fixture.coordinator.marker(), fixture.window.presented_marker());
    assert!(
        !fixture
            .coordinator
            .drain_events()
            .contains(&PresentationEvent::RetryAbandoned)
    );

    fixture.coordinator.dismiss();
    fixture.queue.run_until_idle();
    assert_eq!(dismissed.get(), 1);
}

#[test]
fn flag_flip_dismisses_then_accepts_immediately() {
    let fixture = Fixture::new();
    let (dismissed, on_dismiss) = counter();

    fixture.present(Content::single(Capture::default()), on_dismiss);
    fixture.queue.run_until_idle();
    assert_eq!(
        fixture.coordinator.update_presentation_state(true, &fixture.host),
        SyncAction::None
    );

    assert_eq!(
        fixture.coordinator.update_presentation_state(false, &fixture.host),
        SyncAction::Dismiss
    );
    fixture.queue.run_until_idle();
    assert_eq!(dismissed.get(), 1);
    assert!(!fixture.coordinator.is_presenting());
    fixture.coordinator.drain_events();

    assert_eq!(
        fixture.coordinator.update_presentation_state(true, &fixture.host),
        SyncAction::None
    );
    fixture.present(Content::single(Capture::default()), || {});
    assert_eq!(fixture.coordinator.state(), PresentationState::InProgress);
    assert_eq!(fixture.coordinator.drain_events(), vec![PresentationEvent::Accepted]);
}

#[test]
fn round_trip_clears_tracked_state() {
    let fixture = Fixture::new();

    fixture.present(Content::single(Capture::default()), || {});
    fixture.queue.turn();
    assert!(fixture.coordinator.has_host());
    assert!(fixture.coordinator.has_presented_unit());
    assert!(fixture.coordinator.has_dismiss_handler());
    assert_eq!(
        fixture.coordinator.configuration(),
        Some(TransitionConfiguration::fast())
    );

    fixture.coordinator.dismiss();
    fixture.queue.run_until_idle();

    assert_eq!(fixture.coordinator.state(), PresentationState::Idle);
    assert!(!fixture.coordinator.has_host());
    assert!(!fixture.coordinator.has_presented_unit());
    assert!(!fixture.coordinator.has_dismiss_handler());
    assert_eq!(fixture.coordinator.configuration(), None);
    assert_eq!(fixture.coordinator.marker(), None);
}

#[test]
fn nested_navigation_screen_can_dismiss() {
    let fixture = Fixture::new();
    let (dismissed, on_dismiss) = counter();
    let root = Capture::default();

    fixture.present(Content::navigation(root.clone()), on_dismiss);
    fixture.queue.run_until_idle();

    let navigator = root
        .environment()
        .get::<Navigator>()
        .cloned()
        .expect("navigation root gets a navigator");
    let detail = Capture::default();
    let deeper = Capture::default();
    assert!(navigator.push(detail));
    assert!(navigator.push(deeper.clone()));
    assert_eq!(navigator.depth(), 3);

    let environment = deeper.environment();
    assert_eq!(environment.get::<NavigationDepth>(), Some(&NavigationDepth(2)));
    assert!(environment.dismiss());
    fixture.queue.run_until_idle();

    assert_eq!(dismissed.get(), 1);
    assert_eq!(fixture.coordinator.state(), PresentationState::Idle);
    // The host released the unit, so the stack is gone too.
    assert_eq!(navigator.depth(), 0);

    // A stale trigger reaches an idle coordinator and does nothing.
    assert!(environment.dismiss());
    fixture.queue.run_until_idle();
    assert_eq!(dismissed.get(), 1);
}

#[test]
fn interrupted_presentation_is_reset_by_sync() {
    let fixture = Fixture::new();
    let (dismissed, on_dismiss) = counter();

    fixture.present(Content::single(Capture::default()), on_dismiss);
    fixture.queue.turn();
    fixture.queue.advance(Duration::from_millis(50));
    fixture.window.interrupt_transition();

    assert!(fixture.coordinator.is_presenting());
    assert!(!fixture.window.has_active_presentation());
    assert_eq!(
        fixture.coordinator.update_presentation_state(true, &fixture.host),
        SyncAction::Reset
    );
    assert_eq!(fixture.coordinator.state(), PresentationState::Idle);
    assert_eq!(dismissed.get(), 0);

    fixture.present(Content::single(Capture::default()), || {});
    fixture.queue.run_until_idle();
    assert!(fixture.coordinator.is_presenting());
    assert_eq!(fixture.window.present_calls(), 2);
}

#[test]
fn presentation_uses_file_configuration() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "[transition]\nduration = 0.2\ndamping = 1.0")?;
    let configuration = TransitionConfiguration::load_from_file(file.path())?;

    let fixture = Fixture::new();
    fixture.coordinator.present(
        Content::single(Capture::default()),
        CELL,
        configuration,
        &fixture.host,
        || {},
    );
    fixture.queue.turn();
    assert_eq!(fixture.coordinator.configuration(), Some(configuration));

    fixture.queue.advance(Duration::from_millis(190));
    assert!(fixture.window.is_transitioning());
    fixture.queue.advance(Duration::from_millis(20));
    assert!(!fixture.window.is_transitioning());
    Ok(())
}

#[test]
fn dropped_coordinator_leaves_dismiss_action_inert() {
    let fixture = Fixture::new();
    let root = Capture::default();
    fixture.present(Content::single(root.clone()), || {});
    fixture.queue.run_until_idle();

    let Fixture {
        queue,
        window,
        coordinator,
        ..
    } = fixture;
    drop(coordinator);

    assert!(root.environment().dismiss());
    queue.run_until_idle();
    assert!(window.has_active_presentation());
}
