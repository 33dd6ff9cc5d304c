//! Presentable wrappers around caller content.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use super::dismiss::DismissAction;
use super::environment::Environment;
use crate::geometry::Rect;
use crate::layer::{Layer, LayerRef};
use crate::presentation::{ModalPresentationStyle, PresentationMarker, PresentedUnit, PresentingHost};
use crate::transition::TransitioningDelegate;

/// Caller-supplied content. Receives the environment once it is placed in a
/// host.
pub trait Screen {
    fn on_appear(&mut self, environment: &Environment);

    /// Called when the screen is popped or its host is released.
    fn on_disappear(&mut self) {}
}

/// Stack position of a screen inside a [`NavigationHost`]. The root is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationDepth(pub usize);

/// Handle to the enclosing navigation stack, found in the environment of
/// every screen a [`NavigationHost`] holds.
#[derive(Clone)]
pub struct Navigator {
    host: Weak<NavigationHost>,
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("attached", &(self.host.strong_count() > 0))
            .finish()
    }
}

impl Navigator {
    /// Push `screen`. Returns false once the stack is gone.
    pub fn push(&self, screen: impl Screen + 'static) -> bool {
        match self.host.upgrade() {
            Some(host) => {
                host.push(Box::new(screen));
                true
            }
            None => false,
        }
    }

    pub fn pop(&self) -> bool {
        self.host.upgrade().is_some_and(|host| host.pop())
    }

    pub fn depth(&self) -> usize {
        self.host.upgrade().map_or(0, |host| host.depth())
    }
}

/// Content to present, and the wrapper it goes in.
pub enum Content {
    Single(Box<dyn Screen>),
    Navigation(Box<dyn Screen>),
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(_) => f.write_str("Content::Single"),
            Self::Navigation(_) => f.write_str("Content::Navigation"),
        }
    }
}

impl Content {
    pub fn single(screen: impl Screen + 'static) -> Self {
        Self::Single(Box::new(screen))
    }

    pub fn navigation(root: impl Screen + 'static) -> Self {
        Self::Navigation(Box::new(root))
    }

    /// Wrap the content in its host, bound to `delegate` for transitions.
    pub fn into_unit(
        self,
        delegate: Rc<dyn TransitioningDelegate>,
        dismiss: DismissAction,
    ) -> Rc<dyn PresentedUnit> {
        match self {
            Self::Single(screen) => ContentHost::new(screen, delegate, dismiss),
            Self::Navigation(root) => NavigationHost::new(root, delegate, dismiss),
        }
    }
}

/// State every wrapper carries for the host.
struct UnitCore {
    marker: PresentationMarker,
    layer: LayerRef,
    delegate: Rc<dyn TransitioningDelegate>,
    host: RefCell<Option<Weak<dyn PresentingHost>>>,
}

impl UnitCore {
    fn new(delegate: Rc<dyn TransitioningDelegate>) -> Self {
        Self {
            marker: PresentationMarker::new(),
            layer: Layer::new(Rect::ZERO).into_ref(),
            delegate,
            host: RefCell::new(None),
        }
    }

    fn dismiss(&self, completion: Box<dyn FnOnce()>) {
        let host = self.host.borrow().as_ref().and_then(Weak::upgrade);
        match host {
            Some(host) => host.dismiss_presented(completion),
            None => {
                debug!(marker = self.marker.value(), "unit has no presenting host; dismissal is immediate");
                completion();
            }
        }
    }
}

macro_rules! presented_unit_via_core {
    ($host:ty) => {
        impl PresentedUnit for $host {
            fn marker(&self) -> PresentationMarker {
                self.core.marker
            }

            fn root_layer(&self) -> LayerRef {
                self.core.layer.clone()
            }

            fn presentation_style(&self) -> ModalPresentationStyle {
                ModalPresentationStyle::Custom
            }

            fn transitioning_delegate(&self) -> Option<Rc<dyn TransitioningDelegate>> {
                Some(self.core.delegate.clone())
            }

            fn attach_to(&self, host: Weak<dyn PresentingHost>) {
                *self.core.host.borrow_mut() = Some(host);
            }

            fn dismiss(&self, completion: Box<dyn FnOnce()>) {
                self.core.dismiss(completion);
            }
        }
    };
}

/// Wraps a single screen.
pub struct ContentHost {
    core: UnitCore,
    environment: Environment,
    screen: Box<dyn Screen>,
}

impl ContentHost {
    pub fn new(
        mut screen: Box<dyn Screen>,
        delegate: Rc<dyn TransitioningDelegate>,
        dismiss: DismissAction,
    ) -> Rc<Self> {
        let environment = Environment::new().with(dismiss);
        screen.on_appear(&environment);

        Rc::new(Self {
            core: UnitCore::new(delegate),
            environment,
            screen,
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}

impl Drop for ContentHost {
    fn drop(&mut self) {
        self.screen.on_disappear();
    }
}

presented_unit_via_core!(ContentHost);

struct StackEntry {
    screen: Rc<RefCell<Box<dyn Screen>>>,
    environment: Environment,
}

impl StackEntry {
    fn disappear(&self) {
        // A screen popped from inside its own callback is already borrowed.
        if let Ok(mut screen) = self.screen.try_borrow_mut() {
            screen.on_disappear();
        }
    }
}

/// Wraps a root screen in a navigation stack. Pushed screens get a child of
/// the root environment, so the dismissal trigger set at the top reaches
/// every level.
pub struct NavigationHost {
    core: UnitCore,
    root_environment: Environment,
    stack: RefCell<Vec<StackEntry>>,
}

impl NavigationHost {
    pub fn new(
        root: Box<dyn Screen>,
        delegate: Rc<dyn TransitioningDelegate>,
        dismiss: DismissAction,
    ) -> Rc<Self> {
        let host = Rc::new_cyclic(|weak_self| Self {
            core: UnitCore::new(delegate),
            root_environment: Environment::new().with(dismiss).with(Navigator {
                host: weak_self.clone(),
            }),
            stack: RefCell::new(Vec::new()),
        });
        host.push(root);
        host
    }

    /// Push `screen` on top of the stack. Screens it pushes from
    /// `on_appear` land above it.
    pub fn push(&self, screen: Box<dyn Screen>) {
        let depth = self.depth();
        let environment = self.root_environment.with(NavigationDepth(depth));
        let screen = Rc::new(RefCell::new(screen));
        self.stack.borrow_mut().push(StackEntry {
            screen: screen.clone(),
            environment: environment.clone(),
        });

        debug!(depth, "screen pushed");
        screen.borrow_mut().on_appear(&environment);
    }

    /// Pop the top screen. The root screen stays.
    pub fn pop(&self) -> bool {
        let entry = {
            let mut stack = self.stack.borrow_mut();
            if stack.len() <= 1 {
                return false;
            }
            stack.pop()
        };

        match entry {
            Some(entry) => {
                entry.disappear();
                true
            }
            None => false,
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    /// Environment of the top screen.
    pub fn top_environment(&self) -> Environment {
        self.stack
            .borrow()
            .last()
            .map(|entry| entry.environment.clone())
            .unwrap_or_else(|| self.root_environment.clone())
    }
}

impl Drop for NavigationHost {
    fn drop(&mut self) {
        for entry in self.stack.get_mut().iter().rev() {
            entry.disappear();
        }
    }
}

presented_unit_via_core!(NavigationHost);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::MainQueue;
    use crate::transition::{PhaseShiftTransitionProvider, SourceFrame, TransitionConfiguration, TransitionContext};
    use std::cell::Cell;

    #[derive(Default)]
    struct Probe {
        seen: Rc<RefCell<Option<Environment>>>,
        disappeared: Rc<Cell<bool>>,
    }

    impl Screen for Probe {
        fn on_appear(&mut self, environment: &Environment) {
            *self.seen.borrow_mut() = Some(environment.clone());
        }

        fn on_disappear(&mut self) {
            self.disappeared.set(true);
        }
    }

    fn delegate() -> Rc<dyn TransitioningDelegate> {
        Rc::new(PhaseShiftTransitionProvider::new(
            TransitionContext::new(SourceFrame::default(), TransitionConfiguration::default()),
            MainQueue::new(),
        ))
    }

    fn counting_action() -> (Rc<Cell<usize>>, DismissAction) {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        (calls, DismissAction::new(move || counter.set(counter.get() + 1)))
    }

    #[test]
    fn test_content_host_hands_dismiss_to_screen() {
        let probe = Probe::default();
        let seen = probe.seen.clone();
        let (calls, action) = counting_action();

        let host = ContentHost::new(Box::new(probe), delegate(), action);
        let environment = seen.borrow().clone().unwrap();
        assert!(environment.dismiss());
        assert_eq!(calls.get(), 1);
        assert_eq!(host.presentation_style(), ModalPresentationStyle::Custom);
        assert!(host.transitioning_delegate().is_some());
    }

    #[test]
    fn test_pushed_screens_inherit_dismiss() {
        let (calls, action) = counting_action();
        let navigation = NavigationHost::new(Box::new(Probe::default()), delegate(), action);

        let nested = Probe::default();
        let seen = nested.seen.clone();
        navigation.push(Box::new(Probe::default()));
        navigation.push(Box::new(nested));
        assert_eq!(navigation.depth(), 3);

        let environment = seen.borrow().clone().unwrap();
        assert_eq!(environment.get::<NavigationDepth>(), Some(&NavigationDepth(2)));
        environment.dismiss();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_navigator_pushes_from_inside_a_screen() {
        struct Pusher;

        impl Screen for Pusher {
            fn on_appear(&mut self, environment: &Environment) {
                if let Some(navigator) = environment.get::<Navigator>() {
                    navigator.push(Probe::default());
                }
            }
        }

        let (_calls, action) = counting_action();
        let navigation = NavigationHost::new(Box::new(Pusher), delegate(), action);
        assert_eq!(navigation.depth(), 2);

        let navigator = navigation.top_environment().get::<Navigator>().cloned().unwrap();
        assert!(navigator.pop());
        assert_eq!(navigator.depth(), 1);

        drop(navigation);
        assert!(!navigator.push(Probe::default()));
        assert_eq!(navigator.depth(), 0);
    }

    #[test]
    fn test_pop_keeps_root() {
        let (_calls, action) = counting_action();
        let navigation = NavigationHost::new(Box::new(Probe::default()), delegate(), action);
        let pushed = Probe::default();
        let disappeared = pushed.disappeared.clone();

        navigation.push(Box::new(pushed));
        assert!(navigation.pop());
        assert!(disappeared.get());
        assert!(!navigation.pop());
        assert_eq!(navigation.depth(), 1);
        assert_eq!(
            navigation.top_environment().get::<NavigationDepth>(),
            Some(&NavigationDepth(0))
        );
    }

    #[test]
    fn test_released_host_notifies_screens() {
        let (_calls, action) = counting_action();
        let root = Probe::default();
        let root_gone = root.disappeared.clone();
        let single = Probe::default();
        let single_gone = single.disappeared.clone();

        let navigation = Content::navigation(root).into_unit(delegate(), action.clone());
        let content = Content::single(single).into_unit(delegate(), action);
        assert!(!root_gone.get() && !single_gone.get());

        drop(navigation);
        drop(content);
        assert!(root_gone.get());
        assert!(single_gone.get());
    }

    #[test]
    fn test_unattached_unit_dismisses_immediately() {
        let (_calls, action) = counting_action();
        let unit = Content::single(Probe::default()).into_unit(delegate(), action);
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();

        unit.dismiss(Box::new(move || flag.set(true)));
        assert!(done.get());
    }

    #[test]
    fn test_units_carry_distinct_markers_and_layers() {
        let (_calls, action) = counting_action();
        let first = Content::single(Probe::default()).into_unit(delegate(), action.clone());
        let second = Content::navigation(Probe::default()).into_unit(delegate(), action);

        assert_ne!(first.marker(), second.marker());
        assert!(!Rc::ptr_eq(&first.root_layer(), &second.root_layer()));
    }
}
