//! Phase shift modal transitions.
//!
//! A modal grows out of a small source rectangle (a tapped grid cell, say)
//! to full screen and shrinks back into it on dismissal. The crate is split
//! the way the work flows:
//!
//! - [`geometry`]: the shift that maps a full-screen frame onto its source
//! - [`animation`]: easing, spring timing, and the frame-driven animator
//! - [`transition`]: the host transition protocol and the provider
//! - [`presentation`]: the coordinator state machine and its synchronizer
//! - [`content`]: wrappers that carry caller screens and a dismiss action
//! - [`window`]: a headless reference host over the [`layer`] tree
//!
//! Everything runs on one thread. Deferred work goes through a [`MainQueue`].
//!
//! ```ignore
//! let queue = MainQueue::new();
//! let window = WindowHost::new(queue.clone(), Rect::new(0.0, 0.0, 400.0, 800.0));
//! let host: Rc<dyn PresentingHost> = window.clone();
//! let coordinator = PresentationCoordinator::new(queue.clone());
//!
//! coordinator.present(
//!     Content::single(DetailScreen::new(item)),
//!     registry.source_frame(item.id).unwrap_or_default(),
//!     TransitionConfiguration::fast(),
//!     &host,
//!     || println!("dismissed"),
//! );
//! queue.run_until_idle();
//! ```

pub mod animation;
pub mod content;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod presentation;
pub mod queue;
pub mod registry;
pub mod transition;
pub mod window;

pub use animation::{AnimatorState, EasingFunction, PhaseShiftAnimator, SpringTiming, Transform2D};
pub use content::{Content, ContentHost, DismissAction, Environment, NavigationHost, Screen};
pub use error::{ConfigurationError, SetupError};
pub use geometry::{DISMISS_SCALE, PhaseShift, Point, Rect, ShiftGeometry, Vector};
pub use layer::{Container, ContainerRef, Layer, LayerRef};
pub use presentation::{
    ModalPresentationStyle, PresentationCoordinator, PresentationEvent, PresentationMarker,
    PresentationState, PresentedUnit, PresentingHost, RETRY_BACKOFF, SyncAction,
};
pub use queue::MainQueue;
pub use registry::FrameRegistry;
pub use transition::{
    PhaseShiftTransitionProvider, SourceFrame, TransitionConfiguration, TransitionContext,
    TransitionDirection, TransitioningDelegate,
};
pub use window::WindowHost;

pub type Result<T, E = ConfigurationError> = std::result::Result<T, E>;
