//! Retained layer tree the transitions animate.
//!
//! A `Layer` is the visual of a presented unit: a frame in its container's
//! space, a phase shift applied about the frame's center, and an opacity.
//! A `Container` is the transition container; its own frame is expressed in
//! window space and defines the coordinate space its children live in.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::animation::transform::Transform2D;
use crate::geometry::{PhaseShift, Rect};

pub type LayerRef = Rc<RefCell<Layer>>;
pub type ContainerRef = Rc<RefCell<Container>>;

/// Unique identifier for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

impl LayerId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub frame: Rect,
    pub shift: PhaseShift,
    pub opacity: f64,
}

impl Layer {
    pub fn new(frame: Rect) -> Self {
        Self {
            id: LayerId::new(),
            frame,
            shift: PhaseShift::identity(),
            opacity: 1.0,
        }
    }

    pub fn into_ref(self) -> LayerRef {
        Rc::new(RefCell::new(self))
    }

    /// Frame as currently drawn, with the shift applied.
    pub fn presentation_frame(&self) -> Rect {
        self.shift.apply_to_rect(&self.frame)
    }

    /// Full matrix in container space, for renderers.
    pub fn transform(&self) -> Transform2D {
        self.shift.transform_for(&self.frame)
    }

    /// Drop any transition residue.
    pub fn reset_appearance(&mut self) {
        self.shift = PhaseShift::identity();
        self.opacity = 1.0;
    }
}

#[derive(Debug)]
pub struct Container {
    frame_in_window: Rect,
    children: Vec<LayerRef>,
}

impl Container {
    pub fn new(frame_in_window: Rect) -> Self {
        Self {
            frame_in_window,
            children: Vec::new(),
        }
    }

    pub fn into_ref(self) -> ContainerRef {
        Rc::new(RefCell::new(self))
    }

    pub fn frame_in_window(&self) -> Rect {
        self.frame_in_window
    }

    /// The container's own space: origin at zero, window size.
    pub fn bounds(&self) -> Rect {
        self.frame_in_window.bounds()
    }

    /// Convert a window-space rectangle into this container's space.
    pub fn convert_from_window(&self, rect: &Rect) -> Rect {
        rect.offset(-self.frame_in_window.x, -self.frame_in_window.y)
    }

    /// Attach `layer` on top. Attaching an already attached layer is a no-op.
    /// Returns whether the layer was newly attached.
    pub fn add(&mut self, layer: &LayerRef) -> bool {
        if self.contains(layer) {
            return false;
        }
        self.children.push(Rc::clone(layer));
        true
    }

    pub fn remove(&mut self, layer: &LayerRef) -> bool {
        let before = self.children.len();
        self.children.retain(|child| !Rc::ptr_eq(child, layer));
        self.children.len() != before
    }

    pub fn contains(&self, layer: &LayerRef) -> bool {
        self.children.iter().any(|child| Rc::ptr_eq(child, layer))
    }

    pub fn children(&self) -> &[LayerRef] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
