//! Item id → window-space rectangle map for grid callers.
//!
//! Callers insert an item's frame when it becomes visible and remove it when
//! it scrolls away, then look up the tapped item's [`SourceFrame`] at the
//! moment of interaction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::transition::SourceFrame;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRegistry {
    frames: HashMap<i64, Rect>,
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or refresh the frame of `id`. Returns the previous frame.
    pub fn insert(&mut self, id: i64, frame: Rect) -> Option<Rect> {
        self.frames.insert(id, frame)
    }

    pub fn remove(&mut self, id: i64) -> Option<Rect> {
        self.frames.remove(&id)
    }

    pub fn get(&self, id: i64) -> Option<Rect> {
        self.frames.get(&id).copied()
    }

    pub fn source_frame(&self, id: i64) -> Option<SourceFrame> {
        self.get(id).map(SourceFrame::from)
    }

    /// Drop every entry that no longer intersects `viewport`. Returns how
    /// many were dropped.
    pub fn retain_visible(&mut self, viewport: &Rect) -> usize {
        let before = self.frames.len();
        self.frames.retain(|_, frame| frame.intersects(viewport));
        before - self.frames.len()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, Rect)> + '_ {
        self.frames.iter().map(|(id, frame)| (*id, *frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_previous_frame() {
        let mut registry = FrameRegistry::new();
        assert_eq!(registry.insert(7, Rect::new(0.0, 0.0, 10.0, 10.0)), None);
        assert_eq!(
            registry.insert(7, Rect::new(0.0, 20.0, 10.0, 10.0)),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.source_frame(7),
            Some(SourceFrame::new(0.0, 20.0, 10.0, 10.0))
        );
    }

    #[test]
    fn test_unknown_id() {
        let registry = FrameRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.source_frame(3), None);
    }

    #[test]
    fn test_retain_visible_drops_offscreen_items() {
        let mut registry = FrameRegistry::new();
        registry.insert(1, Rect::new(0.0, 0.0, 100.0, 100.0));
        registry.insert(2, Rect::new(0.0, 900.0, 100.0, 100.0));
        registry.insert(3, Rect::new(-50.0, 790.0, 100.0, 100.0));

        let dropped = registry.retain_visible(&Rect::new(0.0, 0.0, 400.0, 800.0));
        assert_eq!(dropped, 1);
        assert!(registry.get(2).is_none());
        let mut ids: Vec<_> = registry.iter().map(|(id, _)| id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 3]);

        registry.remove(1);
        registry.clear();
        assert!(registry.is_empty());
    }
}
