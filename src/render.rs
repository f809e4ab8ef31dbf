//! Collaborator traits for the external rendering engine.
//!
//! The document/graph layer never talks to a GPU. It hands loaded visual
//! subtrees to the engine through `RenderHandle` and releases them through
//! `dispose`. `NullRenderHandle` is the test double used throughout the
//! test suite.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in model space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// An inverted box that becomes valid once extended.
    pub fn empty() -> Self {
        Self {
            min: [f32::INFINITY; 3],
            max: [f32::NEG_INFINITY; 3],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min[0] < self.max[0] && self.min[1] < self.max[1] && self.min[2] < self.max[2]
    }

    pub fn extend(&mut self, other: &Aabb) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(other.min[i]);
            self.max[i] = self.max[i].max(other.max[i]);
        }
    }

    pub fn center(&self) -> glm::Vec3 {
        (glm::Vec3::from(self.min) + glm::Vec3::from(self.max)) * 0.5
    }

    pub fn size(&self) -> glm::Vec3 {
        glm::Vec3::from(self.max) - glm::Vec3::from(self.min)
    }
}

/// Opaque ownership target for a loaded visual subtree.
///
/// The engine implements this; the document layer only attaches, detaches
/// and disposes. Disposal must release all GPU resources backing the
/// subtree and is idempotent.
pub trait RenderHandle: Send {
    fn dispose(&mut self);

    fn bounding_box(&self) -> Option<Aabb>;
}

/// Engine-free handle used in tests and headless runs. Tracks disposal
/// through a shared flag so tests can observe resource release after the
/// handle itself has been dropped.
pub struct NullRenderHandle {
    disposed: Arc<AtomicBool>,
    bounding_box: Option<Aabb>,
}

impl NullRenderHandle {
    pub fn new(bounding_box: Option<Aabb>) -> Self {
        Self {
            disposed: Arc::new(AtomicBool::new(false)),
            bounding_box,
        }
    }

    pub fn disposed_flag(&self) -> Arc<AtomicBool> {
        self.disposed.clone()
    }
}

impl RenderHandle for NullRenderHandle {
    fn dispose(&mut self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bounding_box
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_becomes_valid_after_extend() {
        let mut bbox = Aabb::empty();
        assert!(!bbox.is_valid());

        bbox.extend(&Aabb::new([-1.0, -2.0, -3.0], [1.0, 2.0, 3.0]));
        assert!(bbox.is_valid());
        assert_eq!(bbox.min, [-1.0, -2.0, -3.0]);
        assert_eq!(bbox.max, [1.0, 2.0, 3.0]);

        bbox.extend(&Aabb::new([-5.0, 0.0, 0.0], [0.0, 0.0, 4.0]));
        assert_eq!(bbox.min, [-5.0, -2.0, -3.0]);
        assert_eq!(bbox.max, [1.0, 2.0, 4.0]);
    }

    #[test]
    fn null_handle_reports_disposal() {
        let mut handle = NullRenderHandle::new(None);
        let flag = handle.disposed_flag();
        assert!(!flag.load(Ordering::SeqCst));
        handle.dispose();
        assert!(flag.load(Ordering::SeqCst));
    }
}
