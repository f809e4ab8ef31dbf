//! Graph vertex: transform plus attached capability components.

use crate::component::Component;
use crate::graph::registry::{ComponentKind, NodeKind};
use crate::graph::transform::Transform;

/// Handle into a [`super::NodeGraph`]. Carries the owning graph's id so
/// membership is checked on every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(super) index: usize,
    pub(super) graph: u64,
}

pub struct Node {
    pub kind: NodeKind,
    pub name: Option<String>,
    pub transform: Transform,
    pub(super) components: Vec<Component>,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl Node {
    pub(super) fn new(kind: NodeKind, name: Option<String>) -> Self {
        Self {
            kind,
            name,
            transform: Transform::default(),
            components: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.iter().find(|c| c.kind() == kind)
    }

    pub fn component_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.kind() == kind)
    }

    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.component(kind).is_some()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.kind.type_name())
    }
}
