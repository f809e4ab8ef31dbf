//! Arena-backed node graph.
//!
//! Nodes live in a slot vector addressed by `NodeId` handles. Every handle
//! carries the owning graph's id, so a node from one graph can never address
//! another. The root scene node exists for the graph's whole lifetime.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::component::Component;
use crate::error::{DocError, Result};
use crate::graph::node::{Node, NodeId};
use crate::graph::registry::NodeKind;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

pub struct NodeGraph {
    id: u64,
    slots: Vec<Option<Node>>,
    root: NodeId,
}

impl NodeGraph {
    pub fn new() -> Self {
        let id = NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed);
        let root = NodeId { index: 0, graph: id };
        Self {
            id,
            slots: vec![Some(Node::new(NodeKind::Scene, Some("Scene".to_string())))],
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.graph == self.id && self.slots.get(id.index).is_some_and(Option::is_some)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        if id.graph != self.id {
            return Err(DocError::precondition("node belongs to a different graph"));
        }
        self.slots
            .get(id.index)
            .and_then(Option::as_ref)
            .ok_or_else(|| DocError::precondition("node no longer exists"))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        if id.graph != self.id {
            return Err(DocError::precondition("node belongs to a different graph"));
        }
        self.slots
            .get_mut(id.index)
            .and_then(Option::as_mut)
            .ok_or_else(|| DocError::precondition("node no longer exists"))
    }

    pub fn create_node(
        &mut self,
        kind: NodeKind,
        name: Option<String>,
        parent: NodeId,
    ) -> Result<NodeId> {
        if !self.contains(parent) {
            return Err(DocError::precondition(
                "parent node does not belong to this graph",
            ));
        }
        let mut node = Node::new(kind, name);
        node.parent = Some(parent);
        let id = NodeId {
            index: self.slots.len(),
            graph: self.id,
        };
        self.slots.push(Some(node));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Attaches a component. A node owns at most one component per kind.
    pub fn add_component(&mut self, id: NodeId, component: Component) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.has_component(component.kind()) {
            return Err(DocError::precondition(format!(
                "node already has a {} component",
                component.kind().type_name()
            )));
        }
        node.components.push(component);
        Ok(())
    }

    /// Moves a node under a new parent. Rejects moves that would detach the
    /// root or introduce a cycle.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<()> {
        if id == self.root {
            return Err(DocError::precondition("cannot reparent the root node"));
        }
        if !self.contains(id) || !self.contains(new_parent) {
            return Err(DocError::precondition(
                "node does not belong to this graph",
            ));
        }
        let mut ancestor = Some(new_parent);
        while let Some(current) = ancestor {
            if current == id {
                return Err(DocError::precondition("reparent would create a cycle"));
            }
            ancestor = self.node(current)?.parent;
        }

        let old_parent = self.node(id)?.parent;
        if let Some(old) = old_parent {
            self.node_mut(old)?.children.retain(|c| *c != id);
        }
        self.node_mut(id)?.parent = Some(new_parent);
        self.node_mut(new_parent)?.children.push(id);
        Ok(())
    }

    /// Removes a node and its whole subtree, disposing components
    /// depth-first. The root cannot be removed.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(DocError::precondition("cannot remove the root node"));
        }
        if !self.contains(id) {
            return Err(DocError::precondition(
                "node does not belong to this graph",
            ));
        }
        if let Some(parent) = self.node(id)?.parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
        }
        self.dispose_subtree(id);
        Ok(())
    }

    /// Clears the whole tree under the root, recursively disposing all
    /// child nodes, and drops the root's own components.
    pub fn clear(&mut self) {
        let children: Vec<NodeId> = self.node(self.root).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.dispose_subtree(child);
        }
        if let Ok(root) = self.node_mut(self.root) {
            root.children.clear();
            for component in &mut root.components {
                component.dispose();
            }
            root.components.clear();
        }
    }

    fn dispose_subtree(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.node(id).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.dispose_subtree(child);
        }
        if let Some(mut node) = self.slots.get_mut(id.index).and_then(Option::take) {
            for component in &mut node.components {
                component.dispose();
            }
        }
    }

    /// Nodes in the subtree of `id`, depth-first, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Ok(node) = self.node(id) {
            for &child in &node.children {
                out.push(child);
                out.extend(self.descendants(child));
            }
        }
        out
    }

    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// One cooperative update pass over every live node: transforms first,
    /// then components. Returns true if anything changed.
    pub fn update_all(&mut self) -> bool {
        let mut changed = false;
        for slot in &mut self.slots {
            if let Some(node) = slot {
                changed |= node.transform.update();
                for component in &mut node.components {
                    changed |= component.update();
                }
            }
        }
        changed
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}
