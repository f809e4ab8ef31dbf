pub mod graph;
pub mod node;
pub mod registry;
pub mod transform;

pub use graph::NodeGraph;
pub use node::{Node, NodeId};
pub use registry::{ComponentKind, NodeKind};
pub use transform::Transform;
