//! Closed registry of node and component archetypes.
//!
//! Archetypes are a fixed, statically enumerated set. Each carries a stable
//! type name used for schema round-tripping and polymorphic dispatch; adding
//! an archetype means extending these enums. The registry performs no
//! validation beyond name uniqueness (asserted in tests).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Document,
    DocumentCollection,
    ExplorerRoot,
    FeatureSet,
    Item,
    Reference,
    Scene,
    ToolSet,
}

impl NodeKind {
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Document,
        NodeKind::DocumentCollection,
        NodeKind::ExplorerRoot,
        NodeKind::FeatureSet,
        NodeKind::Item,
        NodeKind::Reference,
        NodeKind::Scene,
        NodeKind::ToolSet,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::DocumentCollection => "DocumentCollection",
            NodeKind::ExplorerRoot => "ExplorerRoot",
            NodeKind::FeatureSet => "FeatureSet",
            NodeKind::Item => "Item",
            NodeKind::Reference => "Reference",
            NodeKind::Scene => "Scene",
            NodeKind::ToolSet => "ToolSet",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Analytics,
    AssetReader,
    Camera,
    Document,
    FeatureSet,
    Light,
    Meta,
    Model,
    Reference,
    Setup,
    ToolManager,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 11] = [
        ComponentKind::Analytics,
        ComponentKind::AssetReader,
        ComponentKind::Camera,
        ComponentKind::Document,
        ComponentKind::FeatureSet,
        ComponentKind::Light,
        ComponentKind::Meta,
        ComponentKind::Model,
        ComponentKind::Reference,
        ComponentKind::Setup,
        ComponentKind::ToolManager,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            ComponentKind::Analytics => "Analytics",
            ComponentKind::AssetReader => "AssetReader",
            ComponentKind::Camera => "Camera",
            ComponentKind::Document => "Document",
            ComponentKind::FeatureSet => "FeatureSet",
            ComponentKind::Light => "Light",
            ComponentKind::Meta => "Meta",
            ComponentKind::Model => "Model",
            ComponentKind::Reference => "Reference",
            ComponentKind::Setup => "Setup",
            ComponentKind::ToolManager => "ToolManager",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }
}
