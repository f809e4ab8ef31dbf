//! Typed capability components attached to graph nodes.
//!
//! `Component` is a closed tagged variant per archetype; import, export and
//! update are dispatched by a single match instead of virtual overrides.

pub mod camera;
pub mod extras;
pub mod light;
pub mod model;
pub mod property;
pub mod setup;

pub use camera::{CameraComponent, Projection};
pub use extras::{
    AnalyticsComponent, AssetReaderComponent, DocumentComponent, FeatureSetComponent,
    MetaComponent, ReferenceComponent, ToolManagerComponent,
};
pub use light::LightComponent;
pub use model::ModelComponent;
pub use property::Property;
pub use setup::SetupComponent;

use crate::graph::registry::ComponentKind;

pub enum Component {
    Analytics(AnalyticsComponent),
    AssetReader(AssetReaderComponent),
    Camera(CameraComponent),
    Document(DocumentComponent),
    FeatureSet(FeatureSetComponent),
    Light(LightComponent),
    Meta(MetaComponent),
    Model(ModelComponent),
    Reference(ReferenceComponent),
    Setup(SetupComponent),
    ToolManager(ToolManagerComponent),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Analytics(_) => ComponentKind::Analytics,
            Component::AssetReader(_) => ComponentKind::AssetReader,
            Component::Camera(_) => ComponentKind::Camera,
            Component::Document(_) => ComponentKind::Document,
            Component::FeatureSet(_) => ComponentKind::FeatureSet,
            Component::Light(_) => ComponentKind::Light,
            Component::Meta(_) => ComponentKind::Meta,
            Component::Model(_) => ComponentKind::Model,
            Component::Reference(_) => ComponentKind::Reference,
            Component::Setup(_) => ComponentKind::Setup,
            Component::ToolManager(_) => ComponentKind::ToolManager,
        }
    }

    /// One update tick. Returns true if observable state changed.
    pub fn update(&mut self) -> bool {
        match self {
            Component::Camera(camera) => camera.update(),
            Component::Light(light) => light.update(),
            Component::Model(model) => model.update(),
            _ => false,
        }
    }

    /// Releases external resources. Called on node removal and tree clears.
    pub fn dispose(&mut self) {
        if let Component::Model(model) = self {
            model.dispose();
        }
    }

    pub fn as_model(&self) -> Option<&ModelComponent> {
        match self {
            Component::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_model_mut(&mut self) -> Option<&mut ModelComponent> {
        match self {
            Component::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_camera(&self) -> Option<&CameraComponent> {
        match self {
            Component::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn as_setup(&self) -> Option<&SetupComponent> {
        match self {
            Component::Setup(setup) => Some(setup),
            _ => None,
        }
    }
}
