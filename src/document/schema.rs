//! Typed serde model of the si-dpo-3d document JSON schema.
//!
//! The layout follows glTF: flat typed arrays (`nodes`, `cameras`, `models`,
//! ...) cross-referenced by index, with an ordered list of scenes and the
//! index of the active scene.

use serde::{Deserialize, Serialize};

use crate::asset::Derivative;
use crate::render::Aabb;

pub const DOCUMENT_MIME_TYPE: &str = "application/si-dpo-3d.document+json";
pub const DOCUMENT_TYPE: &str = "3DDocument";
pub const DOCUMENT_VERSION: &str = "1.0";
pub const DOCUMENT_GENERATOR: &str = concat!("voyager-doc ", env!("CARGO_PKG_VERSION"));
pub const DOCUMENT_COPYRIGHT: &str = "(c) copyright holder of the scene content";

/// Root persisted artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentData {
    pub asset: AssetInfo,
    pub scene: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenes: Vec<SceneData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cameras: Vec<CameraData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lights: Vec<LightData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metas: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub setups: Vec<SetupData>,
}

impl DocumentData {
    /// Fresh document with the fixed asset metadata block.
    pub fn new() -> Self {
        Self {
            asset: AssetInfo::default(),
            scene: 0,
            scenes: Vec::new(),
            nodes: Vec::new(),
            cameras: Vec::new(),
            lights: Vec::new(),
            models: Vec::new(),
            metas: Vec::new(),
            setups: Vec::new(),
        }
    }
}

impl Default for DocumentData {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

impl Default for AssetInfo {
    fn default() -> Self {
        Self {
            kind: DOCUMENT_TYPE.to_string(),
            version: DOCUMENT_VERSION.to_string(),
            generator: Some(DOCUMENT_GENERATOR.to_string()),
            copyright: Some(DOCUMENT_COPYRIGHT.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Units>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Column-major local matrix. Takes precedence over translation,
    /// rotation and scale when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f32; 16]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<[f32; 3]>,
    /// Euler angles in degrees, applied in Z-Y-X order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

/// Perspective-or-orthographic camera record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraData {
    #[serde(rename = "type")]
    pub kind: ProjectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective: Option<PerspectiveProjection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orthographic: Option<OrthographicProjection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveProjection {
    /// Vertical field of view in radians.
    #[serde(rename = "yfov")]
    pub y_fov: f32,
    #[serde(rename = "znear")]
    pub z_near: f32,
    #[serde(rename = "zfar", default, skip_serializing_if = "Option::is_none")]
    pub z_far: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrthographicProjection {
    /// Half the vertical extent of the view volume.
    #[serde(rename = "ymag")]
    pub size: f32,
    #[serde(rename = "znear")]
    pub z_near: f32,
    #[serde(rename = "zfar")]
    pub z_far: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightType {
    Ambient,
    Directional,
    Point,
    Spot,
    Hemisphere,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightData {
    #[serde(rename = "type")]
    pub kind: LightType,
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<PointLightParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot: Option<SpotLightParams>,
}

fn default_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_intensity() -> f32 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointLightParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decay: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotLightParams {
    pub angle: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penumbra: Option<f32>,
}

/// Length unit of the model's local coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Mm,
    #[default]
    Cm,
    M,
    Km,
    In,
    Ft,
    Yd,
    Mi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelData {
    #[serde(default)]
    pub units: Units,
    pub derivatives: Vec<Derivative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f32; 16]>,
    #[serde(
        rename = "boundingBox",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bounding_box: Option<Aabb>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackgroundStyle {
    Solid,
    LinearGradient,
    RadialGradient,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundData {
    pub style: BackgroundStyle,
    pub color0: [f32; 3],
    pub color1: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridData {
    pub visible: bool,
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationData {
    /// Orbit angles (pitch, yaw) in degrees plus distance.
    pub orbit: [f32; 3],
    pub offset: [f32; 3],
}

/// Scene presentation state: background, grid, initial navigation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<NavigationData>,
}
