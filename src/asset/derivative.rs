//! Derivative descriptors: quality/usage-tagged bundles of asset references
//! representing one renderable version of a model.

use log::warn;
use serde::{Deserialize, Serialize};

/// Discrete quality tier of a derivative, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quality {
    Thumb,
    Low,
    Medium,
    High,
    Highest,
}

impl Quality {
    /// All tiers in ascending order.
    pub const ALL: [Quality; 5] = [
        Quality::Thumb,
        Quality::Low,
        Quality::Medium,
        Quality::High,
        Quality::Highest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Quality::Thumb => "Thumb",
            Quality::Low => "Low",
            Quality::Medium => "Medium",
            Quality::High => "High",
            Quality::Highest => "Highest",
        }
    }
}

/// Intended consumption context for a derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Usage {
    Image2D,
    #[default]
    Web3D,
    App3D,
    Print,
    Editorial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Model,
    Geometry,
    Image,
    Texture,
    Points,
}

/// Usage tag for texture/image assets within a derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapType {
    Color,
    Normal,
    Occlusion,
    Emissive,
    MetallicRoughness,
    Zone,
}

/// Descriptive reference to one asset file. Purely declarative until loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    pub uri: String,
    #[serde(rename = "type")]
    pub kind: AssetType,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "mapType")]
    pub map_type: Option<MapType>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "byteSize")]
    pub byte_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "numFaces")]
    pub num_faces: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "imageSize")]
    pub image_size: Option<u32>,
}

impl AssetRef {
    pub fn new(uri: impl Into<String>, kind: AssetType) -> Self {
        Self {
            uri: uri.into(),
            kind,
            map_type: None,
            byte_size: None,
            num_faces: None,
            image_size: None,
        }
    }

    pub fn with_map_type(mut self, map_type: MapType) -> Self {
        self.map_type = Some(map_type);
        self
    }
}

/// One renderable version of a model: a (usage, quality) pair binding one or
/// more asset references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derivative {
    pub usage: Usage,
    pub quality: Quality,
    pub assets: Vec<AssetRef>,
}

impl Derivative {
    pub fn new(usage: Usage, quality: Quality, assets: Vec<AssetRef>) -> Self {
        Self {
            usage,
            quality,
            assets,
        }
    }

    /// The asset to hand to the loader: a self-contained model file if
    /// present, otherwise the geometry asset.
    pub fn primary_asset(&self) -> Option<&AssetRef> {
        self.assets
            .iter()
            .find(|a| a.kind == AssetType::Model)
            .or_else(|| self.assets.iter().find(|a| a.kind == AssetType::Geometry))
    }

    pub fn asset_of_kind(&self, kind: AssetType) -> Option<&AssetRef> {
        self.assets.iter().find(|a| a.kind == kind)
    }
}

/// Selects the derivative for a (quality, usage) pair.
///
/// Exact match first. Otherwise strictly higher qualities in ascending order
/// (avoids downgrading), then strictly lower qualities in descending order.
/// Returns `None` if no derivative matches the usage at any quality; the
/// caller decides fallback behavior.
pub fn select(derivatives: &[Derivative], quality: Quality, usage: Usage) -> Option<&Derivative> {
    let exact = derivatives
        .iter()
        .find(|d| d.quality == quality && d.usage == usage);
    if exact.is_some() {
        return exact;
    }

    for step in Quality::ALL.iter().filter(|q| **q > quality) {
        if let Some(found) = derivatives
            .iter()
            .find(|d| d.quality == *step && d.usage == usage)
        {
            warn!(
                "no {} derivative for usage {:?}, falling back to higher quality {}",
                quality.name(),
                usage,
                step.name()
            );
            return Some(found);
        }
    }

    for step in Quality::ALL.iter().rev().filter(|q| **q < quality) {
        if let Some(found) = derivatives
            .iter()
            .find(|d| d.quality == *step && d.usage == usage)
        {
            warn!(
                "no {} derivative for usage {:?}, falling back to lower quality {}",
                quality.name(),
                usage,
                step.name()
            );
            return Some(found);
        }
    }

    warn!(
        "no suitable derivative for quality {} and usage {:?}",
        quality.name(),
        usage
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derivative(quality: Quality) -> Derivative {
        Derivative::new(
            Usage::Web3D,
            quality,
            vec![AssetRef::new(
                format!("model-{}.glb", quality.name().to_lowercase()),
                AssetType::Model,
            )],
        )
    }

    #[test]
    fn exact_match_wins() {
        let derivatives = vec![derivative(Quality::Low), derivative(Quality::Medium)];
        let found = select(&derivatives, Quality::Medium, Usage::Web3D).unwrap();
        assert_eq!(found.quality, Quality::Medium);
    }

    #[test]
    fn prefers_next_higher_over_lower() {
        // {Low, High}, requesting Medium must return High, not Low
        let derivatives = vec![derivative(Quality::Low), derivative(Quality::High)];
        let found = select(&derivatives, Quality::Medium, Usage::Web3D).unwrap();
        assert_eq!(found.quality, Quality::High);
    }

    #[test]
    fn falls_back_to_lower_when_no_higher_exists() {
        let derivatives = vec![derivative(Quality::Thumb), derivative(Quality::Low)];
        let found = select(&derivatives, Quality::High, Usage::Web3D).unwrap();
        assert_eq!(found.quality, Quality::Low);
    }

    #[test]
    fn returns_none_when_nothing_matches_usage() {
        let derivatives = vec![derivative(Quality::High)];
        assert!(select(&derivatives, Quality::High, Usage::Print).is_none());
        assert!(select(&[], Quality::Medium, Usage::Web3D).is_none());
    }

    #[test]
    fn primary_asset_prefers_model_over_geometry() {
        let derivative = Derivative::new(
            Usage::Web3D,
            Quality::High,
            vec![
                AssetRef::new("mesh.ply", AssetType::Geometry),
                AssetRef::new("scene.glb", AssetType::Model),
            ],
        );
        assert_eq!(derivative.primary_asset().unwrap().uri, "scene.glb");
    }

    #[test]
    fn quality_names_round_trip_through_json() {
        for quality in Quality::ALL {
            let json = serde_json::to_string(&quality).unwrap();
            assert_eq!(json, format!("\"{}\"", quality.name()));
            let back: Quality = serde_json::from_str(&json).unwrap();
            assert_eq!(back, quality);
        }
    }
}
