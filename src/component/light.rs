//! Light capability round-tripped through the document's light array.

use crate::component::property::Property;
use crate::document::schema::{
    DocumentData, LightData, LightType, NodeData, PointLightParams, SpotLightParams,
};
use crate::error::{DocError, Result};

#[derive(Debug, Clone)]
pub struct LightComponent {
    pub kind: LightType,
    pub color: Property<[f32; 3]>,
    pub intensity: Property<f32>,
    pub point: Option<PointLightParams>,
    pub spot: Option<SpotLightParams>,
}

impl LightComponent {
    pub fn new(kind: LightType) -> Self {
        Self {
            kind,
            color: Property::new([1.0, 1.0, 1.0]),
            intensity: Property::new(1.0),
            point: None,
            spot: None,
        }
    }

    pub fn from_document(node: &NodeData, document: &DocumentData) -> Result<Self> {
        let index = node
            .light
            .ok_or_else(|| DocError::precondition("node has no light reference"))?;
        let data = document.lights.get(index).ok_or_else(|| {
            DocError::validation("lights", format!("light index {} out of range", index))
        })?;

        Ok(Self {
            kind: data.kind,
            color: Property::new(data.color),
            intensity: Property::new(data.intensity),
            point: data.point,
            spot: data.spot,
        })
    }

    pub fn to_document(&self, document: &mut DocumentData) -> usize {
        document.lights.push(LightData {
            kind: self.kind,
            color: self.color.value(),
            intensity: self.intensity.value(),
            point: self.point,
            spot: self.spot,
        });
        document.lights.len() - 1
    }

    pub fn update(&mut self) -> bool {
        self.color.take_changed() | self.intensity.take_changed()
    }
}
