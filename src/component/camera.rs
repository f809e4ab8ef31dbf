//! Camera capability: live projection state round-tripped through the
//! document's camera array.

use crate::component::property::Property;
use crate::document::schema::{
    CameraData, DocumentData, NodeData, OrthographicProjection, PerspectiveProjection,
    ProjectionType,
};
use crate::error::{DocError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians.
        y_fov: f32,
        z_near: f32,
        z_far: Option<f32>,
    },
    Orthographic {
        size: f32,
        z_near: f32,
        z_far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            y_fov: 52f32.to_radians(),
            z_near: 0.1,
            z_far: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CameraComponent {
    pub projection: Property<Projection>,
}

impl CameraComponent {
    /// Reads the projection record referenced by the owning node.
    /// Fails if the node carries no camera reference.
    pub fn from_document(node: &NodeData, document: &DocumentData) -> Result<Self> {
        let index = node
            .camera
            .ok_or_else(|| DocError::precondition("node has no camera reference"))?;
        let data = document.cameras.get(index).ok_or_else(|| {
            DocError::validation("cameras", format!("camera index {} out of range", index))
        })?;

        let projection = match data.kind {
            ProjectionType::Perspective => {
                let p = data.perspective.ok_or_else(|| {
                    DocError::validation("cameras", "perspective camera without record")
                })?;
                Projection::Perspective {
                    y_fov: p.y_fov,
                    z_near: p.z_near,
                    z_far: p.z_far,
                }
            }
            ProjectionType::Orthographic => {
                let o = data.orthographic.ok_or_else(|| {
                    DocError::validation("cameras", "orthographic camera without record")
                })?;
                Projection::Orthographic {
                    size: o.size,
                    z_near: o.z_near,
                    z_far: o.z_far,
                }
            }
        };

        Ok(Self {
            projection: Property::new(projection),
        })
    }

    /// Appends the live projection state to the document's camera array and
    /// returns its index for the caller to store on the node.
    pub fn to_document(&self, document: &mut DocumentData) -> usize {
        let data = match self.projection.value() {
            Projection::Perspective {
                y_fov,
                z_near,
                z_far,
            } => CameraData {
                kind: ProjectionType::Perspective,
                perspective: Some(PerspectiveProjection {
                    y_fov,
                    z_near,
                    z_far,
                }),
                orthographic: None,
            },
            Projection::Orthographic {
                size,
                z_near,
                z_far,
            } => CameraData {
                kind: ProjectionType::Orthographic,
                perspective: None,
                orthographic: Some(OrthographicProjection {
                    size,
                    z_near,
                    z_far,
                }),
            },
        };
        document.cameras.push(data);
        document.cameras.len() - 1
    }

    pub fn update(&mut self) -> bool {
        self.projection.take_changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_document_requires_camera_reference() {
        let node = NodeData::default();
        let document = DocumentData::new();
        let err = CameraComponent::from_document(&node, &document).unwrap_err();
        assert!(matches!(err, DocError::Precondition(_)));
    }

    #[test]
    fn perspective_round_trip() {
        let mut document = DocumentData::new();
        let camera = CameraComponent {
            projection: Property::new(Projection::Perspective {
                y_fov: 0.8,
                z_near: 0.5,
                z_far: Some(250.0),
            }),
        };
        let index = camera.to_document(&mut document);
        assert_eq!(index, 0);

        let node = NodeData {
            camera: Some(index),
            ..Default::default()
        };
        let back = CameraComponent::from_document(&node, &document).unwrap();
        assert_eq!(back.projection.value(), camera.projection.value());
    }

    #[test]
    fn orthographic_round_trip() {
        let mut document = DocumentData::new();
        let camera = CameraComponent {
            projection: Property::new(Projection::Orthographic {
                size: 10.0,
                z_near: 0.1,
                z_far: 500.0,
            }),
        };
        let index = camera.to_document(&mut document);

        let node = NodeData {
            camera: Some(index),
            ..Default::default()
        };
        let back = CameraComponent::from_document(&node, &document).unwrap();
        assert_eq!(back.projection.value(), camera.projection.value());
    }
}
