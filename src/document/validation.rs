//! Structural validation of document data before import.
//!
//! A document that fails any check here is rejected wholesale; `open` never
//! touches the graph with a partially valid document.

use std::collections::HashSet;

use crate::document::schema::{CameraData, DocumentData, ProjectionType};
use crate::document::schema::{DOCUMENT_TYPE, DOCUMENT_VERSION};
use crate::error::{DocError, Result};
use crate::graph::registry::NodeKind;

pub fn validate(data: &DocumentData) -> Result<()> {
    if data.asset.kind != DOCUMENT_TYPE {
        return Err(DocError::validation(
            "asset.type",
            format!("expected '{}', got '{}'", DOCUMENT_TYPE, data.asset.kind),
        ));
    }
    if data.asset.version != DOCUMENT_VERSION {
        return Err(DocError::validation(
            "asset.version",
            format!(
                "unsupported version '{}', expected '{}'",
                data.asset.version, DOCUMENT_VERSION
            ),
        ));
    }

    if data.scenes.is_empty() {
        return Err(DocError::validation("scenes", "document has no scenes"));
    }
    if data.scene >= data.scenes.len() {
        return Err(DocError::validation(
            "scene",
            format!(
                "active scene index {} out of range ({} scenes)",
                data.scene,
                data.scenes.len()
            ),
        ));
    }

    for (i, scene) in data.scenes.iter().enumerate() {
        for &node in &scene.nodes {
            check_index(node, data.nodes.len(), &format!("scenes/{}/nodes", i))?;
        }
        if let Some(setup) = scene.setup {
            check_index(setup, data.setups.len(), &format!("scenes/{}/setup", i))?;
        }
    }

    for (i, node) in data.nodes.iter().enumerate() {
        let path = format!("nodes/{}", i);
        if let Some(kind) = &node.kind {
            if NodeKind::from_type_name(kind).is_none() {
                return Err(DocError::validation(
                    format!("{}/type", path),
                    format!("unknown node type '{}'", kind),
                ));
            }
        }
        for &child in &node.children {
            check_index(child, data.nodes.len(), &format!("{}/children", path))?;
            if child == i {
                return Err(DocError::validation(
                    format!("{}/children", path),
                    "node lists itself as a child",
                ));
            }
        }
        if let Some(camera) = node.camera {
            check_index(camera, data.cameras.len(), &format!("{}/camera", path))?;
        }
        if let Some(model) = node.model {
            check_index(model, data.models.len(), &format!("{}/model", path))?;
        }
        if let Some(light) = node.light {
            check_index(light, data.lights.len(), &format!("{}/light", path))?;
        }
        if let Some(meta) = node.meta {
            check_index(meta, data.metas.len(), &format!("{}/meta", path))?;
        }
    }

    for (i, camera) in data.cameras.iter().enumerate() {
        check_camera(camera, &format!("cameras/{}", i))?;
    }

    check_tree(data)?;
    Ok(())
}

fn check_index(index: usize, len: usize, path: &str) -> Result<()> {
    if index >= len {
        return Err(DocError::validation(
            path,
            format!("index {} out of range ({} entries)", index, len),
        ));
    }
    Ok(())
}

fn check_camera(camera: &CameraData, path: &str) -> Result<()> {
    match camera.kind {
        ProjectionType::Perspective if camera.perspective.is_none() => Err(DocError::validation(
            path,
            "perspective camera without perspective record",
        )),
        ProjectionType::Orthographic if camera.orthographic.is_none() => Err(DocError::validation(
            path,
            "orthographic camera without orthographic record",
        )),
        _ => Ok(()),
    }
}

/// Nodes reachable from the scenes must form a tree: every node has at most
/// one parent and no node is its own ancestor.
fn check_tree(data: &DocumentData) -> Result<()> {
    let mut visited = HashSet::new();
    for scene in &data.scenes {
        for &root in &scene.nodes {
            visit(root, data, &mut visited)?;
        }
    }
    Ok(())
}

fn visit(index: usize, data: &DocumentData, visited: &mut HashSet<usize>) -> Result<()> {
    if !visited.insert(index) {
        return Err(DocError::validation(
            format!("nodes/{}", index),
            "node hierarchy is not a tree (node reached twice)",
        ));
    }
    for &child in &data.nodes[index].children {
        visit(child, data, visited)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::schema::{NodeData, SceneData};

    fn minimal_document() -> DocumentData {
        let mut data = DocumentData::new();
        data.nodes.push(NodeData {
            name: Some("root".into()),
            ..Default::default()
        });
        data.scenes.push(SceneData {
            nodes: vec![0],
            ..Default::default()
        });
        data
    }

    #[test]
    fn accepts_minimal_document() {
        assert!(validate(&minimal_document()).is_ok());
    }

    #[test]
    fn rejects_wrong_type_and_version() {
        let mut data = minimal_document();
        data.asset.kind = "gltf".into();
        assert!(matches!(
            validate(&data),
            Err(DocError::Validation { .. })
        ));

        let mut data = minimal_document();
        data.asset.version = "2.0".into();
        assert!(validate(&data).is_err());
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let mut data = minimal_document();
        data.scene = 3;
        assert!(validate(&data).is_err());

        let mut data = minimal_document();
        data.scenes[0].nodes.push(7);
        assert!(validate(&data).is_err());

        let mut data = minimal_document();
        data.nodes[0].model = Some(0);
        assert!(validate(&data).is_err());
    }

    #[test]
    fn rejects_unknown_node_type() {
        let mut data = minimal_document();
        data.nodes[0].kind = Some("Widget".into());
        assert!(validate(&data).is_err());
    }

    #[test]
    fn rejects_shared_children_and_cycles() {
        // Node 1 referenced both from the scene and as a child of node 0.
        let mut data = minimal_document();
        data.nodes.push(NodeData::default());
        data.nodes[0].children.push(1);
        data.scenes[0].nodes.push(1);
        assert!(validate(&data).is_err());

        // Two nodes referencing each other.
        let mut data = minimal_document();
        data.nodes.push(NodeData {
            children: vec![0],
            ..Default::default()
        });
        data.nodes[0].children.push(1);
        assert!(validate(&data).is_err());
    }

    #[test]
    fn rejects_camera_type_without_matching_record() {
        use crate::document::schema::{CameraData, ProjectionType};
        let mut data = minimal_document();
        data.cameras.push(CameraData {
            kind: ProjectionType::Perspective,
            perspective: None,
            orthographic: None,
        });
        data.nodes[0].camera = Some(0);
        assert!(validate(&data).is_err());
    }
}
