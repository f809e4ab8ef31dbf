//! Bidirectional mapping between the in-memory node/component graph and the
//! JSON document schema, plus the authoring conveniences built on top of it.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use log::debug;

use crate::asset::{AssetLoader, AssetRef, AssetType, Derivative, MapType, Quality, Usage};
use crate::component::{
    CameraComponent, Component, LightComponent, MetaComponent, ModelComponent, SetupComponent,
};
use crate::document::schema::{DocumentData, NodeData, SceneData, Units};
use crate::document::validation::validate;
use crate::error::{DocError, Result};
use crate::graph::transform::{Transform, matrix_from_array, matrix_to_array};
use crate::graph::{ComponentKind, NodeGraph, NodeId, NodeKind};

/// Restricts which component kinds a serialization pass writes out.
pub type ComponentFilter<'a> = &'a dyn Fn(ComponentKind) -> bool;

pub struct Document {
    graph: NodeGraph,
    asset_path: String,
    loader: Option<Arc<dyn AssetLoader>>,
    pub default_quality: Quality,
    /// Scene-level unit declaration, carried alongside the scene root.
    pub scene_units: Option<Units>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            graph: NodeGraph::new(),
            asset_path: String::new(),
            loader: None,
            default_quality: Quality::High,
            scene_units: None,
        }
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut NodeGraph {
        &mut self.graph
    }

    pub fn root(&self) -> NodeId {
        self.graph.root()
    }

    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }

    /// Configures the loading collaborator and rewires every model already
    /// in the graph.
    pub fn set_loader(&mut self, loader: Arc<dyn AssetLoader>) {
        self.loader = Some(loader.clone());
        let ids = self.graph.descendants(self.graph.root());
        for id in ids {
            if let Ok(node) = self.graph.node_mut(id) {
                if let Some(model) = node
                    .component_mut(ComponentKind::Model)
                    .and_then(Component::as_model_mut)
                {
                    model.set_loader(loader.clone(), self.asset_path.clone());
                }
            }
        }
    }

    /// One cooperative update pass over the graph.
    pub fn update(&mut self) -> bool {
        self.graph.update_all()
    }

    /// Imports document data into the graph.
    ///
    /// Without a merge parent the existing tree is cleared first (recursively
    /// disposing all child nodes) and the scene's own import routine runs,
    /// including scene-level metadata. With a merge parent, the document's
    /// root-level nodes are created under that node and the scene-level
    /// metadata is skipped.
    pub fn open(
        &mut self,
        data: &DocumentData,
        asset_path: Option<&str>,
        merge_parent: Option<NodeId>,
    ) -> Result<()> {
        validate(data)?;

        let parent = match merge_parent {
            Some(parent) => {
                if !self.graph.contains(parent) {
                    return Err(DocError::precondition(
                        "merge parent does not belong to this document",
                    ));
                }
                parent
            }
            None => {
                self.graph.clear();
                self.graph.root()
            }
        };
        if let Some(path) = asset_path {
            self.asset_path = path.to_string();
        }

        let scene = &data.scenes[data.scene];

        // Scratch map from document paths to live components, written during
        // import so nested importers can resolve cross-references. Not
        // persisted.
        let mut path_map: HashMap<String, (NodeId, ComponentKind)> = HashMap::new();

        if parent == self.graph.root() {
            self.import_scene(data, scene, &mut path_map)?;
        } else {
            for &index in &scene.nodes {
                self.import_node(data, index, parent, &mut path_map, &format!("nodes/{}", index))?;
            }
        }
        debug!(
            "opened document: {} nodes, {} component paths",
            self.graph.node_count(),
            path_map.len()
        );
        Ok(())
    }

    fn import_scene(
        &mut self,
        data: &DocumentData,
        scene: &SceneData,
        path_map: &mut HashMap<String, (NodeId, ComponentKind)>,
    ) -> Result<()> {
        let root = self.graph.root();
        if let Some(name) = &scene.name {
            self.graph.node_mut(root)?.name = Some(name.clone());
        }
        self.scene_units = scene.units;
        if let Some(setup_index) = scene.setup {
            let setup = SetupComponent::from_data(&data.setups[setup_index]);
            if self.graph.node(root)?.has_component(ComponentKind::Setup) {
                if let Some(Component::Setup(existing)) = self
                    .graph
                    .node_mut(root)?
                    .component_mut(ComponentKind::Setup)
                {
                    *existing = setup;
                }
            } else {
                self.graph.add_component(root, Component::Setup(setup))?;
            }
            path_map.insert(
                format!("setups/{}", setup_index),
                (root, ComponentKind::Setup),
            );
        }
        for &index in &scene.nodes {
            self.import_node(data, index, root, path_map, &format!("nodes/{}", index))?;
        }
        Ok(())
    }

    fn import_node(
        &mut self,
        data: &DocumentData,
        index: usize,
        parent: NodeId,
        path_map: &mut HashMap<String, (NodeId, ComponentKind)>,
        path: &str,
    ) -> Result<NodeId> {
        let node_data = &data.nodes[index];
        let kind = node_data
            .kind
            .as_deref()
            .and_then(NodeKind::from_type_name)
            .unwrap_or(NodeKind::Item);
        let id = self
            .graph
            .create_node(kind, node_data.name.clone(), parent)?;

        self.graph.node_mut(id)?.transform = match &node_data.matrix {
            Some(values) => Transform::from_matrix(&matrix_from_array(values)),
            None => Transform::from_trs(
                node_data.translation,
                node_data.rotation,
                node_data.scale,
            ),
        };

        if node_data.camera.is_some() {
            let camera = CameraComponent::from_document(node_data, data)?;
            self.graph.add_component(id, Component::Camera(camera))?;
            path_map.insert(format!("{}/camera", path), (id, ComponentKind::Camera));
        }
        if let Some(model_index) = node_data.model {
            let mut model = ModelComponent::new(self.default_quality);
            model.from_data(&data.models[model_index])?;
            if let Some(loader) = &self.loader {
                model.set_loader(loader.clone(), self.asset_path.clone());
            }
            self.graph.add_component(id, Component::Model(model))?;
            path_map.insert(format!("{}/model", path), (id, ComponentKind::Model));
        }
        if node_data.light.is_some() {
            let light = LightComponent::from_document(node_data, data)?;
            self.graph.add_component(id, Component::Light(light))?;
            path_map.insert(format!("{}/light", path), (id, ComponentKind::Light));
        }
        if let Some(meta_index) = node_data.meta {
            let meta = MetaComponent {
                data: data.metas[meta_index].clone(),
            };
            self.graph.add_component(id, Component::Meta(meta))?;
            path_map.insert(format!("{}/meta", path), (id, ComponentKind::Meta));
        }

        for &child in &node_data.children {
            self.import_node(data, child, id, path_map, &format!("{}/children/{}", path, child))?;
        }
        Ok(id)
    }

    /// Serializes the graph into a fresh document. Fails if the graph root
    /// has no content.
    pub fn serialize(&self, filter: Option<ComponentFilter>) -> Result<DocumentData> {
        let root = self.graph.root();
        let root_node = self.graph.node(root)?;
        let has_setup = root_node.has_component(ComponentKind::Setup);
        if root_node.children().is_empty() && !has_setup {
            return Err(DocError::precondition(
                "document graph has no content to serialize",
            ));
        }
        let keep = |kind: ComponentKind| filter.is_none_or(|f| f(kind));

        let mut data = DocumentData::new();
        let mut scene = SceneData {
            name: root_node.name.clone(),
            units: self.scene_units,
            ..Default::default()
        };

        // Component-to-path map used to resolve back-references consistently
        // during export.
        let mut path_map: HashMap<(NodeId, ComponentKind), String> = HashMap::new();

        if keep(ComponentKind::Setup) {
            if let Some(setup) = root_node
                .component(ComponentKind::Setup)
                .and_then(Component::as_setup)
            {
                data.setups.push(setup.to_data());
                scene.setup = Some(data.setups.len() - 1);
                path_map.insert((root, ComponentKind::Setup), "setups/0".to_string());
            }
        }

        for &child in root_node.children() {
            let index = self.export_node(child, &mut data, &keep, &mut path_map)?;
            scene.nodes.push(index);
        }

        data.scenes.push(scene);
        data.scene = 0;
        Ok(data)
    }

    fn export_node(
        &self,
        id: NodeId,
        data: &mut DocumentData,
        keep: &dyn Fn(ComponentKind) -> bool,
        path_map: &mut HashMap<(NodeId, ComponentKind), String>,
    ) -> Result<usize> {
        let node = self.graph.node(id)?;
        let mut node_data = NodeData {
            name: node.name.clone(),
            kind: Some(node.kind.type_name().to_string()),
            ..Default::default()
        };
        // Identity transforms are omitted from the document.
        if !node.transform.is_identity() {
            node_data.matrix = Some(matrix_to_array(node.transform.local_matrix()));
        }

        for component in node.components() {
            if !keep(component.kind()) {
                continue;
            }
            match component {
                Component::Camera(camera) => {
                    let index = camera.to_document(data);
                    node_data.camera = Some(index);
                    path_map.insert((id, ComponentKind::Camera), format!("cameras/{}", index));
                }
                Component::Model(model) => {
                    data.models.push(model.to_data());
                    let index = data.models.len() - 1;
                    node_data.model = Some(index);
                    path_map.insert((id, ComponentKind::Model), format!("models/{}", index));
                }
                Component::Light(light) => {
                    let index = light.to_document(data);
                    node_data.light = Some(index);
                    path_map.insert((id, ComponentKind::Light), format!("lights/{}", index));
                }
                Component::Meta(meta) => {
                    data.metas.push(meta.data.clone());
                    node_data.meta = Some(data.metas.len() - 1);
                }
                // Runtime-only capabilities are not persisted.
                _ => {}
            }
        }

        for &child in node.children() {
            node_data
                .children
                .push(self.export_node(child, data, keep, path_map)?);
        }
        data.nodes.push(node_data);
        Ok(data.nodes.len() - 1)
    }

    /// Creates a node under `parent` (default: root) with a model capability
    /// and one derivative referencing `uri` at the requested quality.
    pub fn append_model(
        &mut self,
        uri: &str,
        quality: Option<Quality>,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let parent = parent.unwrap_or_else(|| self.graph.root());
        if !self.graph.contains(parent) {
            return Err(DocError::precondition(
                "parent node does not belong to this document",
            ));
        }
        let quality = quality.unwrap_or(self.default_quality);

        let id = self
            .graph
            .create_node(NodeKind::Item, Some(display_name(uri)), parent)?;
        let mut model = ModelComponent::new(quality);
        model.add_derivative(Derivative::new(
            Usage::Web3D,
            quality,
            vec![AssetRef::new(uri, AssetType::Model)],
        ));
        if let Some(loader) = &self.loader {
            model.set_loader(loader.clone(), self.asset_path.clone());
        }
        self.graph.add_component(id, Component::Model(model))?;
        Ok(id)
    }

    /// Like [`append_model`](Self::append_model), for a bare geometry file
    /// plus optional texture maps.
    pub fn append_geometry(
        &mut self,
        geometry: &str,
        color_map: Option<&str>,
        occlusion_map: Option<&str>,
        normal_map: Option<&str>,
        quality: Option<Quality>,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let parent = parent.unwrap_or_else(|| self.graph.root());
        if !self.graph.contains(parent) {
            return Err(DocError::precondition(
                "parent node does not belong to this document",
            ));
        }
        let quality = quality.unwrap_or(self.default_quality);

        let mut assets = vec![AssetRef::new(geometry, AssetType::Geometry)];
        if let Some(uri) = color_map {
            assets.push(AssetRef::new(uri, AssetType::Image).with_map_type(MapType::Color));
        }
        if let Some(uri) = occlusion_map {
            assets.push(AssetRef::new(uri, AssetType::Image).with_map_type(MapType::Occlusion));
        }
        if let Some(uri) = normal_map {
            assets.push(AssetRef::new(uri, AssetType::Image).with_map_type(MapType::Normal));
        }

        let id = self
            .graph
            .create_node(NodeKind::Item, Some(display_name(geometry)), parent)?;
        let mut model = ModelComponent::new(quality);
        model.add_derivative(Derivative::new(Usage::Web3D, quality, assets));
        if let Some(loader) = &self.loader {
            model.set_loader(loader.clone(), self.asset_path.clone());
        }
        self.graph.add_component(id, Component::Model(model))?;
        Ok(id)
    }

    /// Pretty-printed JSON of the serialized document.
    pub fn dump_json(&self) -> Result<String> {
        let data = self.serialize(None)?;
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Indented text rendering of the node/component tree.
    pub fn dump_tree(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.graph.root(), 0, &mut out);
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Ok(node) = self.graph.node(id) else {
            return;
        };
        let components: Vec<&str> = node
            .components()
            .iter()
            .map(|c| c.kind().type_name())
            .collect();
        let _ = write!(out, "{}{} ({})", "  ".repeat(depth), node.display_name(), node.kind.type_name());
        if components.is_empty() {
            let _ = writeln!(out);
        } else {
            let _ = writeln!(out, " [{}]", components.join(", "));
        }
        for &child in node.children() {
            self.dump_node(child, depth + 1, out);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn display_name(uri: &str) -> String {
    let file = uri.rsplit(['/', '\\']).next().unwrap_or(uri);
    file.split('.').next().unwrap_or(file).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_document() -> DocumentData {
        serde_json::from_value(json!({
            "asset": { "type": "3DDocument", "version": "1.0" },
            "scene": 0,
            "scenes": [{ "name": "Pot", "nodes": [0, 2], "setup": 0 }],
            "nodes": [
                {
                    "name": "group",
                    "type": "Item",
                    "translation": [1.0, 2.0, 3.0],
                    "children": [1]
                },
                {
                    "name": "pot",
                    "type": "Item",
                    "model": 0,
                    "meta": 0
                },
                {
                    "name": "main camera",
                    "type": "Item",
                    "camera": 0
                }
            ],
            "cameras": [{
                "type": "perspective",
                "perspective": { "yfov": 0.9, "znear": 0.1, "zfar": 1000.0 }
            }],
            "models": [{
                "units": "cm",
                "derivatives": [
                    {
                        "usage": "Web3D",
                        "quality": "Thumb",
                        "assets": [{ "uri": "pot-thumb.glb", "type": "Model" }]
                    },
                    {
                        "usage": "Web3D",
                        "quality": "High",
                        "assets": [{ "uri": "pot-high.glb", "type": "Model" }]
                    }
                ]
            }],
            "metas": [{ "collection": { "title": "Pot" } }],
            "setups": [{
                "grid": { "visible": true, "color": [0.5, 0.5, 0.5] }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn open_then_serialize_reproduces_the_scene_graph() {
        let mut document = Document::new();
        let input = sample_document();
        document.open(&input, Some("https://example.org/pot"), None).unwrap();

        let output = document.serialize(None).unwrap();

        assert_eq!(output.nodes.len(), input.nodes.len());
        assert_eq!(output.scenes.len(), 1);
        assert_eq!(output.scenes[0].nodes.len(), input.scenes[0].nodes.len());
        assert_eq!(output.scenes[0].setup, Some(0));
        assert_eq!(output.cameras.len(), 1);
        assert_eq!(output.models.len(), 1);
        assert_eq!(output.metas.len(), 1);

        // Hierarchy shape: one root-level node has exactly one child.
        let with_child = output
            .nodes
            .iter()
            .find(|n| !n.children.is_empty())
            .expect("group node keeps its child");
        assert_eq!(with_child.children.len(), 1);
        assert_eq!(with_child.name.as_deref(), Some("group"));

        // Component data survives.
        assert_eq!(output.models[0].derivatives, input.models[0].derivatives);
        assert_eq!(output.metas[0], input.metas[0]);

        // Identity transforms are omitted; the translated node keeps its matrix.
        let translated = output.nodes.iter().find(|n| n.name.as_deref() == Some("group")).unwrap();
        let matrix = translated.matrix.expect("non-identity transform serialized");
        assert_eq!(&matrix[12..15], &[1.0, 2.0, 3.0]);
        let camera_node = output
            .nodes
            .iter()
            .find(|n| n.name.as_deref() == Some("main camera"))
            .unwrap();
        assert!(camera_node.matrix.is_none());

        // A second round trip is stable.
        let mut second = Document::new();
        second.open(&output, None, None).unwrap();
        let third = second.serialize(None).unwrap();
        assert_eq!(serde_json::to_value(&third).unwrap(), serde_json::to_value(&output).unwrap());
    }

    #[test]
    fn scene_units_survive_a_round_trip() {
        let mut document = Document::new();
        let mut input = sample_document();
        input.scenes[0].units = Some(Units::Cm);

        document.open(&input, None, None).unwrap();
        assert_eq!(document.scene_units, Some(Units::Cm));
        let output = document.serialize(None).unwrap();
        assert_eq!(output.scenes[0].units, Some(Units::Cm));

        // A document without the declaration stays without it.
        document.open(&sample_document(), None, None).unwrap();
        assert_eq!(document.serialize(None).unwrap().scenes[0].units, None);
    }

    #[test]
    fn open_rejects_invalid_documents_without_mutation() {
        let mut document = Document::new();
        document.append_model("keep.glb", None, None).unwrap();

        let mut bad = sample_document();
        bad.asset.version = "9.9".into();
        let err = document.open(&bad, None, None).unwrap_err();
        assert!(matches!(err, DocError::Validation { .. }));

        // The previous content is still there.
        assert_eq!(document.graph().node_count(), 2);
    }

    #[test]
    fn open_without_merge_target_clears_the_tree() {
        let mut document = Document::new();
        document.open(&sample_document(), None, None).unwrap();
        let first_count = document.graph().node_count();

        document.open(&sample_document(), None, None).unwrap();
        assert_eq!(document.graph().node_count(), first_count);
    }

    #[test]
    fn open_with_merge_parent_reparents_and_skips_scene_metadata() {
        let mut document = Document::new();
        let anchor = document.append_model("anchor.glb", None, None).unwrap();

        document.open(&sample_document(), None, Some(anchor)).unwrap();

        let children = document.graph().node(anchor).unwrap().children().to_vec();
        assert_eq!(children.len(), 2);
        // Scene-level setup was skipped.
        assert!(
            !document
                .graph()
                .node(document.root())
                .unwrap()
                .has_component(ComponentKind::Setup)
        );
    }

    #[test]
    fn serialize_fails_on_empty_graph() {
        let document = Document::new();
        let err = document.serialize(None).unwrap_err();
        assert!(matches!(err, DocError::Precondition(_)));
    }

    #[test]
    fn append_model_to_foreign_parent_fails_without_mutation() {
        let mut document = Document::new();
        let mut other = Document::new();
        let foreign = other.append_model("other.glb", None, None).unwrap();

        let before = document.graph().node_count();
        let err = document
            .append_model("mine.glb", None, Some(foreign))
            .unwrap_err();
        assert!(matches!(err, DocError::Precondition(_)));
        assert_eq!(document.graph().node_count(), before);
    }

    #[test]
    fn append_model_registers_one_derivative() {
        let mut document = Document::new();
        let id = document
            .append_model("models/pot-high.glb", Some(Quality::Medium), None)
            .unwrap();

        let node = document.graph().node(id).unwrap();
        assert_eq!(node.display_name(), "pot-high");
        let model = node
            .component(ComponentKind::Model)
            .and_then(Component::as_model)
            .unwrap();
        assert_eq!(model.derivatives().len(), 1);
        assert_eq!(model.derivatives()[0].quality, Quality::Medium);
    }

    #[test]
    fn append_geometry_tags_texture_maps() {
        let mut document = Document::new();
        let id = document
            .append_geometry(
                "mesh.ply",
                Some("color.jpg"),
                Some("occlusion.jpg"),
                None,
                None,
                None,
            )
            .unwrap();

        let node = document.graph().node(id).unwrap();
        let model = node
            .component(ComponentKind::Model)
            .and_then(Component::as_model)
            .unwrap();
        let assets = &model.derivatives()[0].assets;
        assert_eq!(assets.len(), 3);
        assert_eq!(assets[0].kind, AssetType::Geometry);
        assert_eq!(assets[1].map_type, Some(MapType::Color));
        assert_eq!(assets[2].map_type, Some(MapType::Occlusion));
    }

    #[test]
    fn component_filter_limits_serialization() {
        let mut document = Document::new();
        document.open(&sample_document(), None, None).unwrap();

        let filter = |kind: ComponentKind| kind != ComponentKind::Model;
        let output = document.serialize(Some(&filter)).unwrap();
        assert!(output.models.is_empty());
        assert!(output.nodes.iter().all(|n| n.model.is_none()));
        // Cameras still exported.
        assert_eq!(output.cameras.len(), 1);
    }

    #[test]
    fn runtime_capabilities_are_listed_but_never_persisted() {
        use crate::component::ReferenceComponent;

        let mut document = Document::new();
        document.open(&sample_document(), None, None).unwrap();
        let before = serde_json::to_value(document.serialize(None).unwrap()).unwrap();

        let group = document.graph().node(document.root()).unwrap().children()[0];
        document
            .graph_mut()
            .add_component(
                group,
                Component::Reference(ReferenceComponent {
                    uri: "article.html".into(),
                    mime_type: Some("text/html".into()),
                }),
            )
            .unwrap();

        assert!(document.dump_tree().contains("[Reference]"));
        let after = serde_json::to_value(document.serialize(None).unwrap()).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn dump_tree_lists_nodes_and_components() {
        let mut document = Document::new();
        document.open(&sample_document(), None, None).unwrap();

        let tree = document.dump_tree();
        assert!(tree.contains("Pot (Scene)"));
        assert!(tree.contains("pot (Item) [Model, Meta]"));
        assert!(tree.contains("  group (Item)"));
        assert!(tree.contains("    pot (Item)"));
    }
}
