//! Model capability: owns derivative descriptors for one visual object and
//! manages progressive, quality-tiered loading.
//!
//! Loads run as spawned tasks; their outcomes arrive over a completion
//! channel and are applied on the next update tick. A failed load is logged
//! and the model stays without an active derivative, free to retry later.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

use log::warn;
use nalgebra_glm as glm;

use crate::asset::derivative::select;
use crate::asset::{AssetLoader, Derivative, LoadedAsset, Quality, Usage};
use crate::component::property::Property;
use crate::document::schema::{ModelData, Units};
use crate::error::{DocError, Result};
use crate::graph::transform::{
    compose_matrix, matrix_from_array, matrix_is_identity, matrix_to_array,
};
use crate::render::Aabb;

struct ActiveDerivative {
    derivative: Derivative,
    handle: Box<dyn crate::render::RenderHandle>,
}

struct LoadOutcome {
    generation: u64,
    derivative: Derivative,
    result: Result<LoadedAsset>,
}

pub struct ModelComponent {
    pub units: Units,
    pub auto_load: bool,
    pub quality: Property<Quality>,
    pub position: Property<[f32; 3]>,
    /// Euler angles in degrees, Z-Y-X order.
    pub rotation: Property<[f32; 3]>,

    derivatives: Vec<Derivative>,
    active: Option<ActiveDerivative>,
    bounding_box: Option<Aabb>,
    local_matrix: glm::Mat4,

    loader: Option<Arc<dyn AssetLoader>>,
    base_path: String,
    outcome_tx: Sender<LoadOutcome>,
    outcome_rx: Receiver<LoadOutcome>,
    /// Bumped on dispose so stale outcomes from superseded loads are dropped.
    generation: u64,
    loading: bool,
}

impl ModelComponent {
    pub fn new(quality: Quality) -> Self {
        let (outcome_tx, outcome_rx) = channel();
        Self {
            units: Units::default(),
            auto_load: true,
            quality: Property::new(quality),
            position: Property::new([0.0; 3]),
            rotation: Property::new([0.0; 3]),
            derivatives: Vec::new(),
            active: None,
            bounding_box: None,
            local_matrix: glm::Mat4::identity(),
            loader: None,
            base_path: String::new(),
            outcome_tx,
            outcome_rx,
            generation: 0,
            loading: false,
        }
    }

    pub fn set_loader(&mut self, loader: Arc<dyn AssetLoader>, base_path: impl Into<String>) {
        self.loader = Some(loader);
        self.base_path = base_path.into();
    }

    pub fn derivatives(&self) -> &[Derivative] {
        &self.derivatives
    }

    pub fn add_derivative(&mut self, derivative: Derivative) {
        self.derivatives.push(derivative);
    }

    /// Removes the first derivative matching the (quality, usage) pair.
    pub fn remove_derivative(&mut self, quality: Quality, usage: Usage) -> Option<Derivative> {
        let index = self
            .derivatives
            .iter()
            .position(|d| d.quality == quality && d.usage == usage)?;
        Some(self.derivatives.remove(index))
    }

    /// Selects the derivative to load for a quality tier; see
    /// [`crate::asset::derivative::select`] for the fallback rules.
    pub fn select_derivative(&self, quality: Quality, usage: Usage) -> Option<&Derivative> {
        select(&self.derivatives, quality, usage)
    }

    pub fn active_derivative(&self) -> Option<&Derivative> {
        self.active.as_ref().map(|a| &a.derivative)
    }

    pub fn bounding_box(&self) -> Option<&Aabb> {
        self.bounding_box.as_ref()
    }

    pub fn local_matrix(&self) -> &glm::Mat4 {
        &self.local_matrix
    }

    /// The derivatives `auto_load` would fetch, in load order: the thumbnail
    /// first if one exists, then the selected target quality.
    fn load_sequence(&self, quality: Quality) -> Result<Vec<Derivative>> {
        let mut sequence = Vec::new();
        if quality != Quality::Thumb {
            if let Some(thumb) = self
                .derivatives
                .iter()
                .find(|d| d.quality == Quality::Thumb && d.usage == Usage::Web3D)
            {
                sequence.push(thumb.clone());
            }
        }
        if let Some(target) = self.select_derivative(quality, Usage::Web3D) {
            if sequence.last() != Some(target) {
                sequence.push(target.clone());
            }
        }
        if sequence.is_empty() {
            return Err(DocError::load(
                "<auto-load>",
                format!("no suitable derivative for quality {}", quality.name()),
            ));
        }
        Ok(sequence)
    }

    /// Loads the thumbnail (if any) and the target quality sequentially,
    /// each load fully resolved before the next begins.
    pub async fn auto_load(&mut self, quality: Quality) -> Result<()> {
        for derivative in self.load_sequence(quality)? {
            self.load_derivative(derivative).await?;
        }
        Ok(())
    }

    /// Loads one derivative and swaps it in. Requires a configured loader.
    pub async fn load_derivative(&mut self, derivative: Derivative) -> Result<()> {
        let loader = self
            .loader
            .clone()
            .ok_or_else(|| DocError::precondition("no asset loader configured"))?;
        let uri = derivative
            .primary_asset()
            .map(|a| a.uri.clone())
            .ok_or_else(|| DocError::load("<derivative>", "derivative has no loadable asset"))?;
        let loaded = loader.load_asset(&uri, &self.base_path).await?;
        self.install(derivative, loaded);
        Ok(())
    }

    /// Atomically swaps the active derivative: the previous rendered
    /// representation is disposed before the new one takes its place.
    fn install(&mut self, derivative: Derivative, loaded: LoadedAsset) {
        if let Some(mut previous) = self.active.take() {
            previous.handle.dispose();
        }
        if self.bounding_box.is_none() {
            self.bounding_box = loaded.bounding_box;
        }
        self.active = Some(ActiveDerivative {
            derivative,
            handle: loaded.handle,
        });
    }

    /// Fire-and-forget auto-load from the update tick. Errors are logged,
    /// never propagated.
    fn start_auto_load(&mut self, quality: Quality) {
        let Some(loader) = self.loader.clone() else {
            return;
        };
        let sequence = match self.load_sequence(quality) {
            Ok(sequence) => sequence,
            Err(e) => {
                warn!("auto-load skipped: {}", e);
                return;
            }
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("auto-load skipped: no async runtime available");
            return;
        };

        self.loading = true;
        let tx = self.outcome_tx.clone();
        let base_path = self.base_path.clone();
        let generation = self.generation;
        handle.spawn(async move {
            for derivative in sequence {
                let uri = derivative.primary_asset().map(|a| a.uri.clone());
                let result = match uri {
                    Some(uri) => loader.load_asset(&uri, &base_path).await,
                    None => Err(DocError::load(
                        "<derivative>",
                        "derivative has no loadable asset",
                    )),
                };
                let failed = result.is_err();
                let _ = tx.send(LoadOutcome {
                    generation,
                    derivative,
                    result,
                });
                // The rest of the sequence would supersede a failed tier
                // anyway; stop and let the update loop decide on a retry.
                if failed {
                    break;
                }
            }
        });
    }

    /// One update tick: drains completed loads, kicks off auto-loading when
    /// idle, recomposes the local matrix on property changes. Returns true
    /// if anything observable changed.
    pub fn update(&mut self) -> bool {
        let mut changed = false;

        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if outcome.generation != self.generation {
                // Superseded load; its representation is no longer referenced.
                if let Ok(mut loaded) = outcome.result {
                    loaded.handle.dispose();
                }
                continue;
            }
            match outcome.result {
                Ok(loaded) => {
                    self.install(outcome.derivative, loaded);
                    changed = true;
                }
                Err(e) => {
                    warn!("derivative load failed: {}", e);
                    self.loading = false;
                }
            }
        }

        if self.active.is_none() && !self.loading && self.auto_load && self.loader.is_some() {
            self.start_auto_load(self.quality.value());
        }

        if self.position.take_changed() | self.rotation.take_changed() {
            self.local_matrix =
                compose_matrix(self.position.value(), self.rotation.value(), [1.0; 3]);
            changed = true;
        }

        changed
    }

    /// Inflates this component from its document slice. Fails if derivatives
    /// already exist, leaving them untouched.
    pub fn from_data(&mut self, data: &ModelData) -> Result<()> {
        if !self.derivatives.is_empty() {
            return Err(DocError::precondition(
                "model already has derivatives; refusing to inflate twice",
            ));
        }
        self.units = data.units;
        self.derivatives = data.derivatives.clone();
        self.bounding_box = data.bounding_box;
        if let Some(values) = &data.matrix {
            let matrix = matrix_from_array(values);
            let (position, rotation, _scale) =
                crate::graph::transform::decompose_matrix(&matrix);
            self.position = Property::new(position);
            self.rotation = Property::new(rotation);
            self.local_matrix = matrix;
        }
        Ok(())
    }

    /// Deflates to the document slice shape.
    pub fn to_data(&self) -> ModelData {
        ModelData {
            units: self.units,
            derivatives: self.derivatives.clone(),
            matrix: if matrix_is_identity(&self.local_matrix) {
                None
            } else {
                Some(matrix_to_array(&self.local_matrix))
            },
            bounding_box: self.bounding_box,
        }
    }

    /// Releases the active derivative's render resources and clears the
    /// reference. Idempotent; also invalidates in-flight loads.
    pub fn dispose(&mut self) {
        self.generation += 1;
        self.loading = false;
        if let Some(mut active) = self.active.take() {
            active.handle.dispose();
        }
    }
}

impl Drop for ModelComponent {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetRef, AssetType, StubLoader};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn derivative(quality: Quality, uri: &str) -> Derivative {
        Derivative::new(
            Usage::Web3D,
            quality,
            vec![AssetRef::new(uri, AssetType::Model)],
        )
    }

    fn model_with(derivatives: &[(Quality, &str)]) -> (ModelComponent, Arc<StubLoader>) {
        let mut model = ModelComponent::new(Quality::High);
        for (quality, uri) in derivatives {
            model.add_derivative(derivative(*quality, uri));
        }
        let loader = Arc::new(StubLoader::new().with_bounding_box(Aabb::new([-1.0; 3], [1.0; 3])));
        model.set_loader(loader.clone(), "");
        (model, loader)
    }

    #[tokio::test]
    async fn auto_load_fetches_thumb_then_target() {
        let (mut model, loader) =
            model_with(&[(Quality::High, "high.glb"), (Quality::Thumb, "thumb.glb")]);

        model.auto_load(Quality::High).await.unwrap();

        assert_eq!(loader.loaded_uris(), vec!["thumb.glb", "high.glb"]);
        assert_eq!(model.active_derivative().unwrap().quality, Quality::High);
        // The thumb's representation was superseded and must be disposed.
        let flags = loader.handle_flags();
        assert!(flags[0].load(Ordering::SeqCst));
        assert!(!flags[1].load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn auto_load_fails_without_any_derivative() {
        let (mut model, loader) = model_with(&[]);
        assert!(model.auto_load(Quality::High).await.is_err());
        assert!(loader.loaded_uris().is_empty());
    }

    #[tokio::test]
    async fn load_derivative_requires_loader() {
        let mut model = ModelComponent::new(Quality::High);
        let err = model
            .load_derivative(derivative(Quality::High, "high.glb"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocError::Precondition(_)));
    }

    #[tokio::test]
    async fn update_tick_auto_loads_and_applies_outcomes() {
        let (mut model, loader) = model_with(&[(Quality::High, "high.glb")]);

        // First tick spawns the load.
        model.update();
        assert!(model.active_derivative().is_none());

        tokio::time::sleep(Duration::from_millis(50)).await;

        // Next tick drains the completion channel.
        assert!(model.update());
        assert_eq!(model.active_derivative().unwrap().quality, Quality::High);
        assert_eq!(loader.loaded_uris(), vec!["high.glb"]);

        // Once active, further ticks do not reload.
        model.update();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(loader.loaded_uris().len(), 1);
    }

    #[tokio::test]
    async fn failed_load_is_logged_and_retried_on_a_later_tick() {
        let mut model = ModelComponent::new(Quality::High);
        model.add_derivative(derivative(Quality::High, "broken.glb"));
        let loader = Arc::new(StubLoader::new().failing_on("broken.glb"));
        model.set_loader(loader.clone(), "");

        model.update();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!model.update());
        assert!(model.active_derivative().is_none());

        // Conditions unchanged: the next tick retries.
        model.update();
        tokio::time::sleep(Duration::from_millis(50)).await;
        model.update();
        assert_eq!(loader.loaded_uris().len(), 2);
    }

    #[tokio::test]
    async fn inflating_twice_fails_and_keeps_derivatives() {
        let mut model = ModelComponent::new(Quality::High);
        let data = ModelData {
            units: Units::M,
            derivatives: vec![derivative(Quality::Low, "low.glb")],
            matrix: None,
            bounding_box: None,
        };
        model.from_data(&data).unwrap();
        assert_eq!(model.derivatives().len(), 1);

        let second = ModelData {
            units: Units::Mm,
            derivatives: vec![derivative(Quality::High, "high.glb")],
            matrix: None,
            bounding_box: None,
        };
        let err = model.from_data(&second).unwrap_err();
        assert!(matches!(err, DocError::Precondition(_)));
        assert_eq!(model.derivatives().len(), 1);
        assert_eq!(model.derivatives()[0].quality, Quality::Low);
        assert_eq!(model.units, Units::M);
    }

    #[tokio::test]
    async fn dispose_releases_resources_and_clears_active() {
        let (mut model, loader) = model_with(&[(Quality::High, "high.glb")]);
        model.auto_load(Quality::High).await.unwrap();
        assert!(model.active_derivative().is_some());

        model.dispose();
        assert!(model.active_derivative().is_none());
        assert!(loader.handle_flags()[0].load(Ordering::SeqCst));
        // Idempotent.
        model.dispose();
    }

    #[tokio::test]
    async fn loading_adopts_bounding_box_only_when_missing() {
        let (mut model, _loader) = model_with(&[(Quality::High, "high.glb")]);
        model.auto_load(Quality::High).await.unwrap();
        assert_eq!(model.bounding_box().unwrap().min, [-1.0; 3]);

        let preset = Aabb::new([-9.0; 3], [9.0; 3]);
        let (mut model, _loader) = model_with(&[(Quality::High, "high.glb")]);
        model.bounding_box = Some(preset);
        model.auto_load(Quality::High).await.unwrap();
        assert_eq!(model.bounding_box().unwrap().max, [9.0; 3]);
    }

    #[test]
    fn rotation_change_recomposes_local_matrix() {
        let mut model = ModelComponent::new(Quality::High);
        model.auto_load = false;
        model.rotation.set([0.0, 0.0, 90.0]);
        assert!(model.update());

        let v = model.local_matrix() * glm::vec4(1.0, 0.0, 0.0, 0.0);
        assert!(v.x.abs() < 1e-5 && (v.y - 1.0).abs() < 1e-5);
        assert!(!model.update());
    }

    #[test]
    fn model_data_round_trip_preserves_matrix_omission() {
        let mut model = ModelComponent::new(Quality::High);
        model
            .from_data(&ModelData {
                units: Units::Cm,
                derivatives: vec![derivative(Quality::High, "high.glb")],
                matrix: None,
                bounding_box: None,
            })
            .unwrap();
        // Identity transform stays omitted on the way out.
        assert!(model.to_data().matrix.is_none());

        model.position.set([1.0, 2.0, 3.0]);
        model.update();
        let exported = model.to_data();
        let matrix = exported.matrix.expect("non-identity matrix must be written");
        assert_eq!(&matrix[12..15], &[1.0, 2.0, 3.0]);
    }
}
