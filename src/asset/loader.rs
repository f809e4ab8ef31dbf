//! Asset loading collaborator.
//!
//! Loading is the only suspending operation in the document layer. The
//! external engine supplies the decoder that turns fetched bytes into a
//! renderable subtree; this module only fetches and sequences.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::sync::atomic::AtomicBool;

use log::debug;

use crate::error::{DocError, Result};
use crate::render::{Aabb, NullRenderHandle, RenderHandle};

/// Result of loading one asset: the engine-side subtree plus its extents.
pub struct LoadedAsset {
    pub handle: Box<dyn RenderHandle>,
    pub bounding_box: Option<Aabb>,
}

pub type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<LoadedAsset>> + Send + 'a>>;

/// External asset loading manager. Given an asset uri and the document's
/// base path, resolves to a loaded visual representation. Failures are
/// per-asset and surface as rejected loads.
pub trait AssetLoader: Send + Sync {
    fn load_asset<'a>(&'a self, uri: &'a str, base_path: &'a str) -> LoadFuture<'a>;
}

/// Joins base path and uri, normalizing backslashes and duplicate slashes.
pub fn resolve_url(base_path: &str, uri: &str) -> String {
    let uri = uri.replace('\\', "/");
    let uri = uri.trim_start_matches('/');
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        uri.to_string()
    } else {
        format!("{}/{}", base, uri)
    }
}

/// Decodes fetched bytes into an engine subtree. Supplied by the engine.
pub type AssetDecoder =
    dyn Fn(Vec<u8>, &str) -> Result<LoadedAsset> + Send + Sync;

/// Fetches assets over HTTP and hands the bytes to the engine's decoder.
pub struct RemoteAssetReader {
    decoder: Arc<AssetDecoder>,
}

impl RemoteAssetReader {
    pub fn new(decoder: Arc<AssetDecoder>) -> Self {
        Self { decoder }
    }

    async fn fetch(url: &str) -> Result<Vec<u8>> {
        debug!("fetching asset from {}", url);
        let response = reqwest::get(url).await?;
        if !response.status().is_success() {
            return Err(DocError::Network(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

impl AssetLoader for RemoteAssetReader {
    fn load_asset<'a>(&'a self, uri: &'a str, base_path: &'a str) -> LoadFuture<'a> {
        Box::pin(async move {
            let url = resolve_url(base_path, uri);
            let bytes = Self::fetch(&url)
                .await
                .map_err(|e| DocError::load(uri, e.to_string()))?;
            (self.decoder)(bytes, uri)
        })
    }
}

/// Loader double for tests and headless runs: records the order of requested
/// uris, fails the ones it was told to fail, and hands out `NullRenderHandle`s
/// whose disposal flags it retains for inspection.
#[derive(Default)]
pub struct StubLoader {
    loaded: Mutex<Vec<String>>,
    fail: HashSet<String>,
    bounding_box: Option<Aabb>,
    handles: Mutex<Vec<Arc<AtomicBool>>>,
}

impl StubLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounding_box(mut self, bounding_box: Aabb) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    pub fn failing_on(mut self, uri: impl Into<String>) -> Self {
        self.fail.insert(uri.into());
        self
    }

    /// Uris requested so far, in load order.
    pub fn loaded_uris(&self) -> Vec<String> {
        self.loaded.lock().unwrap().clone()
    }

    /// Disposal flags of every handle produced so far, in load order.
    pub fn handle_flags(&self) -> Vec<Arc<AtomicBool>> {
        self.handles.lock().unwrap().clone()
    }
}

impl AssetLoader for StubLoader {
    fn load_asset<'a>(&'a self, uri: &'a str, _base_path: &'a str) -> LoadFuture<'a> {
        Box::pin(async move {
            self.loaded.lock().unwrap().push(uri.to_string());
            if self.fail.contains(uri) {
                return Err(DocError::load(uri, "stubbed failure"));
            }
            let handle = NullRenderHandle::new(self.bounding_box);
            self.handles.lock().unwrap().push(handle.disposed_flag());
            Ok(LoadedAsset {
                bounding_box: self.bounding_box,
                handle: Box::new(handle),
            })
        })
    }
}
