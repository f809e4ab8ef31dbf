pub mod derivative;
pub mod loader;

pub use derivative::{AssetRef, AssetType, Derivative, MapType, Quality, Usage};
pub use loader::{AssetLoader, LoadedAsset, RemoteAssetReader, StubLoader};
