//! Document/graph layer of a 3D scene viewer and authoring tool.
//!
//! A document is a glTF-like JSON description of a scene referencing model
//! derivatives at multiple quality levels. This crate converts documents to
//! and from a typed node/component graph, selects and progressively loads
//! derivatives, and serializes operator edits back into the document format.
//! Rendering and asset decoding are external collaborators behind the
//! traits in [`render`] and [`asset::loader`].

pub mod asset;
pub mod component;
pub mod document;
pub mod error;
pub mod graph;
pub mod render;
pub mod settings;

pub use document::{Document, DocumentData};
pub use error::{DocError, Result};

pub const CONFY_APP_NAME: &str = "voyager-doc";
