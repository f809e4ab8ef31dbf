//! Thin capability payloads without document-specific round-trip logic.

use std::collections::BTreeMap;

use log::debug;

/// Metadata slice carried verbatim from the document's `metas` array.
#[derive(Debug, Clone, Default)]
pub struct MetaComponent {
    pub data: serde_json::Value,
}

/// Reference to an external resource (a linked document, article, media).
#[derive(Debug, Clone, Default)]
pub struct ReferenceComponent {
    pub uri: String,
    pub mime_type: Option<String>,
}

/// Enabled/disabled state of the operator tool set.
#[derive(Debug, Clone, Default)]
pub struct ToolManagerComponent {
    pub active_tools: Vec<String>,
    pub visible: bool,
}

/// Named feature flags for the hosting application.
#[derive(Debug, Clone, Default)]
pub struct FeatureSetComponent {
    pub features: BTreeMap<String, bool>,
}

/// Resolves asset uris against the document's base path for hosts that
/// read additional files next to the document.
#[derive(Debug, Clone, Default)]
pub struct AssetReaderComponent {
    pub root_url: String,
}

/// Explicitly constructed analytics context. Passed in by the host; never
/// a global. Recording is a no-op beyond a debug log (reporting is the
/// host's concern).
#[derive(Debug, Clone, Default)]
pub struct AnalyticsComponent {
    pub enabled: bool,
}

impl AnalyticsComponent {
    pub fn record(&self, event: &str) {
        if self.enabled {
            debug!("analytics event: {}", event);
        }
    }
}

/// Document-level state: title plus the host-facing dump triggers, which
/// live on `Document` itself.
#[derive(Debug, Clone, Default)]
pub struct DocumentComponent {
    pub title: Option<String>,
}
