use serde::{Deserialize, Serialize};

use crate::CONFY_APP_NAME;
use crate::asset::Quality;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerSettings {
    pub default_quality: Quality,
    pub auto_load: bool,
    pub pretty_json: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            default_quality: Quality::High,
            auto_load: true,
            pretty_json: true,
        }
    }
}

impl ViewerSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "viewer").unwrap_or_default()
    }

    pub fn save(&self) {
        let _ = confy::store(CONFY_APP_NAME, "viewer", self);
    }
}
