//! Application configuration

use mbviewer_core::{Error, Result};
use mbviewer_gateway::BackendConfig;
use mbviewer_visualization::ViewerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete configuration of the viewer application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viewer: ViewerConfig,
    pub backend: BackendConfig,
}

impl AppConfig {
    /// Parse a JSON document; missing sections and fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_json_str(&json)
    }
}
