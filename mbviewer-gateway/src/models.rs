//! Request bodies exchanged with the processing backend

use serde::{Deserialize, Serialize};

/// Conversion job for a raw survey file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingSettings {
    pub filename: String,
    /// Column separator of the raw file
    pub sep: String,
    /// Convert coordinates to UTM before writing LOD files
    pub to_utm: bool,
}

/// Analysis job for a processed LOD file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSettings {
    pub stat_based: bool,
    pub k_means: bool,
    pub ml: bool,
    pub filename: String,
}

impl ScriptSettings {
    /// True if at least one analysis method is requested
    pub fn any_selected(&self) -> bool {
        self.stat_based || self.k_means || self.ml
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub file_name: String,
}

/// Analysis methods offered by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    StatBased,
    KMeans,
    Ml,
}

/// Set of analysis methods toggled on by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSelection {
    selected: Vec<ScriptKind>,
}

impl ScriptSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the method if it is not selected, deselect it otherwise
    pub fn toggle(&mut self, kind: ScriptKind) {
        match self.selected.iter().position(|k| *k == kind) {
            Some(index) => {
                self.selected.remove(index);
            }
            None => self.selected.push(kind),
        }
    }

    pub fn contains(&self, kind: ScriptKind) -> bool {
        self.selected.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Job for `filename`, `None` when no method is selected
    pub fn to_settings(&self, filename: &str) -> Option<ScriptSettings> {
        let settings = ScriptSettings {
            stat_based: self.contains(ScriptKind::StatBased),
            k_means: self.contains(ScriptKind::KMeans),
            ml: self.contains(ScriptKind::Ml),
            filename: filename.to_string(),
        };
        settings.any_selected().then_some(settings)
    }
}
