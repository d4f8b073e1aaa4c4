//! Viewer configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Base URL serving the `<name>_lod_<size>.pcd` files
    pub file_server_url: String,
    /// Point counts of the LOD variants to load, nearest level first
    pub lod_sizes: Vec<u64>,
    /// Camera distance between consecutive LOD levels
    pub lod_distance_step: f32,
    /// File loaded when the render loop starts, if nothing was selected yet
    pub initial_file: Option<String>,
    pub field_of_view_degrees: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub frame_interval_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            file_server_url: "http://127.0.0.1:3333/".to_string(),
            lod_sizes: vec![1_000_000],
            lod_distance_step: 300.0,
            initial_file: Some("mb_raw".to_string()),
            field_of_view_degrees: 60.0,
            near_plane: 0.1,
            far_plane: 500_000.0,
            frame_interval_ms: 16,
        }
    }
}

impl ViewerConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}
