//! Visualization for bathymetric point clouds
//!
//! This crate turns decoded point clouds into renderable scene content:
//! - Height based coloring with the bathymetric ramp
//! - Render preparation (recentering, scale, per-vertex colors)
//! - Concurrent loading of LOD variants with progress tracking
//! - Scene graph, camera and orbit controls
//! - The viewer controller and its frame loop

pub mod camera;
pub mod color_ramp;
pub mod config;
pub mod loading;
pub mod lod;
pub mod render_prep;
pub mod scene;
pub mod viewer;

pub use camera::*;
pub use color_ramp::*;
pub use config::*;
pub use loading::*;
pub use lod::*;
pub use render_prep::*;
pub use scene::*;
pub use viewer::*;
