//! # mbviewer
//!
//! Viewer and processing client for bathymetric multibeam surveys.
//!
//! This is the umbrella crate that ties the individual crates together and
//! adds the application layer on top of them.
//!
//! ## Crates
//!
//! - **Core**: points, point clouds, meshes, transforms, colors and errors
//! - **I/O**: PCD decoding, LOD variant naming and point cloud sources
//! - **Gateway**: HTTP client for the processing backend and file server
//! - **Visualization**: color ramp, render preparation, LOD loading and the viewer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mbviewer::prelude::*;
//!
//! # async fn demo() -> mbviewer::Result<()> {
//! let config = AppConfig::default();
//! let mut viewer = Viewer::new(HttpPointCloudSource::new(), config.viewer.clone());
//! viewer.attach(Viewport::new(1280, 720))?;
//! viewer.select_file("mb_raw").await?;
//!
//! let mut session = ViewerSession::new(HttpBackend::new(config.backend)?);
//! session.refresh_file_lists().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod session;

pub use config::AppConfig;
pub use session::ViewerSession;

// Re-export core functionality
pub use mbviewer_core::*;

// Re-export sub-crates
pub use mbviewer_gateway as gateway;
pub use mbviewer_io as io;
pub use mbviewer_visualization as visualization;

/// Convenient imports for common use cases
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::session::ViewerSession;
    pub use mbviewer_core::*;
    pub use mbviewer_gateway::{
        BackendApi, BackendConfig, HttpBackend, HttpPointCloudSource, ProcessingSettings, ScriptKind,
        ScriptSelection, ScriptSettings,
    };
    pub use mbviewer_io::{
        display_name, lod_variant_file_names, lod_variant_urls, read_pcd_file, write_pcd_file, FileSystemSource,
        PcdReader, PcdWriteOptions, PcdWriter, PointCloudSource, ProgressCallback, TransferProgress,
    };
    pub use mbviewer_visualization::{
        bathymetry_color, prepare_point_cloud, Camera, ColorRamp, FileLoadingEntry, Frame, FrameRenderer,
        LoadStatus, LoadingStatusBoard, LodGroup, LodLevel, LodLoader, OrbitControls, RenderablePointCloud, Scene,
        SceneNode, Viewer, ViewerCommand, ViewerConfig, ViewerState, Viewport,
    };
}
