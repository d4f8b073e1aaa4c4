//! Viewer controller
//!
//! Owns the scene, camera, controls and loading state, turns file selections
//! into LOD groups and drives the frame loop. A selection moves through
//! [`Viewer::begin_selection`] and [`Viewer::finish_selection`]; each one is
//! tagged with a generation so a load that finishes after the user picked
//! another file is discarded instead of replacing the newer content.

use crate::camera::{Camera, OrbitControls};
use crate::config::ViewerConfig;
use crate::loading::{FileLoadingEntry, LoadingStatusBoard, LodLoader};
use crate::lod::{LodGroup, LodLevel};
use crate::render_prep::RenderablePointCloud;
use crate::scene::{GridHelper, Scene, SceneNode};
use futures::stream::{FuturesUnordered, StreamExt};
use mbviewer_core::{Error, Point3f, Result, Rgb, TriangleMesh};
use mbviewer_io::{lod_variant_urls, PointCloudSource};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    /// No viewport attached yet
    Uninitialized,
    /// Scene built, nothing loaded or the last load failed
    SceneReady,
    /// Waiting for the current selection's variants
    Loading,
    /// The current selection is in the scene
    Displaying,
}

/// Size of the drawing surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Output surface settings fixed when the viewer is attached
#[derive(Debug, Clone, PartialEq)]
pub struct RendererSettings {
    pub width: u32,
    pub height: u32,
    pub clear_color: [f64; 4],
    pub antialias: bool,
}

impl RendererSettings {
    fn for_viewport(viewport: Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            antialias: true,
        }
    }
}

/// Everything a backend needs to draw one frame
#[derive(Debug)]
pub struct Frame<'a> {
    pub index: u64,
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub settings: &'a RendererSettings,
    /// LOD level chosen for the current camera distance
    pub active_level: Option<&'a LodLevel>,
}

/// Draws frames, implemented by the GPU backend
pub trait FrameRenderer {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()>;
}

/// A selection that has been started but not finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRequest {
    pub generation: u64,
    pub file_name: String,
    pub urls: Vec<String>,
}

/// Input accepted by [`Viewer::run`]
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    SelectFile(String),
    Rotate { azimuth: f32, polar: f32 },
    Zoom(f32),
    Shutdown,
}

type SelectionOutcome = (SelectionRequest, Result<Vec<RenderablePointCloud>>);

pub struct Viewer<S> {
    config: ViewerConfig,
    state: ViewerState,
    scene: Scene,
    camera: Camera,
    controls: OrbitControls,
    settings: Option<RendererSettings>,
    loader: Arc<LodLoader<S>>,
    statuses: LoadingStatusBoard,
    generation: u64,
    selected_file: Option<String>,
    frame_index: u64,
}

impl<S: PointCloudSource> Viewer<S> {
    pub fn new(source: S, config: ViewerConfig) -> Self {
        let statuses = LoadingStatusBoard::new();
        let loader = Arc::new(LodLoader::new(source, statuses.clone()));
        let camera = Camera::perspective(config.field_of_view_degrees, 1.0, config.near_plane, config.far_plane);

        Self {
            config,
            state: ViewerState::Uninitialized,
            scene: Scene::new(),
            camera,
            controls: OrbitControls::new(Point3f::origin()),
            settings: None,
            loader,
            statuses,
            generation: 0,
            selected_file: None,
            frame_index: 0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn renderer_settings(&self) -> Option<&RendererSettings> {
        self.settings.as_ref()
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame_index
    }

    /// Handle to the loading list, shared with in-flight loads
    pub fn status_board(&self) -> &LoadingStatusBoard {
        &self.statuses
    }

    pub fn loading_statuses(&self) -> Vec<FileLoadingEntry> {
        self.statuses.snapshot()
    }

    /// Build the scene for a drawing surface
    pub fn attach(&mut self, viewport: Viewport) -> Result<()> {
        if self.state != ViewerState::Uninitialized {
            return Err(Error::Visualization("viewer is already attached".to_string()));
        }

        self.camera = Camera::perspective(
            self.config.field_of_view_degrees,
            viewport.aspect(),
            self.config.near_plane,
            self.config.far_plane,
        );
        self.controls = OrbitControls::new(Point3f::origin());
        self.settings = Some(RendererSettings::for_viewport(viewport));

        self.scene.clear();
        self.scene.add(SceneNode::Placeholder(TriangleMesh::cube(1.0, Rgb::from_hex(0x00ff00))));
        self.scene.add(SceneNode::Grid(GridHelper::default()));

        self.state = ViewerState::SceneReady;
        log::debug!("Viewer attached to {}x{} viewport", viewport.width, viewport.height);
        Ok(())
    }

    /// Start showing `file_name`: clear the scene content and work out which
    /// variants to load. Any earlier selection becomes stale.
    pub fn begin_selection(&mut self, file_name: &str) -> Result<SelectionRequest> {
        if self.state == ViewerState::Uninitialized {
            return Err(Error::Visualization("viewer is not attached".to_string()));
        }

        self.generation += 1;
        self.selected_file = Some(file_name.to_string());
        self.scene.clear_content();
        self.state = ViewerState::Loading;

        let urls = lod_variant_urls(&self.config.file_server_url, file_name, &self.config.lod_sizes);
        for url in &urls {
            log::debug!("LOD variant of {}: {}", file_name, url);
        }
        log::info!("Selected {} ({} LOD variants)", file_name, urls.len());

        Ok(SelectionRequest {
            generation: self.generation,
            file_name: file_name.to_string(),
            urls,
        })
    }

    /// Insert the loaded variants of a selection.
    ///
    /// Returns `Ok(false)` when the selection is stale and was discarded.
    pub fn finish_selection(
        &mut self,
        request: SelectionRequest,
        result: Result<Vec<RenderablePointCloud>>,
    ) -> Result<bool> {
        if request.generation != self.generation {
            log::warn!(
                "Discarding stale load of {} (generation {}, current {})",
                request.file_name,
                request.generation,
                self.generation
            );
            return Ok(false);
        }

        match result {
            Ok(objects) => {
                let group = LodGroup::from_objects(objects, self.config.lod_distance_step);
                log::info!(
                    "Displaying {} with {} LOD levels ({} points)",
                    request.file_name,
                    group.len(),
                    group.point_count()
                );
                self.scene.add(SceneNode::Lod(group));
                self.state = ViewerState::Displaying;
                Ok(true)
            }
            Err(err) => {
                self.state = ViewerState::SceneReady;
                Err(err)
            }
        }
    }

    /// Select a file and wait until its variants are in the scene
    pub async fn select_file(&mut self, file_name: &str) -> Result<bool> {
        let request = self.begin_selection(file_name)?;
        let result = self.loader.load_all(&request.urls).await;
        self.finish_selection(request, result)
    }

    fn start_selection(&mut self, file_name: &str) -> Result<impl Future<Output = SelectionOutcome>> {
        let request = self.begin_selection(file_name)?;
        let loader = Arc::clone(&self.loader);
        Ok(async move {
            let result = loader.load_all(&request.urls).await;
            (request, result)
        })
    }

    /// Apply control input and draw one frame
    pub fn render_frame<R: FrameRenderer>(&mut self, renderer: &mut R) -> Result<()> {
        let settings = self
            .settings
            .as_ref()
            .ok_or_else(|| Error::Visualization("viewer is not attached".to_string()))?;

        self.controls.update(&mut self.camera);

        let distance = self.camera.distance_to(&Point3f::origin());
        let active_level = self
            .scene
            .lod_group()
            .and_then(|group| group.level_for_distance(distance));

        self.frame_index += 1;
        renderer.render(&Frame {
            index: self.frame_index,
            scene: &self.scene,
            camera: &self.camera,
            settings,
            active_level,
        })
    }

    /// Render at the configured frame interval until `Shutdown` arrives or
    /// the command channel closes. Selections load alongside the frames.
    pub async fn run<R: FrameRenderer>(
        &mut self,
        renderer: &mut R,
        mut commands: mpsc::UnboundedReceiver<ViewerCommand>,
    ) -> Result<()> {
        if self.state == ViewerState::Uninitialized {
            return Err(Error::Visualization("viewer is not attached".to_string()));
        }

        let mut ticker = tokio::time::interval(self.config.frame_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight = FuturesUnordered::new();

        if self.selected_file.is_none() {
            if let Some(name) = self.config.initial_file.clone() {
                in_flight.push(self.start_selection(&name)?);
            }
        }

        loop {
            tokio::select! {
                _ = ticker.tick() => self.render_frame(renderer)?,
                command = commands.recv() => match command {
                    Some(ViewerCommand::SelectFile(name)) => in_flight.push(self.start_selection(&name)?),
                    Some(ViewerCommand::Rotate { azimuth, polar }) => self.controls.rotate(azimuth, polar),
                    Some(ViewerCommand::Zoom(factor)) => self.controls.zoom(factor),
                    Some(ViewerCommand::Shutdown) | None => break,
                },
                Some((request, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    if let Err(err) = self.finish_selection(request, result) {
                        log::error!("Selection failed: {}", err);
                    }
                }
            }
        }

        log::debug!("Render loop stopped after {} frames", self.frame_index);
        Ok(())
    }
}
