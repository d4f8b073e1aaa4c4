//! Integration tests for the LOD pipeline
//!
//! These tests run file selections end to end: fetching PCD bytes through a
//! source, decoding, render preparation, LOD grouping and the frame loop.

use mbviewer_core::{Error, Point3f, PointCloud, Result};
use mbviewer_io::{PcdWriteOptions, PcdWriter, PointCloudSource, ProgressCallback, TransferProgress};
use mbviewer_visualization::*;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;

const SERVER: &str = "http://files.test/";

/// Cloud of `count` points on a slope from -20 to 0 m
fn create_survey_cloud(count: usize) -> PointCloud<Point3f> {
    (0..count)
        .map(|i| {
            let t = i as f32 / (count - 1) as f32;
            Point3f::new(1000.0 + 50.0 * t, -20.0 + 20.0 * t, 2000.0 + 10.0 * (i % 3) as f32)
        })
        .collect()
}

fn encode(cloud: &PointCloud<Point3f>) -> Vec<u8> {
    PcdWriter::write_bytes(cloud, &PcdWriteOptions::default()).unwrap()
}

/// Serves fixed files by URL, delivering each in two chunks after a delay
struct StubSource {
    files: HashMap<String, (Vec<u8>, Duration)>,
}

impl StubSource {
    fn new() -> Self {
        Self { files: HashMap::new() }
    }

    fn with_file(mut self, name: &str, bytes: Vec<u8>, delay_ms: u64) -> Self {
        self.files
            .insert(format!("{}{}", SERVER, name), (bytes, Duration::from_millis(delay_ms)));
        self
    }

    fn survey() -> Self {
        Self::new()
            .with_file("survey_lod_10.pcd", encode(&create_survey_cloud(10)), 40)
            .with_file("survey_lod_20.pcd", encode(&create_survey_cloud(20)), 10)
    }
}

impl PointCloudSource for StubSource {
    async fn fetch(&self, url: &str, on_progress: ProgressCallback<'_>) -> Result<Vec<u8>> {
        let (bytes, delay) = self
            .files
            .get(url)
            .ok_or_else(|| Error::Http(format!("404 Not Found: {}", url)))?;

        let total = bytes.len() as u64;
        tokio::time::sleep(*delay / 2).await;
        on_progress(TransferProgress { loaded: total / 2, total });
        tokio::time::sleep(*delay / 2).await;
        on_progress(TransferProgress { loaded: total, total });

        Ok(bytes.clone())
    }
}

fn survey_config() -> ViewerConfig {
    ViewerConfig {
        file_server_url: SERVER.to_string(),
        lod_sizes: vec![10, 20],
        initial_file: None,
        ..ViewerConfig::default()
    }
}

fn attached_viewer(source: StubSource, config: ViewerConfig) -> Viewer<StubSource> {
    let mut viewer = Viewer::new(source, config);
    viewer.attach(Viewport::new(1280, 720)).unwrap();
    viewer
}

#[tokio::test(start_paused = true)]
async fn test_select_file_builds_lod_group() {
    let mut viewer = attached_viewer(StubSource::survey(), survey_config());

    assert!(viewer.select_file("survey").await.unwrap());
    assert_eq!(viewer.state(), ViewerState::Displaying);

    let group = viewer.scene().lod_group().expect("LOD group in scene");
    let levels = group.levels();
    assert_eq!(levels.len(), 2);
    assert_eq!(levels[0].distance, 0.0);
    assert_eq!(levels[1].distance, 300.0);
    assert_eq!(levels[0].object.name, "survey_lod_10.pcd");
    assert_eq!(levels[1].object.name, "survey_lod_20.pcd");
    assert_eq!(levels[0].object.len(), 10);
    assert_eq!(levels[1].object.len(), 20);
    assert_eq!(group.point_count(), 30);
    assert!(viewer.scene().has_grid());
    assert!(!viewer.scene().has_placeholder());

    let statuses = viewer.loading_statuses();
    assert_eq!(statuses.len(), 2);
    for entry in &statuses {
        assert_eq!(entry.status, LoadStatus::Ready);
        assert_eq!(entry.percentage, 100.0);
        assert!(entry.size > 0);
    }
}

#[tokio::test(start_paused = true)]
async fn test_prepared_levels_are_centered_and_colored() {
    let mut viewer = attached_viewer(StubSource::survey(), survey_config());
    viewer.select_file("survey").await.unwrap();

    let group = viewer.scene().lod_group().unwrap();
    for level in group.levels() {
        let object = &level.object;
        let (min, max) = object.height_range.unwrap();
        assert!((min + 10.0).abs() < 1e-3);
        assert!((max - 10.0).abs() < 1e-3);
        assert_eq!(object.colors.len(), object.len());
        assert_eq!(object.colors[0], bathymetry_color(min, min, max));
        assert_eq!(object.vertices().len(), object.len());
    }
}

#[tokio::test(start_paused = true)]
async fn test_variants_load_concurrently() {
    let mut viewer = attached_viewer(StubSource::survey(), survey_config());
    let start = tokio::time::Instant::now();

    viewer.select_file("survey").await.unwrap();

    // 40 ms and 10 ms transfers overlap
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_progress_is_reported_while_loading() {
    let source = StubSource::new().with_file("slow_lod_10.pcd", encode(&create_survey_cloud(10)), 100);
    let statuses = LoadingStatusBoard::new();
    let loader = LodLoader::new(source, statuses.clone());

    let url = format!("{}slow_lod_10.pcd", SERVER);
    let load = loader.load(&url);
    tokio::pin!(load);

    tokio::select! {
        _ = &mut load => panic!("load finished too early"),
        _ = tokio::time::sleep(Duration::from_millis(75)) => {}
    }
    let entry = statuses.get("slow_lod_10.pcd").unwrap();
    assert_eq!(entry.status, LoadStatus::Loading);
    assert!(entry.size > 0);
    assert!(entry.percentage > 40.0 && entry.percentage <= 50.0);

    load.await.unwrap();
    let entry = statuses.get("slow_lod_10.pcd").unwrap();
    assert_eq!(entry.status, LoadStatus::Ready);
    assert_eq!(entry.percentage, 100.0);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_load_leaves_newer_entry_alone() {
    let source = StubSource::new().with_file("again_lod_10.pcd", encode(&create_survey_cloud(10)), 100);
    let statuses = LoadingStatusBoard::new();
    let loader = LodLoader::new(source, statuses.clone());
    let url = format!("{}again_lod_10.pcd", SERVER);

    let first = loader.load(&url);
    let second = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        loader.load(&url).await
    };
    tokio::pin!(first);
    tokio::pin!(second);

    tokio::select! {
        result = &mut first => assert!(result.is_ok()),
        _ = &mut second => panic!("second load finished first"),
    }
    let entry = statuses.get("again_lod_10.pcd").unwrap();
    assert_eq!(entry.status, LoadStatus::Loading);
    assert!(entry.percentage < 100.0);
    assert_eq!(statuses.len(), 1);

    second.await.unwrap();
    assert_eq!(statuses.get("again_lod_10.pcd").unwrap().status, LoadStatus::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_missing_variant_fails_selection() {
    let source = StubSource::new().with_file("survey_lod_10.pcd", encode(&create_survey_cloud(10)), 5);
    let mut viewer = attached_viewer(source, survey_config());

    let result = viewer.select_file("survey").await;

    assert!(matches!(result, Err(Error::Http(_))));
    assert_eq!(viewer.state(), ViewerState::SceneReady);
    assert!(viewer.scene().lod_group().is_none());

    let board = viewer.status_board();
    assert_eq!(board.get("survey_lod_10.pcd").unwrap().status, LoadStatus::Ready);
    assert_eq!(board.get("survey_lod_20.pcd").unwrap().status, LoadStatus::Error);
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_variant_is_marked_error() {
    let source = StubSource::new().with_file("bad_lod_10.pcd", b"not a pcd file".to_vec(), 5);
    let config = ViewerConfig { lod_sizes: vec![10], ..survey_config() };
    let mut viewer = attached_viewer(source, config);

    assert!(viewer.select_file("bad").await.is_err());
    assert_eq!(viewer.status_board().get("bad_lod_10.pcd").unwrap().status, LoadStatus::Error);
}

#[tokio::test(start_paused = true)]
async fn test_reselecting_replaces_content() {
    let source = StubSource::survey()
        .with_file("other_lod_10.pcd", encode(&create_survey_cloud(5)), 5)
        .with_file("other_lod_20.pcd", encode(&create_survey_cloud(7)), 5);
    let mut viewer = attached_viewer(source, survey_config());

    viewer.select_file("survey").await.unwrap();
    viewer.select_file("other").await.unwrap();

    let lod_groups = viewer
        .scene()
        .nodes()
        .iter()
        .filter(|node| matches!(node, SceneNode::Lod(_)))
        .count();
    assert_eq!(lod_groups, 1);
    assert_eq!(viewer.scene().lod_group().unwrap().point_count(), 12);
    assert_eq!(viewer.selected_file(), Some("other"));
    assert_eq!(viewer.generation(), 2);
}

/// Records frames and stops the loop once content is on screen
struct ShutdownOnContent {
    commands: mpsc::UnboundedSender<ViewerCommand>,
    frames: u64,
    shown: Option<String>,
}

impl FrameRenderer for ShutdownOnContent {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.frames = frame.index;
        if let Some(level) = frame.active_level {
            self.shown = Some(level.object.name.clone());
            let _ = self.commands.send(ViewerCommand::Shutdown);
        } else if frame.index > 1_000 {
            let _ = self.commands.send(ViewerCommand::Shutdown);
        }
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_run_loads_initial_file_and_renders() {
    let config = ViewerConfig { initial_file: Some("survey".to_string()), ..survey_config() };
    let mut viewer = attached_viewer(StubSource::survey(), config);
    let (sender, receiver) = mpsc::unbounded_channel();
    let mut renderer = ShutdownOnContent { commands: sender, frames: 0, shown: None };

    viewer.run(&mut renderer, receiver).await.unwrap();

    // Camera starts 10 units out, inside the first level's range
    assert_eq!(renderer.shown.as_deref(), Some("survey_lod_10.pcd"));
    assert!(renderer.frames > 1);
    assert_eq!(viewer.state(), ViewerState::Displaying);
}

#[tokio::test(start_paused = true)]
async fn test_run_discards_superseded_selection() {
    let source = StubSource::new()
        .with_file("first_lod_10.pcd", encode(&create_survey_cloud(10)), 200)
        .with_file("second_lod_10.pcd", encode(&create_survey_cloud(4)), 10);
    let config = ViewerConfig { lod_sizes: vec![10], ..survey_config() };
    let mut viewer = attached_viewer(source, config);

    let (sender, receiver) = mpsc::unbounded_channel();
    sender.send(ViewerCommand::SelectFile("first".to_string())).unwrap();
    sender.send(ViewerCommand::SelectFile("second".to_string())).unwrap();
    let mut renderer = ShutdownOnContent { commands: sender, frames: 0, shown: None };

    viewer.run(&mut renderer, receiver).await.unwrap();

    assert_eq!(renderer.shown.as_deref(), Some("second_lod_10.pcd"));
    assert_eq!(viewer.scene().lod_group().unwrap().point_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_run_applies_camera_commands() {
    let mut viewer = attached_viewer(StubSource::new(), survey_config());
    let (sender, receiver) = mpsc::unbounded_channel();
    sender.send(ViewerCommand::Zoom(3.0)).unwrap();
    sender.send(ViewerCommand::Shutdown).unwrap();
    let mut renderer = ShutdownOnContent { commands: sender.clone(), frames: 0, shown: None };

    viewer.run(&mut renderer, receiver).await.unwrap();

    // Applied by the first frame after the command
    viewer.render_frame(&mut renderer).unwrap();
    let distance = viewer.camera().distance_to(&Point3f::origin());
    assert!((distance - 30.0).abs() < 1e-3);
}

#[tokio::test]
async fn test_run_requires_attached_viewer() {
    let mut viewer = Viewer::new(StubSource::new(), survey_config());
    let (sender, receiver) = mpsc::unbounded_channel();
    let mut renderer = ShutdownOnContent { commands: sender, frames: 0, shown: None };

    assert!(viewer.run(&mut renderer, receiver).await.is_err());
}
