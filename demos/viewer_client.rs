//! Viewer client
//!
//! Connects to a running processing backend and file server, lists the
//! available files and drives the viewer headless until Ctrl-C.
//!
//! Usage: `viewer_client [config.json]`

use anyhow::Context;
use mbviewer::prelude::*;
use tokio::sync::mpsc;

/// Logs a summary line once per second of frames
struct LoggingRenderer {
    frames_per_report: u64,
}

impl FrameRenderer for LoggingRenderer {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        if frame.index % self.frames_per_report == 0 {
            match frame.active_level {
                Some(level) => log::info!(
                    "frame {}: {} ({} points) at camera distance {:.1}",
                    frame.index,
                    level.object.name,
                    level.object.len(),
                    frame.camera.distance_to(&Point3f::origin())
                ),
                None => log::info!("frame {}: {} scene nodes", frame.index, frame.scene.len()),
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_json_file(&path).with_context(|| format!("loading {}", path))?,
        None => AppConfig::default(),
    };

    let mut session = ViewerSession::new(HttpBackend::new(config.backend.clone())?);
    match session.refresh_file_lists().await {
        Ok(()) => {
            println!("LOD files: {:?}", session.lod_files());
            println!("Raw files: {:?}", session.raw_files());
        }
        Err(err) => log::warn!("Backend unavailable: {}", err),
    }

    let mut viewer_config = config.viewer.clone();
    if let Some(first) = session.lod_files().first().cloned() {
        session.select_lod_file(&first);
        viewer_config.initial_file = Some(first);
    }

    let mut viewer = Viewer::new(HttpPointCloudSource::new(), viewer_config);
    viewer.attach(Viewport::new(1920, 1080))?;

    let (commands, receiver) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = commands.send(ViewerCommand::Shutdown);
        }
    });

    let frames_per_report = (1000 / config.viewer.frame_interval_ms.max(1)).max(1);
    let mut renderer = LoggingRenderer { frames_per_report };
    viewer.run(&mut renderer, receiver).await?;

    for entry in viewer.loading_statuses() {
        println!("{:<32} {:?} {:>6.1}% of {} bytes", entry.filename, entry.status, entry.percentage, entry.size);
    }

    Ok(())
}
