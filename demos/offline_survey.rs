//! Offline survey example
//!
//! Generates a synthetic multibeam survey, writes its LOD variants as PCD
//! files into a temporary directory and shows them with the viewer reading
//! straight from disk. No backend or file server is needed.

use mbviewer::prelude::*;
use rand::Rng;
use std::path::Path;
use tokio::sync::mpsc;

const SURVEY: &str = "synthetic_survey";
const LOD_SIZES: [u64; 3] = [50_000, 20_000, 5_000];

/// Seabed with a channel running through it, in UTM-like coordinates
fn create_survey(count: usize) -> PointCloud<Point3f> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let x: f32 = rng.gen_range(0.0..500.0);
            let z: f32 = rng.gen_range(0.0..500.0);
            let channel = (-(x - 250.0).powi(2) / 5000.0).exp();
            let depth = -20.0 - 25.0 * channel + rng.gen_range(-0.5..0.5);
            Point3f::new(500_000.0 + x, depth, 6_000_000.0 + z)
        })
        .collect()
}

fn write_variants(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for (file, size) in lod_variant_file_names(SURVEY, &LOD_SIZES).iter().zip(LOD_SIZES) {
        let path = dir.join(file);
        write_pcd_file(&create_survey(size as usize), &path)?;
        let written = read_pcd_file(&path)?;
        println!("Wrote {} ({} points, heights {:?})", file, written.len(), written.height_range());
    }
    Ok(())
}

/// Sweeps the camera outwards and stops once the farthest level is shown
struct SweepRenderer {
    commands: mpsc::UnboundedSender<ViewerCommand>,
    last_level: Option<String>,
}

impl FrameRenderer for SweepRenderer {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        let Some(level) = frame.active_level else {
            return Ok(());
        };

        if self.last_level.as_deref() != Some(level.object.name.as_str()) {
            println!(
                "frame {:>4}: distance {:>7.1} -> {} ({} points, heights {:?})",
                frame.index,
                frame.camera.distance_to(&Point3f::origin()),
                level.object.name,
                level.object.len(),
                level.object.height_range
            );
            self.last_level = Some(level.object.name.clone());
        }

        let farthest = frame.scene.lod_group().and_then(|group| group.levels().last());
        if farthest.map(|l| l.object.name == level.object.name).unwrap_or(true) {
            let _ = self.commands.send(ViewerCommand::Shutdown);
        } else {
            let _ = self.commands.send(ViewerCommand::Zoom(1.25));
            let _ = self.commands.send(ViewerCommand::Rotate { azimuth: 0.05, polar: 0.0 });
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dir = std::env::temp_dir().join("mbviewer-offline-survey");
    write_variants(&dir)?;

    let config = ViewerConfig {
        lod_sizes: LOD_SIZES.to_vec(),
        initial_file: Some(SURVEY.to_string()),
        ..ViewerConfig::default()
    };
    let mut viewer = Viewer::new(FileSystemSource::new(&dir), config);
    viewer.attach(Viewport::new(1280, 720))?;

    let (commands, receiver) = mpsc::unbounded_channel();
    let mut renderer = SweepRenderer { commands, last_level: None };
    viewer.run(&mut renderer, receiver).await?;

    println!("Rendered {} frames", viewer.frames_rendered());
    for entry in viewer.loading_statuses() {
        println!("{:<36} {:?} {:>6.1}%", entry.filename, entry.status, entry.percentage);
    }

    Ok(())
}
