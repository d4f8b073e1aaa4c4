//! Turns decoded point clouds into renderable, height-colored objects

use crate::color_ramp::ColorRamp;
use bytemuck::{Pod, Zeroable};
use mbviewer_core::{height_of, Drawable, Point3f, PointCloud, Rgb, Transform3D, Vector3f};
use serde::{Deserialize, Serialize};

/// Uniform scale applied to every loaded point cloud
pub const POINT_CLOUD_SCALE: f32 = 0.1;

/// Rendered size of a single point
pub const POINT_SIZE: f32 = 0.1;

/// Point rendering material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointMaterial {
    pub size: f32,
    /// Use the per-vertex color buffer instead of a single color
    pub vertex_colors: bool,
}

impl Default for PointMaterial {
    fn default() -> Self {
        Self {
            size: POINT_SIZE,
            vertex_colors: true,
        }
    }
}

/// Vertex data for point cloud rendering
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub size: f32,
}

/// A point cloud ready to be placed in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct RenderablePointCloud {
    pub name: String,
    /// Positions recentered on the cloud's own bounding-box center
    pub points: PointCloud<Point3f>,
    /// One color per point
    pub colors: Vec<Rgb>,
    pub material: PointMaterial,
    pub position: Vector3f,
    pub scale: Vector3f,
    /// Height range of the recentered points, `None` when empty
    pub height_range: Option<(f32, f32)>,
}

impl RenderablePointCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Object-to-world transform built from position and scale
    pub fn world_transform(&self) -> Transform3D {
        Transform3D::from_position_scale(self.position, self.scale)
    }

    /// GPU vertices in world space
    pub fn vertices(&self) -> Vec<PointVertex> {
        let transform = self.world_transform();
        self.points
            .iter()
            .zip(&self.colors)
            .map(|(point, color)| {
                let world = transform.transform_point(point);
                PointVertex {
                    position: [world.x, world.y, world.z],
                    color: color.to_unit(),
                    size: self.material.size,
                }
            })
            .collect()
    }

    /// Vertices as raw bytes for upload into a vertex buffer
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.vertices()).to_vec()
    }
}

/// Recenter, scale and color a decoded point cloud.
///
/// The source cloud is left untouched. Heights are taken after recentering,
/// so the ramp always spans the cloud's own vertical extent.
pub fn prepare_point_cloud(cloud: &PointCloud<Point3f>, name: &str) -> RenderablePointCloud {
    let offset = -cloud.center().coords;
    let points = cloud.transformed(&Transform3D::translation(offset));

    let height_range = points.height_range();
    let colors = match height_range {
        Some((min_height, max_height)) => {
            let ramp = ColorRamp::bathymetry(min_height, max_height);
            points.iter().map(|p| ramp.color_at(height_of(p))).collect()
        }
        None => Vec::new(),
    };

    RenderablePointCloud {
        name: name.to_string(),
        points,
        colors,
        material: PointMaterial::default(),
        position: Vector3f::zeros(),
        scale: Vector3f::repeat(POINT_CLOUD_SCALE),
        height_range,
    }
}
