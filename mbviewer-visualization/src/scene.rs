//! Scene graph of the viewer

use crate::lod::LodGroup;
use mbviewer_core::{Point3f, Rgb, TriangleMesh, Vector3f};

/// Flat reference grid drawn under the data
#[derive(Debug, Clone, PartialEq)]
pub struct GridHelper {
    pub size: f32,
    pub divisions: u32,
    pub position: Vector3f,
    pub color: Rgb,
}

impl Default for GridHelper {
    fn default() -> Self {
        Self {
            size: 10.0,
            divisions: 10,
            position: Vector3f::new(0.0, -5.0, 0.0),
            color: Rgb::from_hex(0x888888),
        }
    }
}

impl GridHelper {
    /// Line segments of the grid in world space, parallel to the X and Z axes
    pub fn lines(&self) -> Vec<[Point3f; 2]> {
        let half = self.size / 2.0;
        let step = self.size / self.divisions.max(1) as f32;
        let origin = Point3f::from(self.position);

        let mut lines = Vec::with_capacity(2 * (self.divisions as usize + 1));
        for i in 0..=self.divisions {
            let k = -half + i as f32 * step;
            lines.push([origin + Vector3f::new(-half, 0.0, k), origin + Vector3f::new(half, 0.0, k)]);
            lines.push([origin + Vector3f::new(k, 0.0, -half), origin + Vector3f::new(k, 0.0, half)]);
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    /// Shown until the first file is selected
    Placeholder(TriangleMesh),
    Grid(GridHelper),
    Lod(LodGroup),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Drop loaded data and the placeholder, keep helpers such as the grid
    pub fn clear_content(&mut self) {
        self.nodes.retain(|node| matches!(node, SceneNode::Grid(_)));
    }

    /// The LOD group currently in the scene
    pub fn lod_group(&self) -> Option<&LodGroup> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::Lod(group) => Some(group),
            _ => None,
        })
    }

    pub fn has_placeholder(&self) -> bool {
        self.nodes.iter().any(|node| matches!(node, SceneNode::Placeholder(_)))
    }

    pub fn has_grid(&self) -> bool {
        self.nodes.iter().any(|node| matches!(node, SceneNode::Grid(_)))
    }
}
