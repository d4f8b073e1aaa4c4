//! Mesh data structures and functionality

use crate::point::*;
use crate::color::Rgb;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices, faces and a flat base color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub color: Rgb,
}

impl TriangleMesh {
    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>, color: Rgb) -> Self {
        Self {
            vertices,
            faces,
            color,
        }
    }

    /// Axis-aligned box of the given edge length centered on the origin
    pub fn cube(size: f32, color: Rgb) -> Self {
        let h = size / 2.0;
        let vertices = vec![
            Point3f::new(-h, -h, -h),
            Point3f::new(h, -h, -h),
            Point3f::new(h, h, -h),
            Point3f::new(-h, h, -h),
            Point3f::new(-h, -h, h),
            Point3f::new(h, -h, h),
            Point3f::new(h, h, h),
            Point3f::new(-h, h, h),
        ];
        let faces = vec![
            [0, 2, 1], [0, 3, 2], // back
            [4, 5, 6], [4, 6, 7], // front
            [0, 1, 5], [0, 5, 4], // bottom
            [3, 6, 2], [3, 7, 6], // top
            [0, 4, 7], [0, 7, 3], // left
            [1, 2, 6], [1, 6, 5], // right
        ];

        Self::from_vertices_and_faces(vertices, faces, color)
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }
}
