//! Core data structures and traits for mbviewer
//!
//! This crate provides the fundamental types shared by the viewer crates:
//! points, point clouds, transforms, colors, the placeholder mesh and the
//! common error type.

pub mod point;
pub mod point_cloud;
pub mod mesh;
pub mod traits;
pub mod transform;
pub mod color;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use mesh::*;
pub use traits::*;
pub use transform::*;
pub use color::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4};
