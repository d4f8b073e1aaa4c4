//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Index of the vertical axis. Survey heights are stored on Y.
pub const HEIGHT_AXIS: usize = 1;

/// Vertical coordinate of a point
#[inline]
pub fn height_of(point: &Point3f) -> f32 {
    point[HEIGHT_AXIS]
}
