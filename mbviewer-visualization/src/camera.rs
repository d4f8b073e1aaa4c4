//! Camera and orbit controls for 3D visualization

use nalgebra::{Point3, Vector3, Matrix4, Perspective3};
use std::f32::consts::PI;

/// A 3D camera for viewing point clouds
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Camera on the +Z axis looking at the origin
    pub fn perspective(fov_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self::new(
            Point3::new(0.0, 0.0, 10.0),
            Point3::origin(),
            Vector3::y(),
            fov_degrees.to_radians(),
            aspect_ratio,
            near,
            far,
        )
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Distance from the camera to a world point
    pub fn distance_to(&self, point: &Point3<f32>) -> f32 {
        (self.position - point).norm()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(60.0, 1.0, 0.1, 500_000.0)
    }
}

/// Orbits the camera around a target point.
///
/// Input is accumulated and applied on the next [`OrbitControls::update`],
/// once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_scale: f32,
}

impl OrbitControls {
    pub fn new(target: Point3<f32>) -> Self {
        Self {
            target,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_scale: 1.0,
        }
    }

    /// Queue a rotation around the vertical axis and towards/away from it, in radians
    pub fn rotate(&mut self, azimuth: f32, polar: f32) {
        self.pending_azimuth += azimuth;
        self.pending_polar += polar;
    }

    /// Queue a change of distance; factors below 1 move closer
    pub fn zoom(&mut self, factor: f32) {
        if factor > 0.0 {
            self.pending_scale *= factor;
        }
    }

    /// Apply queued input to the camera. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let changed = self.pending_azimuth != 0.0
            || self.pending_polar != 0.0
            || self.pending_scale != 1.0
            || camera.target != self.target;

        let offset = camera.position - self.target;
        let radius = offset.norm();
        if changed && radius > 0.0 {
            // Spherical coordinates around +Y, azimuth measured from +Z
            let theta = offset.x.atan2(offset.z) + self.pending_azimuth;
            let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + self.pending_polar)
                .clamp(1e-6, PI - 1e-6);
            let r = (radius * self.pending_scale).clamp(self.min_distance, self.max_distance);

            camera.position = self.target
                + Vector3::new(r * phi.sin() * theta.sin(), r * phi.cos(), r * phi.sin() * theta.cos());
            camera.target = self.target;
        }

        self.pending_azimuth = 0.0;
        self.pending_polar = 0.0;
        self.pending_scale = 1.0;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_perspective_defaults() {
        let camera = Camera::default();

        assert_eq!(camera.position, Point3::new(0.0, 0.0, 10.0));
        assert_relative_eq!(camera.fov, FRAC_PI_2 * 2.0 / 3.0, epsilon = 1e-6);
        assert_eq!(camera.far, 500_000.0);
    }

    #[test]
    fn test_orbit_rotation() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::new(Point3::origin());

        controls.rotate(FRAC_PI_2, 0.0);
        assert!(controls.update(&mut camera));

        assert_relative_eq!(camera.position.x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(camera.position.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(camera.position.z, 0.0, epsilon = 1e-4);
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn test_zoom_respects_limits() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::new(Point3::origin());
        controls.min_distance = 4.0;

        controls.zoom(0.5);
        controls.update(&mut camera);
        assert_relative_eq!(camera.distance_to(&Point3::origin()), 5.0, epsilon = 1e-4);

        controls.zoom(0.1);
        controls.update(&mut camera);
        assert_relative_eq!(camera.distance_to(&Point3::origin()), 4.0, epsilon = 1e-4);
    }
}
