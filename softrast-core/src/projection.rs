//! Perspective projection, viewport depth range and camera setup
use nalgebra::{Matrix4, Point3};

use crate::transform::{view_matrix, Transform};

/// Near and far planes used to map NDC depth into buffer depth
///
/// Depth is remapped as `z * (far - near) / 2 + (far + near) / 2`, so NDC -1
/// lands on `near` and NDC 1 on `far`. The default is the fixed 0.1 / 50 pair
/// that reference images were produced with, independent of whatever
/// projection is active. Use [`Perspective::depth_range`] to keep the two in
/// step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    pub near: f32,
    pub far: f32,
}

impl DepthRange {
    pub const LEGACY: DepthRange = DepthRange {
        near: 0.1,
        far: 50.0,
    };

    pub fn new(near: f32, far: f32) -> Self {
        Self { near, far }
    }

    /// Map an NDC depth in [-1, 1] into [near, far]
    pub fn map(&self, ndc_z: f32) -> f32 {
        let f1 = (self.far - self.near) / 2.0;
        let f2 = (self.far + self.near) / 2.0;
        ndc_z * f1 + f2
    }
}

impl Default for DepthRange {
    fn default() -> Self {
        Self::LEGACY
    }
}

/// OpenGL-style perspective frustum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    /// Vertical field of view in degrees
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Perspective {
    pub fn new(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_deg,
            aspect,
            near,
            far,
        }
    }

    /// Projection matrix mapping the frustum to clip space with `w' = -z`
    pub fn matrix(&self) -> Matrix4<f32> {
        let tan_half_fov = (self.fov_deg / 2.0).to_radians().tan();
        let depth = self.far - self.near;

        let mut projection = Matrix4::zeros();
        projection[(0, 0)] = 1.0 / (self.aspect * tan_half_fov);
        projection[(1, 1)] = 1.0 / tan_half_fov;
        projection[(2, 2)] = -(self.far + self.near) / depth;
        projection[(2, 3)] = -2.0 * self.far * self.near / depth;
        projection[(3, 2)] = -1.0;
        projection
    }

    /// Depth range consistent with this frustum's near and far planes
    pub fn depth_range(&self) -> DepthRange {
        DepthRange::new(self.near, self.far)
    }
}

impl Default for Perspective {
    fn default() -> Self {
        Self::new(45.0, 1.0, 0.1, 50.0)
    }
}

/// Eye position plus projection, enough to build a full transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub perspective: Perspective,
}

impl Camera {
    pub fn new(eye: Point3<f32>, perspective: Perspective) -> Self {
        Self { eye, perspective }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        view_matrix(&self.eye)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.perspective.matrix()
    }

    /// Transform for `model` seen through this camera
    ///
    /// The viewport depth range follows the camera's own near and far planes.
    pub fn transform(&self, model: Matrix4<f32>) -> Transform {
        Transform::new(model, self.view_matrix(), self.projection_matrix())
            .with_depth_range(self.perspective.depth_range())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 5.0), Perspective::default())
    }
}
