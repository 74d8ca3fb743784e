//! Model/view/projection transforms and the matrix helpers that build them
use nalgebra::{Matrix4, Point3, Vector3};

use crate::projection::DepthRange;

/// The transform bundle consumed by a draw call
///
/// Holds the three matrices and the depth range the viewport mapping uses.
/// A draw never mutates it, so the same bundle can be reused across frames
/// or rebuilt per frame without stale state leaking between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub model: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub depth_range: DepthRange,
}

impl Transform {
    pub fn new(model: Matrix4<f32>, view: Matrix4<f32>, projection: Matrix4<f32>) -> Self {
        Self {
            model,
            view,
            projection,
            depth_range: DepthRange::default(),
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix4::identity(), Matrix4::identity(), Matrix4::identity())
    }

    pub fn set_model(&mut self, model: Matrix4<f32>) {
        self.model = model;
    }

    pub fn set_view(&mut self, view: Matrix4<f32>) {
        self.view = view;
    }

    pub fn set_projection(&mut self, projection: Matrix4<f32>) {
        self.projection = projection;
    }

    pub fn with_depth_range(mut self, depth_range: DepthRange) -> Self {
        self.depth_range = depth_range;
        self
    }

    /// Combined model-view-projection matrix
    pub fn mvp(&self) -> Matrix4<f32> {
        self.projection * self.view * self.model
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Translate the world so that `eye` sits at the origin
///
/// The camera is not reoriented; it keeps looking down -z.
pub fn view_matrix(eye: &Point3<f32>) -> Matrix4<f32> {
    translation_matrix(-eye.x, -eye.y, -eye.z)
}

/// Rotate through the origin about `axis` by `angle_deg` degrees
///
/// Rodrigues form with `t = 1 - cos θ`. A zero axis yields the identity.
pub fn rotation_matrix(axis: &Vector3<f32>, angle_deg: f32) -> Matrix4<f32> {
    let axis = match axis.try_normalize(f32::EPSILON) {
        Some(axis) => axis,
        None => return Matrix4::identity(),
    };
    let (x, y, z) = (axis.x, axis.y, axis.z);
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let t = 1.0 - cos;

    Matrix4::new(
        t * x * x + cos,     t * x * y - sin * z, t * x * z + sin * y, 0.0,
        t * x * y + sin * z, t * y * y + cos,     t * y * z - sin * x, 0.0,
        t * x * z - sin * y, t * y * z + sin * x, t * z * z + cos,     0.0,
        0.0,                 0.0,                 0.0,                 1.0,
    )
}

/// Rotate about the z axis by `angle_deg` degrees
pub fn z_rotation_matrix(angle_deg: f32) -> Matrix4<f32> {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let mut rotation = Matrix4::identity();
    rotation[(0, 0)] = cos;
    rotation[(0, 1)] = -sin;
    rotation[(1, 0)] = sin;
    rotation[(1, 1)] = cos;
    rotation
}

/// Create a translation matrix
pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

/// Create a scale matrix
pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
    Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    #[test]
    fn test_setters_replace_wholesale() {
        let mut transform = Transform::identity();
        transform.set_model(scale_matrix(2.0, 2.0, 2.0));
        transform.set_model(translation_matrix(1.0, 0.0, 0.0));

        let moved = transform.mvp() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((moved - Vector4::new(1.0, 0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_mvp_order() {
        let mut transform = Transform::identity();
        transform.set_model(scale_matrix(2.0, 2.0, 2.0));
        transform.set_view(translation_matrix(0.0, 0.0, -5.0));

        // Scale first, then translate
        let p = transform.mvp() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p - Vector4::new(2.0, 0.0, -5.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_view_moves_eye_to_origin() {
        let eye = Point3::new(0.0, 0.0, 5.0);
        let view = view_matrix(&eye);
        let p = view * Vector4::new(0.0, 0.0, 5.0, 1.0);
        assert!((p - Vector4::new(0.0, 0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_about_z_matches_z_rotation() {
        let general = rotation_matrix(&Vector3::z(), 30.0);
        let special = z_rotation_matrix(30.0);
        assert!((general - special).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let rotation = rotation_matrix(&Vector3::new(0.0, 0.0, 1.0), 90.0);
        let p = rotation * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p - Vector4::new(0.0, 1.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_normalizes_axis() {
        let unit = rotation_matrix(&Vector3::new(0.0, 1.0, 0.0), 45.0);
        let long = rotation_matrix(&Vector3::new(0.0, 3.0, 0.0), 45.0);
        assert!((unit - long).norm() < 1e-6);
    }

    #[test]
    fn test_zero_angle_is_identity() {
        let rotation = rotation_matrix(&Vector3::new(1.0, 1.0, 0.0), 0.0);
        assert!((rotation - Matrix4::identity()).norm() < 1e-6);
    }
}
