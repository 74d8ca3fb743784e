//! Scene setup around the softrast core
//!
//! Builds the transform for a mesh from a handful of scene options, renders
//! it once, and hands the frame to the exporters in [`export`] and
//! [`preview`].
use log::info;
use nalgebra::{Matrix4, Point3, Vector3};
use softrast_core::transform::{rotation_matrix, scale_matrix, translation_matrix};
use softrast_core::{
    Buffers, Camera, Mesh, Perspective, Primitive, RasterConfig, Rasterizer, Sampling, Transform,
};

pub mod export;
pub mod preview;

/// Where fitted meshes are centered, and the extent they are scaled to
const FIT_CENTER_Z: f32 = -2.0;
const FIT_EXTENT: f32 = 4.0;

/// Everything needed to render one frame of a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct SceneOptions {
    pub width: usize,
    pub height: usize,
    /// Rotation of the model about `axis`, in degrees
    pub angle_deg: f32,
    pub axis: Vector3<f32>,
    pub eye: Point3<f32>,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub sampling: Sampling,
    /// Map depth with the projection's own near/far instead of the fixed pair
    pub match_depth_range: bool,
    pub color: Vector3<f32>,
    /// Applied before the rotation, e.g. to fit a loaded mesh into view
    pub base_model: Matrix4<f32>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            width: 700,
            height: 700,
            angle_deg: 0.0,
            axis: Vector3::z(),
            eye: Point3::new(0.0, 0.0, 5.0),
            fov_deg: 45.0,
            near: 0.1,
            far: 50.0,
            sampling: Sampling::default(),
            match_depth_range: false,
            color: Vector3::new(255.0, 255.0, 255.0),
            base_model: Matrix4::identity(),
        }
    }
}

impl SceneOptions {
    pub fn camera(&self) -> Camera {
        let aspect = self.width as f32 / self.height as f32;
        Camera::new(
            self.eye,
            Perspective::new(self.fov_deg, aspect, self.near, self.far),
        )
    }

    pub fn transform(&self) -> Transform {
        let model = rotation_matrix(&self.axis, self.angle_deg) * self.base_model;
        let camera = self.camera();
        if self.match_depth_range {
            camera.transform(model)
        } else {
            Transform::new(model, camera.view_matrix(), camera.projection_matrix())
        }
    }
}

/// Render `mesh` in a single flat color
pub fn render(mesh: &Mesh, options: &SceneOptions) -> softrast_core::Result<Rasterizer> {
    let config = RasterConfig::new(options.width, options.height).with_sampling(options.sampling);
    let mut rasterizer = Rasterizer::with_config(config);

    let positions = rasterizer.load_positions(mesh.positions.clone());
    let indices = rasterizer.load_indices(mesh.indices.clone());
    let colors = rasterizer.load_colors(mesh.uniform_colors(options.color));

    rasterizer.clear(Buffers::COLOR | Buffers::DEPTH);
    rasterizer.draw(
        positions,
        indices,
        colors,
        Primitive::Triangle,
        &options.transform(),
    )?;

    info!(
        "Rendered {} triangles at {}x{}",
        mesh.triangle_count(),
        options.width,
        options.height
    );
    Ok(rasterizer)
}

/// Model matrix centering `mesh` in front of the default eye
///
/// The largest side of the bounding box is scaled to the size of the
/// reference triangle. Empty or flat-to-a-point meshes are only translated.
pub fn fit_matrix(mesh: &Mesh) -> Matrix4<f32> {
    let (min, max) = match mesh.bounds() {
        Some(bounds) => bounds,
        None => return Matrix4::identity(),
    };
    let center = (min + max) / 2.0;
    let extent = (max - min).max();
    let scale = if extent > f32::EPSILON {
        FIT_EXTENT / extent
    } else {
        1.0
    };

    translation_matrix(0.0, 0.0, FIT_CENTER_Z)
        * scale_matrix(scale, scale, scale)
        * translation_matrix(-center.x, -center.y, -center.z)
}
