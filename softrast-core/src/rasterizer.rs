//! The rasterizer instance: loaded geometry, frame buffer and the draw loop
use log::{debug, trace};
use nalgebra::Vector3;

use crate::assembler::{assemble_triangle, Viewport};
use crate::buffers::{ColorHandle, GeometryStore, IndexHandle, PositionHandle};
use crate::error::{BufferKind, RasterError, Result};
use crate::framebuffer::{Buffers, FrameBuffer};
use crate::geometry::Triangle;
use crate::raster;
use crate::transform::Transform;

/// Sample grid size used when nothing else is configured
pub const DEFAULT_SAMPLE_RATE: u32 = 4;

/// Primitive topology of an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Line,
    Triangle,
}

/// How `draw` fills each triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// One sample at each pixel center
    Single,
    /// An n x n grid of samples per pixel
    Supersample(u32),
}

impl Default for Sampling {
    fn default() -> Self {
        Sampling::Supersample(DEFAULT_SAMPLE_RATE)
    }
}

/// Frame size and sampling mode of a rasterizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterConfig {
    pub width: usize,
    pub height: usize,
    pub sampling: Sampling,
}

impl RasterConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            sampling: Sampling::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self::new(700, 700)
    }
}

pub struct Rasterizer {
    config: RasterConfig,
    geometry: GeometryStore,
    frame: FrameBuffer,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_config(RasterConfig::new(width, height))
    }

    pub fn with_config(config: RasterConfig) -> Self {
        Self {
            config,
            geometry: GeometryStore::new(),
            frame: FrameBuffer::new(config.width, config.height),
        }
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.config.width
    }

    pub fn height(&self) -> usize {
        self.config.height
    }

    pub fn set_sampling(&mut self, sampling: Sampling) {
        self.config.sampling = sampling;
    }

    pub fn load_positions(&mut self, positions: Vec<Vector3<f32>>) -> PositionHandle {
        self.geometry.load_positions(positions)
    }

    pub fn load_indices(&mut self, indices: Vec<[usize; 3]>) -> IndexHandle {
        self.geometry.load_indices(indices)
    }

    pub fn load_colors(&mut self, colors: Vec<Vector3<f32>>) -> ColorHandle {
        self.geometry.load_colors(colors)
    }

    /// Transform, assemble and fill every triangle of an index buffer
    ///
    /// All indices are checked against the position and color buffers before
    /// anything is written, so a bad index leaves the frame untouched.
    /// Triangles that end up with a non-finite vertex (a vertex on the eye
    /// plane) are skipped.
    pub fn draw(
        &mut self,
        positions: PositionHandle,
        indices: IndexHandle,
        colors: ColorHandle,
        primitive: Primitive,
        transform: &Transform,
    ) -> Result<()> {
        if primitive != Primitive::Triangle {
            return Err(RasterError::UnsupportedPrimitive(primitive));
        }
        if self.config.sampling == Sampling::Supersample(0) {
            return Err(RasterError::InvalidSampleRate);
        }

        let positions = self.geometry.positions(positions)?;
        let faces = self.geometry.indices(indices)?;
        let colors = self.geometry.colors(colors)?;
        validate_faces(faces, positions.len(), colors.len())?;

        let mvp = transform.mvp();
        let viewport = Viewport::new(self.frame.width(), self.frame.height(), transform.depth_range);
        debug!(
            "drawing {} triangles into {}x{} ({:?})",
            faces.len(),
            viewport.width,
            viewport.height,
            self.config.sampling
        );

        let mut written = 0;
        for (n, face) in faces.iter().enumerate() {
            let triangle = assemble_triangle(n, face, positions, colors, &mvp, &viewport)?;
            if !triangle.is_finite() {
                trace!("skipping triangle {}: vertex on the eye plane", n);
                continue;
            }
            written += match self.config.sampling {
                Sampling::Single => raster::rasterize_triangle(&mut self.frame, &triangle)?,
                Sampling::Supersample(rate) => {
                    raster::rasterize_triangle_supersampled(&mut self.frame, &triangle, rate)?
                }
            };
        }

        debug!("draw wrote {} pixels", written);
        Ok(())
    }

    /// Fill one assembled triangle, one sample per pixel
    pub fn rasterize_triangle(&mut self, triangle: &Triangle) -> Result<usize> {
        raster::rasterize_triangle(&mut self.frame, triangle)
    }

    /// Fill one assembled triangle with `sample_rate`² samples per pixel
    pub fn rasterize_triangle_supersampled(
        &mut self,
        triangle: &Triangle,
        sample_rate: u32,
    ) -> Result<usize> {
        raster::rasterize_triangle_supersampled(&mut self.frame, triangle, sample_rate)
    }

    pub fn clear(&mut self, buffers: Buffers) {
        self.frame.clear(buffers);
    }

    pub fn get_index(&self, x: i64, y: i64) -> Option<usize> {
        self.frame.index(x, y)
    }

    pub fn set_pixel(&mut self, x: i64, y: i64, color: Vector3<f32>) -> Result<()> {
        self.frame.set_pixel(x, y, color)
    }

    /// RGB triples, top row first
    pub fn frame_buffer(&self) -> &[Vector3<f32>] {
        self.frame.pixels()
    }

    pub fn depth_buffer(&self) -> &[f32] {
        self.frame.depths()
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }
}

fn validate_faces(faces: &[[usize; 3]], positions: usize, colors: usize) -> Result<()> {
    for (triangle, face) in faces.iter().enumerate() {
        for &index in face {
            if index >= positions {
                return Err(RasterError::IndexOutOfRange {
                    triangle,
                    kind: BufferKind::Positions,
                    index,
                    len: positions,
                });
            }
            if index >= colors {
                return Err(RasterError::IndexOutOfRange {
                    triangle,
                    kind: BufferKind::Colors,
                    index,
                    len: colors,
                });
            }
        }
    }
    Ok(())
}
