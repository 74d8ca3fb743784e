//! Turns indexed vertex data into screen-space triangles
use nalgebra::{Matrix4, Vector3, Vector4};

use crate::error::{BufferKind, RasterError, Result};
use crate::geometry::Triangle;
use crate::projection::DepthRange;

/// Screen dimensions and depth mapping for one draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
    pub depth_range: DepthRange,
}

impl Viewport {
    pub fn new(width: usize, height: usize, depth_range: DepthRange) -> Self {
        Self {
            width,
            height,
            depth_range,
        }
    }

    /// Perspective-divide a clip-space vertex and map it to the screen
    ///
    /// x and y land in [0, width] x [0, height], z in the depth range. The
    /// clip-space w is kept as the fourth component.
    pub fn map(&self, clip: &Vector4<f32>) -> Vector4<f32> {
        let w = clip.w;
        let ndc = clip.xyz() / w;
        Vector4::new(
            0.5 * self.width as f32 * (ndc.x + 1.0),
            0.5 * self.height as f32 * (ndc.y + 1.0),
            self.depth_range.map(ndc.z),
            w,
        )
    }
}

/// Build the `triangle`-th triangle of an index buffer
///
/// Vertex and color lookups are bounds-checked; an index past the end of
/// either buffer is reported rather than panicking.
pub fn assemble_triangle(
    triangle: usize,
    face: &[usize; 3],
    positions: &[Vector3<f32>],
    colors: &[Vector3<f32>],
    mvp: &Matrix4<f32>,
    viewport: &Viewport,
) -> Result<Triangle> {
    let mut assembled = Triangle::default();

    for (i, &index) in face.iter().enumerate() {
        let position = lookup(triangle, BufferKind::Positions, positions, index)?;
        let color = lookup(triangle, BufferKind::Colors, colors, index)?;

        let clip = mvp * Vector4::new(position.x, position.y, position.z, 1.0);
        assembled.set_vertex(i, viewport.map(&clip));
        assembled.set_color(i, *color);
    }

    Ok(assembled)
}

fn lookup<'a>(
    triangle: usize,
    kind: BufferKind,
    buffer: &'a [Vector3<f32>],
    index: usize,
) -> Result<&'a Vector3<f32>> {
    buffer.get(index).ok_or(RasterError::IndexOutOfRange {
        triangle,
        kind,
        index,
        len: buffer.len(),
    })
}
