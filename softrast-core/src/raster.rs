//! Coverage testing and pixel fill for screen-space triangles
//!
//! Coverage is decided from the 2D screen positions alone. Depth is
//! interpolated perspective-correctly: each vertex contributes `alpha / w`,
//! and the sum is normalized by `1 / Σ(alpha / w)`.
//!
//! Points exactly on an edge count as covered, so two triangles sharing an
//! edge may both shade the pixels along it.
use nalgebra::{Vector2, Vector4};

use crate::error::{RasterError, Result};
use crate::framebuffer::FrameBuffer;
use crate::geometry::Triangle;

/// Barycentric weights of (x, y) with respect to `v`
///
/// Each weight is the signed area of the sub-triangle opposite its vertex
/// divided by the signed area of the whole triangle, so the result does not
/// depend on winding. Returns `None` for a degenerate triangle.
pub fn barycentric_2d(x: f32, y: f32, v: &[Vector2<f32>; 3]) -> Option<(f32, f32, f32)> {
    let area = edge(&v[1], &v[2], v[0].x, v[0].y);
    if !area.is_normal() {
        return None;
    }

    let c1 = edge(&v[1], &v[2], x, y) / area;
    let c2 = edge(&v[2], &v[0], x, y) / edge(&v[2], &v[0], v[1].x, v[1].y);
    let c3 = edge(&v[0], &v[1], x, y) / edge(&v[0], &v[1], v[2].x, v[2].y);
    Some((c1, c2, c3))
}

/// Whether (x, y) is covered by the triangle, edges included
pub fn inside_triangle(x: f32, y: f32, v: &[Vector2<f32>; 3]) -> bool {
    coverage(x, y, v).is_some()
}

/// Fill `triangle` sampling once at each pixel center
///
/// Covered pixels that pass the depth test get the flat triangle color.
/// Returns the number of pixels written.
pub fn rasterize_triangle(frame: &mut FrameBuffer, triangle: &Triangle) -> Result<usize> {
    let xy = triangle.screen_xy();
    let bounds = match PixelBounds::clipped(&xy, frame.width(), frame.height()) {
        Some(bounds) => bounds,
        None => return Ok(0),
    };
    let color = triangle.color();

    let mut written = 0;
    for y in bounds.min_y..bounds.max_y {
        for x in bounds.min_x..bounds.max_x {
            let Some(bary) = coverage(x as f32 + 0.5, y as f32 + 0.5, &xy) else {
                continue;
            };
            let (depth, _) = perspective_depth(bary, &triangle.v);
            if frame.write_fragment(x, y, depth, color)? {
                written += 1;
            }
        }
    }
    Ok(written)
}

/// Fill `triangle` with a `sample_rate` x `sample_rate` grid per pixel
///
/// Every sub-sample sits at the center of its grid cell and is tested for
/// coverage on its own. Covered sub-samples contribute their
/// perspective-correct depth weighted by their interpolated `1 / w`; the
/// pixel depth is the weighted mean. The pixel color is the flat triangle
/// color scaled by the covered fraction of the grid, which blends edges
/// toward black. Pixels with no covered sub-sample are left untouched.
pub fn rasterize_triangle_supersampled(
    frame: &mut FrameBuffer,
    triangle: &Triangle,
    sample_rate: u32,
) -> Result<usize> {
    if sample_rate == 0 {
        return Err(RasterError::InvalidSampleRate);
    }
    let xy = triangle.screen_xy();
    let bounds = match PixelBounds::clipped(&xy, frame.width(), frame.height()) {
        Some(bounds) => bounds,
        None => return Ok(0),
    };
    let color = triangle.color();
    let samples = (sample_rate * sample_rate) as f32;
    let step = 1.0 / sample_rate as f32;

    let mut written = 0;
    for y in bounds.min_y..bounds.max_y {
        for x in bounds.min_x..bounds.max_x {
            let mut depth_sum = 0.0;
            let mut weight_sum = 0.0;
            let mut covered = 0u32;

            for i in 0..sample_rate {
                for j in 0..sample_rate {
                    let sx = x as f32 + (i as f32 + 0.5) * step;
                    let sy = y as f32 + (j as f32 + 0.5) * step;
                    if let Some(bary) = coverage(sx, sy, &xy) {
                        let (depth, weight) = perspective_depth(bary, &triangle.v);
                        depth_sum += depth * weight;
                        weight_sum += weight;
                        covered += 1;
                    }
                }
            }

            if covered == 0 {
                continue;
            }

            let depth = (depth_sum / samples) / (weight_sum / samples);
            let shaded = color * (covered as f32 / samples);
            if frame.write_fragment(x, y, depth, shaded)? {
                written += 1;
            }
        }
    }
    Ok(written)
}

/// Signed edge function of (x, y) against the line a -> b
fn edge(a: &Vector2<f32>, b: &Vector2<f32>, x: f32, y: f32) -> f32 {
    x * (a.y - b.y) + (b.x - a.x) * y + a.x * b.y - b.x * a.y
}

/// Barycentric weights of a covered point, `None` when uncovered
fn coverage(x: f32, y: f32, v: &[Vector2<f32>; 3]) -> Option<(f32, f32, f32)> {
    let min_x = v[0].x.min(v[1].x).min(v[2].x);
    let max_x = v[0].x.max(v[1].x).max(v[2].x);
    let min_y = v[0].y.min(v[1].y).min(v[2].y);
    let max_y = v[0].y.max(v[1].y).max(v[2].y);
    if x < min_x || x > max_x || y < min_y || y > max_y {
        return None;
    }

    let (c1, c2, c3) = barycentric_2d(x, y, v)?;
    if c1 < 0.0 || c2 < 0.0 || c3 < 0.0 {
        return None;
    }
    Some((c1, c2, c3))
}

/// Perspective-correct depth and the interpolated `1 / w` used to get it
fn perspective_depth((alpha, beta, gamma): (f32, f32, f32), v: &[Vector4<f32>; 3]) -> (f32, f32) {
    let weight = alpha / v[0].w + beta / v[1].w + gamma / v[2].w;
    let depth = alpha * v[0].z / v[0].w + beta * v[1].z / v[1].w + gamma * v[2].z / v[2].w;
    (depth / weight, weight)
}

/// Half-open pixel ranges covering a triangle's bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelBounds {
    min_x: i64,
    max_x: i64,
    min_y: i64,
    max_y: i64,
}

impl PixelBounds {
    /// Floor/ceil bounding box clipped to the frame, `None` when empty
    fn clipped(v: &[Vector2<f32>; 3], width: usize, height: usize) -> Option<Self> {
        let min_x = v[0].x.min(v[1].x).min(v[2].x).floor() as i64;
        let max_x = v[0].x.max(v[1].x).max(v[2].x).ceil() as i64;
        let min_y = v[0].y.min(v[1].y).min(v[2].y).floor() as i64;
        let max_y = v[0].y.max(v[1].y).max(v[2].y).ceil() as i64;

        let bounds = Self {
            min_x: min_x.max(0),
            max_x: max_x.min(width as i64),
            min_y: min_y.max(0),
            max_y: max_y.min(height as i64),
        };
        if bounds.min_x >= bounds.max_x || bounds.min_y >= bounds.max_y {
            return None;
        }
        Some(bounds)
    }
}
