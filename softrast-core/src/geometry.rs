//! Geometry primitives: assembled screen-space triangles and indexed meshes
use nalgebra::{Vector2, Vector3, Vector4};

/// A triangle ready for rasterization
///
/// Each vertex holds screen x, screen y, mapped depth, and the clip-space w
/// kept from before the perspective divide. Colors are per vertex, 0..=255.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub v: [Vector4<f32>; 3],
    pub colors: [Vector3<f32>; 3],
}

impl Triangle {
    pub fn new(v: [Vector4<f32>; 3], colors: [Vector3<f32>; 3]) -> Self {
        Self { v, colors }
    }

    pub fn set_vertex(&mut self, i: usize, vertex: Vector4<f32>) {
        self.v[i] = vertex;
    }

    pub fn set_color(&mut self, i: usize, color: Vector3<f32>) {
        self.colors[i] = color;
    }

    /// Flat shading color, taken from the first vertex
    pub fn color(&self) -> Vector3<f32> {
        self.colors[0]
    }

    /// Screen-space x, y of the three vertices
    pub fn screen_xy(&self) -> [Vector2<f32>; 3] {
        [self.v[0].xy(), self.v[1].xy(), self.v[2].xy()]
    }

    pub fn is_finite(&self) -> bool {
        self.v.iter().all(|v| v.iter().all(|c| c.is_finite()))
    }
}

impl Default for Triangle {
    fn default() -> Self {
        Self {
            v: [Vector4::new(0.0, 0.0, 0.0, 1.0); 3],
            colors: [Vector3::zeros(); 3],
        }
    }
}

/// An indexed triangle mesh, shaped like the buffers the rasterizer loads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vector3<f32>>,
    pub indices: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(triangles),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// One color per vertex, all the same
    pub fn uniform_colors(&self, color: Vector3<f32>) -> Vec<Vector3<f32>> {
        vec![color; self.positions.len()]
    }

    /// Axis-aligned bounds as (min, max), or `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let first = *self.positions.first()?;
        let bounds = self
            .positions
            .iter()
            .fold((first, first), |(min, max), p| (min.inf(p), max.sup(p)));
        Some(bounds)
    }

    /// The triangle the command line renders when no mesh file is given
    pub fn reference_triangle() -> Self {
        Self {
            positions: vec![
                Vector3::new(2.0, 0.0, -2.0),
                Vector3::new(0.0, 2.0, -2.0),
                Vector3::new(-2.0, 0.0, -2.0),
            ],
            indices: vec![[0, 1, 2]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_color_is_first_vertex() {
        let mut triangle = Triangle::default();
        triangle.set_color(0, Vector3::new(10.0, 20.0, 30.0));
        triangle.set_color(1, Vector3::new(255.0, 0.0, 0.0));
        assert_eq!(triangle.color(), Vector3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_non_finite_vertex_detected() {
        let mut triangle = Triangle::default();
        assert!(triangle.is_finite());
        triangle.set_vertex(2, Vector4::new(f32::INFINITY, 0.0, 0.0, 0.0));
        assert!(!triangle.is_finite());
    }

    #[test]
    fn test_mesh_bounds() {
        let mesh = Mesh::reference_triangle();
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vector3::new(-2.0, 0.0, -2.0));
        assert_eq!(max, Vector3::new(2.0, 2.0, -2.0));
        assert!(Mesh::new().bounds().is_none());
    }
}
