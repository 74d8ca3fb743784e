//! Handle-indexed storage for vertex positions, index triples and colors
//!
//! Every load call appends a buffer to the store of its kind and returns the
//! arena slot as a typed handle. Handles are never reclaimed, so a handle
//! stays valid for the lifetime of the store that minted it.
use nalgebra::Vector3;

use crate::error::{BufferKind, RasterError, Result};

/// Selects a loaded position buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionHandle(usize);

/// Selects a loaded index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexHandle(usize);

/// Selects a loaded color buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorHandle(usize);

impl PositionHandle {
    pub fn id(&self) -> usize {
        self.0
    }
}

impl IndexHandle {
    pub fn id(&self) -> usize {
        self.0
    }
}

impl ColorHandle {
    pub fn id(&self) -> usize {
        self.0
    }
}

/// Arena of geometry buffers, one growable store per buffer kind
#[derive(Debug, Default)]
pub struct GeometryStore {
    positions: Vec<Vec<Vector3<f32>>>,
    indices: Vec<Vec<[usize; 3]>>,
    colors: Vec<Vec<Vector3<f32>>>,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_positions(&mut self, positions: Vec<Vector3<f32>>) -> PositionHandle {
        self.positions.push(positions);
        PositionHandle(self.positions.len() - 1)
    }

    pub fn load_indices(&mut self, indices: Vec<[usize; 3]>) -> IndexHandle {
        self.indices.push(indices);
        IndexHandle(self.indices.len() - 1)
    }

    /// Colors are r, g, b in the 0..=255 range, one per vertex
    pub fn load_colors(&mut self, colors: Vec<Vector3<f32>>) -> ColorHandle {
        self.colors.push(colors);
        ColorHandle(self.colors.len() - 1)
    }

    pub fn positions(&self, handle: PositionHandle) -> Result<&[Vector3<f32>]> {
        self.positions
            .get(handle.0)
            .map(Vec::as_slice)
            .ok_or(RasterError::UnknownHandle {
                kind: BufferKind::Positions,
                id: handle.0,
            })
    }

    pub fn indices(&self, handle: IndexHandle) -> Result<&[[usize; 3]]> {
        self.indices
            .get(handle.0)
            .map(Vec::as_slice)
            .ok_or(RasterError::UnknownHandle {
                kind: BufferKind::Indices,
                id: handle.0,
            })
    }

    pub fn colors(&self, handle: ColorHandle) -> Result<&[Vector3<f32>]> {
        self.colors
            .get(handle.0)
            .map(Vec::as_slice)
            .ok_or(RasterError::UnknownHandle {
                kind: BufferKind::Colors,
                id: handle.0,
            })
    }
}
