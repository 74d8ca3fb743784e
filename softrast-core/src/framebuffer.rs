//! Color and depth buffers addressed by screen coordinate
//!
//! Screen y grows upwards from the bottom-left corner, while row 0 of the
//! backing arrays is the top of the image. [`FrameBuffer::index`] does the
//! flip, so exporters can read the arrays top to bottom as-is.
use bitflags::bitflags;
use nalgebra::Vector3;

use crate::error::{RasterError, Result};

bitflags! {
    /// Selects which buffers [`FrameBuffer::clear`] resets
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Buffers: u8 {
        const COLOR = 0b01;
        const DEPTH = 0b10;
    }
}

#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    color: Vec<Vector3<f32>>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            color: vec![Vector3::zeros(); size],
            depth: vec![f32::INFINITY; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reset color to black and/or depth to +infinity
    pub fn clear(&mut self, buffers: Buffers) {
        if buffers.contains(Buffers::COLOR) {
            self.color.fill(Vector3::zeros());
        }
        if buffers.contains(Buffers::DEPTH) {
            self.depth.fill(f32::INFINITY);
        }
    }

    /// Flat offset of screen pixel (x, y), `None` outside the buffer
    pub fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some((self.height - 1 - y as usize) * self.width + x as usize)
    }

    pub fn set_pixel(&mut self, x: i64, y: i64, color: Vector3<f32>) -> Result<()> {
        let idx = self.checked_index(x, y)?;
        self.color[idx] = color;
        Ok(())
    }

    /// Write `color` and `depth` if `depth` is strictly nearer than what is stored
    ///
    /// Returns whether the fragment survived the depth test.
    pub fn write_fragment(
        &mut self,
        x: i64,
        y: i64,
        depth: f32,
        color: Vector3<f32>,
    ) -> Result<bool> {
        let idx = self.checked_index(x, y)?;
        if depth < self.depth[idx] {
            self.color[idx] = color;
            self.depth[idx] = depth;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn color_at(&self, x: i64, y: i64) -> Option<Vector3<f32>> {
        self.index(x, y).map(|idx| self.color[idx])
    }

    pub fn depth_at(&self, x: i64, y: i64) -> Option<f32> {
        self.index(x, y).map(|idx| self.depth[idx])
    }

    /// RGB triples, top row first
    pub fn pixels(&self) -> &[Vector3<f32>] {
        &self.color
    }

    pub fn depths(&self) -> &[f32] {
        &self.depth
    }

    fn checked_index(&self, x: i64, y: i64) -> Result<usize> {
        self.index(x, y).ok_or(RasterError::PixelOutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }
}
