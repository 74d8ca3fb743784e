//! Conversion of the float frame buffer to 8-bit images
use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use nalgebra::Vector3;
use softrast_core::FrameBuffer;

/// Round and saturate one 0..=255 float channel
fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

pub fn to_rgb(color: &Vector3<f32>) -> [u8; 3] {
    [to_channel(color.x), to_channel(color.y), to_channel(color.z)]
}

/// Copy the frame into an image, top row first
pub fn to_rgb_image(frame: &FrameBuffer) -> RgbImage {
    let width = frame.width();
    let pixels = frame.pixels();
    RgbImage::from_fn(width as u32, frame.height() as u32, |x, y| {
        Rgb(to_rgb(&pixels[y as usize * width + x as usize]))
    })
}

/// Write the frame to `path`; the format follows the file extension
pub fn save(frame: &FrameBuffer, path: &Path) -> Result<()> {
    to_rgb_image(frame)
        .save(path)
        .with_context(|| format!("Failed to write image to {}", path.display()))
}
