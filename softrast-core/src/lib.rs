//! softrast core library: a software triangle rasterizer
//!
//! Loads indexed triangle meshes, runs them through a model-view-projection
//! transform and fills a color and depth buffer on the CPU, with optional
//! supersampled anti-aliasing.

pub mod assembler;
pub mod buffers;
pub mod error;
pub mod framebuffer;
pub mod geometry;
pub mod projection;
pub mod raster;
pub mod rasterizer;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use buffers::{ColorHandle, IndexHandle, PositionHandle};
pub use error::{RasterError, Result};
pub use framebuffer::{Buffers, FrameBuffer};
pub use geometry::{Mesh, Triangle};
pub use projection::{Camera, DepthRange, Perspective};
pub use rasterizer::{Primitive, RasterConfig, Rasterizer, Sampling};
pub use transform::Transform;
