//! Errors reported by the rasterizer
use thiserror::Error;

use crate::rasterizer::Primitive;

/// Which kind of geometry buffer a handle refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Positions,
    Indices,
    Colors,
}

impl std::fmt::Display for BufferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BufferKind::Positions => "position",
            BufferKind::Indices => "index",
            BufferKind::Colors => "color",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RasterError {
    #[error("no {kind} buffer loaded under handle {id}")]
    UnknownHandle { kind: BufferKind, id: usize },

    #[error("triangle {triangle} references {kind} {index}, but the buffer holds {len}")]
    IndexOutOfRange {
        triangle: usize,
        kind: BufferKind,
        index: usize,
        len: usize,
    },

    #[error("primitive {0:?} is not supported, only triangles can be drawn")]
    UnsupportedPrimitive(Primitive),

    #[error("sample rate must be at least 1")]
    InvalidSampleRate,

    #[error("pixel ({x}, {y}) lies outside the {width}x{height} frame buffer")]
    PixelOutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },
}

pub type Result<T> = std::result::Result<T, RasterError>;
