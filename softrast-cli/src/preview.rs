//! One-shot colored ASCII preview of a frame in the terminal
use std::io::{self, Write};

use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal, QueueableCommand,
};
use softrast_core::FrameBuffer;

use crate::export::to_rgb;

/// Character luminosity ramp (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 2.0;

/// Fallback when the output is not a terminal
const DEFAULT_SIZE: (usize, usize) = (80, 24);

/// Downsamples a frame buffer to a grid of colored characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalPreview {
    columns: usize,
    rows: usize,
}

impl TerminalPreview {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    /// Largest grid within `columns` x `rows` that keeps the frame's aspect ratio
    pub fn fit(frame: &FrameBuffer, columns: usize, rows: usize) -> Self {
        let aspect = frame.width() as f32 / frame.height().max(1) as f32;
        let rows_for_width = (columns as f32 / aspect / CELL_ASPECT) as usize;
        if rows_for_width <= rows {
            Self::new(columns, rows_for_width)
        } else {
            Self::new((rows as f32 * aspect * CELL_ASPECT) as usize, rows)
        }
    }

    /// Fit to the current terminal, leaving a line for the prompt
    pub fn for_terminal(frame: &FrameBuffer) -> Self {
        let (columns, rows) = terminal::size()
            .map(|(w, h)| (w as usize, h as usize))
            .unwrap_or(DEFAULT_SIZE);
        Self::fit(frame, columns, rows.saturating_sub(1))
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Write the preview, one line per row, sampling the pixel under each cell center
    pub fn draw<W: Write>(&self, frame: &FrameBuffer, writer: &mut W) -> io::Result<()> {
        let pixels = frame.pixels();
        for row in 0..self.rows {
            let y = ((row as f32 + 0.5) * frame.height() as f32 / self.rows as f32) as usize;
            for column in 0..self.columns {
                let x = ((column as f32 + 0.5) * frame.width() as f32 / self.columns as f32) as usize;
                let [r, g, b] = to_rgb(&pixels[y * frame.width() + x]);

                writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                writer.queue(Print(ramp_char(r, g, b)))?;
            }
            writer.queue(Print('\n'))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Pick a ramp character by relative luminance
fn ramp_char(r: u8, g: u8, b: u8) -> char {
    let luminance = (0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32) / 255.0;
    let index = (luminance * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}
