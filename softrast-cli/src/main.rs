//! softrast - render a triangle mesh to an image on the CPU
//!
//! With no mesh file the reference triangle is rendered, matching the
//! classic `-r <angle> <file>` invocation:
//!   softrast -r 20 -o output.png

use std::fs;
use std::io::{stdout, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use nalgebra::{Point3, Vector3};
use softrast_cli::preview::TerminalPreview;
use softrast_cli::{export, fit_matrix, render, SceneOptions};
use softrast_core::rasterizer::DEFAULT_SAMPLE_RATE;
use softrast_core::{stl, Mesh, Sampling};

/// Software triangle rasterizer
#[derive(Parser, Debug)]
#[command(name = "softrast", version, about = "Render a triangle mesh without a GPU")]
struct Args {
    /// Rotation angle in degrees
    #[arg(short = 'r', long, default_value_t = 0.0, allow_negative_numbers = true)]
    angle: f32,

    /// Rotation axis as x,y,z
    #[arg(long, value_parser = parse_triple, default_value = "0,0,1", allow_hyphen_values = true)]
    axis: [f32; 3],

    /// Eye position as x,y,z
    #[arg(long, value_parser = parse_triple, default_value = "0,0,5", allow_hyphen_values = true)]
    eye: [f32; 3],

    /// Output image; the format follows the extension
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// STL mesh to render instead of the reference triangle
    #[arg(long)]
    stl: Option<PathBuf>,

    /// Flat mesh color as r,g,b in 0..=255
    #[arg(long, value_parser = parse_triple, default_value = "217,238,185")]
    color: [f32; 3],

    #[arg(long, default_value_t = 700)]
    width: usize,

    #[arg(long, default_value_t = 700)]
    height: usize,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 45.0)]
    fov: f32,

    #[arg(long, default_value_t = 0.1)]
    near: f32,

    #[arg(long, default_value_t = 50.0)]
    far: f32,

    /// Supersampling grid size per pixel side
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    samples: u32,

    /// Sample each pixel once at its center
    #[arg(long)]
    no_aa: bool,

    /// Map depth with --near/--far instead of the fixed 0.1/50 pair
    #[arg(long)]
    match_depth_range: bool,

    /// Also print the frame to the terminal
    #[arg(long)]
    preview: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn scene_options(&self) -> SceneOptions {
        let sampling = if self.no_aa {
            Sampling::Single
        } else {
            Sampling::Supersample(self.samples)
        };
        SceneOptions {
            width: self.width,
            height: self.height,
            angle_deg: self.angle,
            axis: Vector3::from(self.axis),
            eye: Point3::from(self.eye),
            fov_deg: self.fov,
            near: self.near,
            far: self.far,
            sampling,
            match_depth_range: self.match_depth_range,
            color: Vector3::from(self.color),
            ..SceneOptions::default()
        }
    }
}

fn parse_triple(value: &str) -> Result<[f32; 3], String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in '{}': {}", value, e))?;
    <[f32; 3]>::try_from(parts).map_err(|parts| format!("expected 3 values, got {}", parts.len()))
}

fn load_mesh(path: &Path) -> Result<Mesh> {
    info!("Loading STL file: {}", path.display());
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mesh = stl::parse_stl(&data).with_context(|| format!("Failed to parse {}", path.display()))?;
    info!("Loaded {} triangles", mesh.triangle_count());
    Ok(mesh)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    let mut options = args.scene_options();
    let mesh = match &args.stl {
        Some(path) => {
            let mesh = load_mesh(path)?;
            options.base_model = fit_matrix(&mesh);
            mesh
        }
        None => Mesh::reference_triangle(),
    };

    let rasterizer = render(&mesh, &options).context("Rendering failed")?;

    export::save(rasterizer.frame(), &args.output)?;
    info!("Wrote {}", args.output.display());

    if args.preview {
        let mut stdout = stdout();
        TerminalPreview::for_terminal(rasterizer.frame()).draw(rasterizer.frame(), &mut stdout)?;
        stdout.flush()?;
    }

    Ok(())
}
