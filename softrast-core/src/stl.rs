//! STL file parser for binary and ASCII formats
//!
//! Facets are welded into an indexed [`Mesh`]: vertices with bit-identical
//! coordinates share one position, so the result can be loaded straight into
//! the rasterizer's position and index buffers.
use std::collections::HashMap;

use nalgebra::Vector3;
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u16},
    sequence::{preceded, tuple},
    IResult,
};
use thiserror::Error;

use crate::geometry::Mesh;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("file too small to be a valid STL ({0} bytes)")]
    TooShort(usize),

    #[error("STL declares {declared} facets but only {found} are present")]
    Truncated { declared: usize, found: usize },

    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),
}

type Facet = [Vector3<f32>; 3];

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, MeshError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(MeshError::TooShort(data.len()));
    }

    let body = &data[HEADER_LEN..];
    let declared = u32::from_le_bytes([body[0], body[1], body[2], body[3]]) as usize;
    let facets = &body[4..];
    let found = facets.len() / FACET_LEN;
    if found < declared {
        return Err(MeshError::Truncated { declared, found });
    }

    let (_, facets) = count(binary_facet, declared)(facets)
        .map_err(|_| MeshError::Truncated { declared, found })?;

    let mut builder = MeshBuilder::with_capacity(declared);
    for facet in facets {
        builder.push_facet(facet);
    }
    Ok(builder.finish())
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Facet> {
    let (input, _normal) = take(12usize)(input)?;
    let (input, a) = binary_vector3(input)?;
    let (input, b) = binary_vector3(input)?;
    let (input, c) = binary_vector3(input)?;
    let (input, _attributes) = le_u16(input)?;
    Ok((input, [a, b, c]))
}

fn binary_vector3(input: &[u8]) -> IResult<&[u8], Vector3<f32>> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, MeshError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(e) => Err(MeshError::Ascii(format!("{:?}", e))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;

    let mut builder = MeshBuilder::with_capacity(facets.len());
    for facet in facets {
        builder.push_facet(facet);
    }

    Ok((input, builder.finish()))
}

fn parse_facet(input: &str) -> IResult<&str, Facet> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, a) = parse_vertex(input)?;
    let (input, b) = parse_vertex(input)?;
    let (input, c) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, [a, b, c]))
}

fn parse_vertex(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    parse_vector3(input)
}

fn parse_vector3(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Mesh, MeshError> {
    // Binary files may also start with "solid", so fall back on failure
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }

    parse_binary_stl(data)
}

/// Accumulates facets, sharing positions between identical vertices
struct MeshBuilder {
    mesh: Mesh,
    seen: HashMap<[u32; 3], usize>,
}

impl MeshBuilder {
    fn with_capacity(facets: usize) -> Self {
        Self {
            mesh: Mesh::with_capacity(facets, facets),
            seen: HashMap::with_capacity(facets),
        }
    }

    fn push_facet(&mut self, facet: Facet) {
        let face = facet.map(|v| self.vertex(v));
        self.mesh.indices.push(face);
    }

    fn vertex(&mut self, v: Vector3<f32>) -> usize {
        // Adding zero folds -0.0 into 0.0
        let key = [(v.x + 0.0).to_bits(), (v.y + 0.0).to_bits(), (v.z + 0.0).to_bits()];
        let positions = &mut self.mesh.positions;
        *self.seen.entry(key).or_insert_with(|| {
            positions.push(v);
            positions.len() - 1
        })
    }

    fn finish(self) -> Mesh {
        self.mesh
    }
}
