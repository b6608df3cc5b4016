use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use glam::DVec3;
use stl_io::{Normal, Triangle, Vertex};
use thiserror::Error;
use voxcsg_core::types::Coord;

use crate::surface::extract_surface;
use crate::Mesh;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no voxels to export")]
    EmptyVoxelSet,
    #[error("failed to write mesh: {0}")]
    Io(#[from] std::io::Error),
}

/// Output unit of exported meshes. One voxel is one millimetre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Millimeters,
    Centimeters,
    Meters,
}

impl Unit {
    /// `mm` and `cm` are recognized; anything else means metres.
    pub fn parse(name: &str) -> Self {
        match name {
            "mm" => Unit::Millimeters,
            "cm" => Unit::Centimeters,
            _ => Unit::Meters,
        }
    }

    pub fn scale(self) -> f64 {
        match self {
            Unit::Millimeters => 1.0,
            Unit::Centimeters => 0.1,
            Unit::Meters => 0.001,
        }
    }
}

/// Surface mesh of `coords`, scaled to `unit`.
pub fn build_mesh(coords: &[Coord], unit: Unit) -> Result<Mesh, ExportError> {
    if coords.is_empty() {
        return Err(ExportError::EmptyVoxelSet);
    }
    let mut mesh = extract_surface(coords);
    mesh.scale(unit.scale());
    Ok(mesh)
}

/// Build the mesh of `coords` and write it to `path`: Wavefront OBJ for an
/// `.obj` extension, binary STL otherwise.
pub fn export(coords: &[Coord], path: &Path, unit: Unit) -> Result<Mesh, ExportError> {
    let mesh = build_mesh(coords, unit)?;
    let is_obj = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("obj"));
    let mut writer = BufWriter::new(File::create(path)?);
    if is_obj {
        writer.write_all(to_obj(&mesh).as_bytes())?;
    } else {
        write_stl(&mesh, &mut writer)?;
    }
    writer.flush()?;
    log::info!(
        "Exported {} triangles ({:?}) to {}",
        mesh.triangles.len(),
        unit,
        path.display()
    );
    Ok(mesh)
}

fn triangle_normal(mesh: &Mesh, tri: [u32; 3]) -> DVec3 {
    let [a, b, c] = tri.map(|i| DVec3::from_array(mesh.vertices[i as usize]));
    (b - a).cross(c - a).normalize_or_zero()
}

/// Binary STL through `stl_io`, one facet per triangle.
pub fn write_stl<W: Write>(mesh: &Mesh, writer: &mut W) -> std::io::Result<()> {
    let facets: Vec<Triangle> = mesh
        .triangles
        .iter()
        .map(|&tri| Triangle {
            normal: Normal::new(to_f32(triangle_normal(mesh, tri).to_array())),
            vertices: tri.map(|i| Vertex::new(to_f32(mesh.vertices[i as usize]))),
        })
        .collect();
    stl_io::write_stl(writer, facets.iter())
}

pub fn to_obj(mesh: &Mesh) -> String {
    let mut out = String::new();
    for v in &mesh.vertices {
        out.push_str(&format!("v {} {} {}\n", v[0], v[1], v[2]));
    }
    for t in &mesh.triangles {
        out.push_str(&format!("f {} {} {}\n", t[0] + 1, t[1] + 1, t[2] + 1));
    }
    out
}

fn to_f32(v: [f64; 3]) -> [f32; 3] {
    v.map(|c| c as f32)
}
