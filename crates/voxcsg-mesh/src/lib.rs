pub mod export;
pub mod surface;

pub use export::{build_mesh, export, ExportError, Unit};
pub use surface::extract_surface;

/// Triangle mesh produced from the voxel set.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Multiply every vertex coordinate by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.vertices {
            for c in v.iter_mut() {
                *c *= factor;
            }
        }
    }

    /// Signed enclosed volume. Positive when triangles wind outward.
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let a = glam::DVec3::from_array(self.vertices[t[0] as usize]);
                let b = glam::DVec3::from_array(self.vertices[t[1] as usize]);
                let c = glam::DVec3::from_array(self.vertices[t[2] as usize]);
                a.dot(b.cross(c)) / 6.0
            })
            .sum()
    }
}
