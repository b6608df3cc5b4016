//! Isosurface of a voxel occupancy field.
//!
//! Samples sit on voxel centers (-1 inside, +1 outside) over the bounding
//! box padded by one empty layer, so the surface always closes. The field is
//! meshed with surface nets; every crossing lies halfway between an occupied
//! and an empty sample.

use fast_surface_nets::ndshape::{RuntimeShape, Shape};
use fast_surface_nets::{surface_nets, SurfaceNetsBuffer};
use glam::IVec3;
use voxcsg_core::types::Coord;

use crate::Mesh;

const INSIDE: f32 = -1.0;
const OUTSIDE: f32 = 1.0;

struct Field {
    origin: IVec3,
    shape: RuntimeShape<u32, 3>,
    samples: Vec<f32>,
}

impl Field {
    fn from_coords(coords: &[Coord]) -> Option<Self> {
        let first = *coords.first()?;
        let (min, max) = coords
            .iter()
            .fold((first, first), |(lo, hi), &c| (lo.min(c), hi.max(c)));
        // One empty sample on each side.
        let origin = min - IVec3::ONE;
        let extent = max - min + IVec3::splat(3);
        let shape =
            RuntimeShape::<u32, 3>::new([extent.x as u32, extent.y as u32, extent.z as u32]);

        let mut samples = vec![OUTSIDE; shape.usize()];
        for &c in coords {
            let local = c - origin;
            let idx = shape.linearize([local.x as u32, local.y as u32, local.z as u32]);
            samples[idx as usize] = INSIDE;
        }
        Some(Self {
            origin,
            shape,
            samples,
        })
    }

    fn max_corner(&self) -> [u32; 3] {
        self.shape.as_array().map(|n| n - 1)
    }
}

/// Closed, outward-wound triangle surface around `coords`, in voxel units.
pub fn extract_surface(coords: &[Coord]) -> Mesh {
    let Some(field) = Field::from_coords(coords) else {
        return Mesh::empty();
    };

    let mut buffer = SurfaceNetsBuffer::default();
    surface_nets(
        &field.samples,
        &field.shape,
        [0, 0, 0],
        field.max_corner(),
        &mut buffer,
    );

    let offset = field.origin.as_dvec3();
    let mut mesh = Mesh {
        vertices: buffer
            .positions
            .iter()
            .map(|p| {
                [
                    offset.x + p[0] as f64,
                    offset.y + p[1] as f64,
                    offset.z + p[2] as f64,
                ]
            })
            .collect(),
        triangles: buffer
            .indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect(),
    };

    // Winding is consistent across all parts; orient it outward.
    if mesh.signed_volume() < 0.0 {
        for tri in &mut mesh.triangles {
            tri.swap(1, 2);
        }
    }
    log::debug!(
        "Surface of {} voxels: {} vertices, {} triangles",
        coords.len(),
        mesh.vertices.len(),
        mesh.triangles.len()
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use std::collections::HashMap;

    /// Every directed edge appears once and its reverse once: closed and
    /// consistently wound.
    fn assert_closed(mesh: &Mesh) {
        let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
        for t in &mesh.triangles {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                *directed.entry((a, b)).or_default() += 1;
            }
        }
        for (&(a, b), &count) in &directed {
            assert_eq!(count, 1, "edge {a}->{b} used {count} times");
            assert_eq!(directed.get(&(b, a)), Some(&1), "edge {a}->{b} has no twin");
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_surface(&[]).is_empty());
    }

    #[test]
    fn test_single_voxel_closed() {
        let mesh = extract_surface(&[IVec3::new(5, 5, 5)]);
        assert!(!mesh.is_empty());
        assert_closed(&mesh);
        assert!(mesh.signed_volume() > 0.0);
        for v in &mesh.vertices {
            let d = DVec3::from_array(*v) - DVec3::splat(5.0);
            assert!(d.abs().max_element() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn test_block_volume_grows() {
        let single = extract_surface(&[IVec3::ZERO]).signed_volume();
        let mut block = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                for z in 0..3 {
                    block.push(IVec3::new(x, y, z));
                }
            }
        }
        let mesh = extract_surface(&block);
        assert_closed(&mesh);
        let volume = mesh.signed_volume();
        assert!(volume > single);
        // Surface stays within half a voxel of the block.
        assert!(volume < 4.0 * 4.0 * 4.0);
        assert!(volume > 2.0 * 2.0 * 2.0);
    }

    #[test]
    fn test_negative_coordinates_keep_position() {
        let mesh = extract_surface(&[IVec3::new(-3, 0, 2)]);
        let centroid = mesh
            .vertices
            .iter()
            .fold(DVec3::ZERO, |acc, v| acc + DVec3::from_array(*v))
            / mesh.vertices.len() as f64;
        assert!((centroid - DVec3::new(-3.0, 0.0, 2.0)).length() < 1e-6);
    }

    #[test]
    fn test_disjoint_parts() {
        let mesh = extract_surface(&[IVec3::new(0, 0, 0), IVec3::new(4, 0, 0)]);
        assert_closed(&mesh);
        let one = extract_surface(&[IVec3::ZERO]);
        assert_eq!(mesh.triangles.len(), one.triangles.len() * 2);
        assert!(mesh.signed_volume() > 0.0);
    }
}
