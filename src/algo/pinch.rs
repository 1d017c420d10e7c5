//! Tip pinching: sharpening or rounding of curvature extrema.
//!
//! A "tip" is a vertex whose signed curvature is a strict local extremum
//! relative to its neighbors: a protrusion (local maximum) or a pit (local
//! minimum). This stage displaces such vertices along their normal,
//! proportionally to their curvature:
//!
//! ```text
//! pos' = pos + amount * curvature * normal
//! ```
//!
//! A positive `amount` drives protrusions further outward and pits further
//! inward (sharpening both); a negative `amount` rounds both. Vertices whose
//! curvature magnitude sits below a small floor are never touched, so
//! near-flat noise is not amplified.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use super::curvature::CurvatureField;
use crate::mesh::{MeshIndex, SurfaceMesh, VertexId};

/// Minimum curvature magnitude for a vertex to qualify as a tip.
pub const CURVATURE_FLOOR: f64 = 1e-4;

/// Displace curvature extrema along their normals.
///
/// Reads `positions` and returns a fresh buffer; the input is never
/// mutated. `curvature` and `normals` must be evaluated against
/// `positions` (the pipeline driver computes a fresh field after the
/// smoothing and volume stages). Vertices that are not strict local extrema
/// of signed curvature, have no neighbors, or fall below
/// [`CURVATURE_FLOOR`] pass through unchanged.
pub fn pinch_tips<I: MeshIndex>(
    mesh: &SurfaceMesh<I>,
    positions: &[Point3<f64>],
    normals: &[Vector3<f64>],
    curvature: &CurvatureField<I>,
    amount: f64,
    parallel: bool,
) -> Vec<Point3<f64>> {
    let n = mesh.num_vertices();

    let compute_vertex = |idx: usize| -> Point3<f64> {
        let v = VertexId::<I>::new(idx);
        let pos = positions[idx];
        let k = curvature.signed(v);
        if k.abs() <= CURVATURE_FLOOR {
            return pos;
        }

        let neighbors = mesh.neighbors(v);
        if neighbors.is_empty() {
            return pos;
        }

        // Strict extremum test: plateaus of equal curvature are not tips
        let is_max = neighbors.iter().all(|&nb| k > curvature.signed(nb));
        let is_min = neighbors.iter().all(|&nb| k < curvature.signed(nb));
        if !is_max && !is_min {
            return pos;
        }

        pos + amount * k * normals[idx]
    };

    if parallel {
        (0..n).into_par_iter().map(compute_vertex).collect()
    } else {
        (0..n).map(compute_vertex).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::curvature::signed_curvature;
    use crate::mesh::build_from_triangles;
    use std::f64::consts::TAU;

    /// Cone: apex over a fanned disc base. Apex is vertex 0, the rim is
    /// 1..=segments, the base center is the last vertex.
    fn create_cone(segments: usize) -> SurfaceMesh {
        let mut vertices = vec![Point3::new(0.0, 0.0, 1.0)];
        for i in 0..segments {
            let a = TAU * i as f64 / segments as f64;
            vertices.push(Point3::new(a.cos(), a.sin(), 0.0));
        }
        vertices.push(Point3::new(0.0, 0.0, 0.0));
        let center = segments + 1;

        let mut faces = Vec::new();
        for i in 0..segments {
            let a = 1 + i;
            let b = 1 + (i + 1) % segments;
            faces.push([0, a, b]); // side, outward
            faces.push([center, b, a]); // base, downward
        }

        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_apex_is_local_maximum() {
        let mesh = create_cone(8);
        let field = signed_curvature(&mesh);

        let apex = VertexId::new(0);
        let k_apex = field.signed(apex);
        assert!(k_apex > CURVATURE_FLOOR, "apex should protrude, got {}", k_apex);
        for &nb in mesh.neighbors(apex) {
            assert!(
                field.signed(nb) < k_apex,
                "apex curvature should strictly exceed its neighbors"
            );
        }
    }

    #[test]
    fn test_positive_pinch_sharpens_apex() {
        let mesh = create_cone(8);
        let field = signed_curvature(&mesh);

        let out = pinch_tips(&mesh, mesh.positions(), mesh.normals(), &field, 1.0, true);
        assert!(
            out[0].z > 1.05,
            "positive pinch should push the apex outward, got z = {}",
            out[0].z
        );
    }

    #[test]
    fn test_negative_pinch_rounds_apex() {
        let mesh = create_cone(8);
        let field = signed_curvature(&mesh);

        let out = pinch_tips(&mesh, mesh.positions(), mesh.normals(), &field, -1.0, true);
        assert!(
            out[0].z < 0.95,
            "negative pinch should pull the apex inward, got z = {}",
            out[0].z
        );
    }

    #[test]
    fn test_displacement_proportional_to_curvature() {
        let mesh = create_cone(8);
        let field = signed_curvature(&mesh);
        let apex = VertexId::new(0);

        let out = pinch_tips(&mesh, mesh.positions(), mesh.normals(), &field, 1.0, true);
        let moved = (out[0] - mesh.positions()[0]).norm();
        assert!(
            (moved - field.magnitude(apex)).abs() < 1e-9,
            "unit pinch should displace by the curvature magnitude along a unit normal"
        );
    }

    #[test]
    fn test_rim_plateau_untouched() {
        // All rim vertices share the same curvature by symmetry, so none is
        // a strict extremum against its rim neighbors.
        let mesh = create_cone(8);
        let field = signed_curvature(&mesh);

        let out = pinch_tips(&mesh, mesh.positions(), mesh.normals(), &field, 1.0, true);
        for i in 1..=8 {
            assert_eq!(
                out[i],
                mesh.positions()[i],
                "rim vertex {} should not move",
                i
            );
        }
    }

    #[test]
    fn test_flat_grid_untouched() {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        let n = 3;
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                faces.push([v00, v00 + 1, v00 + n + 2]);
                faces.push([v00, v00 + n + 2, v00 + n + 1]);
            }
        }
        let mesh: SurfaceMesh = build_from_triangles(&vertices, &faces).unwrap();
        let field = signed_curvature(&mesh);

        let out = pinch_tips(&mesh, mesh.positions(), mesh.normals(), &field, 1.0, true);
        assert_eq!(out, mesh.positions().to_vec(), "flat geometry has no tips");
    }
}
