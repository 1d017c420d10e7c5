//! Signed curvature estimation on meshes.
//!
//! This module estimates, for every vertex, how far it protrudes from or
//! recedes into the plane of its neighborhood. The estimate is the
//! displacement between the vertex and the centroid of its neighbors,
//! projected onto the vertex normal and normalized by the mean incident
//! edge length so the measure is scale-invariant.
//!
//! The sign encodes the protrusion direction: positive values are convex
//! (the vertex sticks out along its normal), negative values are concave.
//! The adaptive smoother consumes only the magnitude; the tip pincher uses
//! the sign to tell protrusions from pits.
//!
//! # Example
//!
//! ```
//! use claypolish::algo::curvature::signed_curvature;
//! use claypolish::mesh::{build_from_triangles, SurfaceMesh, VertexId};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let mesh: SurfaceMesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! let field = signed_curvature(&mesh);
//! // The apex of a tetrahedron protrudes: positive curvature
//! assert!(field.signed(VertexId::new(3)) > 0.0);
//! ```

use std::marker::PhantomData;

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::mesh::{MeshIndex, SurfaceMesh, VertexId};

/// Per-vertex signed curvature values.
///
/// Recomputed once per smoothing iteration against the current positions;
/// curvature is never frozen from the initial mesh.
#[derive(Debug, Clone)]
pub struct CurvatureField<I: MeshIndex = u32> {
    /// Signed curvature per vertex.
    values: Vec<f64>,
    /// Phantom data for index type.
    _marker: PhantomData<I>,
}

impl<I: MeshIndex> CurvatureField<I> {
    /// Get the signed curvature at a vertex.
    ///
    /// Positive = convex/protruding, negative = concave/receding.
    #[inline]
    pub fn signed(&self, v: VertexId<I>) -> f64 {
        self.values[v.index()]
    }

    /// Get the curvature magnitude at a vertex.
    #[inline]
    pub fn magnitude(&self, v: VertexId<I>) -> f64 {
        self.values[v.index()].abs()
    }

    /// Get all signed values as a slice.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The largest curvature magnitude in the field, or 0 if empty.
    pub fn max_magnitude(&self) -> f64 {
        self.values.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }
}

/// Compute signed curvature for all vertices.
///
/// Evaluates against the mesh's own positions and normals. Uses parallel
/// computation; see [`signed_curvature_sequential`] for the single-threaded
/// variant.
pub fn signed_curvature<I: MeshIndex>(mesh: &SurfaceMesh<I>) -> CurvatureField<I> {
    signed_curvature_at(mesh, mesh.positions(), mesh.normals(), true)
}

/// Compute signed curvature for all vertices (sequential version).
pub fn signed_curvature_sequential<I: MeshIndex>(mesh: &SurfaceMesh<I>) -> CurvatureField<I> {
    signed_curvature_at(mesh, mesh.positions(), mesh.normals(), false)
}

/// Compute signed curvature against an external position/normal buffer.
///
/// The smoother calls this once per iteration with the current intermediate
/// positions; both buffers must have the mesh's cardinality and ordering.
/// Vertices with no neighbors get curvature 0.
pub fn signed_curvature_at<I: MeshIndex>(
    mesh: &SurfaceMesh<I>,
    positions: &[Point3<f64>],
    normals: &[Vector3<f64>],
    parallel: bool,
) -> CurvatureField<I> {
    let n = mesh.num_vertices();

    let compute_vertex = |idx: usize| -> f64 {
        let v = VertexId::<I>::new(idx);
        let neighbors = mesh.neighbors(v);
        if neighbors.is_empty() {
            return 0.0;
        }

        let pos = positions[idx];
        let mut centroid = Vector3::zeros();
        let mut edge_sum = 0.0;
        for &nb in neighbors {
            let np = positions[nb.index()];
            centroid += np.coords;
            edge_sum += (np - pos).norm();
        }

        let count = neighbors.len() as f64;
        let centroid = centroid / count;
        let mean_edge = edge_sum / count;
        if mean_edge < 1e-12 {
            return 0.0;
        }

        // Displacement out of the neighborhood plane, per unit edge length
        (pos.coords - centroid).dot(&normals[idx]) / mean_edge
    };

    let values: Vec<f64> = if parallel {
        (0..n).into_par_iter().map(compute_vertex).collect()
    } else {
        (0..n).map(compute_vertex).collect()
    };

    CurvatureField {
        values,
        _marker: PhantomData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;

    fn create_grid(n: usize) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }

        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + (n + 1);
                let v11 = v01 + 1;

                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }

        (vertices, faces)
    }

    fn create_unit_cube() -> SurfaceMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_flat_grid_zero_curvature() {
        let (vertices, faces) = create_grid(4);
        let mesh: SurfaceMesh = build_from_triangles(&vertices, &faces).unwrap();

        let field = signed_curvature(&mesh);
        for v in mesh.vertex_ids() {
            assert!(
                field.magnitude(v) < 1e-12,
                "coplanar vertex {:?} should have zero curvature, got {}",
                v,
                field.signed(v)
            );
        }
    }

    #[test]
    fn test_bump_positive_dent_negative() {
        let (mut vertices, faces) = create_grid(4);
        // Raise the center vertex of the 5x5 grid
        let center = 2 * 5 + 2;
        vertices[center].z = 0.5;
        let bump: SurfaceMesh = build_from_triangles(&vertices, &faces).unwrap();
        let field = signed_curvature(&bump);
        assert!(
            field.signed(crate::mesh::VertexId::new(center)) > 0.0,
            "raised vertex should be convex"
        );

        let (mut vertices, faces) = create_grid(4);
        vertices[center].z = -0.5;
        let dent: SurfaceMesh = build_from_triangles(&vertices, &faces).unwrap();
        let field = signed_curvature(&dent);
        assert!(
            field.signed(crate::mesh::VertexId::new(center)) < 0.0,
            "lowered vertex should be concave"
        );
    }

    #[test]
    fn test_cube_corner_curvature() {
        let mesh = create_unit_cube();
        let field = signed_curvature(&mesh);

        // Every corner protrudes. The exact magnitude depends on how many
        // face diagonals the triangulation attaches to the corner (valence
        // 3 to 6 here), landing between roughly 0.55 and 0.72.
        for v in mesh.vertex_ids() {
            let k = field.signed(v);
            assert!(k > 0.0, "cube corner should be convex, got {}", k);
            assert!(
                (0.4..0.8).contains(&k),
                "cube corner curvature should be well below 0.8, got {}",
                k
            );
        }
    }

    #[test]
    fn test_isolated_vertex_zero() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(9.0, 9.0, 9.0), // unreferenced
        ];
        let faces = vec![[0, 1, 2]];
        let mesh: SurfaceMesh = build_from_triangles(&vertices, &faces).unwrap();

        let field = signed_curvature(&mesh);
        assert_eq!(field.signed(VertexId::new(3)), 0.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mesh = create_unit_cube();
        let par = signed_curvature(&mesh);
        let seq = signed_curvature_sequential(&mesh);
        for v in mesh.vertex_ids() {
            assert_eq!(par.signed(v), seq.signed(v));
        }
    }

    #[test]
    fn test_max_magnitude() {
        let mesh = create_unit_cube();
        let field = signed_curvature(&mesh);
        let max = field.max_magnitude();
        for v in mesh.vertex_ids() {
            assert!(field.magnitude(v) <= max);
        }
        assert!(max > 0.0);
    }
}
