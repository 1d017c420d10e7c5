//! Mesh construction utilities.
//!
//! This module builds [`SurfaceMesh`] instances from face-vertex lists as
//! commonly produced by mesh file formats or host applications. The
//! adjacency relation is assembled once here, in O(V + E), and is immutable
//! afterwards.

use std::collections::BTreeSet;

use nalgebra::Point3;

use super::index::{MeshIndex, VertexId};
use super::surface::SurfaceMesh;
use crate::error::{PolishError, Result};

/// Build a surface mesh from vertices and triangle faces.
///
/// Vertices that no face references are kept as isolated vertices with no
/// neighbors; the filter passes them through unchanged.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as `[v0, v1, v2]` indices
///
/// # Returns
/// A surface mesh with derived area-weighted vertex normals, or an error if
/// the input is invalid.
///
/// # Example
/// ```
/// use claypolish::mesh::{build_from_triangles, SurfaceMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh: SurfaceMesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<SurfaceMesh<I>> {
    if vertices.is_empty() {
        return Err(PolishError::EmptyMesh);
    }

    // Validate vertex indices and reject degenerate faces
    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(PolishError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(PolishError::DegenerateFace { face: fi });
        }
    }

    // Collect the undirected edge set. BTreeSet both deduplicates edges
    // shared between faces and yields them in index order, which keeps the
    // packed neighbor lists sorted and the build deterministic.
    let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();
    for face in faces {
        for i in 0..3 {
            let a = face[i];
            let b = face[(i + 1) % 3];
            edges.insert(if a < b { (a, b) } else { (b, a) });
        }
    }

    // Flatten into CSR form: count, prefix-sum, fill.
    let num_vertices = vertices.len();
    let mut counts = vec![0usize; num_vertices];
    for &(a, b) in &edges {
        counts[a] += 1;
        counts[b] += 1;
    }

    let mut neighbor_offsets = Vec::with_capacity(num_vertices + 1);
    neighbor_offsets.push(0);
    for &c in &counts {
        neighbor_offsets.push(neighbor_offsets.last().unwrap() + c);
    }

    let mut cursor = neighbor_offsets[..num_vertices].to_vec();
    let mut neighbor_data = vec![VertexId::<I>::invalid(); edges.len() * 2];
    for &(a, b) in &edges {
        neighbor_data[cursor[a]] = VertexId::new(b);
        cursor[a] += 1;
        neighbor_data[cursor[b]] = VertexId::new(a);
        cursor[b] += 1;
    }

    let triangles: Vec<[VertexId<I>; 3]> = faces
        .iter()
        .map(|f| [VertexId::new(f[0]), VertexId::new(f[1]), VertexId::new(f[2])])
        .collect();

    let mut mesh = SurfaceMesh {
        positions: vertices.to_vec(),
        normals: Vec::new(),
        triangles,
        neighbor_offsets,
        neighbor_data,
        authored_normals: false,
    };
    mesh.normals = mesh.vertex_normals_at(&mesh.positions);

    Ok(mesh)
}
