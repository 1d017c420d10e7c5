//! Flat triangle-surface representation.
//!
//! This module provides [`SurfaceMesh`], a read-mostly triangle mesh built
//! around a flattened vertex-adjacency table. The filter kernel only ever
//! needs per-vertex reads of positions, normals, and directly connected
//! neighbors, so adjacency is stored CSR-style: one offsets array and one
//! packed neighbor array, shared read-only across parallel workers.
//!
//! Topology is immutable after construction; filtering reads positions and
//! writes fresh output buffers of equal cardinality.

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, MeshIndex, VertexId};
use crate::error::{PolishError, Result};

/// A triangle mesh with precomputed vertex adjacency.
///
/// Holds vertex positions, per-vertex unit normals (derived at construction
/// or authored by the host), the triangle list, and a symmetric
/// vertex-to-neighbors relation. Construct with
/// [`build_from_triangles`](super::build_from_triangles).
#[derive(Debug, Clone)]
pub struct SurfaceMesh<I: MeshIndex = u32> {
    /// Vertex positions.
    pub(crate) positions: Vec<Point3<f64>>,

    /// Per-vertex unit normals. Zero for vertices with no incident faces.
    pub(crate) normals: Vec<Vector3<f64>>,

    /// Triangle list.
    pub(crate) triangles: Vec<[VertexId<I>; 3]>,

    /// CSR offsets into `neighbor_data`, length `num_vertices + 1`.
    pub(crate) neighbor_offsets: Vec<usize>,

    /// Packed neighbor indices, sorted per vertex.
    pub(crate) neighbor_data: Vec<VertexId<I>>,

    /// Whether `normals` were supplied by the host rather than derived.
    pub(crate) authored_normals: bool,
}

impl<I: MeshIndex> Default for SurfaceMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> SurfaceMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            triangles: Vec::new(),
            neighbor_offsets: vec![0],
            neighbor_data: Vec::new(),
            authored_normals: false,
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.triangles.len()
    }

    /// Check whether the mesh has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.positions[v.index()]
    }

    /// Get all vertex positions as a slice.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Get the normal of a vertex.
    #[inline]
    pub fn normal(&self, v: VertexId<I>) -> &Vector3<f64> {
        &self.normals[v.index()]
    }

    /// Get all vertex normals as a slice.
    #[inline]
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    /// Whether the vertex normals were authored by the host.
    ///
    /// Derived normals are recomputed against intermediate positions during
    /// filtering; authored normals are kept fixed for a whole evaluation.
    #[inline]
    pub fn has_authored_normals(&self) -> bool {
        self.authored_normals
    }

    /// Replace the vertex normals with host-authored unit normals.
    ///
    /// Returns an error if the normal count does not match the vertex count.
    pub fn set_vertex_normals(&mut self, normals: Vec<Vector3<f64>>) -> Result<()> {
        if normals.len() != self.positions.len() {
            return Err(PolishError::invalid_param(
                "normals",
                normals.len(),
                "must match vertex count",
            ));
        }
        self.normals = normals;
        self.authored_normals = true;
        Ok(())
    }

    // ==================== Topology Queries ====================

    /// Get the neighbors of a vertex as a sorted slice.
    ///
    /// The relation is symmetric: if `a` appears in `neighbors(b)`, then `b`
    /// appears in `neighbors(a)`. Isolated vertices yield an empty slice.
    #[inline]
    pub fn neighbors(&self, v: VertexId<I>) -> &[VertexId<I>] {
        let i = v.index();
        &self.neighbor_data[self.neighbor_offsets[i]..self.neighbor_offsets[i + 1]]
    }

    /// Compute the valence (degree) of a vertex.
    #[inline]
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.neighbors(v).len()
    }

    /// Get the three vertices of a triangular face.
    #[inline]
    pub fn triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        self.triangles[f.index()]
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.positions.len()).map(VertexId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.triangles.len()).map(FaceId::new)
    }

    // ==================== Geometry ====================

    /// Get the positions of the three vertices of a face.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.triangle(f);
        [
            *self.position(v0),
            *self.position(v1),
            *self.position(v2),
        ]
    }

    /// Compute the unit normal of a face.
    ///
    /// Returns zero for degenerate faces.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        let n = (p1 - p0).cross(&(p2 - p0));
        let len = n.norm();
        if len > 1e-12 {
            n / len
        } else {
            Vector3::zeros()
        }
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Compute the centroid of a face.
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    /// Compute the centroid of all vertices.
    ///
    /// Returns the origin for an empty mesh.
    pub fn centroid(&self) -> Point3<f64> {
        centroid_of(&self.positions)
    }

    /// Compute the signed volume enclosed by the mesh.
    ///
    /// Uses the divergence theorem (sum of signed tetrahedra from the
    /// origin). Only meaningful for closed meshes; the sign depends on the
    /// winding orientation.
    pub fn signed_volume(&self) -> f64 {
        self.signed_volume_at(&self.positions)
    }

    /// Compute the signed volume against an external position buffer.
    ///
    /// The buffer must have the same cardinality and ordering as the mesh's
    /// own positions.
    pub fn signed_volume_at(&self, positions: &[Point3<f64>]) -> f64 {
        let mut volume = 0.0;
        for tri in &self.triangles {
            let p0 = positions[tri[0].index()].coords;
            let p1 = positions[tri[1].index()].coords;
            let p2 = positions[tri[2].index()].coords;
            volume += p0.dot(&p1.cross(&p2)) / 6.0;
        }
        volume
    }

    /// Compute area-weighted vertex normals against an external position
    /// buffer.
    ///
    /// Vertices with no incident faces (or degenerate neighborhoods) get a
    /// zero normal. The buffer must have the same cardinality and ordering
    /// as the mesh's own positions.
    pub fn vertex_normals_at(&self, positions: &[Point3<f64>]) -> Vec<Vector3<f64>> {
        let mut normals = vec![Vector3::zeros(); positions.len()];

        // Accumulate area-weighted face normals
        for tri in &self.triangles {
            let p0 = positions[tri[0].index()];
            let p1 = positions[tri[1].index()];
            let p2 = positions[tri[2].index()];
            let face_normal = (p1 - p0).cross(&(p2 - p0)); // Area-weighted

            normals[tri[0].index()] += face_normal;
            normals[tri[1].index()] += face_normal;
            normals[tri[2].index()] += face_normal;
        }

        for n in &mut normals {
            let len = n.norm();
            if len > 1e-12 {
                *n /= len;
            }
        }

        normals
    }
}

/// Compute the centroid of a position buffer.
///
/// Returns the origin for an empty buffer.
pub(crate) fn centroid_of(positions: &[Point3<f64>]) -> Point3<f64> {
    if positions.is_empty() {
        return Point3::origin();
    }
    let sum: Vector3<f64> = positions.iter().map(|p| p.coords).sum();
    Point3::from(sum / positions.len() as f64)
}
