//! Curvature-adaptive Laplacian smoothing.
//!
//! One smoothing pass moves each vertex toward the centroid of its
//! neighbors, blended per vertex by a curvature-derived weight: vertices at
//! or below the curvature threshold keep their position, vertices well above
//! it are fully smoothed, and a smoothstep ramp in between avoids visible
//! seams at the threshold boundary.
//!
//! All vertices of a pass are updated simultaneously from the pass's input
//! buffer (double buffering); no vertex ever reads a neighbor's in-progress
//! update. The pipeline driver in [`polish`](crate::algo::polish) recomputes
//! the curvature field between passes.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use super::curvature::CurvatureField;
use crate::mesh::{MeshIndex, SurfaceMesh, VertexId};

/// Ramp-width factor for the threshold smoothstep.
///
/// The smoothing weight ramps from 0 at `threshold` to 1 at
/// `threshold * RAMP_WIDTH`.
pub const RAMP_WIDTH: f64 = 2.0;

/// The `strength` value that maps to a full single-pass snap to the
/// Laplacian target.
pub const FULL_STRENGTH: f64 = 5.0;

/// Compute the smoothing weight for a curvature magnitude.
///
/// Returns 0 for magnitudes at or below `threshold`, 1 at or above
/// `threshold * RAMP_WIDTH`, with a smoothstep ramp in between. A zero
/// threshold degenerates to a hard step: any positive curvature is fully
/// smoothed.
pub fn smooth_weight(magnitude: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return if magnitude > 0.0 { 1.0 } else { 0.0 };
    }
    let t = ((magnitude - threshold) / (threshold * (RAMP_WIDTH - 1.0))).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Perform one curvature-adaptive smoothing pass.
///
/// Reads `positions` (the pass input buffer) and returns a fresh output
/// buffer; the input is never mutated. Per vertex:
///
/// ```text
/// pos' = lerp(pos, centroid(neighbors), smooth_weight(|k|, threshold) * clamp(strength / 5, 0, 1))
/// ```
///
/// Vertices with no neighbors pass through unchanged.
pub fn adaptive_smooth_pass<I: MeshIndex>(
    mesh: &SurfaceMesh<I>,
    positions: &[Point3<f64>],
    curvature: &CurvatureField<I>,
    strength: f64,
    threshold: f64,
    parallel: bool,
) -> Vec<Point3<f64>> {
    let factor = (strength / FULL_STRENGTH).clamp(0.0, 1.0);
    let n = mesh.num_vertices();

    let compute_vertex = |idx: usize| -> Point3<f64> {
        let v = VertexId::<I>::new(idx);
        let neighbors = mesh.neighbors(v);
        let pos = positions[idx];
        if neighbors.is_empty() {
            return pos;
        }

        let mut centroid = Vector3::zeros();
        for &nb in neighbors {
            centroid += positions[nb.index()].coords;
        }
        centroid /= neighbors.len() as f64;

        let weight = smooth_weight(curvature.magnitude(v), threshold) * factor;
        Point3::from(pos.coords.lerp(&centroid, weight))
    };

    if parallel {
        (0..n).into_par_iter().map(compute_vertex).collect()
    } else {
        (0..n).map(compute_vertex).collect()
    }
}
