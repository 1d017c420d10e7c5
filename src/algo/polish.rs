//! The clay-polish filter pipeline.
//!
//! This module sequences the filter stages into one deterministic,
//! re-evaluatable transform: snapshot the input positions, run the
//! configured number of curvature-adaptive smoothing passes, blend back
//! toward the snapshot to counteract shrinkage, then pinch curvature tips.
//! The pipeline is a pure function of `(mesh, options)`; it owns no state
//! across evaluations and returns a fresh position buffer of the same
//! cardinality and ordering as the input.
//!
//! # Example
//!
//! ```
//! use claypolish::algo::polish::{clay_polish, PolishOptions};
//! use claypolish::mesh::{build_from_triangles, SurfaceMesh};
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
//! let options = PolishOptions::default()
//!     .with_strength(2.0)
//!     .with_iterations(8);
//! let polished = clay_polish(&mesh, &options).unwrap();
//! assert_eq!(polished.len(), mesh.num_vertices());
//! ```

use std::borrow::Cow;

use nalgebra::{Point3, Vector3};

use super::curvature::signed_curvature_at;
use super::pinch::pinch_tips;
use super::smooth::adaptive_smooth_pass;
use super::Progress;
use crate::error::{PolishError, Result};
use crate::mesh::{MeshIndex, SurfaceMesh};

/// Configuration for one polish evaluation.
///
/// Immutable for the duration of an evaluation and validated in full before
/// any computation starts. The host is expected to clamp raw UI input to the
/// documented ranges; the kernel still rejects out-of-range values.
#[derive(Debug, Clone)]
pub struct PolishOptions {
    /// Overall intensity multiplier, in `[0, 5]`.
    ///
    /// Scales the per-pass blend toward the Laplacian target; 0 disables
    /// smoothing entirely, 5 snaps fully to the target each pass.
    pub strength: f64,

    /// Number of smoothing passes, in `[1, 50]`.
    pub iterations: usize,

    /// Curvature magnitude below which a vertex is left untouched, `>= 0`.
    ///
    /// Separates "flat" (preserved) from "curved" (smoothed) regions; the
    /// transition ramps smoothly up to twice the threshold.
    pub curvature_threshold: f64,

    /// Tip displacement amount (signed).
    ///
    /// Positive sharpens curvature extrema, negative rounds them, 0 skips
    /// the stage entirely.
    pub pinch_tips: f64,

    /// Blend factor toward the original positions, in `[0, 1]`.
    ///
    /// Applied after smoothing to counteract shrinkage: 0 keeps the pure
    /// smoothing result, 1 restores the original positions.
    pub keep_volume: f64,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for PolishOptions {
    fn default() -> Self {
        Self {
            strength: 1.0,
            iterations: 5,
            curvature_threshold: 0.1,
            pinch_tips: 0.0,
            keep_volume: 0.3,
            parallel: true,
        }
    }
}

impl PolishOptions {
    /// Set the overall strength.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    /// Set the number of smoothing passes.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the curvature threshold.
    pub fn with_curvature_threshold(mut self, threshold: f64) -> Self {
        self.curvature_threshold = threshold;
        self
    }

    /// Set the tip pinch amount.
    pub fn with_pinch_tips(mut self, pinch_tips: f64) -> Self {
        self.pinch_tips = pinch_tips;
        self
    }

    /// Set the volume-preservation blend factor.
    pub fn with_keep_volume(mut self, keep_volume: f64) -> Self {
        self.keep_volume = keep_volume;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check every parameter against its documented range.
    ///
    /// Returns the first violation found; no partial application of a bad
    /// config ever happens because this runs before any computation.
    pub fn validate(&self) -> Result<()> {
        if !self.strength.is_finite() || !(0.0..=5.0).contains(&self.strength) {
            return Err(PolishError::invalid_param(
                "strength",
                self.strength,
                "must be in [0, 5]",
            ));
        }
        if !(1..=50).contains(&self.iterations) {
            return Err(PolishError::invalid_param(
                "iterations",
                self.iterations,
                "must be in [1, 50]",
            ));
        }
        if !self.curvature_threshold.is_finite() || self.curvature_threshold < 0.0 {
            return Err(PolishError::invalid_param(
                "curvature_threshold",
                self.curvature_threshold,
                "must be finite and non-negative",
            ));
        }
        if !self.pinch_tips.is_finite() {
            return Err(PolishError::invalid_param(
                "pinch_tips",
                self.pinch_tips,
                "must be finite",
            ));
        }
        if !self.keep_volume.is_finite() || !(0.0..=1.0).contains(&self.keep_volume) {
            return Err(PolishError::invalid_param(
                "keep_volume",
                self.keep_volume,
                "must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// The normals the filter stages see for a given intermediate buffer.
///
/// Host-authored normals stay fixed for the whole evaluation; derived
/// normals track the current positions.
fn working_normals<'a, I: MeshIndex>(
    mesh: &'a SurfaceMesh<I>,
    positions: &[Point3<f64>],
) -> Cow<'a, [Vector3<f64>]> {
    if mesh.has_authored_normals() {
        Cow::Borrowed(mesh.normals())
    } else {
        Cow::Owned(mesh.vertex_normals_at(positions))
    }
}

/// Run the clay-polish filter.
///
/// Returns a new position buffer with the same cardinality and ordering as
/// the input mesh; topology and all other attributes are untouched. A mesh
/// with zero vertices yields an empty buffer (the degenerate input is not an
/// error). An out-of-range option is rejected before any computation.
pub fn clay_polish<I: MeshIndex>(
    mesh: &SurfaceMesh<I>,
    options: &PolishOptions,
) -> Result<Vec<Point3<f64>>> {
    clay_polish_with_progress(mesh, options, &Progress::none())
}

/// Run the clay-polish filter, reporting once per smoothing pass.
pub fn clay_polish_with_progress<I: MeshIndex>(
    mesh: &SurfaceMesh<I>,
    options: &PolishOptions,
    progress: &Progress,
) -> Result<Vec<Point3<f64>>> {
    options.validate()?;

    if mesh.is_empty() {
        return Ok(Vec::new());
    }

    let original = mesh.positions().to_vec();
    let mut positions = original.clone();

    for iteration in 0..options.iterations {
        progress.report(iteration, options.iterations, "Clay polish");

        // Curvature tracks the current geometry, never the initial mesh
        let normals = working_normals(mesh, &positions);
        let curvature = signed_curvature_at(mesh, &positions, &normals, options.parallel);

        positions = adaptive_smooth_pass(
            mesh,
            &positions,
            &curvature,
            options.strength,
            options.curvature_threshold,
            options.parallel,
        );
    }
    progress.report(options.iterations, options.iterations, "Clay polish");

    if options.keep_volume > 0.0 {
        for (pos, orig) in positions.iter_mut().zip(&original) {
            *pos = Point3::from(pos.coords.lerp(&orig.coords, options.keep_volume));
        }
    }

    if options.pinch_tips != 0.0 {
        let normals = working_normals(mesh, &positions);
        let curvature = signed_curvature_at(mesh, &positions, &normals, options.parallel);
        positions = pinch_tips(
            mesh,
            &positions,
            &normals,
            &curvature,
            options.pinch_tips,
            options.parallel,
        );
    }

    Ok(positions)
}
