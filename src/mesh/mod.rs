//! Core mesh data structures.
//!
//! This module provides the flat triangle-surface representation consumed by
//! the polish kernel and related types.
//!
//! # Overview
//!
//! The primary type is [`SurfaceMesh`], which stores vertex positions,
//! per-vertex unit normals, the triangle list, and a precomputed symmetric
//! vertex-adjacency table. Topology is fixed at construction; the filter
//! stages only read it and produce fresh position buffers.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type (the
//! [`MeshIndex`] trait), allowing `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use claypolish::mesh::{build_from_triangles, SurfaceMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: SurfaceMesh = build_from_triangles(&vertices, &faces).unwrap();
//! ```

mod builder;
mod index;
mod surface;

pub use builder::build_from_triangles;
pub use index::{FaceId, MeshIndex, VertexId};
pub use surface::SurfaceMesh;

pub(crate) use surface::centroid_of;
