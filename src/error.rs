//! Error types for claypolish.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`PolishError`].
pub type Result<T> = std::result::Result<T, PolishError>;

/// Errors that can occur during mesh construction or filtering.
#[derive(Error, Debug)]
pub enum PolishError {
    /// The mesh has no vertices.
    #[error("mesh has no vertices")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// Invalid parameter value.
    ///
    /// Filter configurations are validated in full before any computation
    /// starts; a rejected config is never partially applied.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl PolishError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        PolishError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
