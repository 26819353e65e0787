//! Error types for mesh validation.

use thiserror::Error;

/// Errors raised when a mesh does not satisfy the layout the line
/// extractors rely on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Mesh has no vertices or no faces.
    #[error("mesh is empty")]
    Empty,

    /// A per-vertex attribute array has the wrong length.
    #[error("attribute `{attribute}` has {found} entries, expected {expected}")]
    LengthMismatch {
        /// Name of the offending attribute.
        attribute: &'static str,
        /// Number of vertices in the mesh.
        expected: usize,
        /// Length of the attribute array.
        found: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Face index.
        face: usize,
        /// Offending vertex index.
        vertex: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
