//! Error types for line extraction.

use linedraw_mesh::MeshError;
use thiserror::Error;

/// Errors that reject a frame before any face is processed.
///
/// Per-face degeneracies never surface here: a face that cannot produce a
/// segment is skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineError {
    /// Mesh has no vertices or faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Mesh layout is inconsistent.
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),

    /// A feature needs a per-view field that was not computed for this frame.
    #[error("feature `{feature}` needs the `{field}` field, which was not computed")]
    MissingField {
        /// Feature family that was requested.
        feature: &'static str,
        /// Field group that is missing.
        field: &'static str,
    },

    /// Adjacency was built for a different mesh.
    #[error("topology covers {topology_vertices} vertices and {topology_faces} faces, mesh has {mesh_vertices} and {mesh_faces}")]
    TopologyMismatch {
        /// Vertex count of the mesh.
        mesh_vertices: usize,
        /// Face count of the mesh.
        mesh_faces: usize,
        /// Vertices covered by the topology.
        topology_vertices: usize,
        /// Faces covered by the topology.
        topology_faces: usize,
    },

    /// Per-view fields were computed for a different mesh.
    #[error("per-view fields cover {found} vertices, mesh has {expected}")]
    FieldLength {
        /// Vertex count of the mesh.
        expected: usize,
        /// Vertex count of the fields.
        found: usize,
    },

    /// The model-view transform has no inverse, so there is no viewer position.
    #[error("model-view transform is singular")]
    SingularTransform,

    /// Configuration values are out of range.
    #[error("invalid line configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for line extraction.
pub type Result<T> = std::result::Result<T, LineError>;
