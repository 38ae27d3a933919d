//! Error types for mesh repair operations.

use thiserror::Error;

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors that can occur during mesh repair.
#[derive(Debug, Error)]
pub enum RepairError {
    /// Mesh is empty (no vertices or faces).
    #[error("mesh is empty")]
    EmptyMesh,

    /// A face references a vertex that does not exist.
    #[error("face {face} has invalid vertex index {index} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// Face holding the bad index.
        face: usize,
        /// The invalid index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Repair parameters are unusable.
    #[error("invalid repair parameter: {reason}")]
    InvalidParameter {
        /// What was wrong.
        reason: String,
    },

    /// Hole filling failed.
    #[error("failed to fill holes: {reason}")]
    HoleFillFailed {
        /// Reason for failure.
        reason: String,
    },
}

/// Check that every face index refers to an existing vertex.
///
/// # Errors
///
/// Returns [`RepairError::EmptyMesh`] for a mesh without faces and
/// [`RepairError::InvalidIndex`] for the first out-of-range index.
pub fn check_indices(mesh: &mesh_types::IndexedMesh) -> RepairResult<()> {
    if mesh.faces.is_empty() || mesh.vertices.is_empty() {
        return Err(RepairError::EmptyMesh);
    }
    let vertex_count = mesh.vertices.len();
    for (face, f) in mesh.faces.iter().enumerate() {
        if let Some(&index) = f.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(RepairError::InvalidIndex {
                face,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}
