//! Mesh validation.
//!
//! A mesh is watertight when every edge is shared by exactly two faces and
//! neighbouring faces traverse their common edge in opposite directions.
//! That is the condition under which a signed distance is well defined.

use std::fmt;

use mesh_types::IndexedMesh;

use crate::adjacency::MeshAdjacency;
use crate::winding::{face_components, is_winding_consistent};

/// Summary of a mesh's topology.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of faces.
    pub face_count: usize,
    /// Number of distinct edges.
    pub edge_count: usize,
    /// Edges with only one adjacent face.
    pub boundary_edge_count: usize,
    /// Edges with more than two adjacent faces.
    pub non_manifold_edge_count: usize,
    /// Connected bodies.
    pub component_count: usize,
    /// Neighbouring faces agree on orientation.
    pub winding_consistent: bool,
    /// Signed volume; negative for inside-out meshes.
    pub signed_volume: f64,
}

impl MeshReport {
    /// Closed, two-manifold and consistently wound.
    #[must_use]
    pub const fn is_watertight(&self) -> bool {
        self.face_count > 0
            && self.boundary_edge_count == 0
            && self.non_manifold_edge_count == 0
            && self.winding_consistent
    }

    /// Watertight with negative volume.
    #[must_use]
    pub fn is_inside_out(&self) -> bool {
        self.is_watertight() && self.signed_volume < 0.0
    }
}

impl fmt::Display for MeshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vertices, {} faces, {} bodies, {} boundary edges, {} non-manifold edges, winding {}, volume {:.6}",
            self.vertex_count,
            self.face_count,
            self.component_count,
            self.boundary_edge_count,
            self.non_manifold_edge_count,
            if self.winding_consistent { "consistent" } else { "inconsistent" },
            self.signed_volume,
        )
    }
}

/// Inspect a mesh.
///
/// # Example
///
/// ```
/// use mesh_repair::validate_mesh;
/// use mesh_types::unit_cube;
///
/// let report = validate_mesh(&unit_cube());
/// assert!(report.is_watertight());
/// assert_eq!(report.component_count, 1);
/// ```
#[must_use]
pub fn validate_mesh(mesh: &IndexedMesh) -> MeshReport {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    MeshReport {
        vertex_count: mesh.vertices.len(),
        face_count: mesh.faces.len(),
        edge_count: adjacency.edge_count(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        component_count: face_components(mesh).len(),
        winding_consistent: is_winding_consistent(mesh),
        signed_volume: mesh.signed_volume(),
    }
}

/// Shorthand for `validate_mesh(mesh).is_watertight()`.
#[must_use]
pub fn is_watertight(mesh: &IndexedMesh) -> bool {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    adjacency.is_closed_manifold() && is_winding_consistent(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::unit_cube;

    #[test]
    fn cube_is_watertight() {
        let cube = unit_cube();
        assert!(is_watertight(&cube));
        let report = validate_mesh(&cube);
        assert_eq!(report.edge_count, 18);
        assert!(!report.is_inside_out());
    }

    #[test]
    fn open_mesh_is_not_watertight() {
        let mut cube = unit_cube();
        cube.faces.pop();
        assert!(!is_watertight(&cube));
        assert_eq!(validate_mesh(&cube).boundary_edge_count, 3);
    }

    #[test]
    fn flipped_face_breaks_watertightness() {
        let mut cube = unit_cube();
        cube.faces[0].swap(1, 2);
        assert!(!is_watertight(&cube));
    }

    #[test]
    fn inverted_cube_is_inside_out() {
        let mut cube = unit_cube();
        cube.flip_normals();
        assert!(validate_mesh(&cube).is_inside_out());
    }

    #[test]
    fn empty_mesh_is_not_watertight() {
        assert!(!is_watertight(&IndexedMesh::new()));
        assert!(!validate_mesh(&IndexedMesh::new()).is_watertight());
    }

    #[test]
    fn report_display() {
        let text = validate_mesh(&unit_cube()).to_string();
        assert!(text.contains("12 faces"));
        assert!(text.contains("winding consistent"));
    }
}
