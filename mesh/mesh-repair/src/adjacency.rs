//! Edge and face adjacency for indexed meshes.

use hashbrown::HashMap;

/// Undirected edge key with `a < b`.
pub type EdgeKey = (u32, u32);

/// Edge-to-face adjacency for a mesh.
///
/// Every undirected edge maps to the faces that use it, in face order.
#[derive(Debug, Clone, Default)]
pub struct MeshAdjacency {
    edge_to_faces: HashMap<EdgeKey, Vec<usize>>,
}

impl MeshAdjacency {
    /// Build adjacency information from a list of faces.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_repair::MeshAdjacency;
    ///
    /// let faces = vec![[0, 1, 2], [1, 3, 2]];
    /// let adj = MeshAdjacency::build(&faces);
    ///
    /// assert_eq!(adj.edge_count(), 5);
    /// assert_eq!(adj.boundary_edge_count(), 4);
    /// ```
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<EdgeKey, Vec<usize>> = HashMap::with_capacity(faces.len() * 3 / 2);
        for (face_idx, face) in faces.iter().enumerate() {
            for (a, b) in face_edges(*face) {
                edge_to_faces.entry(edge_key(a, b)).or_default().push(face_idx);
            }
        }
        Self { edge_to_faces }
    }

    /// Faces sharing the edge between `a` and `b`, in either direction.
    #[must_use]
    pub fn faces_for_edge(&self, a: u32, b: u32) -> &[usize] {
        self.edge_to_faces
            .get(&edge_key(a, b))
            .map_or(&[], Vec::as_slice)
    }

    /// Edges used by exactly one face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&edge, _)| edge)
    }

    /// Number of edges used by exactly one face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces.values().filter(|f| f.len() == 1).count()
    }

    /// Number of edges used by more than two faces.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_to_faces.values().filter(|f| f.len() > 2).count()
    }

    /// Number of distinct undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// True when every edge is shared by exactly two faces.
    ///
    /// An empty adjacency is not watertight.
    #[must_use]
    pub fn is_closed_manifold(&self) -> bool {
        !self.edge_to_faces.is_empty() && self.edge_to_faces.values().all(|f| f.len() == 2)
    }

    /// Faces sharing an edge with `face`, excluding itself.
    pub fn neighbors<'a>(&'a self, face: [u32; 3], face_idx: usize) -> impl Iterator<Item = usize> + 'a {
        face_edges(face)
            .into_iter()
            .flat_map(move |(a, b)| self.faces_for_edge(a, b).iter().copied())
            .filter(move |&other| other != face_idx)
    }
}

/// The three directed edges of a face in winding order.
#[inline]
#[must_use]
pub const fn face_edges(face: [u32; 3]) -> [(u32, u32); 3] {
    [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])]
}

/// Check whether `face` traverses the directed edge `a -> b`.
#[inline]
#[must_use]
pub fn has_directed_edge(face: [u32; 3], a: u32, b: u32) -> bool {
    face_edges(face).contains(&(a, b))
}

#[inline]
fn edge_key(a: u32, b: u32) -> EdgeKey {
    if a < b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TETRA: [[u32; 3]; 4] = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]];

    #[test]
    fn tetrahedron_is_closed() {
        let adj = MeshAdjacency::build(&TETRA);
        assert_eq!(adj.edge_count(), 6);
        assert_eq!(adj.boundary_edge_count(), 0);
        assert!(adj.is_closed_manifold());
    }

    #[test]
    fn open_fan_has_boundary() {
        let adj = MeshAdjacency::build(&TETRA[..3]);
        assert_eq!(adj.boundary_edge_count(), 3);
        assert!(!adj.is_closed_manifold());
    }

    #[test]
    fn non_manifold_edge_counted() {
        let faces = [[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let adj = MeshAdjacency::build(&faces);
        assert_eq!(adj.non_manifold_edge_count(), 1);
        assert_eq!(adj.faces_for_edge(1, 0), &[0, 1, 2]);
    }

    #[test]
    fn neighbors_exclude_self() {
        let adj = MeshAdjacency::build(&TETRA);
        let mut n: Vec<usize> = adj.neighbors(TETRA[0], 0).collect();
        n.sort_unstable();
        assert_eq!(n, vec![1, 2, 3]);
    }

    #[test]
    fn directed_edges() {
        assert!(has_directed_edge([0, 1, 2], 2, 0));
        assert!(!has_directed_edge([0, 1, 2], 0, 2));
    }

    #[test]
    fn empty_is_not_closed() {
        assert!(!MeshAdjacency::build(&[]).is_closed_manifold());
    }
}
