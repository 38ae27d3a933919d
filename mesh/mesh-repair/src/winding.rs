//! Consistent face orientation per connected body.
//!
//! Faces are propagated across shared manifold edges so that neighbours
//! traverse their common edge in opposite directions. Each connected body is
//! then flipped as a whole if its signed volume is negative, which makes the
//! normals of every closed body point outward.

use std::collections::VecDeque;

use mesh_types::{IndexedMesh, MeshTopology};
use tracing::debug;

use crate::adjacency::{MeshAdjacency, face_edges, has_directed_edge};

/// Outcome of [`fix_normals`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindingReport {
    /// Number of connected bodies found.
    pub components: usize,
    /// Faces flipped to agree with their neighbours.
    pub faces_flipped: usize,
    /// Bodies inverted because their volume was negative.
    pub bodies_inverted: usize,
}

/// Connected components of faces, linked through shared edges.
///
/// Components are ordered by their lowest face index.
#[must_use]
pub fn face_components(mesh: &IndexedMesh) -> Vec<Vec<usize>> {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut visited = vec![false; mesh.faces.len()];
    let mut components = Vec::new();

    for seed in 0..mesh.faces.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut queue = VecDeque::from([seed]);
        let mut members = Vec::new();
        while let Some(face_idx) = queue.pop_front() {
            members.push(face_idx);
            for other in adjacency.neighbors(mesh.faces[face_idx], face_idx) {
                if !visited[other] {
                    visited[other] = true;
                    queue.push_back(other);
                }
            }
        }
        components.push(members);
    }
    components
}

/// Make face winding consistent within each body and orient bodies outward.
///
/// Winding only propagates across edges shared by exactly two faces.
pub fn fix_normals(mesh: &mut IndexedMesh) -> WindingReport {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut visited = vec![false; mesh.faces.len()];
    let mut report = WindingReport::default();

    for seed in 0..mesh.faces.len() {
        if visited[seed] {
            continue;
        }
        report.components += 1;
        visited[seed] = true;
        let mut queue = VecDeque::from([seed]);
        let mut members = Vec::new();

        while let Some(face_idx) = queue.pop_front() {
            members.push(face_idx);
            let face = mesh.faces[face_idx];
            for (a, b) in face_edges(face) {
                let shared = adjacency.faces_for_edge(a, b);
                if shared.len() != 2 {
                    continue;
                }
                for &other in shared {
                    if other == face_idx || visited[other] {
                        continue;
                    }
                    visited[other] = true;
                    if has_directed_edge(mesh.faces[other], a, b) {
                        mesh.faces[other].swap(1, 2);
                        report.faces_flipped += 1;
                    }
                    queue.push_back(other);
                }
            }
        }

        if body_volume(mesh, &members) < 0.0 {
            for &face_idx in &members {
                mesh.faces[face_idx].swap(1, 2);
            }
            report.bodies_inverted += 1;
        }
    }

    debug!(
        components = report.components,
        faces_flipped = report.faces_flipped,
        bodies_inverted = report.bodies_inverted,
        "fixed winding"
    );
    report
}

/// Check that every manifold edge is traversed in opposite directions.
#[must_use]
pub fn is_winding_consistent(mesh: &IndexedMesh) -> bool {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    mesh.faces.iter().enumerate().all(|(face_idx, &face)| {
        face_edges(face).iter().all(|&(a, b)| {
            let shared = adjacency.faces_for_edge(a, b);
            shared.len() != 2
                || shared
                    .iter()
                    .filter(|&&other| other != face_idx)
                    .all(|&other| !has_directed_edge(mesh.faces[other], a, b))
        })
    })
}

fn body_volume(mesh: &IndexedMesh, faces: &[usize]) -> f64 {
    faces
        .iter()
        .filter_map(|&i| mesh.triangle(i))
        .map(|t| t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)))
        .sum::<f64>()
        / 6.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{Vector3, unit_cube};

    #[test]
    fn consistent_cube_is_untouched() {
        let mut cube = unit_cube();
        let report = fix_normals(&mut cube);
        assert_eq!(report.components, 1);
        assert_eq!(report.faces_flipped, 0);
        assert_eq!(report.bodies_inverted, 0);
        assert!(is_winding_consistent(&cube));
    }

    #[test]
    fn single_flipped_face_is_repaired() {
        let mut cube = unit_cube();
        cube.faces[5].swap(0, 1);
        assert!(!is_winding_consistent(&cube));
        fix_normals(&mut cube);
        assert!(is_winding_consistent(&cube));
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn inverted_bodies_are_handled_independently() {
        let mut a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(4.0, 0.0, 0.0));
        b.flip_normals();
        a.merge(&b);
        assert_relative_eq!(a.signed_volume(), 0.0, epsilon = 1e-12);

        let report = fix_normals(&mut a);
        assert_eq!(report.components, 2);
        assert_eq!(report.bodies_inverted, 1);
        assert_relative_eq!(a.signed_volume(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn components_split_bodies() {
        let mut a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(4.0, 0.0, 0.0));
        a.merge(&b);
        let comps = face_components(&a);
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].len(), 12);
        assert_eq!(comps[1][0], 12);
    }
}
