//! Vertex welding and face cleanup.

use hashbrown::{HashMap, HashSet};
use mesh_types::{IndexedMesh, MeshTopology, Point3};
use tracing::debug;

/// Merge vertices closer than `epsilon` to each other.
///
/// Uses a spatial hash with cells of size `2 * epsilon` and checks the
/// 27-cell neighbourhood. Faces collapsed by the merge are removed. Merged
/// vertices stay in the vertex list until
/// [`remove_unreferenced_vertices`] runs.
///
/// Returns the number of vertices merged into another.
#[allow(clippy::cast_possible_truncation)]
pub fn weld_vertices(mesh: &mut IndexedMesh, epsilon: f64) -> usize {
    if mesh.vertices.is_empty() || epsilon <= 0.0 {
        return 0;
    }

    let cell_size = epsilon * 2.0;
    let mut grid: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for (idx, v) in mesh.vertices.iter().enumerate() {
        grid.entry(cell_of(&v.position, cell_size))
            .or_default()
            .push(idx as u32);
    }

    let mut remap: Vec<u32> = (0..mesh.vertices.len() as u32).collect();
    let mut merged = 0;

    for idx in 0..mesh.vertices.len() {
        if remap[idx] as usize != idx {
            continue;
        }
        let position = mesh.vertices[idx].position;
        let (cx, cy, cz) = cell_of(&position, cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &other in candidates {
                        let o = other as usize;
                        if o <= idx || remap[o] as usize != o {
                            continue;
                        }
                        if (mesh.vertices[o].position - position).norm() < epsilon {
                            remap[o] = idx as u32;
                            merged += 1;
                        }
                    }
                }
            }
        }
    }

    if merged > 0 {
        for face in &mut mesh.faces {
            for i in face.iter_mut() {
                *i = remap[*i as usize];
            }
        }
        mesh.faces.retain(|f| f[0] != f[1] && f[1] != f[2] && f[0] != f[2]);
        debug!(merged, epsilon, "welded vertices");
    }
    merged
}

#[allow(clippy::cast_possible_truncation)]
fn cell_of(p: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (p.x / cell_size).floor() as i64,
        (p.y / cell_size).floor() as i64,
        (p.z / cell_size).floor() as i64,
    )
}

/// Remove faces whose area is below `area_threshold`, or which repeat a vertex.
///
/// Returns the number of faces removed.
pub fn remove_degenerate_faces(mesh: &mut IndexedMesh, area_threshold: f64) -> usize {
    let before = mesh.faces.len();
    let keep: Vec<bool> = (0..before)
        .map(|i| {
            let f = mesh.faces[i];
            f[0] != f[1]
                && f[1] != f[2]
                && f[0] != f[2]
                && mesh.triangle(i).is_some_and(|t| t.area() >= area_threshold)
        })
        .collect();
    let mut flags = keep.into_iter();
    mesh.faces.retain(|_| flags.next().unwrap_or(false));
    before - mesh.faces.len()
}

/// Remove faces that use the same three vertices as an earlier face,
/// regardless of winding or rotation.
///
/// Returns the number of faces removed.
pub fn remove_duplicate_faces(mesh: &mut IndexedMesh) -> usize {
    let before = mesh.faces.len();
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(before);
    mesh.faces.retain(|f| {
        let mut key = *f;
        key.sort_unstable();
        seen.insert(key)
    });
    before - mesh.faces.len()
}

/// Drop vertices no face refers to and compact the vertex list.
///
/// Returns the number of vertices removed.
#[allow(clippy::cast_possible_truncation)]
pub fn remove_unreferenced_vertices(mesh: &mut IndexedMesh) -> usize {
    let mut used = vec![false; mesh.vertices.len()];
    for f in &mesh.faces {
        for &i in f {
            used[i as usize] = true;
        }
    }
    if used.iter().all(|&u| u) {
        return 0;
    }

    let mut new_index = vec![u32::MAX; mesh.vertices.len()];
    let mut next = 0u32;
    for (old, &u) in used.iter().enumerate() {
        if u {
            new_index[old] = next;
            next += 1;
        }
    }

    let before = mesh.vertices.len();
    let mut old = 0;
    mesh.vertices.retain(|_| {
        let keep = used[old];
        old += 1;
        keep
    });
    for f in &mut mesh.faces {
        for i in f.iter_mut() {
            *i = new_index[*i as usize];
        }
    }
    before - mesh.vertices.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{Vertex, unit_cube};

    fn triangle_soup_cube() -> IndexedMesh {
        let cube = unit_cube();
        let mut soup = IndexedMesh::new();
        for tri in cube.triangles() {
            let base = u32::try_from(soup.vertices.len()).unwrap_or(0);
            soup.vertices.extend([tri.v0, tri.v1, tri.v2].map(Vertex::new));
            soup.faces.push([base, base + 1, base + 2]);
        }
        soup
    }

    #[test]
    fn weld_restores_shared_vertices() {
        let mut soup = triangle_soup_cube();
        assert_eq!(soup.vertex_count(), 36);
        let merged = weld_vertices(&mut soup, 1e-6);
        assert_eq!(merged, 28);
        assert_eq!(remove_unreferenced_vertices(&mut soup), 28);
        assert_eq!(soup.vertex_count(), 8);
        assert_eq!(soup.face_count(), 12);
    }

    #[test]
    fn weld_ignores_distant_vertices() {
        let mut cube = unit_cube();
        assert_eq!(weld_vertices(&mut cube, 0.1), 0);
    }

    #[test]
    fn weld_collapses_sliver_faces() {
        let mut mesh = IndexedMesh::from_raw(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1e-9, 0.0]],
            &[[0, 1, 2]],
        );
        weld_vertices(&mut mesh, 1e-6);
        assert!(mesh.faces.is_empty());
    }

    #[test]
    fn degenerate_faces_removed() {
        let mut mesh = IndexedMesh::from_raw(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2], [0, 1, 3], [0, 0, 3]],
        );
        assert_eq!(remove_degenerate_faces(&mut mesh, 1e-12), 2);
        assert_eq!(mesh.faces, vec![[0, 1, 3]]);
    }

    #[test]
    fn duplicates_removed_regardless_of_order() {
        let mut mesh = IndexedMesh::from_raw(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2], [2, 1, 0], [1, 2, 0]],
        );
        assert_eq!(remove_duplicate_faces(&mut mesh), 2);
    }

    #[test]
    fn unreferenced_vertices_compacted() {
        let mut mesh = IndexedMesh::from_raw(
            &[[9.0, 9.0, 9.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[1, 2, 3]],
        );
        assert_eq!(remove_unreferenced_vertices(&mut mesh), 1);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert_eq!(mesh.vertices[0].position.x, 0.0);
    }
}
