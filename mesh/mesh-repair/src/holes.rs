//! Hole detection and filling.
//!
//! A hole is a closed loop of boundary edges. Loops are traced in the
//! direction opposite to the faces that own the boundary edges, so a patch
//! triangulated in loop order has the same winding as its surroundings.

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, Point3, Triangle, Vector3};
use tracing::{debug, warn};

use crate::adjacency::{MeshAdjacency, face_edges};

/// A closed loop of boundary vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Ordered vertex indices; the loop closes from the last back to the first.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of edges (and vertices) in the loop.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True for a loop without vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Find all closed boundary loops of a mesh.
///
/// Open boundary chains that do not return to their start (which only occur
/// around non-manifold vertices) are skipped with a warning.
///
/// # Example
///
/// ```
/// use mesh_types::IndexedMesh;
/// use mesh_repair::detect_holes;
///
/// let tri = IndexedMesh::from_raw(
///     &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
///     &[[0, 1, 2]],
/// );
/// let holes = detect_holes(&tri);
/// assert_eq!(holes.len(), 1);
/// assert_eq!(holes[0].vertices, vec![0, 2, 1]);
/// ```
#[must_use]
pub fn detect_holes(mesh: &IndexedMesh) -> Vec<BoundaryLoop> {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut next: HashMap<u32, Vec<u32>> = HashMap::new();
    for &face in &mesh.faces {
        for (a, b) in face_edges(face) {
            if adjacency.faces_for_edge(a, b).len() == 1 {
                next.entry(b).or_default().push(a);
            }
        }
    }

    let mut starts: Vec<u32> = next.keys().copied().collect();
    starts.sort_unstable();

    let mut loops = Vec::new();
    for start in starts {
        while next.get(&start).is_some_and(|v| !v.is_empty()) {
            let mut vertices = vec![start];
            let mut current = start;
            let closed = loop {
                let Some(step) = next.get_mut(&current).and_then(Vec::pop) else {
                    break false;
                };
                if step == start {
                    break true;
                }
                vertices.push(step);
                current = step;
            };
            if closed && vertices.len() >= 3 {
                loops.push(BoundaryLoop { vertices });
            } else if !closed {
                warn!(start, "boundary chain does not close");
            }
        }
    }

    debug!(holes = loops.len(), "detected boundary loops");
    loops
}

/// Triangulate a boundary loop by ear clipping in the loop's plane.
///
/// Falls back to a fan when no ear can be found (strongly non-planar loops).
#[must_use]
pub fn fill_hole(mesh: &IndexedMesh, boundary: &BoundaryLoop) -> Vec<[u32; 3]> {
    let n = boundary.len();
    if n < 3 {
        return Vec::new();
    }
    let positions: Vec<Point3<f64>> = boundary
        .vertices
        .iter()
        .map(|&i| mesh.vertices[i as usize].position)
        .collect();
    let normal = loop_normal(&positions);

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&i| {
            let prev = remaining[(i + m - 1) % m];
            let next = remaining[(i + 1) % m];
            is_ear(&positions, &remaining, prev, remaining[i], next, &normal)
        });
        let Some(i) = ear else {
            warn!(remaining = m, "ear clipping stuck, using fan");
            break;
        };
        let prev = remaining[(i + m - 1) % m];
        let next = remaining[(i + 1) % m];
        triangles.push([
            boundary.vertices[prev],
            boundary.vertices[remaining[i]],
            boundary.vertices[next],
        ]);
        remaining.remove(i);
    }

    for k in 1..remaining.len() - 1 {
        triangles.push([
            boundary.vertices[remaining[0]],
            boundary.vertices[remaining[k]],
            boundary.vertices[remaining[k + 1]],
        ]);
    }
    triangles
}

/// Fill every hole with at most `max_edges` edges.
///
/// Returns the number of holes filled.
pub fn fill_holes(mesh: &mut IndexedMesh, max_edges: usize) -> usize {
    let holes = detect_holes(mesh);
    let mut filled = 0;
    for hole in holes.iter().filter(|h| h.len() <= max_edges) {
        let patch = fill_hole(mesh, hole);
        if !patch.is_empty() {
            mesh.faces.extend(patch);
            filled += 1;
        }
    }
    if filled < holes.len() {
        debug!(skipped = holes.len() - filled, max_edges, "left large holes open");
    }
    filled
}

/// Newell normal of a polygon in loop order.
fn loop_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z)
}

fn is_ear(
    positions: &[Point3<f64>],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
    normal: &Vector3<f64>,
) -> bool {
    let tri = Triangle::new(positions[prev], positions[curr], positions[next]);
    let Some(tri_normal) = tri.normal() else {
        return false;
    };
    if tri_normal.dot(normal) <= 0.0 {
        return false;
    }
    remaining
        .iter()
        .filter(|&&i| i != prev && i != curr && i != next)
        .all(|&i| !inside_triangle(&positions[i], &tri, normal))
}

/// Point-in-triangle test after projecting along `normal`.
fn inside_triangle(p: &Point3<f64>, tri: &Triangle, normal: &Vector3<f64>) -> bool {
    let side = |a: &Point3<f64>, b: &Point3<f64>| (b - a).cross(&(p - a)).dot(normal);
    side(&tri.v0, &tri.v1) > 0.0 && side(&tri.v1, &tri.v2) > 0.0 && side(&tri.v2, &tri.v0) > 0.0
}
