//! Indexed triangle mesh.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Aabb, MeshBounds, MeshTopology, Triangle, Vertex};

/// A triangle mesh with indexed vertices.
///
/// Faces reference vertices by `u32` index. Winding is CCW when viewed from
/// outside.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex, MeshTopology};
///
/// let mesh = IndexedMesh::from_parts(
///     vec![
///         Vertex::from_coords(0.0, 0.0, 0.0),
///         Vertex::from_coords(1.0, 0.0, 0.0),
///         Vertex::from_coords(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
/// assert_eq!(mesh.vertex_count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,
    /// Triangle faces as indices into `vertices`.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Create an empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create an empty mesh with preallocated storage.
    #[must_use]
    pub fn with_capacity(vertex_capacity: usize, face_capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_capacity),
            faces: Vec::with_capacity(face_capacity),
        }
    }

    /// Create a mesh from vertices and faces.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from raw positions and faces.
    #[must_use]
    pub fn from_raw(positions: &[[f64; 3]], faces: &[[u32; 3]]) -> Self {
        Self {
            vertices: positions.iter().map(|&p| Vertex::from(p)).collect(),
            faces: faces.to_vec(),
        }
    }

    /// Iterate over vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.vertices.iter().map(|v| &v.position)
    }

    /// Translate every vertex by `offset`.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for v in &mut self.vertices {
            v.position += offset;
        }
    }

    /// Uniformly scale every vertex about the origin.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.vertices {
            v.position.coords *= factor;
        }
    }

    /// Swap the Y and Z coordinate of every vertex (Z-up to Y-up and back).
    ///
    /// Normals are swapped as well. Swapping two axes mirrors the mesh, so
    /// face winding is reversed to keep normals pointing outward.
    pub fn swap_yz(&mut self) {
        for v in &mut self.vertices {
            v.position.coords.swap_rows(1, 2);
            if let Some(n) = v.normal.as_mut() {
                n.swap_rows(1, 2);
            }
        }
        for face in &mut self.faces {
            face.swap(1, 2);
        }
    }

    /// Mean of all vertex positions, or `None` for a mesh without vertices.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn vertex_centroid(&self) -> Option<Point3<f64>> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum: Vector3<f64> = self.positions().map(|p| p.coords).sum();
        Some(Point3::from(sum / self.vertices.len() as f64))
    }

    /// Largest Euclidean norm over all vertices; `0.0` for an empty mesh.
    #[must_use]
    pub fn max_vertex_norm(&self) -> f64 {
        self.vertices.iter().map(Vertex::norm).fold(0.0, f64::max)
    }

    /// Append another mesh, offsetting its face indices.
    pub fn merge(&mut self, other: &Self) {
        #[allow(clippy::cast_possible_truncation)]
        let offset = self.vertices.len() as u32;
        self.vertices.extend(other.vertices.iter().cloned());
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );
    }

    /// Concatenate several meshes into one.
    #[must_use]
    pub fn concatenate<'a>(parts: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut out = Self::new();
        for part in parts {
            out.merge(part);
        }
        out
    }

    /// Reverse the winding of every face.
    pub fn flip_normals(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
        for v in &mut self.vertices {
            if let Some(n) = v.normal.as_mut() {
                *n = -*n;
            }
        }
    }

    /// Signed volume via the divergence theorem.
    ///
    /// Positive for a closed mesh with outward-facing normals.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|t| t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)))
            .sum::<f64>()
            / 6.0
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|t| t.area()).sum()
    }

    /// Per-face areas in face order.
    #[must_use]
    pub fn face_areas(&self) -> Vec<f64> {
        self.triangles().map(|t| t.area()).collect()
    }

    /// Check that every face index refers to an existing vertex.
    #[must_use]
    pub fn indices_in_range(&self) -> bool {
        let n = self.vertices.len();
        self.faces
            .iter()
            .all(|f| f.iter().all(|&i| (i as usize) < n))
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    fn triangle(&self, face_index: usize) -> Option<Triangle> {
        let f = self.faces.get(face_index)?;
        Some(Triangle::new(
            self.vertices.get(f[0] as usize)?.position,
            self.vertices.get(f[1] as usize)?.position,
            self.vertices.get(f[2] as usize)?.position,
        ))
    }

    fn triangles(&self) -> impl Iterator<Item = Triangle> {
        (0..self.faces.len()).filter_map(|i| self.triangle(i))
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions())
    }
}

/// Axis-aligned unit cube `[0, 1]³` with outward winding.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    let positions = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let faces = [
        // bottom (z = 0)
        [0, 2, 1],
        [0, 3, 2],
        // top (z = 1)
        [4, 5, 6],
        [4, 6, 7],
        // front (y = 0)
        [0, 1, 5],
        [0, 5, 4],
        // back (y = 1)
        [3, 7, 6],
        [3, 6, 2],
        // left (x = 0)
        [0, 4, 7],
        [0, 7, 3],
        // right (x = 1)
        [1, 2, 6],
        [1, 6, 5],
    ];
    IndexedMesh::from_raw(&positions, &faces)
}
